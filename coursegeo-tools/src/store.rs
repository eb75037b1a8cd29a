//! Stockage d'objets (buckets et clés)
//!
//! `LocalStore` expose un dossier local avec la même interface qu'un
//! stockage distant: chaque bucket est un sous-dossier, chaque clé un
//! chemin relatif séparé par `/`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Accès à un stockage d'objets
pub trait BlobStore {
    /// Clés du bucket commençant par `prefix`, triées
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>>;

    /// Contenu d'un objet
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    /// Écrit un objet (écrase l'existant)
    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<()>;

    /// Télécharge tous les objets sous `prefix` dans `local_dir`.
    ///
    /// Le chemin local est la clé privée du préfixe; les clés de dossier
    /// (terminées par `/`) sont ignorées. Une clé contenant un segment `.` ou
    /// `..` est refusée. Retourne le nombre de fichiers écrits.
    fn download_many(&self, bucket: &str, prefix: &str, local_dir: &Path) -> Result<usize> {
        std::fs::create_dir_all(local_dir)
            .with_context(|| format!("Cannot create {}", local_dir.display()))?;

        let keys = self.list(bucket, prefix)?;
        if keys.is_empty() {
            info!(bucket, prefix, "No objects found");
        }

        let mut count = 0;
        for key in keys.iter().filter(|key| !key.ends_with('/')) {
            let relative = key
                .strip_prefix(prefix)
                .unwrap_or(key)
                .trim_start_matches('/');
            if relative.is_empty() {
                continue;
            }

            let mut target = local_dir.to_path_buf();
            for segment in relative.split('/').filter(|s| !s.is_empty()) {
                if segment == ".." || segment == "." {
                    bail!("Invalid object key: {:?}", key);
                }
                target.push(segment);
            }
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Cannot create {}", parent.display()))?;
            }

            let bytes = self.get(bucket, key)?;
            std::fs::write(&target, bytes)
                .with_context(|| format!("Cannot write {}", target.display()))?;
            debug!(key = %key, target = %target.display(), "Object downloaded");
            count += 1;
        }

        Ok(count)
    }
}

/// Stockage sur disque local
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_dir(&self, bucket: &str) -> Result<PathBuf> {
        if bucket.is_empty() || bucket.contains(['/', '\\']) || bucket == ".." {
            bail!("Invalid bucket name: {:?}", bucket);
        }
        Ok(self.root.join(bucket))
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf> {
        let mut path = self.bucket_dir(bucket)?;
        for segment in key.split('/').filter(|s| !s.is_empty()) {
            if segment == ".." || segment == "." {
                bail!("Invalid object key: {:?}", key);
            }
            path.push(segment);
        }
        Ok(path)
    }
}

impl BlobStore for LocalStore {
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let dir = self.bucket_dir(bucket)?;
        if !dir.is_dir() {
            bail!("Bucket not found: {}", bucket);
        }

        let mut keys = Vec::new();
        for entry in WalkDir::new(&dir).min_depth(1) {
            let entry = entry.with_context(|| format!("Cannot list bucket {}", bucket))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&dir) else {
                continue;
            };
            let key = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        std::fs::read(&path).with_context(|| format!("Cannot read object {}/{}", bucket, key))
    }

    fn put(&self, bucket: &str, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes).with_context(|| format!("Cannot write object {}/{}", bucket, key))
    }
}
