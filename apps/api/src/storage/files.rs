use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::storage::StorageError;

/// Writes generated resumes into a single output directory.
#[derive(Debug, Clone)]
pub struct ResumeStore {
    dir: PathBuf,
}

impl ResumeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the output directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    pub async fn exists(&self, file_name: &str) -> Result<bool, StorageError> {
        let path = self.path_for(file_name)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    /// Writes `pdf` as `file_name`. An existing file of that name belongs to
    /// another bid and is never replaced.
    pub async fn save(&self, file_name: &str, pdf: &[u8]) -> Result<PathBuf, StorageError> {
        let path = self.path_for(file_name)?;
        self.ensure_dir().await?;

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::FileExists(file_name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = write_all(&mut file, pdf).await {
            drop(file);
            if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                warn!("Could not remove partial PDF {}: {cleanup}", path.display());
            }
            return Err(e);
        }

        info!("PDF saved to {}", path.display());
        Ok(path)
    }

    /// Deletes a resume written by `save`.
    pub async fn remove(&self, file_name: &str) -> Result<(), StorageError> {
        let path = self.path_for(file_name)?;
        tokio::fs::remove_file(&path).await?;
        info!("PDF removed: {}", path.display());
        Ok(())
    }

    fn path_for(&self, file_name: &str) -> Result<PathBuf, StorageError> {
        if file_name.is_empty()
            || file_name.contains(['/', '\\'])
            || file_name.starts_with('.')
        {
            return Err(StorageError::InvalidFileName(file_name.to_string()));
        }
        Ok(self.dir.join(file_name))
    }
}

async fn write_all(file: &mut tokio::fs::File, bytes: &[u8]) -> Result<(), StorageError> {
    file.write_all(bytes).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_creates_dir_and_writes_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ResumeStore::new(tmp.path().join("auto_generated_resumes"));

        let path = store.save("Jane_Acme_Dev_7.pdf", b"%PDF-1.7").await.unwrap();

        assert_eq!(path, store.dir().join("Jane_Acme_Dev_7.pdf"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"%PDF-1.7");
        assert!(store.exists("Jane_Acme_Dev_7.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_refuses_to_replace_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ResumeStore::new(tmp.path());

        let path = store.save("a.pdf", b"first").await.unwrap();
        let err = store.save("a.pdf", b"second").await.unwrap_err();

        assert!(matches!(err, StorageError::FileExists(ref name) if name == "a.pdf"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn test_remove_deletes_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ResumeStore::new(tmp.path());

        store.save("a.pdf", b"x").await.unwrap();
        store.remove("a.pdf").await.unwrap();

        assert!(!store.exists("a.pdf").await.unwrap());
        assert!(store.remove("a.pdf").await.is_err());
    }

    #[tokio::test]
    async fn test_save_rejects_path_traversal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ResumeStore::new(tmp.path());

        for name in ["../escape.pdf", "sub/dir.pdf", "..\\x.pdf", ".hidden", ""] {
            let err = store.save(name, b"x").await.unwrap_err();
            assert!(matches!(err, StorageError::InvalidFileName(_)), "{name}");
            assert!(store.remove(name).await.is_err(), "{name}");
        }
    }
}
