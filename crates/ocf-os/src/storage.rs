use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, ErrorKind, Result};

/// The directory where a secure device keeps its credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStorage {
    path: PathBuf,
}

impl CredentialStorage {
    /// Opens the credential storage at `path`, creating the directory when
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or if `path`
    /// exists but is not a directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        std::fs::create_dir_all(path).map_err(|e| {
            Error::new(
                ErrorKind::Storage,
                format!("Unable to open credential storage `{}`: {e}", path.display()),
            )
        })?;

        info!("Credential storage: {}", path.display());

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Returns the storage directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::error::ErrorKind;

    use super::CredentialStorage;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ocf-os-{}-{name}", std::process::id()))
    }

    #[test]
    fn creates_missing_directory() {
        let path = scratch("creds");

        let storage = CredentialStorage::open(&path).unwrap();

        assert!(storage.path().is_dir());
        std::fs::remove_dir_all(path).unwrap();
    }

    #[test]
    fn rejects_regular_file() {
        let path = scratch("file");
        std::fs::write(&path, b"not a directory").unwrap();

        let error = CredentialStorage::open(&path).unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Storage);
        std::fs::remove_file(path).unwrap();
    }
}
