//! Secret read from a local JSON file

use super::SecretStore;
use crate::credential::Credential;
use crate::error::SecretError;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

/// Reads the secret document from a file on every resolve.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    path: PathBuf,
}

impl FileSecretStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SecretStore for FileSecretStore {
    async fn resolve(&self, name: &str) -> Result<Credential, SecretError> {
        debug!(path = %self.path.display(), secret = name, "Reading secret file");

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => SecretError::NotFound(name.to_string()),
                ErrorKind::PermissionDenied => SecretError::AccessDenied(name.to_string()),
                _ => SecretError::Unavailable(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    e
                )),
            })?;

        Credential::from_secret_string(name, &content)
    }
}
