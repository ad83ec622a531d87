//! Secret store clients
//!
//! A [`SecretStore`] resolves a secret name to a [`Credential`]. Inside
//! Lambda the secret comes from the Parameters and Secrets extension; for
//! local runs it can be read from a JSON file instead.

mod extension;
mod file;

use crate::credential::Credential;
use crate::error::SecretError;

pub use extension::ExtensionSecretStore;
pub use file::FileSecretStore;

/// Resolves named credentials.
#[allow(async_fn_in_trait)]
pub trait SecretStore {
    async fn resolve(&self, name: &str) -> Result<Credential, SecretError>;
}

/// The secret store selected by configuration.
pub enum AnySecretStore {
    Extension(ExtensionSecretStore),
    File(FileSecretStore),
}

impl SecretStore for AnySecretStore {
    async fn resolve(&self, name: &str) -> Result<Credential, SecretError> {
        match self {
            Self::Extension(store) => store.resolve(name).await,
            Self::File(store) => store.resolve(name).await,
        }
    }
}
