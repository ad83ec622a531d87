//! Source-database bootstrap for the text embeddings pipeline
//!
//! Resolves a database credential from a secret store, connects to the
//! PostgreSQL source database and seeds the `faqs` table with one row:
//! - Credential parsing and secret store clients
//! - Seed data and the statements that create it
//! - The bootstrap handler with scoped connection release
//! - A Lambda Runtime API client driving the handler
//!
//! Inside Lambda the secret is read through the AWS Parameters and Secrets
//! Lambda Extension, not the Secrets Manager API. The function must have
//! that extension layer attached, and its execution role still needs
//! `secretsmanager:GetSecretValue` on the secret. Without the layer every
//! invocation fails with `CredentialResolutionError` (store unavailable).
//! Set `BOOTSTRAP_SECRET_FILE` to read the secret from a file instead.

pub mod config;
pub mod credential;
pub mod db;
pub mod error;
pub mod handler;
pub mod runtime;
pub mod secrets;
pub mod seed;

#[cfg(test)]
mod test_http;

pub use config::{BootstrapConfig, Config, DEFAULT_SECRET_NAME};
pub use credential::Credential;
pub use db::{Connector, PgConnector, Session};
pub use error::{BootstrapError, SecretError};
pub use handler::{BootstrapReport, Bootstrapper};
pub use secrets::{AnySecretStore, ExtensionSecretStore, FileSecretStore, SecretStore};
pub use seed::{FaqRow, SchemaPolicy, Statement, FAQ_TABLE};
