//! Error taxonomy surfaced by the bootstrap handler
//!
//! Every failure reaches the invoker as one of the [`BootstrapError`]
//! variants so that it can be told apart in logs and in the Lambda
//! `errorType` field.

use thiserror::Error;

/// Failures while resolving a named secret.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret {0} not found")]
    NotFound(String),

    #[error("access denied to secret {0}")]
    AccessDenied(String),

    #[error("secret store unavailable: {0}")]
    Unavailable(String),

    #[error("secret {name} is malformed: {reason}")]
    Malformed { name: String, reason: String },
}

/// Failures of a single bootstrap invocation.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to resolve credential {secret}: {source}")]
    CredentialResolution {
        secret: String,
        #[source]
        source: SecretError,
    },

    #[error("failed to connect to {host}:{port}: {reason}")]
    Connection {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("relation {table} already exists")]
    SchemaConflict { table: String },

    #[error("query failed: {reason}")]
    QueryExecution { reason: String },

    #[error("seed row rejected: {reason}")]
    InvalidSeed { reason: String },
}

impl BootstrapError {
    /// Stable name of the failure class, reported as the Lambda `errorType`.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::CredentialResolution { .. } => "CredentialResolutionError",
            Self::Connection { .. } => "ConnectionError",
            Self::SchemaConflict { .. } => "SchemaConflictError",
            Self::QueryExecution { .. } => "QueryExecutionError",
            Self::InvalidSeed { .. } => "InvalidSeedError",
        }
    }

    /// Bootstrap phase the failure happened in, for log fields.
    pub fn phase(&self) -> &'static str {
        match self {
            Self::CredentialResolution { .. } => "resolve_credential",
            Self::Connection { .. } => "connect",
            Self::SchemaConflict { .. } | Self::QueryExecution { .. } => "seed",
            Self::InvalidSeed { .. } => "validate_seed",
        }
    }
}
