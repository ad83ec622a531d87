//! Bootstrap configuration from environment variables

use crate::seed::SchemaPolicy;
use anyhow::{anyhow, Context, Result};
use common::{ConfigExt, LambdaEnv};
use sqlx::postgres::PgSslMode;
use std::path::PathBuf;
use std::time::Duration;

/// Secret created for the source database by the infrastructure stack
pub const DEFAULT_SECRET_NAME: &str = "text-embeddings-pipeline-source-database";

/// Settings the handler is constructed with.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub secret_name: String,
    pub schema_policy: SchemaPolicy,
    pub connect_timeout: Duration,
    /// Upper bound for the whole seeding transaction, commit included.
    ///
    /// When it fires while COMMIT is in flight the server may still have
    /// applied the transaction, even though the invocation reports a query
    /// failure. Re-running under `if-not-exists` settles the outcome.
    pub query_timeout: Duration,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            secret_name: DEFAULT_SECRET_NAME.to_string(),
            schema_policy: SchemaPolicy::Strict,
            connect_timeout: Duration::from_secs(5),
            query_timeout: Duration::from_secs(5),
        }
    }
}

/// Process-level configuration for the `faq-bootstrap` binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub bootstrap: BootstrapConfig,
    pub ssl_mode: PgSslMode,
    /// Read the secret from this file instead of the secrets extension.
    pub secret_file: Option<PathBuf>,
    pub secrets_extension_port: u16,
    pub secret_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let schema_policy = String::env_or("BOOTSTRAP_SCHEMA_POLICY", "strict")
            .parse::<SchemaPolicy>()
            .map_err(|e| anyhow!(e))
            .context("Invalid BOOTSTRAP_SCHEMA_POLICY")?;

        let ssl_mode = String::env_or("BOOTSTRAP_SSL_MODE", "prefer")
            .parse::<PgSslMode>()
            .context("Invalid BOOTSTRAP_SSL_MODE")?;

        Ok(Self {
            bootstrap: BootstrapConfig {
                secret_name: String::env_or("BOOTSTRAP_SECRET_NAME", DEFAULT_SECRET_NAME),
                schema_policy,
                connect_timeout: Duration::from_secs(u64::env_parse(
                    "BOOTSTRAP_CONNECT_TIMEOUT",
                    5,
                )),
                query_timeout: Duration::from_secs(u64::env_parse("BOOTSTRAP_QUERY_TIMEOUT", 5)),
            },
            ssl_mode,
            secret_file: String::env_opt("BOOTSTRAP_SECRET_FILE").map(PathBuf::from),
            secrets_extension_port: LambdaEnv::secrets_extension_port(),
            secret_timeout: Duration::from_secs(u64::env_parse("BOOTSTRAP_SECRET_TIMEOUT", 3)),
        })
    }
}
