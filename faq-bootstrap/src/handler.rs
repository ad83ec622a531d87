//! The bootstrap handler
//!
//! One invocation resolves the credential, opens a connection, seeds the
//! `faqs` table in a single transaction and closes the connection again.
//! Once a connection is open it is closed on every exit path, and a close
//! failure never hides the result of the seeding itself.

use crate::config::BootstrapConfig;
use crate::db::{Connector, Session};
use crate::error::BootstrapError;
use crate::secrets::SecretStore;
use crate::seed::{seed_statements, FaqRow, SchemaPolicy, Statement, FAQ_TABLE};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Summary returned to the invoker after a successful bootstrap.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapReport {
    pub secret_name: String,
    pub host: String,
    pub database: String,
    pub table: String,
    pub schema_policy: SchemaPolicy,
    pub rows_inserted: u64,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

/// Seeds the source database using the configured collaborators.
pub struct Bootstrapper<S, C> {
    config: BootstrapConfig,
    secrets: S,
    connector: C,
    seed: FaqRow,
}

impl<S, C> Bootstrapper<S, C>
where
    S: SecretStore,
    C: Connector,
{
    pub fn new(config: BootstrapConfig, secrets: S, connector: C) -> Self {
        Self {
            config,
            secrets,
            connector,
            seed: FaqRow::sample(),
        }
    }

    /// Replace the seed row inserted by [`invoke`](Self::invoke).
    pub fn with_seed(mut self, seed: FaqRow) -> Self {
        self.seed = seed;
        self
    }

    pub fn config(&self) -> &BootstrapConfig {
        &self.config
    }

    /// Run one bootstrap.
    pub async fn invoke(&self) -> Result<BootstrapReport, BootstrapError> {
        let result = self.run().await;
        if let Err(e) = &result {
            error!(
                error_type = e.error_type(),
                phase = e.phase(),
                error = %e,
                "Bootstrap failed"
            );
        }
        result
    }

    async fn run(&self) -> Result<BootstrapReport, BootstrapError> {
        let start = Instant::now();

        self.seed.validate()?;
        let statements = seed_statements(self.config.schema_policy, &self.seed);

        info!(secret = %self.config.secret_name, "Resolving database credential");
        let credential = self
            .secrets
            .resolve(&self.config.secret_name)
            .await
            .map_err(|source| BootstrapError::CredentialResolution {
                secret: self.config.secret_name.clone(),
                source,
            })?;

        info!(
            host = %credential.host,
            port = credential.port,
            database = %credential.database(),
            "Connecting to source database"
        );
        let mut session = match timeout(
            self.config.connect_timeout,
            self.connector.connect(&credential),
        )
        .await
        {
            Ok(session) => session?,
            Err(_) => {
                return Err(BootstrapError::Connection {
                    host: credential.host.clone(),
                    port: credential.port,
                    reason: format!("timed out after {:?}", self.config.connect_timeout),
                })
            }
        };

        let seeded = self.seed_database(&mut session, &statements).await;

        if let Err(e) = session.close().await {
            warn!(error = %e, "Failed to close database connection");
        }

        let rows_inserted = seeded?;
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            table = FAQ_TABLE,
            policy = %self.config.schema_policy,
            rows_inserted,
            duration_ms,
            "Bootstrap completed"
        );

        Ok(BootstrapReport {
            secret_name: self.config.secret_name.clone(),
            host: credential.host.clone(),
            database: credential.database().to_string(),
            table: FAQ_TABLE.to_string(),
            schema_policy: self.config.schema_policy,
            rows_inserted,
            duration_ms,
            completed_at: Utc::now(),
        })
    }

    async fn seed_database(
        &self,
        session: &mut C::Session,
        statements: &[Statement],
    ) -> Result<u64, BootstrapError> {
        timeout(
            self.config.query_timeout,
            session.run_in_transaction(statements),
        )
        .await
        .map_err(|_| BootstrapError::QueryExecution {
            reason: format!(
                "transaction timed out after {:?}; the commit may still have been applied",
                self.config.query_timeout
            ),
        })?
    }
}
