//! PostgreSQL implementation backed by a single `sqlx` connection

use super::{Connector, Session};
use crate::credential::Credential;
use crate::error::BootstrapError;
use crate::seed::{Statement, FAQ_TABLE};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::Connection;
use tracing::{debug, warn};

/// SQLSTATE raised by `CREATE TABLE` when the relation exists
const DUPLICATE_TABLE: &str = "42P07";

/// Connects with one dedicated connection per invocation.
#[derive(Debug, Clone)]
pub struct PgConnector {
    ssl_mode: PgSslMode,
}

impl PgConnector {
    pub fn new(ssl_mode: PgSslMode) -> Self {
        Self { ssl_mode }
    }

    fn options(&self, credential: &Credential) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&credential.host)
            .port(credential.port)
            .username(&credential.username)
            .password(&credential.password)
            .database(credential.database())
            .ssl_mode(self.ssl_mode)
            .application_name("faq-bootstrap")
    }
}

impl Default for PgConnector {
    fn default() -> Self {
        Self::new(PgSslMode::Prefer)
    }
}

impl Connector for PgConnector {
    type Session = PgSession;

    async fn connect(&self, credential: &Credential) -> Result<PgSession, BootstrapError> {
        let conn = PgConnection::connect_with(&self.options(credential))
            .await
            .map_err(|e| BootstrapError::Connection {
                host: credential.host.clone(),
                port: credential.port,
                reason: e.to_string(),
            })?;

        debug!(host = %credential.host, "Connection established");
        Ok(PgSession { conn })
    }
}

/// An open connection to the source database.
pub struct PgSession {
    conn: PgConnection,
}

impl Session for PgSession {
    async fn run_in_transaction(
        &mut self,
        statements: &[Statement],
    ) -> Result<u64, BootstrapError> {
        let mut tx = self.conn.begin().await.map_err(classify)?;
        let mut rows_affected = 0;

        for statement in statements {
            let mut query = sqlx::query(statement.sql);
            for param in &statement.params {
                query = query.bind(param.as_str());
            }

            let result = query.execute(&mut *tx).await;
            match result {
                Ok(done) => rows_affected += done.rows_affected(),
                Err(e) => {
                    if let Err(rollback) = tx.rollback().await {
                        warn!(error = %rollback, "Rollback failed");
                    }
                    return Err(classify(e));
                }
            }
        }

        tx.commit().await.map_err(classify)?;
        Ok(rows_affected)
    }

    async fn close(self) -> Result<(), BootstrapError> {
        self.conn
            .close()
            .await
            .map_err(|e| BootstrapError::QueryExecution {
                reason: format!("failed to close connection: {}", e),
            })
    }
}

/// Map a statement failure onto the bootstrap taxonomy.
fn classify(error: sqlx::Error) -> BootstrapError {
    if let sqlx::Error::Database(db) = &error {
        if db.code().as_deref() == Some(DUPLICATE_TABLE) {
            return BootstrapError::SchemaConflict {
                table: FAQ_TABLE.to_string(),
            };
        }
    }

    BootstrapError::QueryExecution {
        reason: error.to_string(),
    }
}
