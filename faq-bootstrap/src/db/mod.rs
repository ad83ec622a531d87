//! Database access for the bootstrap
//!
//! The handler only needs to open one connection, run a few statements in
//! a transaction and close the connection again. These traits describe
//! exactly that, so the handler can be exercised without a server.

mod postgres;

use crate::credential::Credential;
use crate::error::BootstrapError;
use crate::seed::Statement;

pub use postgres::{PgConnector, PgSession};

/// Opens sessions against the database named by a credential.
#[allow(async_fn_in_trait)]
pub trait Connector {
    type Session: Session;

    /// Connect as `credential.username` to the database of the same name.
    async fn connect(&self, credential: &Credential) -> Result<Self::Session, BootstrapError>;
}

/// One open database connection.
#[allow(async_fn_in_trait)]
pub trait Session: Sized {
    /// Run `statements` in order inside a single transaction and commit.
    ///
    /// Returns the total number of rows affected. On failure the
    /// transaction is rolled back and nothing is committed.
    async fn run_in_transaction(&mut self, statements: &[Statement])
        -> Result<u64, BootstrapError>;

    /// Close the connection.
    async fn close(self) -> Result<(), BootstrapError>;
}
