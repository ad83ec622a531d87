//! Database credential stored in the secret store
//!
//! The secret is a JSON document with at least `username`, `password`,
//! `host` and `port`. RDS-generated secrets store the port as a number,
//! hand-written ones often as a string, so both are accepted.

use crate::error::SecretError;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::fmt;

/// Credential for the source database. Lives for one invocation.
#[derive(Clone, Deserialize)]
pub struct Credential {
    pub username: String,
    pub password: String,
    pub host: String,
    #[serde(deserialize_with = "deserialize_port")]
    pub port: u16,
}

impl Credential {
    /// Parse the `SecretString` of secret `name`.
    pub fn from_secret_string(name: &str, secret: &str) -> Result<Self, SecretError> {
        let malformed = |reason: String| SecretError::Malformed {
            name: name.to_string(),
            reason,
        };

        let credential: Credential =
            serde_json::from_str(secret).map_err(|e| malformed(e.to_string()))?;

        if credential.username.trim().is_empty() {
            return Err(malformed("username is empty".to_string()));
        }
        if credential.host.trim().is_empty() {
            return Err(malformed("host is empty".to_string()));
        }
        if credential.port == 0 {
            return Err(malformed("port must be non-zero".to_string()));
        }

        Ok(credential)
    }

    /// The database to connect to. This scheme names it after the login role.
    pub fn database(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortRepr {
    Number(u16),
    Text(String),
}

fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    match PortRepr::deserialize(deserializer)? {
        PortRepr::Number(port) => Ok(port),
        PortRepr::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid port {:?}", text))),
    }
}
