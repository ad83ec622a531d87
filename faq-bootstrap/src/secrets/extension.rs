//! Secrets Manager access through the Parameters and Secrets Lambda Extension
//!
//! The extension serves `GET /secretsmanager/get?secretId=<name>` on
//! localhost and authenticates callers with the function's session token.
//! It answers with the Secrets Manager `GetSecretValue` response body.

use super::SecretStore;
use crate::credential::Credential;
use crate::error::SecretError;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const TOKEN_HEADER: &str = "X-Aws-Parameters-Secrets-Token";

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetSecretValueResponse {
    secret_string: Option<String>,
}

/// Client for the secrets extension running next to the function.
#[derive(Clone)]
pub struct ExtensionSecretStore {
    client: Client,
    endpoint: String,
    token: String,
}

impl ExtensionSecretStore {
    pub fn new(port: u16, token: String, timeout: Duration) -> Result<Self, SecretError> {
        Self::with_endpoint(
            format!("http://localhost:{}/secretsmanager/get", port),
            token,
            timeout,
        )
    }

    fn with_endpoint(
        endpoint: String,
        token: String,
        timeout: Duration,
    ) -> Result<Self, SecretError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SecretError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl SecretStore for ExtensionSecretStore {
    async fn resolve(&self, name: &str) -> Result<Credential, SecretError> {
        debug!(endpoint = %self.endpoint, secret = name, "Fetching secret from extension");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("secretId", name)])
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| SecretError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SecretError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(status_error(name, status, &body));
        }

        let payload: GetSecretValueResponse =
            serde_json::from_str(&body).map_err(|e| SecretError::Malformed {
                name: name.to_string(),
                reason: e.to_string(),
            })?;

        let secret = payload.secret_string.ok_or_else(|| SecretError::Malformed {
            name: name.to_string(),
            reason: "SecretString is missing; binary secrets are not supported".to_string(),
        })?;

        Credential::from_secret_string(name, &secret)
    }
}

/// Classify a non-success extension response.
///
/// The extension forwards Secrets Manager exception names in the body, which
/// are more specific than the status code.
fn status_error(name: &str, status: StatusCode, body: &str) -> SecretError {
    if body.contains("ResourceNotFoundException") {
        return SecretError::NotFound(name.to_string());
    }
    if body.contains("AccessDeniedException") {
        return SecretError::AccessDenied(name.to_string());
    }

    match status {
        StatusCode::NOT_FOUND => SecretError::NotFound(name.to_string()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SecretError::AccessDenied(name.to_string())
        }
        _ => SecretError::Unavailable(format!("extension returned {}: {}", status, body.trim())),
    }
}
