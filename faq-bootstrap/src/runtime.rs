//! Lambda Runtime API client
//!
//! Implements the custom-runtime side of the Lambda Runtime API: poll for
//! the next invocation, then post either a response or an error for it.
//! Bootstrap failures are reported with their `error_type()` so the
//! invoker can tell them apart.

use crate::db::Connector;
use crate::error::BootstrapError;
use crate::handler::Bootstrapper;
use crate::secrets::SecretStore;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};

const API_VERSION: &str = "2018-06-01";
const REQUEST_ID_HEADER: &str = "Lambda-Runtime-Aws-Request-Id";
const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("runtime API response is missing the {0} header")]
    MissingHeader(&'static str),

    #[error("runtime API returned {status} for {path}")]
    Status { status: u16, path: String },
}

/// Error body accepted by the `error` endpoints.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub error_message: String,
    pub error_type: String,
}

impl ErrorReport {
    pub fn from_bootstrap(error: &BootstrapError) -> Self {
        Self {
            error_message: error.to_string(),
            error_type: error.error_type().to_string(),
        }
    }

    /// Report for a failure before the first invocation could be served.
    pub fn init(error: &anyhow::Error) -> Self {
        Self {
            error_message: format!("{:#}", error),
            error_type: "Runtime.InitError".to_string(),
        }
    }
}

/// A pending invocation handed out by the runtime API.
#[derive(Debug)]
pub struct Invocation {
    pub request_id: String,
    /// Opaque trigger payload
    pub payload: Value,
}

/// Client for the Runtime API at `$AWS_LAMBDA_RUNTIME_API`.
#[derive(Clone)]
pub struct RuntimeClient {
    client: Client,
    base_url: String,
}

impl RuntimeClient {
    /// `api` is the `host:port` from `AWS_LAMBDA_RUNTIME_API`.
    pub fn new(api: &str) -> Result<Self, RuntimeError> {
        // No request timeout: `invocation/next` blocks until an event arrives.
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: format!("http://{}/{}/runtime", api, API_VERSION),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Block until the next invocation is available.
    pub async fn next_invocation(&self) -> Result<Invocation, RuntimeError> {
        let path = "invocation/next";
        let response = self.client.get(self.url(path)).send().await?;
        if !response.status().is_success() {
            return Err(RuntimeError::Status {
                status: response.status().as_u16(),
                path: path.to_string(),
            });
        }

        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(RuntimeError::MissingHeader(REQUEST_ID_HEADER))?;

        let body = response.bytes().await?;
        let payload = serde_json::from_slice(&body).unwrap_or(Value::Null);

        Ok(Invocation {
            request_id,
            payload,
        })
    }

    pub async fn send_response<T: Serialize>(
        &self,
        request_id: &str,
        body: &T,
    ) -> Result<(), RuntimeError> {
        let path = format!("invocation/{}/response", request_id);
        let response = self.client.post(self.url(&path)).json(body).send().await?;
        check_status(response.status(), path)
    }

    pub async fn send_error(
        &self,
        request_id: &str,
        report: &ErrorReport,
    ) -> Result<(), RuntimeError> {
        self.post_error(format!("invocation/{}/error", request_id), report)
            .await
    }

    pub async fn send_init_error(&self, report: &ErrorReport) -> Result<(), RuntimeError> {
        self.post_error("init/error".to_string(), report).await
    }

    async fn post_error(&self, path: String, report: &ErrorReport) -> Result<(), RuntimeError> {
        let response = self
            .client
            .post(self.url(&path))
            .header(ERROR_TYPE_HEADER, report.error_type.as_str())
            .json(report)
            .send()
            .await?;
        check_status(response.status(), path)
    }
}

fn check_status(status: reqwest::StatusCode, path: String) -> Result<(), RuntimeError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RuntimeError::Status {
            status: status.as_u16(),
            path,
        })
    }
}

/// Serve invocations until the runtime API fails.
///
/// Each invocation runs the bootstrap once. Its failure is reported to the
/// runtime API and does not stop the loop.
pub async fn run<S, C>(
    client: &RuntimeClient,
    bootstrapper: &Bootstrapper<S, C>,
) -> Result<(), RuntimeError>
where
    S: SecretStore,
    C: Connector,
{
    loop {
        let invocation = client.next_invocation().await?;
        let span = info_span!("invocation", request_id = %invocation.request_id);

        async {
            debug!(payload = %invocation.payload, "Received trigger event");

            match bootstrapper.invoke().await {
                Ok(report) => {
                    client
                        .send_response(&invocation.request_id, &report)
                        .await?;
                    info!("Invocation succeeded");
                }
                Err(e) => {
                    client
                        .send_error(&invocation.request_id, &ErrorReport::from_bootstrap(&e))
                        .await?;
                    warn!(error_type = e.error_type(), "Invocation reported as failed");
                }
            }

            Ok::<(), RuntimeError>(())
        }
        .instrument(span)
        .await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BootstrapConfig;
    use crate::credential::Credential;
    use crate::db::Session;
    use crate::error::SecretError;
    use crate::seed::Statement;
    use crate::test_http::{serve, StubResponse};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolves on the first call, then reports the secret as missing.
    struct FirstCallSecrets {
        calls: AtomicUsize,
    }

    impl SecretStore for FirstCallSecrets {
        async fn resolve(&self, name: &str) -> Result<Credential, SecretError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(Credential {
                    username: "app".to_string(),
                    password: "p".to_string(),
                    host: "db.local".to_string(),
                    port: 5432,
                })
            } else {
                Err(SecretError::NotFound(name.to_string()))
            }
        }
    }

    struct OneRowConnector;

    impl Connector for OneRowConnector {
        type Session = OneRowSession;

        async fn connect(&self, _credential: &Credential) -> Result<OneRowSession, BootstrapError> {
            Ok(OneRowSession)
        }
    }

    struct OneRowSession;

    impl Session for OneRowSession {
        async fn run_in_transaction(
            &mut self,
            _statements: &[Statement],
        ) -> Result<u64, BootstrapError> {
            Ok(1)
        }

        async fn close(self) -> Result<(), BootstrapError> {
            Ok(())
        }
    }

    fn next_event(request_id: &str) -> StubResponse {
        StubResponse::new(200, r#"{"RequestType":"Create"}"#)
            .header(REQUEST_ID_HEADER, request_id)
    }

    #[tokio::test]
    async fn test_run_reports_response_and_error() {
        let (addr, mut requests) = serve(vec![
            next_event("req-1"),
            StubResponse::new(202, r#"{"status":"OK"}"#),
            next_event("req-2"),
            StubResponse::new(202, r#"{"status":"OK"}"#),
        ])
        .await;

        let client = RuntimeClient::new(&addr).unwrap();
        let bootstrapper = Bootstrapper::new(
            BootstrapConfig::default(),
            FirstCallSecrets {
                calls: AtomicUsize::new(0),
            },
            OneRowConnector,
        );

        // The stub stops listening after four exchanges, which ends the loop.
        let err = run(&client, &bootstrapper).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Http(_)));

        let next = requests.recv().await.unwrap();
        assert_eq!(next.method, "GET");
        assert_eq!(next.target, "/2018-06-01/runtime/invocation/next");

        let response = requests.recv().await.unwrap();
        assert_eq!(response.method, "POST");
        assert_eq!(response.target, "/2018-06-01/runtime/invocation/req-1/response");
        let report: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(report["table"], "faqs");
        assert_eq!(report["rows_inserted"], 1);
        assert_eq!(report["schema_policy"], "strict");

        let next = requests.recv().await.unwrap();
        assert_eq!(next.target, "/2018-06-01/runtime/invocation/next");

        let failure = requests.recv().await.unwrap();
        assert_eq!(failure.method, "POST");
        assert_eq!(failure.target, "/2018-06-01/runtime/invocation/req-2/error");
        assert_eq!(
            failure.header(ERROR_TYPE_HEADER),
            Some("CredentialResolutionError")
        );
        let body: Value = serde_json::from_str(&failure.body).unwrap();
        assert_eq!(body["errorType"], "CredentialResolutionError");
        assert!(body["errorMessage"]
            .as_str()
            .unwrap()
            .contains("not found"));
    }

    #[tokio::test]
    async fn test_init_error_is_posted() {
        let (addr, mut requests) = serve(vec![StubResponse::new(202, "{}")]).await;
        let client = RuntimeClient::new(&addr).unwrap();

        let err = anyhow::anyhow!("AWS_SESSION_TOKEN must be set");
        client
            .send_init_error(&ErrorReport::init(&err))
            .await
            .unwrap();

        let request = requests.recv().await.unwrap();
        assert_eq!(request.target, "/2018-06-01/runtime/init/error");
        assert_eq!(request.header(ERROR_TYPE_HEADER), Some("Runtime.InitError"));
        let body: Value = serde_json::from_str(&request.body).unwrap();
        assert_eq!(body["errorMessage"], "AWS_SESSION_TOKEN must be set");
    }

    #[tokio::test]
    async fn test_next_without_request_id_is_rejected() {
        let (addr, _requests) = serve(vec![StubResponse::new(200, "{}")]).await;
        let client = RuntimeClient::new(&addr).unwrap();

        let err = client.next_invocation().await.unwrap_err();
        assert!(matches!(err, RuntimeError::MissingHeader(REQUEST_ID_HEADER)));
    }

    #[test]
    fn test_urls() {
        let client = RuntimeClient::new("127.0.0.1:9001").unwrap();
        assert_eq!(
            client.url("invocation/next"),
            "http://127.0.0.1:9001/2018-06-01/runtime/invocation/next"
        );
        assert_eq!(
            client.url("init/error"),
            "http://127.0.0.1:9001/2018-06-01/runtime/init/error"
        );
    }

    #[test]
    fn test_error_report_shape() {
        let err = BootstrapError::CredentialResolution {
            secret: "source".to_string(),
            source: SecretError::NotFound("source".to_string()),
        };

        let json = serde_json::to_value(ErrorReport::from_bootstrap(&err)).unwrap();
        assert_eq!(json["errorType"], "CredentialResolutionError");
        assert_eq!(
            json["errorMessage"],
            "failed to resolve credential source: secret source not found"
        );
    }

    #[test]
    fn test_init_error_report() {
        let err = anyhow::anyhow!("bad value").context("Invalid BOOTSTRAP_SSL_MODE");
        let report = ErrorReport::init(&err);
        assert_eq!(report.error_type, "Runtime.InitError");
        assert_eq!(report.error_message, "Invalid BOOTSTRAP_SSL_MODE: bad value");
    }
}
