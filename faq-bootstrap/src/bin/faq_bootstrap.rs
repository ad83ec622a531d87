//! Source-database bootstrap function
//!
//! Inside Lambda this serves invocations from the Runtime API, one bootstrap
//! per trigger event. Outside Lambda (no `AWS_LAMBDA_RUNTIME_API`) it runs a
//! single bootstrap and exits non-zero if it fails.

use anyhow::{Context, Result};
use common::{init_logging, LambdaEnv};
use faq_bootstrap::runtime::{self, ErrorReport, RuntimeClient};
use faq_bootstrap::{
    AnySecretStore, Bootstrapper, Config, ExtensionSecretStore, FileSecretStore, PgConnector,
};
use tracing::{error, info};

fn build(config: Config) -> Result<Bootstrapper<AnySecretStore, PgConnector>> {
    let secrets = match &config.secret_file {
        Some(path) => {
            info!(path = %path.display(), "Reading secret from file");
            AnySecretStore::File(FileSecretStore::new(path))
        }
        None => AnySecretStore::Extension(
            ExtensionSecretStore::new(
                config.secrets_extension_port,
                LambdaEnv::session_token()
                    .context("AWS_SESSION_TOKEN must be set to use the secrets extension")?,
                config.secret_timeout,
            )
            .context("Failed to create secrets extension client")?,
        ),
    };

    Ok(Bootstrapper::new(
        config.bootstrap,
        secrets,
        PgConnector::new(config.ssl_mode),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _guard = init_logging("faq-bootstrap");

    let runtime_client = LambdaEnv::runtime_api()
        .map(|api| RuntimeClient::new(&api))
        .transpose()
        .context("Failed to create runtime API client")?;

    let bootstrapper = match Config::from_env().and_then(build) {
        Ok(b) => b,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Initialization failed");
            if let Some(client) = &runtime_client {
                if let Err(report_err) = client.send_init_error(&ErrorReport::init(&e)).await {
                    error!(error = %report_err, "Failed to report init error");
                }
            }
            return Err(e);
        }
    };

    info!(
        function = %LambdaEnv::function_name(),
        secret = %bootstrapper.config().secret_name,
        policy = %bootstrapper.config().schema_policy,
        "faq-bootstrap starting"
    );

    match runtime_client {
        Some(client) => {
            runtime::run(&client, &bootstrapper)
                .await
                .context("Runtime API loop failed")?;
        }
        None => {
            info!("AWS_LAMBDA_RUNTIME_API not set, running a single bootstrap");
            match bootstrapper.invoke().await {
                Ok(report) => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Err(_) => {
                    // Already logged with its error type by the handler.
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
