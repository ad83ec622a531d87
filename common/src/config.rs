//! Environment variable parsing helpers
//!
//! Provides ergonomic helpers for reading configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Extension trait for parsing environment variables.
///
/// Provides convenient methods for reading env vars with defaults, optional values,
/// and type parsing.
pub trait ConfigExt {
    /// Get an environment variable with a default value.
    ///
    /// # Example
    /// ```ignore
    /// let name = String::env_or("BOOTSTRAP_SECRET_NAME", "source-database");
    /// ```
    fn env_or(name: &str, default: &str) -> String {
        env::var(name).unwrap_or_else(|_| default.to_string())
    }

    /// Get an optional environment variable, treating empty values as unset.
    fn env_opt(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Get an environment variable parsed as a specific type.
    ///
    /// Returns `default` if the variable is not set or fails to parse.
    ///
    /// # Example
    /// ```ignore
    /// let timeout: u64 = u64::env_parse("BOOTSTRAP_CONNECT_TIMEOUT", 5);
    /// ```
    fn env_parse<T: FromStr>(name: &str, default: T) -> T {
        env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

// Blanket implementation for all types
impl<T> ConfigExt for T {}

/// Lambda execution environment helpers.
///
/// Reads the variables the Lambda service injects into every function.
pub struct LambdaEnv;

impl LambdaEnv {
    /// Default port of the Parameters and Secrets Lambda Extension.
    pub const DEFAULT_SECRETS_EXTENSION_PORT: u16 = 2773;

    /// Check if running inside the Lambda execution environment.
    pub fn is_lambda() -> bool {
        Self::runtime_api().is_some()
    }

    /// Host and port of the Lambda Runtime API, if any.
    pub fn runtime_api() -> Option<String> {
        String::env_opt("AWS_LAMBDA_RUNTIME_API")
    }

    /// Name of the deployed function.
    pub fn function_name() -> String {
        String::env_or("AWS_LAMBDA_FUNCTION_NAME", "local")
    }

    /// Session token of the execution role, used to authenticate to extensions.
    pub fn session_token() -> Option<String> {
        String::env_opt("AWS_SESSION_TOKEN")
    }

    /// Port the secrets extension listens on.
    pub fn secrets_extension_port() -> u16 {
        u16::env_parse(
            "PARAMETERS_SECRETS_EXTENSION_HTTP_PORT",
            Self::DEFAULT_SECRETS_EXTENSION_PORT,
        )
    }
}
