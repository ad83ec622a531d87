//! Structured logging initialization
//!
//! Provides consistent logging initialization for local runs and for the
//! Lambda execution environment, where output ends up in CloudWatch.

use crate::config::{ConfigExt, LambdaEnv};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Guard that keeps the tracing subscriber active.
/// Drop this at the end of main to flush logs.
pub struct LogGuard;

/// Initialize structured logging for a component.
///
/// `RUST_LOG` directives apply as given; without them the level is `info`.
/// `LOG_FORMAT=json` switches to one JSON object per line. ANSI colors are
/// disabled inside Lambda since CloudWatch renders escape codes literally.
///
/// # Example
/// ```ignore
/// let _guard = init_logging("faq-bootstrap");
/// info!("Starting up...");
/// ```
pub fn init_logging(component: &str) -> LogGuard {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let ansi = !LambdaEnv::is_lambda();

    let (text, json) = if String::env_or("LOG_FORMAT", "text").eq_ignore_ascii_case("json") {
        (None, Some(fmt::layer().json().with_target(false)))
    } else {
        (Some(fmt::layer().with_target(false).with_ansi(ansi)), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json)
        .init();

    tracing::debug!(component, "Logging initialized");

    LogGuard
}
