//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Wayfis application.

use tracing::{info, warn, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{Result, WayfisError};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file appender; keep it alive until shutdown.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "wayfis.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| WayfisError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log payment lifecycle events
pub fn log_payment_event(payment_id: &str, event: &str, order_id: Option<i64>, amount: Option<i64>) {
    info!(
        payment_id = payment_id,
        event = event,
        order_id = order_id,
        amount = amount,
        "Payment event"
    );
}

/// Log admin actions
pub fn log_admin_action(admin: &str, action: &str, target: Option<&str>) {
    warn!(
        admin = admin,
        action = action,
        target = target,
        "Admin action performed"
    );
}

/// Log API errors with context
pub fn log_api_error(api: &str, error: &str, context: Option<&str>) {
    error!(
        api = api,
        error = error,
        context = context,
        "API error occurred"
    );
}
