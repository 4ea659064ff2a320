use crate::commands::{CommandInvocation, CommandReply};
use crate::enforcement::ViolationReport;
use crate::registry::BanError;
use crate::{COMMAND_TARGET, CONSOLE_TARGET, ERROR_TARGET, EVENT_TARGET};
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Command log file name
pub const COMMAND_LOG_FILE: &str = "commands";

/// Initialize the logging system with console and file outputs
pub fn init(log_dir: &Path) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Create log directory if it doesn't exist
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    // Set up file appenders with daily rotation
    let command_file = RollingFileAppender::new(Rotation::DAILY, log_dir, COMMAND_LOG_FILE);

    // Create a layer for console output (human-readable format)
    let console_layer = fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_ansi(true);

    // Create a layer for command and violation logs (JSON format)
    let command_layer = fmt::layer()
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_ansi(false)
        .json()
        .with_writer(command_file);

    // Use env filter to allow runtime configuration of log levels
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(command_layer)
        .try_init()?;

    info!("Logging system initialized");
    Ok(())
}

/// Log the start of a command execution; pass the returned instant to
/// [`log_command_end`]
pub fn log_command_start(invocation: &CommandInvocation) -> Instant {
    info!(
        target: COMMAND_TARGET,
        command = %invocation.name,
        sender = %invocation.sender.name,
        elevated = invocation.sender.elevated,
        arguments = ?invocation.args,
        event = "start",
        "Command execution started"
    );
    Instant::now()
}

/// Log the end of a command execution
pub fn log_command_end(invocation: &CommandInvocation, started: Instant, reply: &CommandReply) {
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or_default();
    info!(
        target: COMMAND_TARGET,
        command = %invocation.name,
        sender = %invocation.sender.name,
        duration_ms = duration_ms,
        rejected = reply.is_error(),
        event = "end",
        "Command execution completed"
    );
}

/// Log errors that occur during command execution
pub fn log_command_error(invocation: &CommandInvocation, error: &BanError) {
    error!(
        target: ERROR_TARGET,
        command = %invocation.name,
        sender = %invocation.sender.name,
        error = %error,
        "Command error"
    );
}

/// Log a blocked use of a banned material
pub fn log_violation(report: &ViolationReport, admins_notified: usize) {
    info!(
        target: EVENT_TARGET,
        actor_id = %report.actor.id,
        actor = %report.actor.name,
        purpose = %report.purpose,
        resource = %report.resource,
        admins_notified = admins_notified,
        at = %report.at.to_rfc3339(),
        event = "violation",
        "Blocked use of banned material"
    );
}

pub fn log_console(message: String) {
    info!(
        target: CONSOLE_TARGET,
        message = %message,
        event = "console",
    );
}
