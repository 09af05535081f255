//! Logger module
//!
//! Provides logging utilities for the mock server including:
//! - Startup banner and loaded mock summary
//! - One access record per dispatched request, in several formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogWriter;

use crate::config::Config;
use crate::registry::ResponseRegistry;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_banner() {
    write_info(&format!(
        "{} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    ));
    write_info(env!("CARGO_PKG_DESCRIPTION"));
}

pub fn log_mock_loaded(path: &str, registry: &ResponseRegistry) {
    write_info(&format!(
        "[Mock] Loaded {} endpoint(s) from {path}",
        registry.len()
    ));
    if registry.is_empty() {
        log_warning("Mock file defines no endpoints; every request will get a 404");
    }
    for (uri, method) in registry.entries() {
        write_info(&format!("  - {method:<7} {uri}"));
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Mock server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info(&format!(
        "Access log format: {}",
        config.logging.access_log_format
    ));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Write one formatted access record to `sink`
pub fn log_access(sink: &LogWriter, entry: &AccessLogEntry, format: &str) {
    sink.write_access(&entry.format(format));
}

pub fn log_shutdown(signal: &str) {
    write_info(&format!("\n[Shutdown] {signal} received, stopping listener"));
}
