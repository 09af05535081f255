// Configuration types module
// Defines all settings-related data structures

use serde::Deserialize;

/// Main settings structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub mock: MockConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Listener configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Mock file and response behaviour
#[derive(Debug, Deserialize, Clone)]
pub struct MockConfig {
    /// Path of the JSON mock file
    pub file: String,
    /// Treat a definition with no headers and no payload as not configured
    pub empty_response_is_absent: bool,
    /// JSON-escape the uri and method fields of the 404 body
    pub escape_not_found_fields: bool,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Access log format (mockup, combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds before a connection task is torn down
    pub connection_timeout: u64,
    pub max_connections: Option<u64>,
}
