// Configuration module entry point
// Loads server settings and holds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;

/// Settings file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "mockup";

impl Config {
    /// Load settings from the given file path (without extension)
    ///
    /// The file is optional; `MOCKUP__SECTION__KEY` environment variables
    /// override it and built-in defaults fill the rest.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("MOCKUP").separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 1234)?
            .set_default("mock.file", "config_api_mockup.json")?
            .set_default("mock.empty_response_is_absent", true)?
            .set_default("mock.escape_not_found_fields", false)?
            .set_default("logging.access_log_format", "mockup")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 30)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
