//! Request handler module
//!
//! Resolves each request against the response registry.

pub mod dispatcher;

// Re-export main entry point
pub use dispatcher::handle_request;
