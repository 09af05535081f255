//! HTTP protocol layer module
//!
//! Response rendering for the mock server, decoupled from routing.

pub mod response;

// Re-export commonly used items
pub use response::{build_found_response, build_not_found_response};
