//! Mock file loader
//!
//! Reads the JSON mock file (`path -> method -> {headers, payload}`) and turns
//! it into a [`ResponseRegistry`]. Read and parse failures are fatal at
//! startup; headers that cannot be sent only produce a warning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::{ResponseDefinition, ResponseRegistry, RouteTable};

/// Errors raised while building the registry from the mock file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read mock file {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid mock file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// `null` at either level is accepted and read as "nothing configured"
type RawTable = HashMap<String, Option<HashMap<String, Option<ResponseDefinition>>>>;

/// Read and parse the mock file at `path`
pub fn load_from_file(
    path: impl AsRef<Path>,
    empty_is_absent: bool,
) -> Result<ResponseRegistry, LoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&content, empty_is_absent)
}

/// Parse mock file content
pub fn load_from_str(content: &str, empty_is_absent: bool) -> Result<ResponseRegistry, LoadError> {
    let raw: RawTable = serde_json::from_str(content)?;

    let mut routes = RouteTable::with_capacity(raw.len());
    for (path, methods) in raw {
        let methods: HashMap<String, ResponseDefinition> = methods
            .unwrap_or_default()
            .into_iter()
            .map(|(method, def)| (method, def.unwrap_or_default()))
            .collect();

        for (method, def) in &methods {
            warn_unsendable_headers(&path, method, def);
        }
        routes.insert(path, methods);
    }

    Ok(ResponseRegistry::new(routes, empty_is_absent))
}

/// Entries are kept as written; the dispatcher skips the ones it cannot send
fn warn_unsendable_headers(path: &str, method: &str, def: &ResponseDefinition) {
    for entry in def.headers.iter().filter(|e| e.to_http().is_none()) {
        crate::logger::log_warning(&format!(
            "Header {:?} for {method} {path} cannot be sent and will be skipped",
            entry.name
        ));
    }
}
