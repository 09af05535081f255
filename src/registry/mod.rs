//! Response registry module
//!
//! Immutable lookup table from (request target, method) to a canned response.
//! Built once at startup by the loader and shared read-only by every
//! connection task.

mod loader;

pub use loader::{load_from_file, load_from_str};

use hyper::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::HashMap;

/// A single response header, applied with "set" semantics
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    #[serde(rename = "key")]
    pub name: String,
    pub value: String,
}

impl HeaderEntry {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Wire form of this header, or `None` if hyper cannot send it
    ///
    /// Line breaks in the value are sent as spaces.
    pub fn to_http(&self) -> Option<(HeaderName, HeaderValue)> {
        let name = HeaderName::from_bytes(self.name.as_bytes()).ok()?;
        let value = if self.value.contains(['\r', '\n']) {
            HeaderValue::from_str(&self.value.replace(['\r', '\n'], " "))
        } else {
            HeaderValue::from_str(&self.value)
        };
        Some((name, value.ok()?))
    }
}

/// Canned response for one (path, method) pair
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ResponseDefinition {
    /// Headers in configuration order; `null` or missing means none
    #[serde(default, deserialize_with = "null_as_empty")]
    pub headers: Vec<HeaderEntry>,
    /// Response body, written verbatim
    #[serde(default, rename = "payload")]
    pub body: String,
}

impl ResponseDefinition {
    #[cfg(test)]
    pub fn new(headers: Vec<HeaderEntry>, body: impl Into<String>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    /// True for the default-constructed form: no headers and an empty body
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.body.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<HeaderEntry>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<HeaderEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Raw mock file layout: path -> method -> definition
pub type RouteTable = HashMap<String, HashMap<String, ResponseDefinition>>;

/// Read-only (path, method) lookup table
///
/// Keys are matched exactly: no case folding of methods, no trailing-slash
/// handling, and the query string is part of the path key.
#[derive(Debug, Clone, Default)]
pub struct ResponseRegistry {
    routes: RouteTable,
    empty_is_absent: bool,
}

impl ResponseRegistry {
    /// Build a registry from an already parsed route table
    ///
    /// With `empty_is_absent` set, a definition with no headers and an empty
    /// body is reported as missing by [`lookup`](Self::lookup).
    pub fn new(routes: RouteTable, empty_is_absent: bool) -> Self {
        Self {
            routes,
            empty_is_absent,
        }
    }

    pub fn lookup(&self, path: &str, method: &str) -> Option<&ResponseDefinition> {
        self.routes
            .get(path)?
            .get(method)
            .filter(|def| !(self.empty_is_absent && def.is_empty()))
    }

    /// Number of configured (path, method) entries
    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured (path, method) pairs, sorted
    pub fn entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .routes
            .iter()
            .flat_map(|(path, methods)| {
                methods
                    .keys()
                    .map(move |method| (path.as_str(), method.as_str()))
            })
            .collect();
        entries.sort_unstable();
        entries
    }
}

#[cfg(test)]
pub(crate) fn registry_from(
    entries: &[(&str, &str, ResponseDefinition)],
    empty_is_absent: bool,
) -> ResponseRegistry {
    let mut routes = RouteTable::new();
    for (path, method, def) in entries {
        routes
            .entry((*path).to_string())
            .or_default()
            .insert((*method).to_string(), def.clone());
    }
    ResponseRegistry::new(routes, empty_is_absent)
}
