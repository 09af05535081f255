//! HTTP response building module
//!
//! Renders the two responses the mock server can produce: a configured
//! response (200) and the standard not-found payload (404).

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Response, StatusCode};

use crate::registry::ResponseDefinition;

/// Content type used when a definition configures no headers
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Render the not-found JSON body
///
/// `uri` and `method` are substituted literally unless `escape` is set, so a
/// target containing `"` yields invalid JSON by default.
pub fn not_found_body(uri: &str, method: &str, escape: bool) -> String {
    let (uri, method) = if escape {
        (escape_json(uri), escape_json(method))
    } else {
        (uri.to_string(), method.to_string())
    };
    format!(
        r#"{{ "errors": [{{ "status": 404, "message": "Resource Not Found", "uri": "{uri}", "method": "{method}" }}] }}"#
    )
}

/// Build 404 Not Found response for an unmapped (uri, method)
pub fn build_not_found_response(uri: &str, method: &str, escape: bool) -> Response<Full<Bytes>> {
    let body = not_found_body(uri, method, escape);
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header(CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            let mut response = Response::new(Full::new(Bytes::new()));
            *response.status_mut() = StatusCode::NOT_FOUND;
            response
        })
}

/// Build 200 response from a configured definition
///
/// Headers are applied in order with replace semantics, so a later entry wins
/// over an earlier one with the same name.
pub fn build_found_response(def: &ResponseDefinition) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(def.body.clone())));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    if def.headers.is_empty() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        return response;
    }

    for entry in &def.headers {
        match entry.to_http() {
            Some((name, value)) => {
                headers.insert(name, value);
            }
            None => crate::logger::log_warning(&format!(
                "Skipping invalid header {:?}: {:?}",
                entry.name, entry.value
            )),
        }
    }
    response
}

/// JSON string escaping without the surrounding quotes
fn escape_json(s: &str) -> String {
    serde_json::to_string(s)
        .ok()
        .and_then(|quoted| quoted.get(1..quoted.len() - 1).map(ToString::to_string))
        .unwrap_or_else(|| s.to_string())
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
