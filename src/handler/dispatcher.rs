//! Request dispatch module
//!
//! Entry point for HTTP request processing: resolves the request target and
//! method against the registry and renders the configured or not-found
//! response.

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use crate::registry::ResponseRegistry;
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{REFERER, USER_AGENT};
use hyper::{Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Options that shape the not-found branch
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    pub escape_not_found_fields: bool,
}

/// Resolve one (target, method) pair to a response
///
/// Total: always yields 200 with the configured definition or 404 with the
/// not-found payload.
pub fn dispatch(
    registry: &ResponseRegistry,
    uri: &str,
    method: &str,
    options: DispatchOptions,
) -> Response<Full<Bytes>> {
    match registry.lookup(uri, method) {
        Some(def) => http::build_found_response(def),
        None => http::build_not_found_response(uri, method, options.escape_not_found_fields),
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let uri = request_target(&req);
    let method = req.method().as_str();

    let options = DispatchOptions {
        escape_not_found_fields: state.config.mock.escape_not_found_fields,
    };
    let response = dispatch(&state.registry, &uri, method, options);

    let mut entry = AccessLogEntry::new(method.to_string(), uri, response.status().as_u16());
    entry.remote_addr = peer_addr.ip().to_string();
    entry.http_version = http_version(req.version()).to_string();
    entry.body_bytes =
        usize::try_from(response.body().size_hint().exact().unwrap_or(0)).unwrap_or(usize::MAX);
    entry.referer = header_string(&req, REFERER);
    entry.user_agent = header_string(&req, USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    logger::log_access(
        &state.access_log,
        &entry,
        &state.config.logging.access_log_format,
    );

    Ok(response)
}

/// Full request target as received: path plus query string
///
/// Absolute-form targets keep their scheme and authority. hyper has already
/// normalized the target: an absolute form with no path reads back with `/`,
/// and a fragment never reaches the handler.
pub fn request_target<B>(req: &Request<B>) -> String {
    let uri = req.uri();
    if uri.scheme().is_some() || uri.authority().is_some() {
        return uri.to_string();
    }
    uri.path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string)
}

fn header_string<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn http_version(version: hyper::Version) -> &'static str {
    match version {
        hyper::Version::HTTP_09 => "0.9",
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        hyper::Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{registry_from, HeaderEntry, ResponseDefinition};
    use http_body_util::BodyExt;
    use hyper::header::CONTENT_TYPE;
    use hyper::StatusCode;

    fn users_registry() -> ResponseRegistry {
        registry_from(
            &[
                ("/users", "GET", ResponseDefinition::new(vec![], "[]")),
                (
                    "/users",
                    "POST",
                    ResponseDefinition::new(
                        vec![HeaderEntry::new("Content-Type", "application/json")],
                        r#"{"id":1}"#,
                    ),
                ),
                (
                    "/dup",
                    "GET",
                    ResponseDefinition::new(
                        vec![
                            HeaderEntry::new("Content-Type", "text/html"),
                            HeaderEntry::new("Content-Type", "application/xml"),
                        ],
                        "<a/>",
                    ),
                ),
            ],
            true,
        )
    }

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn not_found_for(uri: &str, method: &str) -> String {
        format!(
            r#"{{ "errors": [{{ "status": 404, "message": "Resource Not Found", "uri": "{uri}", "method": "{method}" }}] }}"#
        )
    }

    #[tokio::test]
    async fn test_get_with_default_content_type() {
        let response = dispatch(&users_registry(), "/users", "GET", DispatchOptions::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(body_string(response).await, "[]");
    }

    #[tokio::test]
    async fn test_post_with_configured_headers() {
        let response = dispatch(&users_registry(), "/users", "POST", DispatchOptions::default());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_string(response).await, r#"{"id":1}"#);
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let response = dispatch(&users_registry(), "/unknown", "GET", DispatchOptions::default());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_string(response).await, not_found_for("/unknown", "GET"));
    }

    #[tokio::test]
    async fn test_method_mismatch_is_not_found() {
        let response = dispatch(&users_registry(), "/users", "DELETE", DispatchOptions::default());
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, not_found_for("/users", "DELETE"));
    }

    #[tokio::test]
    async fn test_key_exactness() {
        let registry = users_registry();
        for (uri, method) in [
            ("/users/", "GET"),
            ("/Users", "GET"),
            ("/users?x=1", "GET"),
            ("/users", "get"),
        ] {
            let response = dispatch(&registry, uri, method, DispatchOptions::default());
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{method} {uri}");
            assert_eq!(body_string(response).await, not_found_for(uri, method));
        }
    }

    #[tokio::test]
    async fn test_duplicate_header_last_wins() {
        let response = dispatch(&users_registry(), "/dup", "GET", DispatchOptions::default());
        let values: Vec<_> = response.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, vec!["application/xml"]);
        assert_eq!(body_string(response).await, "<a/>");
    }

    #[tokio::test]
    async fn test_not_found_escaping_option() {
        let options = DispatchOptions {
            escape_not_found_fields: true,
        };
        let response = dispatch(&users_registry(), "/q?name=\"x\"", "GET", options);
        let body = body_string(response).await;
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["errors"][0]["uri"], "/q?name=\"x\"");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_dispatch_matches_baseline() {
        let registry = Arc::new(users_registry());
        let cases = [
            ("/users", "GET"),
            ("/users", "POST"),
            ("/users", "DELETE"),
            ("/dup", "GET"),
            ("/missing", "PUT"),
        ];

        let mut baseline = Vec::new();
        for (uri, method) in cases {
            let response = dispatch(&registry, uri, method, DispatchOptions::default());
            baseline.push((response.status(), body_string(response).await));
        }

        let mut tasks = Vec::new();
        for i in 0..64 {
            let registry = Arc::clone(&registry);
            let (uri, method) = cases[i % cases.len()];
            tasks.push(tokio::spawn(async move {
                let response = dispatch(&registry, uri, method, DispatchOptions::default());
                (i % cases.len(), response.status(), body_string(response).await)
            }));
        }

        for task in tasks {
            let (idx, status, body) = task.await.unwrap();
            assert_eq!((status, body), baseline[idx]);
        }
    }

    #[test]
    fn test_request_target_keeps_query() {
        let req = Request::builder()
            .uri("/users?page=2&sort=desc")
            .body(())
            .unwrap();
        assert_eq!(request_target(&req), "/users?page=2&sort=desc");

        let req = Request::builder().uri("/users").body(()).unwrap();
        assert_eq!(request_target(&req), "/users");
    }

    #[test]
    fn test_request_target_absolute_form() {
        let req = Request::builder()
            .uri("http://example.com/users?x=1")
            .body(())
            .unwrap();
        assert_eq!(request_target(&req), "http://example.com/users?x=1");
    }

    #[test]
    fn test_request_target_normalized_forms() {
        let req = Request::builder()
            .uri("http://example.com")
            .body(())
            .unwrap();
        assert_eq!(request_target(&req), "http://example.com/");

        let req = Request::builder().uri("/a#frag").body(()).unwrap();
        assert_eq!(request_target(&req), "/a");
    }

    #[tokio::test]
    async fn test_handle_request_uses_raw_method() {
        let config = crate::config::Config::load_from("/nonexistent/api_mockup_settings").unwrap();
        let state = Arc::new(AppState::new(config, users_registry()));
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();

        let req = Request::builder()
            .method(hyper::Method::from_bytes(b"get").unwrap())
            .uri("/users")
            .body(())
            .unwrap();
        let response = handle_request(req, Arc::clone(&state), peer).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_string(response).await, not_found_for("/users", "get"));

        let req = Request::builder()
            .method("GET")
            .uri("/users")
            .body(())
            .unwrap();
        let response = handle_request(req, state, peer).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_one_access_record_per_request() {
        let dir = std::env::temp_dir().join(format!("api_mockup_access_{}", std::process::id()));
        let path = dir.join("access.log");
        let sink = Arc::new(crate::logger::LogWriter::open(path.to_str(), None).unwrap());

        let config = crate::config::Config::load_from("/nonexistent/api_mockup_settings").unwrap();
        let state = Arc::new(AppState::new(config, users_registry()).with_access_log(sink));
        let peer: SocketAddr = "127.0.0.1:50000".parse().unwrap();

        let hit = Request::builder().method("GET").uri("/users").body(()).unwrap();
        let response = handle_request(hit, Arc::clone(&state), peer).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let miss = Request::builder()
            .method("DELETE")
            .uri("/users")
            .body(())
            .unwrap();
        let response = handle_request(miss, state, peer).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let content = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_dir_all(&dir);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2, "got: {content}");
        assert!(lines[0].ends_with(" 200\tGET\t/users"), "got: {}", lines[0]);
        assert!(lines[1].ends_with(" 404\tDELETE\t/users"), "got: {}", lines[1]);
    }
}
