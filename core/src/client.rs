//! Stateless HTTP request builder and response parser for the campus API.
//!
//! # Design
//! `CampusClient` holds only a `base_url` and carries no mutable state between
//! calls. Building produces an `HttpRequest`, parsing consumes an
//! `HttpResponse`; the transport executes the round-trip in between, keeping
//! this half deterministic and free of I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::http::{HttpRequest, HttpResponse, RequestOptions, APPLICATION_JSON, CONTENT_TYPE};
use crate::routes::{Endpoint, PathArgs};

/// Synchronous, stateless client for the campus API.
#[derive(Debug, Clone)]
pub struct CampusClient {
    base_url: String,
}

impl CampusClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request for `path` relative to the base address.
    ///
    /// The JSON content-type header is always present unless the caller
    /// supplies a header with the same name, which replaces it. Other caller
    /// headers are appended in order.
    pub fn build_request(&self, path: &str, options: RequestOptions) -> HttpRequest {
        let mut headers = vec![(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())];
        for (name, value) in options.headers {
            match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
                Some(slot) => *slot = (name, value),
                None => headers.push((name, value)),
            }
        }

        HttpRequest {
            method: options.method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body: options.body,
        }
    }

    /// Build a request for a route-table endpoint, serializing `body` as JSON.
    pub fn build<B: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        args: PathArgs,
        body: Option<&B>,
    ) -> ApiResult<HttpRequest> {
        let route = endpoint.route();
        let path = route.path(args)?;
        let body = body.map(encode).transpose()?;
        Ok(self.build_request(
            &path,
            RequestOptions {
                method: route.method,
                headers: Vec::new(),
                body,
            },
        ))
    }

    /// Parse a response into raw JSON, or the error it carries.
    ///
    /// A successful body is returned exactly as the server sent it.
    pub fn parse_response(&self, response: HttpResponse) -> ApiResult<Value> {
        check_status(&response)?;
        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body)
            .map_err(|e| ApiError::request_failed(format!("invalid JSON response: {e}")))
    }

    /// Parse a response and deserialize it into `T`.
    pub fn parse<T: DeserializeOwned>(&self, response: HttpResponse) -> ApiResult<T> {
        decode(self.parse_response(response)?)
    }
}

pub(crate) fn encode<B: Serialize + ?Sized>(body: &B) -> ApiResult<String> {
    serde_json::to_string(body)
        .map_err(|e| ApiError::request_failed(format!("failed to encode request body: {e}")))
}

pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::request_failed(format!("unexpected response shape: {e}")))
}

/// Map a non-success status to `RequestFailed`.
///
/// The message is the body's `detail` field when one is present, otherwise a
/// generic message naming the status code.
fn check_status(response: &HttpResponse) -> ApiResult<()> {
    if response.is_success() {
        return Ok(());
    }
    let detail = serde_json::from_str::<Value>(&response.body)
        .ok()
        .and_then(|body| match body.get("detail") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | Some(Value::String(_)) | None => None,
            Some(other) => Some(other.to_string()),
        });
    let message = detail.unwrap_or_else(|| format!("HTTP error! status: {}", response.status));
    Err(ApiError::from_status(response.status, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use crate::types::NewStudent;
    use serde_json::json;

    fn client() -> CampusClient {
        CampusClient::new("http://localhost:8000")
    }

    #[test]
    fn build_request_defaults_to_json_get() {
        let req = client().build_request("/colleges", RequestOptions::default());
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8000/colleges");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn caller_headers_override_and_extend() {
        let options = RequestOptions::method(HttpMethod::Put)
            .with_header("Content-Type", "text/plain")
            .with_header("x-trace", "abc")
            .with_body("hi");
        let req = client().build_request("/echo", options);
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.headers.len(), 2);
        assert_eq!(req.header("content-type"), Some("text/plain"));
        assert_eq!(req.header("x-trace"), Some("abc"));
        assert_eq!(req.body.as_deref(), Some("hi"));
    }

    #[test]
    fn build_endpoint_serializes_body() {
        let input = NewStudent {
            name: "Ana".to_string(),
            email: "ana@uni.edu".to_string(),
            college_id: 2,
        };
        let req = client()
            .build(Endpoint::CreateStudent, PathArgs::none(), Some(&input))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "http://localhost:8000/students");
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Ana", "email": "ana@uni.edu", "college_id": 2}));
    }

    #[test]
    fn build_endpoint_with_query() {
        let req = client()
            .build::<()>(Endpoint::ListEvents, PathArgs::query(Some(4)), None)
            .unwrap();
        assert_eq!(req.url, "http://localhost:8000/events?college_id=4");
        assert!(req.body.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = CampusClient::new("http://localhost:8000/");
        let req = client.build_request("/health", RequestOptions::default());
        assert_eq!(req.url, "http://localhost:8000/health");
    }

    #[test]
    fn success_body_passes_through_unchanged() {
        let body = r#"[{"college_id":1,"name":"North","location":"Oslo","extra":{"nested":[1,2]}}]"#;
        let value = client().parse_response(HttpResponse::new(200, body)).unwrap();
        assert_eq!(value, serde_json::from_str::<Value>(body).unwrap());
    }

    #[test]
    fn empty_success_body_is_null() {
        let value = client().parse_response(HttpResponse::new(204, "")).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn detail_becomes_the_message() {
        let response = HttpResponse::new(400, r#"{"detail":"Email already registered"}"#);
        let err = client().parse_response(response).unwrap_err();
        assert_eq!(err.message(), "Email already registered");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn non_string_detail_is_rendered_as_json() {
        let response = HttpResponse::new(422, r#"{"detail":[{"loc":["body","name"]}]}"#);
        let err = client().parse_response(response).unwrap_err();
        assert_eq!(err.message(), r#"[{"loc":["body","name"]}]"#);
    }

    #[test]
    fn missing_detail_falls_back_to_status() {
        let err = client()
            .parse_response(HttpResponse::new(404, r#"{"error":"nope"}"#))
            .unwrap_err();
        assert_eq!(err.message(), "HTTP error! status: 404");
    }

    #[test]
    fn non_json_error_body_names_the_status() {
        let err = client()
            .parse_response(HttpResponse::new(502, "<html>Bad Gateway</html>"))
            .unwrap_err();
        assert!(err.message().contains("502"));
    }

    #[test]
    fn bad_json_on_success_is_a_request_failure() {
        let err = client()
            .parse_response(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(err.message().starts_with("invalid JSON response"));
        assert!(err.status().is_none());
    }

    #[test]
    fn typed_parse_reports_shape_mismatch() {
        let err = client()
            .parse::<Vec<NewStudent>>(HttpResponse::new(200, r#"{"not":"a list"}"#))
            .unwrap_err();
        assert!(err.message().starts_with("unexpected response shape"));
    }
}
