//! JSON response builders shared by every route

use bytes::Bytes;
use http_body_util::Full;
use hyper::ext::ReasonPhrase;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;

pub type FullBody = Full<Bytes>;

const ALLOWED_METHODS: &str = "GET, POST, PATCH, DELETE, OPTIONS";

/// A successful controller outcome: status, reason phrase and JSON body
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub reason: &'static str,
    pub body: serde_json::Value,
}

impl Reply {
    pub fn ok(reason: &'static str, body: serde_json::Value) -> Self {
        Self {
            status: StatusCode::OK,
            reason,
            body,
        }
    }

    pub fn into_response(self) -> Response<FullBody> {
        json_response(self.status, self.reason, &self.body)
    }
}

fn cors(response: &mut Response<FullBody>) {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
}

/// Serialize `body` as JSON with the given status and reason phrase
pub fn json_response<T: Serialize>(
    status: StatusCode,
    reason: &'static str,
    body: &T,
) -> Response<FullBody> {
    let bytes = serde_json::to_vec(body).unwrap_or_else(|e| {
        json!({ "error": format!("Serialization error: {}", e) })
            .to_string()
            .into_bytes()
    });

    let mut response = Response::new(Full::new(Bytes::from(bytes)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    if !reason.is_empty() {
        response
            .extensions_mut()
            .insert(ReasonPhrase::from_static(reason.as_bytes()));
    }
    cors(&mut response);
    response
}

/// CORS preflight response
pub fn preflight_response() -> Response<FullBody> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    cors(&mut response);
    response
}

/// Unknown path
pub fn not_found_response(path: &str) -> Response<FullBody> {
    json_response(
        StatusCode::NOT_FOUND,
        "Not Found",
        &json!({ "error": "Not Found", "path": path }),
    )
}

/// Known path, unsupported verb
pub fn method_not_allowed_response() -> Response<FullBody> {
    let mut response = json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method Not Allowed",
        &json!({ "error": "Method not allowed" }),
    );
    response
        .headers_mut()
        .insert(header::ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response<FullBody>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_json_response_sets_headers_and_reason() {
        let response = json_response(
            StatusCode::CREATED,
            "Blog created",
            &json!({ "newBlog": { "title": "x" } }),
        );

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        let reason = response.extensions().get::<ReasonPhrase>().unwrap();
        assert_eq!(reason.as_bytes(), b"Blog created");
        assert_eq!(body_json(response).await["newBlog"]["title"], "x");
    }

    #[tokio::test]
    async fn test_not_found_echoes_path() {
        let response = not_found_response("/nope");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Not Found");
        assert_eq!(body["path"], "/nope");
    }

    #[test]
    fn test_preflight_is_empty_no_content() {
        let response = preflight_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .is_some());
    }
}
