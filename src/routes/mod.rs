//! HTTP routes for quire
//!
//! Each controller takes the shared state and a fully-read [`ApiRequest`] and
//! returns `Result<Reply, ApiError>`. [`respond`] renders either side.

pub mod blogs;
pub mod categories;
pub mod error;
pub mod health;
pub mod query;
pub mod response;
pub mod users;
pub mod views;


use bytes::Bytes;
use hyper::{Method, Response};
use serde::de::DeserializeOwned;

pub use error::ApiError;
pub use health::{health_check, readiness_check, version_info};
pub use query::{PageLimits, Params};
pub use response::{
    method_not_allowed_response, not_found_response, preflight_response, FullBody, Reply,
};

/// A request with its body already collected
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub params: Params,
    pub body: Bytes,
}

impl ApiRequest {
    pub fn new(method: Method, path: &str, query: Option<&str>, body: Bytes) -> Self {
        Self {
            method,
            path: path.to_string(),
            params: Params::parse(query),
            body,
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key)
    }

    /// Decode the JSON body; malformed JSON and wrong field types are both 400
    ///
    /// An empty or whitespace-only body decodes as `{}`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body: &[u8] = if self.body.trim_ascii().is_empty() {
            b"{}"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|_| ApiError::BadRequest("Invalid JSON"))
    }
}

/// Render a controller outcome, naming the operation for unhandled failures
pub fn respond(result: Result<Reply, ApiError>, operation: &'static str) -> Response<FullBody> {
    match result {
        Ok(reply) => reply.into_response(),
        Err(err) => err.in_context(operation).into_response(),
    }
}

/// Required, non-blank text field from a request body
pub(crate) fn required(value: Option<String>, error: &'static str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::BadRequest(error))
}

/// Required field kept exactly as sent; blank still counts as missing
pub(crate) fn required_raw(value: Option<String>, error: &'static str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ApiError::BadRequest(error))
}

/// Optional text field for a PATCH: absent is fine, present-but-blank is not
pub(crate) fn optional(
    value: Option<String>,
    error: &'static str,
) -> Result<Option<String>, ApiError> {
    value.map(|v| required(Some(v), error)).transpose()
}
