//! Request-scoped error outcomes and their JSON envelope

use hyper::{Response, StatusCode};
use serde_json::json;
use tracing::warn;

use crate::routes::response::{json_response, FullBody};
use crate::types::QuireError;
use crate::validation::EntityKind;

/// Why a request failed
#[derive(Debug)]
pub enum ApiError {
    /// Identifier missing or not a well-formed ObjectId (400)
    InvalidId(EntityKind),
    /// Entity absent, or not linked to the supplied owner ids (404)
    NotFound(EntityKind),
    /// Any other caller mistake (400)
    BadRequest(&'static str),
    /// Everything else, database failures included (500)
    Unhandled {
        context: Option<&'static str>,
        source: QuireError,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unhandled { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error text placed in the envelope
    pub fn message(&self) -> String {
        match self {
            Self::InvalidId(kind) => kind.invalid_id_message().to_string(),
            Self::NotFound(kind) => kind.not_found_message().to_string(),
            Self::BadRequest(message) => (*message).to_string(),
            Self::Unhandled { source, .. } => source.to_string(),
        }
    }

    /// Reason phrase sent on the status line
    fn reason(&self) -> &'static str {
        match self {
            Self::InvalidId(kind) => kind.invalid_id_message(),
            Self::NotFound(kind) => kind.not_found_message(),
            Self::BadRequest(message) => message,
            Self::Unhandled { context, .. } => context.unwrap_or("Internal Server Error"),
        }
    }

    /// Attach the operation description to an unhandled error (first one wins)
    pub fn in_context(self, operation: &'static str) -> Self {
        match self {
            Self::Unhandled {
                context: None,
                source,
            } => Self::Unhandled {
                context: Some(operation),
                source,
            },
            other => other,
        }
    }

    pub fn into_response(self) -> Response<FullBody> {
        if let Self::Unhandled { context, source } = &self {
            warn!(
                operation = context.unwrap_or("unknown"),
                error = %source,
                "Request failed"
            );
        }

        json_response(self.status(), self.reason(), &json!({ "error": self.message() }))
    }
}

impl From<QuireError> for ApiError {
    fn from(source: QuireError) -> Self {
        match source {
            QuireError::Duplicate(_) => Self::BadRequest("User already exists"),
            source => Self::Unhandled {
                context: None,
                source,
            },
        }
    }
}
