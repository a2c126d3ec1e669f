use std::error::Error as StdError;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use log::*;
use serde::Serialize;
use utoipa::ToSchema;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The body could not be read as JSON of the expected shape.
    Malformed,
    /// The request was well-formed but its content was rejected.
    Invalid,
}

/// JSON body returned for every failed admin API request.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::Invalid,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::Malformed,
            message: message.into(),
        }
    }

    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    fn status_code(&self) -> StatusCode {
        match self.error_kind {
            ErrorKind::Malformed => StatusCode::BAD_REQUEST,
            ErrorKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn code(&self) -> &'static str {
        match self.error_kind {
            ErrorKind::Malformed => "MALFORMED_REQUEST",
            ErrorKind::Invalid => "INVALID_REQUEST",
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        match &self.source {
            Some(source) => write!(fmt, "{}: {source}", self.message),
            None => write!(fmt, "{}", self.message),
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        debug!("Rejected request ({status}): {self}");

        let body = ErrorResponse {
            error: self.message.clone(),
            details: self.source.as_ref().map(|source| source.to_string()),
            code: self.code().to_string(),
            timestamp: Utc::now(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        let error = match rejection {
            // Valid JSON whose fields do not fit the request type.
            JsonRejection::JsonDataError(_) => Error::invalid("Request body has invalid fields"),
            JsonRejection::MissingJsonContentType(_) => {
                Error::malformed("Expected a request with Content-Type: application/json")
            }
            _ => Error::malformed("Request body is not valid JSON"),
        };
        error.with_source(rejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn invalid_maps_to_unprocessable_entity() {
        let response = Error::invalid("Notification title must not be empty").into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Notification title must not be empty");
        assert_eq!(body["code"], "INVALID_REQUEST");
        assert!(body.get("details").is_none());
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn malformed_maps_to_bad_request_with_details() {
        let source = serde_json::from_str::<Value>("{").unwrap_err();
        let response = Error::malformed("Request body is not valid JSON")
            .with_source(source)
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["code"], "MALFORMED_REQUEST");
        assert!(body["details"].is_string());
    }
}
