use std::fmt;

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::http::{HttpHeaders, HttpMethod};

/// Error payload as reported by the server (or synthesized locally).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorItem {
    pub code: i32,
    #[serde(default)]
    pub info: Option<String>,
}

/// `{"success": false, "error": {"code": int, "info": string|null}}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorItem,
}

/// The request an error result originated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub method: HttpMethod,
    pub url: String,
    pub request_was_sent: bool,
}

/// Outcome of a JSON decode of a response body.
#[derive(Debug)]
pub enum Decoded<T> {
    /// `None` when the response carried no body.
    Value(Option<T>),
    Error(serde_json::Error),
}

/// An error status from the server, or a synthesized transport failure.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointError {
    /// HTTP status, or `0` when no response was received.
    pub code: i32,
    pub response: ErrorResponse,
    /// Set for transport failures.
    pub request_info: Option<RequestInfo>,
    pub headers: Option<HttpHeaders>,
    /// Lets a consumer mark the error as already reported.
    pub handled: bool,
}

impl EndpointError {
    /// The error code carried in the payload (server code or synthetic code).
    pub fn error_code(&self) -> i32 {
        self.response.error.code
    }

    pub fn info(&self) -> Option<&str> {
        self.response.error.info.as_deref()
    }
}

impl fmt::Display for EndpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HTTP {} (error {}): {}",
            self.code,
            self.error_code(),
            self.info().unwrap_or("no details")
        )
    }
}

/// Typed result of a completed call.
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointResult {
    Response { body: Option<String> },
    Error(EndpointError),
}

impl EndpointResult {
    pub fn response(body: Option<String>) -> Self {
        EndpointResult::Response { body }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, EndpointResult::Error(_))
    }

    pub fn has_data(&self) -> bool {
        match self {
            EndpointResult::Response { body } => body.as_deref().is_some_and(|b| !b.trim().is_empty()),
            EndpointResult::Error(_) => false,
        }
    }

    /// Decodes the response body as JSON. Unknown keys are ignored.
    ///
    /// Errors always decode to `Decoded::Value(None)`; match on the result
    /// first when the distinction matters.
    pub fn decode_response<T: DeserializeOwned>(&self) -> Decoded<T> {
        let body = match self {
            EndpointResult::Response { body: Some(body) } if !body.trim().is_empty() => body,
            _ => return Decoded::Value(None),
        };

        match serde_json::from_str(body) {
            Ok(value) => Decoded::Value(Some(value)),
            Err(e) => {
                debug!("Response body failed to decode: {e}");
                Decoded::Error(e)
            }
        }
    }
}
