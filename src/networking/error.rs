use std::error::Error as StdError;
use std::fmt;
use std::io;

use super::result::{ErrorItem, ErrorResponse};

/// Locally synthesized error conditions. Codes and messages are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkError {
    /// The server answered with an error status and no body.
    NoResponse,
    /// The request never reached the server.
    NoInternetConnection,
    /// TLS handshake or certificate failure.
    SslFailure,
    /// No response within the endpoint's timeout.
    Timeout,
}

impl NetworkError {
    pub fn code(&self) -> i32 {
        match self {
            NetworkError::NoResponse => -1,
            NetworkError::NoInternetConnection => -2,
            NetworkError::SslFailure => -3,
            NetworkError::Timeout => -4,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            NetworkError::NoResponse => "An unexpected response has been received by the server.",
            NetworkError::NoInternetConnection => "No internet connection.",
            NetworkError::SslFailure => "SSL failure, unable to establish a secure connection.",
            NetworkError::Timeout => {
                "Failed to receive response from the server within a given time."
            }
        }
    }

    /// The error payload handed to callers in place of a server response.
    pub fn value(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: ErrorItem {
                code: self.code(),
                info: Some(self.message().to_string()),
            },
        }
    }

    /// Classifies a transport failure by walking its source chain.
    ///
    /// TLS failures are recognised by type first (`native_tls::Error`, bare or
    /// inside an `io::Error`). Message text is only consulted for the causes
    /// below the outermost error, and never for a `reqwest::Error`, whose
    /// message carries the request URL.
    pub fn classify(error: &(dyn StdError + 'static)) -> NetworkError {
        let mut current = Some(error);
        let mut outermost = true;
        let mut tls = false;

        while let Some(err) = current {
            if let Some(reqwest_err) = err.downcast_ref::<reqwest::Error>()
                && reqwest_err.is_timeout()
            {
                return NetworkError::Timeout;
            }
            if let Some(io_err) = err.downcast_ref::<io::Error>()
                && io_err.kind() == io::ErrorKind::TimedOut
            {
                return NetworkError::Timeout;
            }
            let inner_text_match =
                !outermost && !names_request(err) && is_tls_message(&err.to_string());
            if is_tls_error(err) || inner_text_match {
                tls = true;
            }
            outermost = false;
            current = err.source();
        }

        if tls {
            NetworkError::SslFailure
        } else {
            NetworkError::NoInternetConnection
        }
    }
}

fn is_tls_error(err: &(dyn StdError + 'static)) -> bool {
    if err.is::<native_tls::Error>() {
        return true;
    }
    err.downcast_ref::<io::Error>()
        .and_then(|io_err| io_err.get_ref())
        .is_some_and(|inner| inner.is::<native_tls::Error>())
}

/// True for errors whose message is built around the request URL.
fn names_request(err: &(dyn StdError + 'static)) -> bool {
    if err.is::<reqwest::Error>() {
        return true;
    }
    err.downcast_ref::<io::Error>()
        .and_then(|io_err| io_err.get_ref())
        .is_some_and(|inner| inner.is::<reqwest::Error>())
}

fn is_tls_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["ssl", "tls", "certificate", "handshake"]
        .iter()
        .any(|needle| message.contains(needle))
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

/// Failures that are not expressed as an `EndpointResult`.
#[derive(Debug)]
pub enum CallError {
    /// The endpoint could not be turned into a request (bad URL, bad header).
    Construction(String),
    /// An error status came back with a body that is not an error payload.
    ErrorParse {
        message: String,
        source: serde_json::Error,
    },
    /// A success body could not be read off the wire.
    Body(String),
    /// The stream handler failed.
    Stream(io::Error),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::Construction(msg) => write!(f, "invalid request: {msg}"),
            CallError::ErrorParse { message, source } => write!(f, "{message} ({source})"),
            CallError::Body(msg) => write!(f, "failed to read response body: {msg}"),
            CallError::Stream(e) => write!(f, "stream handler failed: {e}"),
        }
    }
}

impl StdError for CallError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            CallError::ErrorParse { source, .. } => Some(source),
            CallError::Stream(e) => Some(e),
            _ => None,
        }
    }
}
