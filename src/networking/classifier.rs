//! Maps a raw transport outcome onto an `EndpointResult`.

use std::error::Error as StdError;

use log::{debug, error, warn};
use reqwest::header::HeaderMap;

use super::endpoint::{Endpoint, ResponseStream};
use super::error::{CallError, NetworkError};
use super::http::{HttpHeader, HttpHeaders};
use super::result::{EndpointError, EndpointResult, ErrorResponse, RequestInfo};

const HTTP_OK: u16 = 200;
const HTTP_CREATED: u16 = 201;
const HTTP_ACCEPTED: u16 = 202;
const HTTP_NO_CONTENT: u16 = 204;

/// Success statuses whose body is handed to the caller. Any other 2xx is
/// reported without a body.
pub fn retains_body(status: u16) -> bool {
    matches!(status, HTTP_OK | HTTP_CREATED | HTTP_ACCEPTED | HTTP_NO_CONTENT)
}

/// No response was received, or a monitor rejected the call. Always produces
/// an `Error` result.
pub fn process_failure(err: &(dyn StdError + 'static), request_info: RequestInfo) -> EndpointResult {
    let kind = NetworkError::classify(err);
    debug!("Transport failure classified as {:?}: {err}", kind);

    EndpointResult::Error(EndpointError {
        code: 0,
        response: kind.value(),
        request_info: Some(request_info),
        headers: None,
        handled: false,
    })
}

pub async fn process_response(
    endpoint: &dyn Endpoint,
    response: reqwest::Response,
) -> Result<EndpointResult, CallError> {
    let status = response.status();
    debug!("Response status {} for path '{}'", status, endpoint.path());

    if status.is_success() {
        process_successful(endpoint, response).await
    } else {
        process_error(endpoint, response).await
    }
}

async fn process_successful(
    endpoint: &dyn Endpoint,
    response: reqwest::Response,
) -> Result<EndpointResult, CallError> {
    if !retains_body(response.status().as_u16()) {
        return Ok(EndpointResult::response(None));
    }

    let body = response_body(endpoint, response).await.inspect_err(|e| {
        error!("Failed to read successful response: {e}");
    })?;
    Ok(EndpointResult::response(body))
}

async fn process_error(
    endpoint: &dyn Endpoint,
    response: reqwest::Response,
) -> Result<EndpointResult, CallError> {
    let code = i32::from(response.status().as_u16());
    let headers = parse_response_headers(response.headers());

    let body = response_body(endpoint, response).await.inspect_err(|e| {
        error!("Failed to read error response: {e}");
    })?;

    let error_response = match body {
        None => NetworkError::NoResponse.value(),
        Some(text) => parse_error_response(&text)?,
    };

    warn!(
        "HTTP {} from '{}': {:?}",
        code,
        endpoint.path(),
        error_response.error
    );

    Ok(EndpointResult::Error(EndpointError {
        code,
        response: error_response,
        request_info: None,
        headers,
        handled: false,
    }))
}

/// Decodes an error body, ignoring unknown keys.
pub fn parse_error_response(text: &str) -> Result<ErrorResponse, CallError> {
    serde_json::from_str(text).map_err(|source| CallError::ErrorParse {
        message: "Failed to parse error response.".to_string(),
        source,
    })
}

/// Reads the body as text, or hands it to the endpoint's stream handler.
///
/// Returns `None` for blank bodies and whenever the body was streamed.
async fn response_body(
    endpoint: &dyn Endpoint,
    response: reqwest::Response,
) -> Result<Option<String>, CallError> {
    if let Some(handler) = endpoint.stream_handler() {
        let headers = parse_response_headers(response.headers());
        let stream = ResponseStream::from_response(response);
        // The stream moves into the handler and is dropped on every exit path.
        handler
            .on_stream(headers, stream)
            .await
            .map_err(CallError::Stream)?;
        return Ok(None);
    }

    let text = response
        .text()
        .await
        .map_err(|e| CallError::Body(e.to_string()))?;
    if text.trim().is_empty() {
        Ok(None)
    } else {
        Ok(Some(text))
    }
}

/// Collects response headers, `None` when there are none.
pub fn parse_response_headers(header_map: &HeaderMap) -> Option<HttpHeaders> {
    if header_map.is_empty() {
        return None;
    }

    let headers = header_map
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), HttpHeader::new(v)))
        })
        .collect();
    Some(headers)
}
