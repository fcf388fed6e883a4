//! # Networking
//!
//! Declarative endpoints turned into HTTP calls with typed results.
//!
//! - [`endpoint`]: the `Endpoint` descriptor with its streaming and monitor hooks
//! - [`network`]: request building and dispatch (`Network`)
//! - [`classifier`]: transport outcome → `EndpointResult`
//! - [`result`]: result, decode and error-payload types
//! - [`error`]: synthetic error codes and `CallError`
//! - [`http`]: methods, encodings, cache policies and headers

pub mod classifier;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod network;
pub mod result;

pub use endpoint::{DEFAULT_REQUEST_TIMEOUT, Endpoint, HttpMonitor, ResponseStream, StreamHandler};
pub use error::{CallError, NetworkError};
pub use http::{
    CachePolicy, HttpBody, HttpEncoding, HttpHeader, HttpHeaders, HttpMethod, header_name,
    header_value,
};
pub use network::{CallResult, Network, NetworkBuilder};
pub use result::{Decoded, EndpointError, EndpointResult, ErrorItem, ErrorResponse, RequestInfo};
