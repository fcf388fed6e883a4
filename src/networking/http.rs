//! Plain HTTP vocabulary shared by endpoints and the request builder.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP method of an endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Delete,
    #[default]
    Get,
    Head,
    Patch,
    Post,
    Put,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Delete => "DELETE",
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
        }
    }

    /// DELETE, PATCH, POST and PUT always carry a payload, even an empty one.
    pub fn has_body(&self) -> bool {
        matches!(
            self,
            HttpMethod::Delete | HttpMethod::Patch | HttpMethod::Post | HttpMethod::Put
        )
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
        }
    }
}

/// How the `body` map of an endpoint is turned into a request payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HttpEncoding {
    /// Body values concatenated, sent as `application/json; charset=utf-8`.
    Json,
    /// Body values concatenated, sent as `application/json`.
    JsonByteArray,
    /// Form encoded key/value pairs.
    #[default]
    None,
}

impl HttpEncoding {
    pub fn media_type(&self) -> Option<&'static str> {
        match self {
            HttpEncoding::Json => Some("application/json; charset=utf-8"),
            HttpEncoding::JsonByteArray => Some("application/json"),
            HttpEncoding::None => None,
        }
    }
}

/// Cache behaviour requested from the transport and any intermediaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Use whatever the transport does by default.
    #[default]
    Default,
    /// Don't accept an unvalidated cached response.
    NoCache,
    /// Don't store the server's response in any cache.
    NoStore,
    /// Only accept a cached response; a cache miss yields `504`.
    OnlyIfCached,
    /// Force a cached response to be validated by the server.
    Server,
}

impl CachePolicy {
    /// The `Cache-Control` directive for this policy, `None` for `Default`.
    pub fn directive(&self) -> Option<&'static str> {
        match self {
            CachePolicy::Default => None,
            CachePolicy::NoCache => Some("no-cache"),
            CachePolicy::NoStore => Some("no-store"),
            CachePolicy::OnlyIfCached => Some("only-if-cached"),
            CachePolicy::Server => Some("max-age=0"),
        }
    }
}

/// A single header value, optionally restricted to one HTTP method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpHeader {
    pub method: Option<HttpMethod>,
    pub value: String,
}

impl HttpHeader {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            method: None,
            value: value.into(),
        }
    }

    pub fn scoped(method: HttpMethod, value: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            value: value.into(),
        }
    }

    /// Unscoped headers apply to every method.
    pub fn applies_to(&self, method: HttpMethod) -> bool {
        self.method.is_none_or(|m| m == method)
    }
}

pub type HttpHeaders = BTreeMap<String, HttpHeader>;
pub type HttpBody = BTreeMap<String, String>;

pub mod header_name {
    pub const ACCEPT_CHARSET: &str = "Accept-Charset";
    pub const ACCEPT_LANGUAGE: &str = "Accept-Language";
    pub const ACCEPT_ENCODING: &str = "Accept-Encoding";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const CONTENT_DISPOSITION: &str = "Content-Disposition";
    pub const USER_AGENT: &str = "User-Agent";
}

pub mod header_value {
    /// `Accept-Encoding` value listing br, gzip and deflate in falling quality.
    pub fn preferred_encoding() -> String {
        ["br", "gzip", "deflate"]
            .iter()
            .enumerate()
            .map(|(index, value)| format!("{value};q={:.1}", 1.0 - index as f64 * 0.1))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn authorization_bearer(token: &str) -> String {
        format!("Bearer {token}")
    }
}
