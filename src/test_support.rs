//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::time::Duration;

use crate::networking::{
    CachePolicy, Endpoint, HttpBody, HttpEncoding, HttpHeader, HttpHeaders, HttpMethod,
    DEFAULT_REQUEST_TIMEOUT,
};

/// An endpoint whose every property can be set from a test.
pub struct TestEndpoint {
    base_url: String,
    path: String,
    method: HttpMethod,
    headers: Option<HttpHeaders>,
    body: Option<HttpBody>,
    encoding: HttpEncoding,
    timeout: Duration,
    cache_policy: CachePolicy,
}

impl TestEndpoint {
    pub fn new(base_url: &str, path: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            path: path.to_string(),
            method: HttpMethod::Get,
            headers: None,
            body: None,
            encoding: HttpEncoding::None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_policy: CachePolicy::Default,
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: &str, header: HttpHeader) -> Self {
        self.headers
            .get_or_insert_with(HttpHeaders::new)
            .insert(name.to_string(), header);
        self
    }

    pub fn body_entry(mut self, key: &str, value: &str) -> Self {
        self.body
            .get_or_insert_with(HttpBody::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn encoding(mut self, encoding: HttpEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.cache_policy = cache_policy;
        self
    }
}

impl Endpoint for TestEndpoint {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> HttpMethod {
        self.method
    }

    fn headers(&self) -> Option<HttpHeaders> {
        self.headers.clone()
    }

    fn body(&self) -> Option<HttpBody> {
        self.body.clone()
    }

    fn encoding(&self) -> HttpEncoding {
        self.encoding
    }

    fn request_timeout(&self) -> Duration {
        self.timeout
    }

    fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }
}
