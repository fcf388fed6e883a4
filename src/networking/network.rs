//! Request building and dispatch.
//!
//! A `Network` is built once through `NetworkBuilder` and is read-only after
//! that: the global header registry and the transport clients never change,
//! so a single instance can be shared behind an `Arc` by every caller.
//!
//! ```text
//!   Endpoint ──build_request──► reqwest::Request ──transport──► outcome
//!                                                                  │
//!   caller ◄──── Result<EndpointResult, CallError> ◄──classifier───┘
//! ```

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;

use log::{debug, error, info};
use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::{Client, Request, Response, Url};
use tokio::task::JoinHandle;

use super::classifier;
use super::endpoint::{Endpoint, HttpMonitor};
use super::error::CallError;
use super::http::{HttpBody, HttpEncoding, HttpHeader, HttpHeaders, HttpMethod};
use super::result::{EndpointResult, RequestInfo};

const MAX_REDIRECTS: usize = 20;

pub type CallResult = Result<EndpointResult, CallError>;

// ============================================================================
// Builder
// ============================================================================

#[derive(Debug, Default)]
pub struct NetworkBuilder {
    headers: HttpHeaders,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a header sent with every request (or every request of the
    /// header's method, when scoped). A later registration under the same
    /// name replaces the earlier one.
    pub fn header(mut self, name: impl Into<String>, header: HttpHeader) -> Self {
        self.headers.insert(name.into(), header);
        self
    }

    pub fn headers(mut self, headers: HttpHeaders) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn build(self) -> Result<Network, CallError> {
        let clients = TransportClients::new()?;
        info!(
            "Network ready with {} global header(s)",
            self.headers.len()
        );
        Ok(Network {
            headers: self.headers,
            clients,
        })
    }
}

/// One client per redirect behaviour. `reqwest` fixes the redirect policy per
/// client, so the endpoint's flags pick the client.
#[derive(Debug)]
struct TransportClients {
    no_follow: Client,
    same_scheme: Client,
    follow_all: Client,
}

impl TransportClients {
    fn new() -> Result<Self, CallError> {
        let build = |policy: Policy| {
            Client::builder()
                .redirect(policy)
                .build()
                .map_err(|e| CallError::Construction(format!("transport client: {e}")))
        };

        let same_scheme = Policy::custom(|attempt| {
            if attempt.previous().len() > MAX_REDIRECTS {
                return attempt.error("too many redirects");
            }
            let switches_scheme = attempt
                .previous()
                .last()
                .is_some_and(|prev| prev.scheme() != attempt.url().scheme());
            if switches_scheme {
                attempt.stop()
            } else {
                attempt.follow()
            }
        });

        Ok(Self {
            no_follow: build(Policy::none())?,
            same_scheme: build(same_scheme)?,
            follow_all: build(Policy::limited(MAX_REDIRECTS))?,
        })
    }

    fn select(&self, endpoint: &dyn Endpoint) -> &Client {
        match (endpoint.follow_redirects(), endpoint.follow_ssl_redirects()) {
            (false, _) => &self.no_follow,
            (true, false) => &self.same_scheme,
            (true, true) => &self.follow_all,
        }
    }
}

// ============================================================================
// Network
// ============================================================================

/// HTTP client configuration plus the dispatch entry points.
#[derive(Debug)]
pub struct Network {
    headers: HttpHeaders,
    clients: TransportClients,
}

impl Network {
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    pub fn global_headers(&self) -> &HttpHeaders {
        &self.headers
    }

    /// Builds the request an endpoint describes. Performs no I/O.
    pub fn build_request(&self, endpoint: &dyn Endpoint) -> Result<Request, CallError> {
        self.prepare(endpoint).map(|(_, request)| request)
    }

    /// Runs the endpoint and waits for its typed result.
    pub async fn execute(&self, endpoint: &dyn Endpoint) -> CallResult {
        let (client, request) = self.prepare(endpoint).inspect_err(|e| {
            error!("Failed to execute network call for path '{}': {e}", endpoint.path());
        })?;
        dispatch(client, request, endpoint).await
    }

    /// Runs the endpoint in the background and hands the result to `callback`.
    ///
    /// The callback runs exactly once. If the request cannot be built it runs
    /// on the calling thread before `call` returns and `None` is returned;
    /// otherwise it runs on a Tokio worker and the task handle is returned.
    /// Must be called from within a Tokio runtime.
    pub fn call<F>(&self, endpoint: Arc<dyn Endpoint>, callback: F) -> Option<JoinHandle<()>>
    where
        F: FnOnce(CallResult) + Send + 'static,
    {
        let (client, request) = match self.prepare(endpoint.as_ref()) {
            Ok(prepared) => prepared,
            Err(e) => {
                error!("Failed to execute network call for path '{}': {e}", endpoint.path());
                callback(Err(e));
                return None;
            }
        };

        let client = client.clone();
        Some(tokio::spawn(async move {
            let result = dispatch(&client, request, endpoint.as_ref()).await;
            callback(result);
        }))
    }

    fn prepare(&self, endpoint: &dyn Endpoint) -> Result<(&Client, Request), CallError> {
        let client = self.clients.select(endpoint);
        let method = endpoint.method();
        let mut url = build_url(endpoint)?;
        let body = endpoint.body();

        if !method.has_body() {
            add_query_parameters(&mut url, body.as_ref());
        }

        let mut builder = client
            .request(method.into(), url)
            .headers(self.build_headers(endpoint)?)
            .timeout(endpoint.request_timeout());

        if method.has_body() {
            builder = match (body, endpoint.encoding()) {
                (None, _) => builder.body(""),
                (Some(body), HttpEncoding::None) => builder.form(&body),
                (Some(body), encoding) => {
                    let mut builder = builder.body(join_body_values(&body));
                    if let Some(media_type) = encoding.media_type() {
                        builder = builder.header(CONTENT_TYPE, media_type);
                    }
                    builder
                }
            };
        }

        if let Some(directive) = endpoint.cache_policy().directive() {
            builder = builder.header(CACHE_CONTROL, directive);
        }

        let request = builder
            .build()
            .map_err(|e| CallError::Construction(e.to_string()))?;
        debug!("Built {} {}", request.method(), request.url());
        Ok((client, request))
    }

    /// Global headers first (unscoped or scoped to this method), then the
    /// endpoint's own headers.
    fn build_headers(&self, endpoint: &dyn Endpoint) -> Result<HeaderMap, CallError> {
        let method = endpoint.method();
        let mut map = HeaderMap::new();

        for (name, header) in &self.headers {
            if header.applies_to(method) {
                append_header(&mut map, name, &header.value)?;
            }
        }
        for (name, header) in endpoint.headers().iter().flatten() {
            append_header(&mut map, name, &header.value)?;
        }

        Ok(map)
    }
}

async fn dispatch(client: &Client, request: Request, endpoint: &dyn Endpoint) -> CallResult {
    let method = endpoint.method();
    let url = request.url().to_string();
    let monitors = endpoint.monitors().unwrap_or_default();
    let request = match intercept_request(&monitors, request).await {
        Ok(request) => request,
        Err(e) => return failure(&e, method, &url, false),
    };
    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(e) => return failure(&e, method, &url, !e.is_connect()),
    };
    let response = match intercept_response(&monitors, response).await {
        Ok(response) => response,
        Err(e) => return failure(&e, method, &url, true),
    };

    classifier::process_response(endpoint, response).await
}

fn failure(
    err: &(dyn StdError + 'static),
    method: HttpMethod,
    url: &str,
    request_was_sent: bool,
) -> CallResult {
    debug!("Transport failure for {method} {url}: {err}");
    let request_info = RequestInfo {
        method,
        url: url.to_string(),
        request_was_sent,
    };
    Ok(classifier::process_failure(err, request_info))
}

/// Request hooks run in list order.
async fn intercept_request(
    monitors: &[Arc<dyn HttpMonitor>],
    mut request: Request,
) -> io::Result<Request> {
    for monitor in monitors {
        request = monitor.intercept_request(request).await?;
    }
    Ok(request)
}

/// Response hooks run in reverse list order, so the first monitor sees the
/// request first and the response last.
async fn intercept_response(
    monitors: &[Arc<dyn HttpMonitor>],
    mut response: Response,
) -> io::Result<Response> {
    for monitor in monitors.iter().rev() {
        response = monitor.intercept_response(response).await?;
    }
    Ok(response)
}

fn append_header(map: &mut HeaderMap, name: &str, value: &str) -> Result<(), CallError> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| CallError::Construction(format!("invalid header name '{name}': {e}")))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| CallError::Construction(format!("invalid value for header '{name}': {e}")))?;
    map.append(name, value);
    Ok(())
}

/// Scheme, host and port of the base URL, with the base path and the
/// endpoint path joined underneath. Query and fragment of the base are dropped.
fn build_url(endpoint: &dyn Endpoint) -> Result<Url, CallError> {
    let base_url = endpoint.base_url();
    let mut url = Url::parse(base_url)
        .map_err(|e| CallError::Construction(format!("invalid base URL '{base_url}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(CallError::Construction(format!(
            "base URL '{base_url}' is not an http(s) URL with a host"
        )));
    }

    let base_path = url.path().trim_matches('/').to_string();
    let path = endpoint.path().trim_start_matches('/');
    let joined = [base_path.as_str(), path]
        .iter()
        .filter(|segment| !segment.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");

    url.set_path(&format!("/{joined}"));
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn add_query_parameters(url: &mut Url, body: Option<&HttpBody>) {
    let Some(body) = body.filter(|b| !b.is_empty()) else {
        return;
    };
    let mut pairs = url.query_pairs_mut();
    for (name, value) in body {
        pairs.append_pair(name, value);
    }
}

/// JSON payloads are the body values concatenated in key order.
fn join_body_values(body: &HttpBody) -> String {
    body.values().map(String::as_str).collect()
}
