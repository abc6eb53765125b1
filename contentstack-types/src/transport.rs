//! HTTP collaborator contract.
//!
//! The SDK core never opens sockets. It hands a fully resolved
//! [`HttpRequest`] to an injected [`HttpTransport`] and gets back the raw
//! status, headers and body. Retry, connection pooling and TLS belong to the
//! transport implementation.

use crate::error::{ApiError, Error, Result, TransportError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// HTTP method of a request. The delivery API is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
        }
    }
}

/// A fully resolved request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

/// A raw response as returned by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs HTTP requests on behalf of the SDK.
///
/// Dropping the returned future must abort the request. Implementations
/// report timeouts and cancellations as the matching [`TransportError`]
/// variants rather than as generic network failures.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends a request and returns the raw response, whatever its status.
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: HttpTransport + ?Sized> HttpTransport for Arc<T> {
    async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

/// Per-stack request settings: base URL, auth headers and environment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestContext {
    /// Scheme, host and API version, e.g. `https://cdn.contentstack.io/v3`.
    pub base_url: String,
    /// Headers sent with every request (`api_key`, `access_token`, `branch`).
    pub headers: BTreeMap<String, String>,
    /// Publishing environment appended as the `environment` URI parameter.
    pub environment: Option<String>,
}

impl RequestContext {
    /// Builds a GET request for `path` with an already encoded query string.
    pub fn get(&self, path: &str, query: &str) -> HttpRequest {
        let mut url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        HttpRequest {
            method: HttpMethod::Get,
            url,
            headers: self.headers.clone(),
            body: None,
        }
    }
}

/// Sends `request` and maps non-2xx responses onto the error taxonomy.
///
/// A non-2xx body carrying the CMS error envelope becomes [`Error::Api`];
/// anything else becomes [`TransportError::Status`].
pub async fn dispatch(transport: &dyn HttpTransport, request: HttpRequest) -> Result<HttpResponse> {
    debug!("{} {}", request.method.as_str(), request.url);
    let response = transport.send(request).await?;

    if response.is_success() {
        return Ok(response);
    }

    debug!("request failed with HTTP {}", response.status);
    match ApiError::from_body(response.status, &response.body) {
        Some(api) => Err(Error::Api(api)),
        None => Err(Error::Transport(TransportError::Status {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        })),
    }
}
