//! Error types shared by every layer of the SDK.
//!
//! Configuration errors are raised locally and never reach the network.
//! Everything past the network boundary (transport, API, decode, cache)
//! travels through the same [`Error`] channel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ResourceKind;

/// Result type for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error returned by every fallible SDK call.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid builder argument or client setup, detected before any I/O.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Network failure, timeout or cancellation reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Structured error envelope returned by the server.
    #[error("{0}")]
    Api(#[from] ApiError),

    /// Response body could not be turned into the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A cache-only read found nothing.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

impl Error {
    /// Returns true if the server reported the resource as missing (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Api(api) => api.status == 404,
            Error::Transport(TransportError::Status { status, .. }) => *status == 404,
            _ => false,
        }
    }

    /// Returns true if this error is a cache miss rather than a server response.
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, Error::Cache(CacheError::Miss { .. }))
    }

    /// Returns true if the request was cancelled by the caller.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Transport(TransportError::Cancelled))
    }

    /// Returns the HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(api) => Some(api.status),
            Error::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

/// Local, pre-network misuse of the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// An endpoint that addresses a single resource was given an empty UID.
    #[error("a UID is required to address a single {0}")]
    MissingUid(&'static str),

    /// A required credential or stack setting is empty.
    #[error("missing required setting: {0}")]
    MissingCredential(&'static str),

    /// Both a sync token and a pagination token were supplied.
    #[error("a sync can resume from a sync token or a pagination token, not both")]
    ConflictingSyncTokens,

    /// Sync filters were supplied while resuming from a token.
    #[error("sync filters are only valid for an initial sync")]
    SyncFilterOnResume,

    /// Page size above the server maximum.
    #[error("limit {requested} exceeds the maximum of {max}")]
    LimitExceeded { requested: u32, max: u32 },

    /// Include flag that has no wire meaning for the resource kind.
    #[error("include flag `{flag}` is not supported for {kind}")]
    UnsupportedInclude { flag: &'static str, kind: ResourceKind },

    /// Value that has no query-string representation (e.g. JSON null).
    #[error("unsupported parameter value for `{0}`")]
    UnsupportedValue(String),

    /// Any other out-of-range builder argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Failures reported by the HTTP collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("network failure: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("request cancelled")]
    Cancelled,

    /// Non-2xx status whose body is not a recognizable error envelope.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Structured 4xx/5xx error returned by the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("API error {error_code} (HTTP {status}): {error_message}")]
pub struct ApiError {
    /// HTTP status of the response.
    pub status: u16,
    /// Server-side error code.
    pub error_code: i64,
    /// Human readable message from the server.
    pub error_message: String,
    /// Per-field error details.
    pub errors: ErrorInfo,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error_message: Option<String>,
    error_code: Option<i64>,
    #[serde(default)]
    errors: ErrorInfo,
}

impl ApiError {
    /// Builds an API error from a non-2xx response body.
    ///
    /// Returns `None` when the body is not a JSON error envelope, in which
    /// case the caller should surface a [`TransportError::Status`] instead.
    pub fn from_body(status: u16, body: &[u8]) -> Option<Self> {
        let envelope: ErrorEnvelope = serde_json::from_slice(body).ok()?;
        if envelope.error_message.is_none() && envelope.error_code.is_none() {
            return None;
        }
        Some(Self {
            status,
            error_code: envelope.error_code.unwrap_or_default(),
            error_message: envelope.error_message.unwrap_or_default(),
            errors: envelope.errors,
        })
    }
}

/// Field-level details from the `errors` object of an error envelope.
///
/// The server reports credential problems under `api_key`, `access_token`
/// or the legacy `authtoken`; all three land in [`ErrorInfo::access_token`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawErrorInfo")]
pub struct ErrorInfo {
    pub access_token: Option<Vec<String>>,
    pub environment: Option<Vec<String>>,
    pub uid: Option<Vec<String>>,
}

#[derive(Default, Deserialize)]
struct RawErrorInfo {
    api_key: Option<Vec<String>>,
    access_token: Option<Vec<String>>,
    authtoken: Option<Vec<String>>,
    environment: Option<Vec<String>>,
    uid: Option<Vec<String>>,
}

impl From<RawErrorInfo> for ErrorInfo {
    fn from(raw: RawErrorInfo) -> Self {
        Self {
            access_token: raw.api_key.or(raw.access_token).or(raw.authtoken),
            environment: raw.environment,
            uid: raw.uid,
        }
    }
}

/// The response could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The body is not JSON at all.
    #[error("unparseable response: {message}")]
    Unparseable { message: String, body: String },

    /// The body is JSON but lacks the expected envelope shape.
    #[error("response does not match the expected shape: missing {expected}")]
    SchemaMismatch { expected: String },

    /// A single item in the page failed to decode against its model.
    #[error("item {index} failed to decode: {source}")]
    InvalidItem { index: usize, source: FieldError },
}

impl DecodeError {
    /// Wraps a JSON parse failure together with the offending bytes.
    pub fn unparseable(err: &serde_json::Error, body: &[u8]) -> Self {
        Self::Unparseable {
            message: err.to_string(),
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// Shorthand for a missing envelope key.
    pub fn missing(expected: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            expected: expected.into(),
        }
    }
}

/// A model could not be built from a field bag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("missing field `{key}`")]
    Missing { key: String },

    #[error("field `{key}` is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    #[error("field `{key}` is invalid: {message}")]
    Invalid { key: String, message: String },
}

/// Cache lookups that could not be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("no cached response for {url}")]
    Miss { url: String },
}
