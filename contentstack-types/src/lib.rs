//! Core type definitions for the Contentstack delivery SDK.
//!
//! This crate holds the pieces every other layer agrees on:
//! - The error taxonomy ([`Error`] and its per-kind enums)
//! - [`ResourceKind`], which fixes endpoint envelope keys per resource
//! - The HTTP collaborator contract ([`HttpTransport`], [`HttpRequest`], [`HttpResponse`])
//! - Cache policy and the [`ResponseCache`] strategy the transport layer executes
//!
//! Nothing here performs I/O on its own. Transports and caches are injected
//! by the caller; there is no process-wide session or stack.

mod cache;
mod error;
mod resource;
mod transport;

pub use cache::{CachePolicy, MemoryCache, ResponseCache, ResponseSource};
pub use error::{
    ApiError, CacheError, ConfigurationError, DecodeError, Error, ErrorInfo, FieldError, Result,
    TransportError,
};
pub use resource::ResourceKind;
pub use transport::{
    dispatch, HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestContext,
};
