//! Delivery SDK for the Contentstack headless CMS.
//!
//! ```no_run
//! use contentstack::{FieldBag, Operation, Stack, StackConfig};
//!
//! # async fn run() -> contentstack::Result<()> {
//! let stack = Stack::connect(StackConfig::new("blt_api_key", "cs_delivery_token", "production"))?;
//!
//! let query = stack
//!     .content_type("session")
//!     .query()?
//!     .where_field("seats", Operation::is_greater_than(100))
//!     .include_reference(["track"])
//!     .limit(20)?;
//!
//! let page = stack.find::<FieldBag>(&query).await?;
//! for session in &page {
//!     println!("{:?}", session.title());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! The pieces are split across crates and re-exported here:
//! - `contentstack-types`: errors, resource kinds, transport and cache contracts
//! - `contentstack-query`: the query builder and parameter encoder
//! - `contentstack-model`: field bags, content models and reference resolution
//! - `contentstack-sync`: the change feed cursor and engine

mod config;
mod resources;
mod stack;
mod transport;

pub use config::{Region, StackConfig};
pub use resources::{Asset, ContentType, Entry, GlobalField, Taxonomy};
pub use stack::{Delivery, Stack};
pub use transport::ReqwestTransport;

pub use contentstack_model::{
    ContentModel, ContentstackResponse, DecodeOptions, DecodePolicy, FieldBag, Materializer,
    ModelSchema, ReferenceValue, SchemaField, SchemaRegistry,
};
pub use contentstack_query::{
    encode, Include, IncludeSet, Operation, ParamValue, Query, QueryOperator, Reference,
    SortOrder, MAX_LIMIT,
};
pub use contentstack_sync::{
    PublishType, SyncEngine, SyncItem, SyncOptions, SyncPage, SyncStack, SyncState,
};
pub use contentstack_types::{
    ApiError, CacheError, CachePolicy, ConfigurationError, DecodeError, Error, ErrorInfo,
    FieldError, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MemoryCache, ResourceKind,
    ResponseCache, ResponseSource, Result, TransportError,
};
