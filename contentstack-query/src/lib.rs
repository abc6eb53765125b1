//! Query construction for the Contentstack delivery API.
//!
//! Two layers live here:
//! - **Encoding** ([`encode`], [`encode_filter`]): turns the [`ParamValue`]
//!   model into a canonical, key-sorted query string or a MongoDB-style
//!   filter JSON object.
//! - **Building** ([`Query`]): a consuming builder that accumulates filter
//!   constraints, include flags, projections, ordering and pagination.
//!
//! # Example
//!
//! ```
//! use contentstack_query::{Operation, Query};
//! use contentstack_types::ResourceKind;
//!
//! let query = Query::new(ResourceKind::Entries, "/content_types/session/entries")
//!     .where_field("title", Operation::equals("Keynote"))
//!     .where_field("seats", Operation::is_greater_than(100))
//!     .order_by_ascending("created_at")
//!     .limit(20)
//!     .unwrap();
//!
//! assert!(query.url_query().starts_with("asc=created_at&limit=20"));
//! ```
//!
//! A `Query` is a plain value. It is `Send`, holds no locks, and is meant to
//! be owned and mutated by a single caller before it is executed.

mod builder;
mod encoder;
mod include;
mod operation;
mod value;

pub use builder::{Query, BASE_PROJECTION, MAX_LIMIT};
pub use encoder::{encode, encode_filter, encode_filter_string, FilterFormat, SKIPPED_KEYS};
pub use include::{Include, IncludeSet};
pub use operation::{Operation, QueryOperator, Reference, SortOrder};
pub use value::ParamValue;
