//! Response materialization for the Contentstack delivery API.
//!
//! Turns a raw response body into a [`ContentstackResponse`]:
//! - [`FieldBag`] is the dynamic, untyped view of an entry or asset
//! - [`ContentModel`] is the capability a caller's type implements to be
//!   decoded from a field bag (a declared key list plus a decode function)
//! - [`SchemaRegistry`] maps content type UIDs to [`ModelSchema`]s used when
//!   hydrating referenced entries
//! - [`Materializer`] walks the envelope, substitutes reference stubs with the
//!   objects the server returned, and decodes each item
//!
//! Materialization is purely local. No follow-up requests are issued to
//! resolve references the server did not embed.

mod fields;
mod materializer;
mod model;
mod response;
mod schema;

pub use fields::{FieldBag, ReferenceValue};
pub use materializer::{DecodeOptions, DecodePolicy, Materializer, INCLUDED_KEY};
pub use model::ContentModel;
pub use response::ContentstackResponse;
pub use schema::{ModelSchema, SchemaField, SchemaRegistry};
