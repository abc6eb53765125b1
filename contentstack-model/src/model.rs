use contentstack_types::FieldError;

use crate::fields::FieldBag;

/// A caller-defined type that can be decoded from a field bag.
///
/// `FIELD_KEYS` lists the keys the model reads. Before decoding, the item is
/// projected to those keys, so unknown JSON fields never reach
/// [`ContentModel::from_fields`]. An empty list means "all fields".
///
/// ```
/// use contentstack_model::{ContentModel, FieldBag};
/// use contentstack_types::FieldError;
///
/// struct Session {
///     title: String,
///     seats: i64,
/// }
///
/// impl ContentModel for Session {
///     const FIELD_KEYS: &'static [&'static str] = &["title", "seats"];
///
///     fn from_fields(fields: &FieldBag) -> Result<Self, FieldError> {
///         Ok(Self {
///             title: fields.required_str("title")?.to_string(),
///             seats: fields.required_i64("seats")?,
///         })
///     }
/// }
/// ```
pub trait ContentModel: Sized {
    const FIELD_KEYS: &'static [&'static str];

    fn from_fields(fields: &FieldBag) -> Result<Self, FieldError>;
}

impl ContentModel for FieldBag {
    const FIELD_KEYS: &'static [&'static str] = &[];

    fn from_fields(fields: &FieldBag) -> Result<Self, FieldError> {
        Ok(fields.clone())
    }
}
