//! Resource handles. Each one only knows its endpoint path; execution goes
//! through the owning [`Stack`].

use contentstack_model::{ContentModel, ContentstackResponse, FieldBag, ModelSchema};
use contentstack_query::Query;
use contentstack_types::{ConfigurationError, DecodeError, ResourceKind, Result};

use crate::stack::Stack;

fn segment(uid: &str, kind: ResourceKind) -> std::result::Result<String, ConfigurationError> {
    if uid.is_empty() {
        return Err(ConfigurationError::MissingUid(kind.noun()));
    }
    Ok(urlencoding::encode(uid).into_owned())
}

async fn fetch_schema(stack: &Stack, query: &Query) -> Result<ModelSchema> {
    let response = stack.fetch::<FieldBag>(query).await?;
    let definition = response
        .into_items()
        .into_iter()
        .next()
        .ok_or_else(|| DecodeError::missing(query.kind().single_key()))?;
    Ok(ModelSchema::from_content_type(&definition.into_value())?)
}

/// A content type and the entries published under it.
#[derive(Clone)]
pub struct ContentType<'s> {
    stack: &'s Stack,
    uid: String,
}

impl<'s> ContentType<'s> {
    pub(crate) fn new(stack: &'s Stack, uid: String) -> Self {
        Self { stack, uid }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Query over this content type's entries.
    pub fn query(&self) -> Result<Query> {
        let uid = segment(&self.uid, ResourceKind::ContentTypes)?;
        Ok(Query::new(
            ResourceKind::Entries,
            format!("/content_types/{uid}/entries"),
        ))
    }

    pub fn entry(&self, uid: impl Into<String>) -> Entry<'s> {
        Entry {
            stack: self.stack,
            content_type_uid: self.uid.clone(),
            uid: uid.into(),
        }
    }

    /// Query addressing the content type definition itself.
    pub fn definition(&self) -> Result<Query> {
        let uid = segment(&self.uid, ResourceKind::ContentTypes)?;
        Ok(Query::new(
            ResourceKind::ContentTypes,
            format!("/content_types/{uid}"),
        ))
    }

    pub async fn fetch<T: ContentModel>(&self) -> Result<ContentstackResponse<T>> {
        self.stack.fetch(&self.definition()?).await
    }

    /// Fetches the definition and reads its field schema.
    pub async fn schema(&self) -> Result<ModelSchema> {
        fetch_schema(self.stack, &self.definition()?).await
    }
}

/// One entry of a content type.
#[derive(Clone)]
pub struct Entry<'s> {
    stack: &'s Stack,
    content_type_uid: String,
    uid: String,
}

impl Entry<'_> {
    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn content_type_uid(&self) -> &str {
        &self.content_type_uid
    }

    /// Query addressing this entry. Locale, include flags and projections
    /// set on it are honoured by [`Stack::fetch`].
    pub fn query(&self) -> Result<Query> {
        let content_type = segment(&self.content_type_uid, ResourceKind::ContentTypes)?;
        let uid = segment(&self.uid, ResourceKind::Entries)?;
        Ok(Query::new(
            ResourceKind::Entries,
            format!("/content_types/{content_type}/entries/{uid}"),
        ))
    }

    pub async fn fetch<T: ContentModel>(&self) -> Result<ContentstackResponse<T>> {
        self.stack.fetch(&self.query()?).await
    }
}

/// One asset.
#[derive(Clone)]
pub struct Asset<'s> {
    stack: &'s Stack,
    uid: String,
}

impl<'s> Asset<'s> {
    pub(crate) fn new(stack: &'s Stack, uid: String) -> Self {
        Self { stack, uid }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn query(&self) -> Result<Query> {
        let uid = segment(&self.uid, ResourceKind::Assets)?;
        Ok(Query::new(ResourceKind::Assets, format!("/assets/{uid}")))
    }

    pub async fn fetch<T: ContentModel>(&self) -> Result<ContentstackResponse<T>> {
        self.stack.fetch(&self.query()?).await
    }
}

/// One global field definition.
#[derive(Clone)]
pub struct GlobalField<'s> {
    stack: &'s Stack,
    uid: String,
}

impl<'s> GlobalField<'s> {
    pub(crate) fn new(stack: &'s Stack, uid: String) -> Self {
        Self { stack, uid }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn query(&self) -> Result<Query> {
        let uid = segment(&self.uid, ResourceKind::GlobalFields)?;
        Ok(Query::new(
            ResourceKind::GlobalFields,
            format!("/global_fields/{uid}"),
        ))
    }

    pub async fn fetch<T: ContentModel>(&self) -> Result<ContentstackResponse<T>> {
        self.stack.fetch(&self.query()?).await
    }

    pub async fn schema(&self) -> Result<ModelSchema> {
        fetch_schema(self.stack, &self.query()?).await
    }
}

/// Entries classified under taxonomy terms.
///
/// Filter with the taxonomy operations, e.g.
/// `where_field("taxonomies.region", Operation::below("europe"))`.
#[derive(Clone, Copy)]
pub struct Taxonomy<'s> {
    stack: &'s Stack,
}

impl<'s> Taxonomy<'s> {
    pub(crate) fn new(stack: &'s Stack) -> Self {
        Self { stack }
    }

    pub fn query(&self) -> Query {
        Query::new(ResourceKind::Taxonomies, "/taxonomies/entries")
    }

    pub async fn find<T: ContentModel>(&self, query: &Query) -> Result<ContentstackResponse<T>> {
        self.stack.find(query).await
    }
}
