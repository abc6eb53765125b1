//! The stack client: request execution, cache policies and decoding.

use contentstack_model::{
    ContentModel, ContentstackResponse, DecodeOptions, DecodePolicy, Materializer, SchemaRegistry,
};
use contentstack_query::{Include, ParamValue, Query};
use contentstack_sync::{SyncEngine, SyncStack};
use contentstack_types::{
    dispatch, CacheError, CachePolicy, Error, HttpRequest, HttpTransport, RequestContext,
    ResourceKind, ResponseCache, ResponseSource, Result, TransportError,
};
use futures::stream::{self, BoxStream, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::StackConfig;
use crate::resources::{Asset, ContentType, GlobalField, Taxonomy};
use crate::transport::ReqwestTransport;

/// One result of a fetch, tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery<T> {
    pub source: ResponseSource,
    pub response: ContentstackResponse<T>,
}

/// A configured stack. Entry point for every query, fetch and sync.
///
/// The stack owns no per-query state. Distinct queries may run
/// concurrently against the same stack.
pub struct Stack {
    config: StackConfig,
    context: RequestContext,
    transport: Arc<dyn HttpTransport>,
    cache: Option<Arc<dyn ResponseCache>>,
    registry: SchemaRegistry,
    decode_policy: DecodePolicy,
}

impl Stack {
    /// Creates a stack over an injected transport.
    pub fn new(config: StackConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        config.validate()?;
        let context = config.request_context();
        info!("stack {} at {}", config.api_key, context.base_url);
        Ok(Self {
            config,
            context,
            transport,
            cache: None,
            registry: SchemaRegistry::new(),
            decode_policy: DecodePolicy::default(),
        })
    }

    /// Creates a stack over the default reqwest transport.
    pub fn connect(config: StackConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Self::new(config, Arc::new(transport))
    }

    /// Attaches a response cache, consulted according to the configured policy.
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.config.cache_policy = policy;
        self
    }

    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Schemas used to project and validate resolved references.
    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    // ── Resources ────────────────────────────────────────────────

    pub fn content_type(&self, uid: impl Into<String>) -> ContentType<'_> {
        ContentType::new(self, uid.into())
    }

    /// Query over every content type of the stack.
    pub fn content_types(&self) -> Query {
        Query::new(ResourceKind::ContentTypes, "/content_types")
    }

    pub fn asset(&self, uid: impl Into<String>) -> Asset<'_> {
        Asset::new(self, uid.into())
    }

    pub fn assets(&self) -> Query {
        Query::new(ResourceKind::Assets, "/assets")
    }

    pub fn global_field(&self, uid: impl Into<String>) -> GlobalField<'_> {
        GlobalField::new(self, uid.into())
    }

    pub fn global_fields(&self) -> Query {
        Query::new(ResourceKind::GlobalFields, "/global_fields")
    }

    pub fn taxonomy(&self) -> Taxonomy<'_> {
        Taxonomy::new(self)
    }

    // ── Execution ────────────────────────────────────────────────

    /// Runs a collection query and returns one page.
    ///
    /// Under `CacheThenNetwork` this returns the network result only; use
    /// [`Stack::find_stream`] to see both deliveries.
    pub async fn find<T: ContentModel>(&self, query: &Query) -> Result<ContentstackResponse<T>> {
        let request = self.prepare(query)?;
        self.deliver(&request, query, false)
            .await
            .map(|delivery| delivery.response)
    }

    /// Fetches the single resource `query` addresses.
    pub async fn fetch<T: ContentModel>(&self, query: &Query) -> Result<ContentstackResponse<T>> {
        let request = self.prepare(query)?;
        self.deliver(&request, query, true)
            .await
            .map(|delivery| delivery.response)
    }

    /// Like [`Stack::find`], but gives up with [`TransportError::Cancelled`]
    /// as soon as `cancel` completes. The in-flight request is dropped.
    pub async fn find_until<T, F>(&self, query: &Query, cancel: F) -> Result<ContentstackResponse<T>>
    where
        T: ContentModel,
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                debug!("query on {} cancelled", query.path());
                Err(TransportError::Cancelled.into())
            }
            result = self.find(query) => result,
        }
    }

    /// Runs a collection query and yields every delivery the cache policy
    /// produces: one, or up to two under `CacheThenNetwork` (cached first,
    /// then network). A cache miss there yields only the network result.
    pub fn find_stream<'a, T>(&'a self, query: &'a Query) -> BoxStream<'a, Result<Delivery<T>>>
    where
        T: ContentModel + Send + 'a,
    {
        if self.config.cache_policy != CachePolicy::CacheThenNetwork {
            return stream::once(self.find_delivery(query)).boxed();
        }
        let cached = stream::once(self.cached_delivery(query)).filter_map(|hit| async move { hit.map(Ok::<_, Error>) });
        let network = stream::once(self.network_delivery(query));
        cached.chain(network).boxed()
    }

    /// Starts a change feed run from `cursor`.
    pub fn sync(&self, cursor: SyncStack) -> SyncEngine {
        SyncEngine::new(self.transport.clone(), self.context.clone(), cursor)
    }

    async fn find_delivery<T: ContentModel>(&self, query: &Query) -> Result<Delivery<T>> {
        let request = self.prepare(query)?;
        self.deliver(&request, query, false).await
    }

    async fn cached_delivery<T: ContentModel>(&self, query: &Query) -> Option<Delivery<T>> {
        // An invalid query surfaces from the network delivery that follows.
        let request = self.prepare(query).ok()?;
        match self.from_cache(&request, query, false).await {
            Ok(delivery) => Some(delivery),
            Err(err) => {
                debug!("no cached delivery for {}: {err}", request.url);
                None
            }
        }
    }

    async fn network_delivery<T: ContentModel>(&self, query: &Query) -> Result<Delivery<T>> {
        let request = self.prepare(query)?;
        self.from_network(request, query, false).await
    }

    /// Applies the configured cache policy.
    async fn deliver<T: ContentModel>(
        &self,
        request: &HttpRequest,
        query: &Query,
        singular: bool,
    ) -> Result<Delivery<T>> {
        match self.config.cache_policy {
            CachePolicy::NetworkOnly | CachePolicy::CacheThenNetwork => {
                self.from_network(request.clone(), query, singular).await
            }
            CachePolicy::CacheOnly => self.from_cache(request, query, singular).await,
            CachePolicy::CacheElseNetwork => match self.from_cache(request, query, singular).await {
                Err(err) if err.is_cache_miss() => {
                    debug!("cache miss, going to network: {}", request.url);
                    self.from_network(request.clone(), query, singular).await
                }
                other => other,
            },
            CachePolicy::NetworkElseCache => {
                match self.from_network(request.clone(), query, singular).await {
                    Err(Error::Transport(err)) if err != TransportError::Cancelled => {
                        warn!("network failed ({err}), trying cache: {}", request.url);
                        self.from_cache(request, query, singular)
                            .await
                            .map_err(|_| Error::Transport(err))
                    }
                    other => other,
                }
            }
        }
    }

    async fn from_network<T: ContentModel>(
        &self,
        request: HttpRequest,
        query: &Query,
        singular: bool,
    ) -> Result<Delivery<T>> {
        let url = request.url.clone();
        let response = dispatch(self.transport.as_ref(), request).await?;
        let decoded = self.materialize(&response.body, query, singular)?;
        if let Some(cache) = &self.cache {
            cache.put(&url, response.body).await;
        }
        Ok(Delivery {
            source: ResponseSource::Network,
            response: decoded,
        })
    }

    async fn from_cache<T: ContentModel>(
        &self,
        request: &HttpRequest,
        query: &Query,
        singular: bool,
    ) -> Result<Delivery<T>> {
        let miss = || CacheError::Miss {
            url: request.url.clone(),
        };
        let cache = self.cache.as_ref().ok_or_else(miss)?;
        let body = cache.get(&request.url).await.ok_or_else(miss)?;
        debug!("cache hit: {}", request.url);
        Ok(Delivery {
            source: ResponseSource::Cache,
            response: self.materialize(&body, query, singular)?,
        })
    }

    fn materialize<T: ContentModel>(
        &self,
        body: &[u8],
        query: &Query,
        singular: bool,
    ) -> Result<ContentstackResponse<T>> {
        let mut options = if singular {
            DecodeOptions::single(query.kind())
        } else {
            DecodeOptions::collection(query.kind())
        };
        options = options
            .with_references(query.included_references().iter().cloned())
            .with_count(
                query.includes(Include::Count)
                    || query.uri_parameter("include_count") == Some(&ParamValue::Bool(true)),
            )
            .with_policy(self.decode_policy);
        if let Some(locale) = query.locale_code() {
            options = options.with_locale(locale);
        }
        Ok(Materializer::new(&self.registry).materialize(body, &options)?)
    }

    /// Renders `query` into a request, scoping it to the configured
    /// environment unless the query names one. Invalid queries never
    /// reach the transport.
    fn prepare(&self, query: &Query) -> Result<HttpRequest> {
        query.validate()?;
        let query_string = match &self.context.environment {
            Some(environment) if query.uri_parameter("environment").is_none() => query
                .clone()
                .add_uri_param("environment", environment.as_str())
                .url_query(),
            _ => query.url_query(),
        };
        Ok(self.context.get(query.path(), &query_string))
    }
}
