//! Orchestration of the list, count and item operations

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::QueryConfig;
use crate::core::{
    AuthContext, ClassDescriptor, FieldPath, FilterParameters, ItemResult, ListParameters, ListResult,
    MetadataRegistry, Predicate, Query, QueryError, QueryStore, Record,
};
use crate::query::coerce;
use crate::query::{QueryContext, apply_filters, apply_page, apply_search, apply_sort};

/// Query entry point for one class backed by one store
///
/// A `DataSource` holds no per-request state, so a single instance can be
/// shared (typically behind an `Arc`) by any number of concurrent requests.
pub struct DataSource<S> {
    store: S,
    metadata: Arc<MetadataRegistry>,
    class: Arc<ClassDescriptor>,
    config: QueryConfig,
}

impl<S: QueryStore> DataSource<S> {
    pub fn new(store: S, metadata: Arc<MetadataRegistry>, class: Arc<ClassDescriptor>, config: QueryConfig) -> Self {
        Self {
            store,
            metadata,
            class,
            config,
        }
    }

    /// Look the class up by name and validate the configuration
    pub fn for_class(
        store: S,
        metadata: Arc<MetadataRegistry>,
        class: &str,
        config: QueryConfig,
    ) -> Result<Self, QueryError> {
        config.validate()?;
        let class = metadata.require(class)?;
        Ok(Self::new(store, metadata, class, config))
    }

    /// Like [`for_class`](Self::for_class), naming the class through a record type
    pub fn for_type<T: Record>(
        store: S,
        metadata: Arc<MetadataRegistry>,
        config: QueryConfig,
    ) -> Result<Self, QueryError> {
        Self::for_class(store, metadata, T::class_name(), config)
    }

    pub fn class(&self) -> &ClassDescriptor {
        &self.class
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn metadata(&self) -> &MetadataRegistry {
        &self.metadata
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn context<'a>(&'a self, principal: &'a AuthContext) -> QueryContext<'a> {
        QueryContext::new(&self.metadata, principal, &self.config)
    }

    /// The unfiltered query over the whole class
    pub fn base_query(&self) -> Query {
        Query::new(self.class.clone())
    }

    /// Base query narrowed by filters, then search
    pub fn filtered_query(&self, params: &FilterParameters, principal: &AuthContext) -> Query {
        let ctx = self.context(principal);
        let query = apply_filters(self.base_query(), params, &ctx);
        apply_search(query, params.search.as_deref(), &ctx)
    }

    /// One page of matching records
    #[tracing::instrument(skip_all, fields(class = %self.class.name()))]
    pub async fn get_list(
        &self,
        params: &ListParameters,
        principal: &AuthContext,
        cancel: &CancellationToken,
    ) -> Result<ListResult<S::Item>, QueryError> {
        let query = self.filtered_query(params.filter_parameters(), principal);

        let total = if self.config.counts_total() {
            Some(self.count(&query, cancel).await?)
        } else {
            None
        };

        let query = apply_sort(query, &params.order_by, &self.context(principal));
        let window = apply_page(
            query,
            params.page,
            params.page_size,
            total,
            self.config.max_page_size,
            self.config.default_page_size,
        );

        let items = self.evaluate(&window.query, cancel).await?;
        tracing::debug!(page = window.page, returned = items.len(), total = ?total, "list served");

        Ok(ListResult::new(items, window.page, window.page_size, total).with_fields(params.fields.clone()))
    }

    /// Number of records matching the filters and search
    #[tracing::instrument(skip_all, fields(class = %self.class.name()))]
    pub async fn get_count(
        &self,
        params: &FilterParameters,
        principal: &AuthContext,
        cancel: &CancellationToken,
    ) -> Result<ItemResult<u64>, QueryError> {
        let query = self.filtered_query(params, principal);
        let count = self.count(&query, cancel).await?;
        Ok(ItemResult::success(count))
    }

    /// The record whose primary key is `id`, within the filtered set
    ///
    /// An id that does not parse as the key type is reported the same way
    /// as a missing record. More than one match is a descriptor or store
    /// defect and fails with [`QueryError::AmbiguousMatch`].
    #[tracing::instrument(skip_all, fields(class = %self.class.name(), id = %id))]
    pub async fn get_item(
        &self,
        id: &str,
        params: &FilterParameters,
        principal: &AuthContext,
        cancel: &CancellationToken,
    ) -> Result<ItemResult<S::Item>, QueryError> {
        let key = self.class.primary_key();
        let Some(value) = coerce::coerce_scalar(key.type_category(), id, self.config.time_zone()) else {
            tracing::debug!("id does not parse as the primary key type");
            return Ok(self.not_found(id));
        };

        let query = self
            .filtered_query(params, principal)
            .filter(Predicate::Equals(FieldPath::new(key.name()), value))
            .take(2);

        let mut items = self.evaluate(&query, cancel).await?;
        match items.len() {
            0 => Ok(self.not_found(id)),
            1 => Ok(ItemResult::success(items.remove(0))),
            _ => Err(QueryError::AmbiguousMatch {
                class: self.class.name().to_string(),
                key: id.to_string(),
            }),
        }
    }

    fn not_found<T>(&self, id: &str) -> ItemResult<T> {
        ItemResult::failure(format!("{} item with ID {} was not found.", self.class.display_name(), id))
    }

    async fn count(&self, query: &Query, cancel: &CancellationToken) -> Result<u64, QueryError> {
        if cancel.is_cancelled() {
            return Err(QueryError::Cancelled);
        }
        if !self.store.supports_async() {
            return self.store.count(query);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueryError::Cancelled),
            result = self.store.count_async(query) => result,
        }
    }

    async fn evaluate(&self, query: &Query, cancel: &CancellationToken) -> Result<Vec<S::Item>, QueryError> {
        if cancel.is_cancelled() {
            return Err(QueryError::Cancelled);
        }
        if !self.store.supports_async() {
            return self.store.evaluate(query);
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(QueryError::Cancelled),
            result = self.store.evaluate_async(query) => result,
        }
    }
}
