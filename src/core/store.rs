//! Store trait for evaluating composed queries

use async_trait::async_trait;

use crate::core::error::QueryError;
use crate::core::query::Query;

/// A backend able to count and evaluate a [`Query`]
///
/// Stores advertise whether they have a native asynchronous path through
/// [`supports_async`](QueryStore::supports_async). The pipeline picks the
/// path from that flag; stages never assume either mode. Failures are
/// returned as [`QueryError::Store`] and reach the caller unmodified.
#[async_trait]
pub trait QueryStore: Send + Sync {
    /// The record type produced by evaluation
    type Item: Clone + Send + Sync + 'static;

    /// Capability flag: prefer `count_async` / `evaluate_async`
    fn supports_async(&self) -> bool {
        false
    }

    /// Number of records matching the query predicates
    ///
    /// Ordering, skip and take are ignored.
    fn count(&self, query: &Query) -> Result<u64, QueryError>;

    /// Records matching the query, ordered and paged
    fn evaluate(&self, query: &Query) -> Result<Vec<Self::Item>, QueryError>;

    async fn count_async(&self, query: &Query) -> Result<u64, QueryError> {
        self.count(query)
    }

    async fn evaluate_async(&self, query: &Query) -> Result<Vec<Self::Item>, QueryError> {
        self.evaluate(query)
    }
}
