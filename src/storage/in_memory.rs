//! In-memory query store for testing and development

use crate::core::{FieldPath, OrderClause, Predicate, Query, QueryError, QueryStore, Record, SortDirection};
use anyhow::anyhow;
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

/// In-memory store evaluating queries over a vector of records
///
/// Useful for testing and development. Uses RwLock for thread-safe access;
/// clones share the same records.
#[derive(Clone)]
pub struct InMemoryStore<R: Record> {
    records: Arc<RwLock<Vec<R>>>,
    async_capable: bool,
}

impl<R: Record> InMemoryStore<R> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            async_capable: false,
        }
    }

    /// Create a store holding `records`, in insertion order
    pub fn from_records(records: impl IntoIterator<Item = R>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records.into_iter().collect())),
            async_capable: false,
        }
    }

    /// Advertise (or not) the asynchronous evaluation path
    pub fn with_async(mut self, async_capable: bool) -> Self {
        self.async_capable = async_capable;
        self
    }

    pub fn insert(&self, record: R) -> Result<(), QueryError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;
        records.push(record);
        Ok(())
    }

    pub fn len(&self) -> Result<usize, QueryError> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, QueryError> {
        Ok(self.len()? == 0)
    }

    fn matching(&self, predicate: &Predicate) -> Result<Vec<R>, QueryError> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        Ok(records.iter().filter(|r| matches(predicate, *r)).cloned().collect())
    }
}

impl<R: Record> Default for InMemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> QueryStore for InMemoryStore<R> {
    type Item = R;

    fn supports_async(&self) -> bool {
        self.async_capable
    }

    fn count(&self, query: &Query) -> Result<u64, QueryError> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        let predicate = query.predicate();
        Ok(records.iter().filter(|r| matches(&predicate, *r)).count() as u64)
    }

    fn evaluate(&self, query: &Query) -> Result<Vec<R>, QueryError> {
        let mut rows = self.matching(&query.predicate())?;
        if !query.ordering().is_empty() {
            rows.sort_by(|a, b| compare(a, b, query.ordering()));
        }
        let skip = query.skip_count().unwrap_or(0);
        let take = query.take_count().unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(skip).take(take).collect())
    }

    async fn count_async(&self, query: &Query) -> Result<u64, QueryError> {
        tokio::task::yield_now().await;
        self.count(query)
    }

    async fn evaluate_async(&self, query: &Query) -> Result<Vec<R>, QueryError> {
        tokio::task::yield_now().await;
        self.evaluate(query)
    }
}

/// Whether `record` satisfies `predicate`
///
/// Missing fields read as null. Comparisons between unrelated types are
/// false rather than errors.
pub fn matches<R: Record>(predicate: &Predicate, record: &R) -> bool {
    match predicate {
        Predicate::Always => true,
        Predicate::Never => false,
        Predicate::IsNull(path) => record.path_value(path).is_null(),
        Predicate::Equals(path, value) => record.path_value(path).loose_eq(value),
        Predicate::In(path, values) => {
            let actual = record.path_value(path);
            values.iter().any(|v| actual.loose_eq(v))
        }
        Predicate::Range { path, start, end } => {
            let actual = record.path_value(path);
            matches!(actual.partial_compare(start), Some(Ordering::Greater | Ordering::Equal))
                && matches!(actual.partial_compare(end), Some(Ordering::Less))
        }
        Predicate::StartsWith { path, value } => {
            text(record, path).is_some_and(|t| t.starts_with(&value.to_lowercase()))
        }
        Predicate::Contains { path, value } => {
            text(record, path).is_some_and(|t| t.contains(&value.to_lowercase()))
        }
        Predicate::And(children) => children.iter().all(|c| matches(c, record)),
        Predicate::Or(children) => children.iter().any(|c| matches(c, record)),
    }
}

fn text<R: Record>(record: &R, path: &FieldPath) -> Option<String> {
    record.path_value(path).as_string().map(str::to_lowercase)
}

fn compare<R: Record>(a: &R, b: &R, ordering: &[OrderClause]) -> Ordering {
    ordering
        .iter()
        .map(|clause| {
            let order = a.path_value(&clause.path).sort_compare(&b.path_value(&clause.path));
            match clause.direction {
                SortDirection::Ascending => order,
                SortDirection::Descending => order.reverse(),
            }
        })
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}
