//! The composable query handle
//!
//! A [`Query`] describes an unbounded set of records of one class. Stages
//! attach predicates, ordering and limits to it without evaluating it; a
//! [`QueryStore`](crate::core::store::QueryStore) evaluates it once at the
//! end of a pipeline run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::core::descriptor::ClassDescriptor;
use crate::core::predicate::{FieldPath, Predicate};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// Parse `asc`/`ascending`/`desc`/`descending` (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// One ordering key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause {
    pub path: FieldPath,
    pub direction: SortDirection,
}

impl OrderClause {
    pub fn ascending(path: FieldPath) -> Self {
        Self {
            path,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(path: FieldPath) -> Self {
        Self {
            path,
            direction: SortDirection::Descending,
        }
    }
}

impl fmt::Display for OrderClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.direction.as_str())
    }
}

/// An unevaluated query over one class
#[derive(Debug, Clone)]
pub struct Query {
    class: Arc<ClassDescriptor>,
    predicates: Vec<Predicate>,
    ordering: Vec<OrderClause>,
    skip: Option<usize>,
    take: Option<usize>,
}

impl Query {
    /// The unfiltered base query of a class
    pub fn new(class: Arc<ClassDescriptor>) -> Self {
        Self {
            class,
            predicates: Vec::new(),
            ordering: Vec::new(),
            skip: None,
            take: None,
        }
    }

    pub fn class(&self) -> &ClassDescriptor {
        &self.class
    }

    /// Attach a narrowing predicate; predicates combine conjunctively
    pub fn filter(mut self, predicate: Predicate) -> Self {
        if predicate != Predicate::Always {
            self.predicates.push(predicate);
        }
        self
    }

    /// Replace the ordering
    pub fn order_by(mut self, ordering: Vec<OrderClause>) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.skip = Some(n);
        self
    }

    pub fn take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }

    /// All attached predicates as one conjunction
    pub fn predicate(&self) -> Predicate {
        Predicate::and(self.predicates.iter().cloned())
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn ordering(&self) -> &[OrderClause] {
        &self.ordering
    }

    pub fn skip_count(&self) -> Option<usize> {
        self.skip
    }

    pub fn take_count(&self) -> Option<usize> {
        self.take
    }

    /// Whether no predicate has been attached
    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty()
    }
}
