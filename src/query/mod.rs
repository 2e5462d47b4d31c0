//! The list/item query composition pipeline
//!
//! Stages run in a fixed order:
//!
//! ```text
//! list:  base -> filter -> search -> count -> sort -> page -> evaluate
//! count: base -> filter -> search -> count
//! ```
//!
//! The count must see filter and search but not paging; sorting has to be
//! in place before skip/take mean anything. Every stage is a pure function
//! from a [`Query`](crate::core::Query) to a narrower one and never fails on
//! request input.

pub mod coerce;
pub mod filter;
pub mod page;
pub mod pipeline;
pub mod search;
pub mod sort;

#[cfg(test)]
pub(crate) mod testing;

pub use filter::apply_filters;
pub use page::{PageWindow, apply_page};
pub use pipeline::DataSource;
pub use search::apply_search;
pub use sort::apply_sort;

use crate::config::QueryConfig;
use crate::core::{AuthContext, MetadataRegistry};

/// Everything a stage may consult besides the query itself
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub metadata: &'a MetadataRegistry,
    pub principal: &'a AuthContext,
    pub config: &'a QueryConfig,
}

impl<'a> QueryContext<'a> {
    pub fn new(
        metadata: &'a MetadataRegistry,
        principal: &'a AuthContext,
        config: &'a QueryConfig,
    ) -> Self {
        Self {
            metadata,
            principal,
            config,
        }
    }
}
