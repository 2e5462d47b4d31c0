//! # This-Query
//!
//! Metadata-driven list and item queries over runtime-described entities.
//!
//! ## Features
//!
//! - **Descriptor-Driven**: Classes and properties are described at runtime; every query decision reads the descriptors
//! - **URL Filters**: `filter.<field>=<value>` with typed coercion, null handling, alternatives and date ranges
//! - **Free-Text Search**: Per-property search configuration, token splitting and nested object traversal
//! - **Safe Sorting**: Client ordering validated against readability, with per-class default ordering
//! - **Paging**: Clamped page sizes, last-page snapping and optional total counts
//! - **Pluggable Stores**: In-memory evaluation and PostgreSQL rendering behind one trait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_query::prelude::*;
//!
//! let mut registry = MetadataRegistry::new();
//! registry.register(
//!     ClassDescriptor::builder("Person")
//!         .property(PropertyDescriptor::new("id", TypeCategory::Guid).primary_key())
//!         .property(
//!             PropertyDescriptor::new("lastName", TypeCategory::String)
//!                 .searchable(SearchConfig::begins_with().split_on_spaces())
//!                 .with_default_order(1, SortDirection::Ascending),
//!         )
//!         .build()?,
//! );
//!
//! let source = DataSource::for_type::<Person>(
//!     InMemoryStore::from_records(people),
//!     Arc::new(registry),
//!     QueryConfig::default(),
//! )?;
//!
//! let params = ListParameters::new().with_search("smi").with_page_size(10);
//! let page = source
//!     .get_list(&params, &AuthContext::Anonymous, &CancellationToken::new())
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod logging;
pub mod query;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Metadata ===
    pub use crate::core::{
        ClassDescriptor, DateKind, EnumDescriptor, MetadataRegistry, NumberKind, PropertyDescriptor,
        SearchConfig, SearchMethod, TypeCategory,
    };

    // === Query model ===
    pub use crate::core::{
        FieldPath, FieldValue, OrderClause, Predicate, Query, Record, SortDirection,
    };

    // === Request and response contracts ===
    pub use crate::core::{
        AuthContext, AuthPolicy, FilterParameters, ItemResult, ListParameters, ListResult,
        OrderByDirective, QueryError,
        extractors::{FilterQuery, ListQuery},
    };

    // === Pipeline ===
    pub use crate::config::{CountMode, QueryConfig};
    pub use crate::query::{DataSource, QueryContext};

    // === Storage ===
    pub use crate::core::QueryStore;
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryStore;
    pub use crate::storage::{SqlCompiler, SqlStatement};

    // === External re-exports ===
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
    pub use tokio_util::sync::CancellationToken;
    pub use uuid::Uuid;
}
