//! Core module containing the metadata contracts and query types

pub mod auth;
pub mod descriptor;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod field;
pub mod params;
pub mod predicate;
pub mod query;
pub mod registry;
pub mod result;
pub mod store;

pub use auth::{AuthContext, AuthPolicy};
pub use descriptor::{
    ClassDescriptor, DateKind, EnumDescriptor, NumberKind, PropertyDescriptor, SearchConfig,
    SearchMethod, TypeCategory,
};
pub use entity::Record;
pub use error::QueryError;
pub use field::FieldValue;
pub use params::{FilterParameters, ListParameters, OrderByDirective};
pub use predicate::{FieldPath, Predicate};
pub use query::{OrderClause, Query, SortDirection};
pub use registry::MetadataRegistry;
pub use result::{ItemResult, ListResult};
pub use store::QueryStore;
