//! Descriptors shared by the stage unit tests

use std::sync::Arc;

use crate::config::QueryConfig;
use crate::core::descriptor::{DateKind, EnumDescriptor, NumberKind, SearchConfig, TypeCategory};
use crate::core::{AuthContext, AuthPolicy, ClassDescriptor, MetadataRegistry, PropertyDescriptor, Query, SortDirection};
use crate::query::QueryContext;

pub(crate) fn status() -> Arc<EnumDescriptor> {
    Arc::new(EnumDescriptor::new(
        "Status",
        [("Active", 1), ("Inactive", 2), ("Archived", 3)],
    ))
}

pub(crate) fn registry() -> MetadataRegistry {
    let mut registry = MetadataRegistry::new();

    registry.register(
        ClassDescriptor::builder("Address")
            .property(PropertyDescriptor::new("id", TypeCategory::Number(NumberKind::Integer)).primary_key())
            .property(PropertyDescriptor::new("city", TypeCategory::String).searchable(SearchConfig::begins_with()))
            .property(PropertyDescriptor::new("street", TypeCategory::String))
            .build()
            .unwrap(),
    );

    registry.register(
        ClassDescriptor::builder("Company")
            .property(PropertyDescriptor::new("id", TypeCategory::Number(NumberKind::Integer)).primary_key())
            .property(PropertyDescriptor::new("name", TypeCategory::String).searchable(SearchConfig::begins_with()))
            .property(
                PropertyDescriptor::new("address", TypeCategory::Object("Address".into()))
                    .nullable()
                    .searchable(SearchConfig::begins_with()),
            )
            .build()
            .unwrap(),
    );

    registry.register(
        ClassDescriptor::builder("Person")
            .property(PropertyDescriptor::new("id", TypeCategory::Guid).primary_key())
            .property(
                PropertyDescriptor::new("firstName", TypeCategory::String)
                    .searchable(SearchConfig::begins_with().split_on_spaces())
                    .with_default_order(2, SortDirection::Ascending),
            )
            .property(
                PropertyDescriptor::new("lastName", TypeCategory::String)
                    .searchable(SearchConfig::begins_with().split_on_spaces())
                    .with_default_order(1, SortDirection::Ascending),
            )
            .property(
                PropertyDescriptor::new("email", TypeCategory::String)
                    .nullable()
                    .searchable(SearchConfig::contains()),
            )
            .property(PropertyDescriptor::new("age", TypeCategory::Number(NumberKind::Integer)).nullable())
            .property(PropertyDescriptor::new("rating", TypeCategory::Number(NumberKind::Float)))
            .property(PropertyDescriptor::new("status", TypeCategory::Enum(status())).searchable(SearchConfig::default()))
            .property(PropertyDescriptor::new("active", TypeCategory::Boolean))
            .property(PropertyDescriptor::new("birthDate", TypeCategory::Date(DateKind::Date)).nullable())
            .property(PropertyDescriptor::new("createdAt", TypeCategory::Date(DateKind::Timestamp)))
            .property(
                PropertyDescriptor::new("salary", TypeCategory::Number(NumberKind::Float))
                    .readable_by(AuthPolicy::role("hr")),
            )
            .property(PropertyDescriptor::new("secret", TypeCategory::String).internal())
            .property(PropertyDescriptor::new("code", TypeCategory::String).url_filterable(false))
            .property(PropertyDescriptor::new("fullName", TypeCategory::String).not_persisted())
            .property(
                PropertyDescriptor::new("employer", TypeCategory::Object("Company".into()))
                    .nullable()
                    .searchable(SearchConfig::begins_with()),
            )
            .property(PropertyDescriptor::new("tags", TypeCategory::Collection))
            .build()
            .unwrap(),
    );

    registry
}

pub(crate) fn person_query(registry: &MetadataRegistry) -> Query {
    Query::new(registry.require("Person").unwrap())
}

pub(crate) fn context<'a>(
    registry: &'a MetadataRegistry,
    principal: &'a AuthContext,
    config: &'a QueryConfig,
) -> QueryContext<'a> {
    QueryContext::new(registry, principal, config)
}
