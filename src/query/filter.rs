//! Field filters: `filter.<field>=<value>`

use tracing::debug;

use crate::core::descriptor::TypeCategory;
use crate::core::{ClassDescriptor, FieldPath, FilterParameters, Predicate, PropertyDescriptor, Query};
use crate::query::QueryContext;
use crate::query::coerce::{self, NULL_LITERAL};

/// Narrow `query` by every applicable filter parameter
///
/// Unknown, unfilterable or unreadable fields are skipped, as are empty
/// values. A value that cannot be coerced to the property type still
/// narrows the query: it matches nothing.
pub fn apply_filters(query: Query, params: &FilterParameters, ctx: &QueryContext<'_>) -> Query {
    let predicates: Vec<Predicate> = params
        .filter
        .iter()
        .filter_map(|(field, raw)| filter_predicate(query.class(), field, raw, ctx))
        .collect();
    predicates.into_iter().fold(query, Query::filter)
}

fn filter_predicate(
    class: &ClassDescriptor,
    field: &str,
    raw: &str,
    ctx: &QueryContext<'_>,
) -> Option<Predicate> {
    let Some(prop) = class.property(field) else {
        debug!(class = %class.name(), field, "ignoring filter on unknown field");
        return None;
    };
    if !prop.is_url_filterable() || !prop.is_persisted() {
        debug!(class = %class.name(), field, "ignoring filter on unfilterable field");
        return None;
    }
    if !prop.is_client_readable(ctx.principal) {
        debug!(class = %class.name(), field, "ignoring filter on unreadable field");
        return None;
    }
    if raw.trim().is_empty() {
        return None;
    }

    let path = FieldPath::new(prop.name());
    Some(match prop.type_category() {
        TypeCategory::Date(kind) => {
            coerce::date_predicate(path, *kind, prop.is_nullable(), raw, ctx.config.time_zone())
        }
        TypeCategory::String => string_predicate(path, raw, ctx.config.wildcard),
        _ => alternatives_predicate(prop, path, raw, ctx),
    })
}

/// Exact match, or a prefix match when the wildcard marker is present
fn string_predicate(path: FieldPath, raw: &str, wildcard: char) -> Predicate {
    if raw.contains(wildcard) {
        Predicate::StartsWith {
            path,
            value: raw.replace(wildcard, ""),
        }
    } else {
        Predicate::Equals(path, raw.into())
    }
}

/// Comma-separated alternatives, OR'd together
fn alternatives_predicate(
    prop: &PropertyDescriptor,
    path: FieldPath,
    raw: &str,
    ctx: &QueryContext<'_>,
) -> Predicate {
    let zone = ctx.config.time_zone();
    let mut values = Vec::new();
    let mut match_null = false;

    for alternative in raw.split(',').map(str::trim) {
        if alternative.eq_ignore_ascii_case(NULL_LITERAL) {
            match_null |= prop.is_nullable();
            continue;
        }
        match coerce::coerce_scalar(prop.type_category(), alternative, zone) {
            Some(value) if !values.contains(&value) => values.push(value),
            Some(_) => {}
            None => debug!(field = %path, alternative, "dropping unparsable filter alternative"),
        }
    }

    let mut branches = Vec::with_capacity(2);
    if match_null {
        branches.push(Predicate::IsNull(path.clone()));
    }
    if !values.is_empty() {
        branches.push(Predicate::one_of(path, values));
    }
    Predicate::or(branches)
}
