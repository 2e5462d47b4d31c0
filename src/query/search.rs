//! Free-text search across the searchable properties of a class
//!
//! Two forms are accepted. `field:value` searches one property (or the
//! searchable leaves of one related object) with the whole value. Anything
//! else is a general search over every readable searchable leaf, up to the
//! configured nesting depth.
//!
//! General search builds two groups:
//!
//! - leaves configured to split on spaces must match *every* token, each
//!   token through at least one of them
//! - all other leaves are matched against the whole search string
//!
//! A record matches when either group matches.

use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::core::descriptor::{NumberKind, SearchLeaf, SearchMethod, TypeCategory};
use crate::core::{ClassDescriptor, FieldPath, FieldValue, Predicate, PropertyDescriptor, Query, SearchConfig};
use crate::query::QueryContext;
use crate::query::coerce;

/// Narrow `query` by a search string; blank input leaves it unchanged
pub fn apply_search(query: Query, search: Option<&str>, ctx: &QueryContext<'_>) -> Query {
    let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return query;
    };
    let predicate = search_predicate(query.class(), search, ctx);
    query.filter(predicate)
}

/// Predicate for a non-blank search string
pub fn search_predicate(class: &ClassDescriptor, search: &str, ctx: &QueryContext<'_>) -> Predicate {
    if let Some(predicate) = field_scoped_predicate(class, search, ctx) {
        return predicate;
    }
    general_predicate(class, search, ctx)
}

/// Split on whitespace and commas, dropping repeats and capping the count
pub fn tokenize(search: &str, max_terms: usize) -> Vec<&str> {
    let mut seen = HashSet::new();
    search
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .take(max_terms)
        .collect()
}

fn field_scoped_predicate(class: &ClassDescriptor, search: &str, ctx: &QueryContext<'_>) -> Option<Predicate> {
    let (field, value) = search.split_once(':')?;
    let (field, value) = (field.trim(), value.trim());
    if field.is_empty() || value.is_empty() {
        return None;
    }
    let prop = class.property_by_name_or_display(field)?;
    if !prop.is_persisted() || !prop.is_client_readable(ctx.principal) {
        return None;
    }

    let prefix = FieldPath::new(prop.name());
    let alternatives: Vec<Predicate> = match prop.type_category() {
        TypeCategory::Object(target) => {
            let target = ctx.metadata.class(target)?;
            if !target.is_readable_by(ctx.principal) {
                return None;
            }
            target
                .resolve_search_properties(ctx.metadata, class.name(), 1, 1)
                .into_iter()
                .filter(|leaf| leaf.is_readable_by(ctx.principal))
                .filter_map(|leaf| {
                    term_predicate(leaf.path.rebase(&prefix), leaf.property, &leaf.config, value, ctx)
                })
                .collect()
        }
        TypeCategory::Collection => return None,
        _ => {
            let config = prop.search_config().cloned().unwrap_or_default();
            term_predicate(prefix, prop, &config, value, ctx).into_iter().collect()
        }
    };

    if alternatives.is_empty() {
        debug!(class = %class.name(), field, "field search produced nothing, using general search");
        return None;
    }
    Some(Predicate::or(alternatives))
}

fn general_predicate(class: &ClassDescriptor, search: &str, ctx: &QueryContext<'_>) -> Predicate {
    let leaves: Vec<SearchLeaf<'_>> = class
        .resolve_search_properties(ctx.metadata, class.name(), 0, ctx.config.search_max_depth)
        .into_iter()
        .filter(|leaf| leaf.is_readable_by(ctx.principal))
        .collect();
    let (split, whole): (Vec<_>, Vec<_>) = leaves.into_iter().partition(|leaf| leaf.config.split_on_spaces);

    let mut groups = Vec::with_capacity(2);

    if !split.is_empty() {
        let per_token: Vec<Predicate> = tokenize(search, ctx.config.max_search_terms)
            .into_iter()
            .filter_map(|token| {
                let alternatives: Vec<Predicate> = split
                    .iter()
                    .filter_map(|leaf| term_predicate(leaf.path.clone(), leaf.property, &leaf.config, token, ctx))
                    .collect();
                (!alternatives.is_empty()).then(|| Predicate::or(alternatives))
            })
            .collect();
        if !per_token.is_empty() {
            groups.push(Predicate::and(per_token));
        }
    }

    let whole_matches: Vec<Predicate> = whole
        .iter()
        .filter_map(|leaf| term_predicate(leaf.path.clone(), leaf.property, &leaf.config, search, ctx))
        .collect();
    if !whole_matches.is_empty() {
        groups.push(Predicate::or(whole_matches));
    }

    if groups.is_empty() {
        debug!(class = %class.name(), "search matched no searchable property");
    }
    Predicate::or(groups)
}

/// Predicate matching one term against one leaf, if the term fits its type
fn term_predicate(
    path: FieldPath,
    prop: &PropertyDescriptor,
    config: &SearchConfig,
    term: &str,
    ctx: &QueryContext<'_>,
) -> Option<Predicate> {
    let term = term.trim();
    match prop.type_category() {
        TypeCategory::String => Some(match config.method {
            SearchMethod::BeginsWith => Predicate::StartsWith {
                path,
                value: term.to_string(),
            },
            SearchMethod::Contains => Predicate::Contains {
                path,
                value: term.to_string(),
            },
        }),
        TypeCategory::Number(NumberKind::Integer) => term
            .parse::<i64>()
            .ok()
            .map(|n| Predicate::Equals(path, FieldValue::Integer(n))),
        TypeCategory::Number(NumberKind::Float) => term
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|n| Predicate::Equals(path, FieldValue::Float(n))),
        TypeCategory::Guid => Uuid::parse_str(term)
            .ok()
            .map(|id| Predicate::Equals(path, FieldValue::Uuid(id))),
        TypeCategory::Enum(descriptor) => {
            let needle = term.to_lowercase();
            let codes: Vec<FieldValue> = descriptor
                .members
                .iter()
                .filter(|m| m.name.to_lowercase().starts_with(&needle) || m.code.to_string() == term)
                .map(|m| FieldValue::Integer(m.code))
                .collect();
            (!codes.is_empty()).then(|| Predicate::one_of(path, codes))
        }
        TypeCategory::Date(kind) => {
            coerce::parse_date(term).map(|parsed| coerce::date_match(path, *kind, &parsed, ctx.config.time_zone()))
        }
        TypeCategory::Boolean | TypeCategory::Object(_) | TypeCategory::Collection => None,
    }
}
