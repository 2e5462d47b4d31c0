//! Client ordering with the class default as fallback

use tracing::debug;

use crate::core::descriptor::TypeCategory;
use crate::core::{ClassDescriptor, FieldPath, OrderByDirective, OrderClause, Query};
use crate::query::QueryContext;

/// Order `query` by the client's directives
///
/// A `none` directive anywhere suppresses ordering altogether. Directives
/// are applied in sequence until the first one that does not resolve to a
/// readable persisted path; it and every later directive are dropped. When
/// nothing usable remains the class default ordering applies.
pub fn apply_sort(query: Query, directives: &[OrderByDirective], ctx: &QueryContext<'_>) -> Query {
    if directives.iter().any(OrderByDirective::is_no_sort) {
        debug!(class = %query.class().name(), "sorting suppressed by request");
        return query;
    }
    let ordering = resolve_ordering(query.class(), directives, ctx);
    query.order_by(ordering)
}

/// Order clauses for `directives`, falling back to the class default
pub fn resolve_ordering(
    class: &ClassDescriptor,
    directives: &[OrderByDirective],
    ctx: &QueryContext<'_>,
) -> Vec<OrderClause> {
    let mut clauses = Vec::new();
    for directive in directives {
        match resolve_directive(class, directive, ctx) {
            Some(resolved) => clauses.extend(resolved),
            None => {
                debug!(
                    class = %class.name(),
                    field = %directive.field,
                    "invalid sort field, dropping it and later directives"
                );
                break;
            }
        }
    }
    if clauses.is_empty() {
        clauses = class.default_ordering(ctx.metadata).to_vec();
    }
    clauses
}

/// Walk a dotted path through object properties
///
/// Intermediate segments must be readable object properties of readable
/// classes. An object-valued terminal sorts by the target class's default
/// ordering, in the requested direction.
fn resolve_directive(
    root: &ClassDescriptor,
    directive: &OrderByDirective,
    ctx: &QueryContext<'_>,
) -> Option<Vec<OrderClause>> {
    let segments: Vec<&str> = directive.field.split('.').map(str::trim).collect();
    if segments.iter().any(|s| s.is_empty()) {
        return None;
    }

    let mut class = root;
    let mut path: Option<FieldPath> = None;
    let (last, hops) = segments.split_last()?;

    for segment in hops {
        let prop = class.property(segment)?;
        if !prop.is_persisted() || !prop.is_client_readable(ctx.principal) {
            return None;
        }
        let target = ctx.metadata.class(prop.type_category().object_class()?)?;
        if !target.is_readable_by(ctx.principal) {
            return None;
        }
        path = Some(extend(path, prop.name()));
        class = target.as_ref();
    }

    let prop = class.property(last)?;
    if !prop.is_persisted() || !prop.is_client_readable(ctx.principal) {
        return None;
    }
    let path = extend(path, prop.name());

    match prop.type_category() {
        TypeCategory::Collection => None,
        TypeCategory::Object(target) => {
            let target = ctx.metadata.class(target)?;
            if !target.is_readable_by(ctx.principal) {
                return None;
            }
            Some(
                target
                    .default_ordering(ctx.metadata)
                    .iter()
                    .map(|clause| OrderClause {
                        path: clause.path.rebase(&path),
                        direction: directive.direction,
                    })
                    .collect(),
            )
        }
        _ => Some(vec![OrderClause {
            path,
            direction: directive.direction,
        }]),
    }
}

fn extend(path: Option<FieldPath>, segment: &str) -> FieldPath {
    match path {
        Some(path) => path.child(segment),
        None => FieldPath::new(segment),
    }
}
