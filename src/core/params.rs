//! Request parameters for list, count and item requests
//!
//! Parameter names are the wire contract:
//!
//! ```text
//! GET /people?filter.lastName=Smith&search=ann&page=2&pageSize=10
//! GET /people?orderBy=lastName,firstName&orderByDescending=birthDate
//! GET /people?orderBy=none&fields=id,firstName
//! ```
//!
//! Parsing is lenient: unknown keys are ignored and unparsable integers
//! are treated as absent.

use indexmap::IndexMap;

use crate::core::query::SortDirection;

/// Sentinel field name that disables ordering entirely
pub const NO_SORT: &str = "none";

const FILTER_PREFIX: &str = "filter.";

/// Parameters shared by every request that selects rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParameters {
    /// `filter.<field>=<value>` pairs, in request order
    pub filter: IndexMap<String, String>,

    /// Free-text search
    pub search: Option<String>,
}

impl FilterParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Parse the wire format from decoded query pairs
    ///
    /// A repeated `filter.<field>` keeps the last value.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            params.accept(key.as_ref(), value.as_ref());
        }
        params
    }

    fn accept(&mut self, key: &str, value: &str) -> bool {
        if let Some(field) = key.strip_prefix(FILTER_PREFIX) {
            if !field.is_empty() {
                self.filter.insert(field.to_string(), value.to_string());
            }
            return true;
        }
        if key == "search" {
            self.search = Some(value.to_string());
            return true;
        }
        false
    }
}

/// One client sort directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByDirective {
    pub field: String,
    pub direction: SortDirection,
}

impl OrderByDirective {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn is_no_sort(&self) -> bool {
        self.field.trim().eq_ignore_ascii_case(NO_SORT)
    }
}

/// Parameters of a list request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListParameters {
    pub filter_params: FilterParameters,

    /// Page number (starts at 1)
    pub page: Option<i64>,

    /// Number of items per page
    pub page_size: Option<i64>,

    /// Client sort directives, in priority order
    pub order_by: Vec<OrderByDirective>,

    /// Projection allowlist; passed through untouched
    pub fields: Vec<String>,
}

impl ListParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter_params = self.filter_params.with_filter(field, value);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.filter_params = self.filter_params.with_search(search);
        self
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push(OrderByDirective::new(field, direction));
        self
    }

    pub fn filter_parameters(&self) -> &FilterParameters {
        &self.filter_params
    }

    /// Whether a directive asked for no ordering at all
    pub fn sorting_suppressed(&self) -> bool {
        self.order_by.iter().any(OrderByDirective::is_no_sort)
    }

    /// Parse the wire format from decoded query pairs
    ///
    /// `orderBy` and `orderByDescending` accept comma-separated paths;
    /// ascending directives come first.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        let mut ascending = Vec::new();
        let mut descending = Vec::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            if params.filter_params.accept(key, value) {
                continue;
            }
            match key {
                "page" => params.page = value.trim().parse().ok(),
                "pageSize" => params.page_size = value.trim().parse().ok(),
                "orderBy" => ascending.extend(split_list(value)),
                "orderByDescending" => descending.extend(split_list(value)),
                "fields" => params.fields = split_list(value),
                _ => {}
            }
        }

        params.order_by = ascending
            .into_iter()
            .map(|f| OrderByDirective::new(f, SortDirection::Ascending))
            .chain(
                descending
                    .into_iter()
                    .map(|f| OrderByDirective::new(f, SortDirection::Descending)),
            )
            .collect();
        params
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
