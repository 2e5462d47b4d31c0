//! Property and class descriptors
//!
//! Descriptors are the only view the pipeline has of an entity type. They
//! are built once by the application (or a metadata compiler), registered
//! in a [`MetadataRegistry`](crate::core::registry::MetadataRegistry), and
//! shared read-only between requests afterwards.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use crate::core::auth::{AuthContext, AuthPolicy};
use crate::core::error::QueryError;
use crate::core::predicate::FieldPath;
use crate::core::query::{OrderClause, SortDirection};
use crate::core::registry::MetadataRegistry;

/// Hard ceiling for any recursion through nested object properties
pub const MAX_NESTING_DEPTH: usize = 3;

/// Default depth for search property resolution
pub const DEFAULT_SEARCH_DEPTH: usize = 2;

/// Storage flavour of a numeric property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Float,
}

/// Storage flavour of a date-like property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    /// Calendar date, stored as a naive value at midnight
    Date,
    /// Naive wall-clock date and time
    DateTime,
    /// Offset-aware instant, stored in UTC
    Timestamp,
}

/// One named member of an enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub code: i64,
}

/// Enumeration metadata: members by name and integer code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: String,
    pub members: Vec<EnumMember>,
}

impl EnumDescriptor {
    pub fn new<N: Into<String>>(
        name: impl Into<String>,
        members: impl IntoIterator<Item = (N, i64)>,
    ) -> Self {
        Self {
            name: name.into(),
            members: members
                .into_iter()
                .map(|(name, code)| EnumMember {
                    name: name.into(),
                    code,
                })
                .collect(),
        }
    }

    /// Find a member by case-insensitive name
    pub fn member_named(&self, name: &str) -> Option<&EnumMember> {
        self.members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(name))
    }

    /// Resolve an integer code or a member name to a code
    pub fn parse(&self, raw: &str) -> Option<i64> {
        let raw = raw.trim();
        raw.parse::<i64>()
            .ok()
            .or_else(|| self.member_named(raw).map(|m| m.code))
    }
}

/// Semantic type category of a property
#[derive(Debug, Clone, PartialEq)]
pub enum TypeCategory {
    String,
    Number(NumberKind),
    Boolean,
    Date(DateKind),
    Enum(Arc<EnumDescriptor>),
    Guid,
    /// Nested object; names the target class in the registry
    Object(String),
    /// Collection of nested objects or values
    Collection,
}

impl TypeCategory {
    /// Primitive or date-like scalar values
    pub fn is_scalar(&self) -> bool {
        !matches!(self, TypeCategory::Object(_) | TypeCategory::Collection)
    }

    /// Target class of an object property
    pub fn object_class(&self) -> Option<&str> {
        match self {
            TypeCategory::Object(class) => Some(class),
            _ => None,
        }
    }
}

/// How a search term is matched against a text property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMethod {
    #[default]
    BeginsWith,
    Contains,
}

/// Marks a property as a free-text search target
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchConfig {
    pub method: SearchMethod,
    pub split_on_spaces: bool,
    /// When non-empty, only searches rooted at one of these classes use the property
    pub root_whitelist: HashSet<String>,
    /// Searches rooted at one of these classes skip the property
    pub root_blacklist: HashSet<String>,
}

impl SearchConfig {
    pub fn begins_with() -> Self {
        Self::default()
    }

    pub fn contains() -> Self {
        Self {
            method: SearchMethod::Contains,
            ..Self::default()
        }
    }

    pub fn split_on_spaces(mut self) -> Self {
        self.split_on_spaces = true;
        self
    }

    pub fn whitelist_root(mut self, class: &str) -> Self {
        self.root_whitelist.insert(class.to_ascii_lowercase());
        self
    }

    pub fn blacklist_root(mut self, class: &str) -> Self {
        self.root_blacklist.insert(class.to_ascii_lowercase());
        self
    }

    /// Whether a search rooted at `root` may use this property
    pub fn allows_root(&self, root: &str) -> bool {
        let root = root.to_ascii_lowercase();
        if self.root_blacklist.contains(&root) {
            return false;
        }
        self.root_whitelist.is_empty() || self.root_whitelist.contains(&root)
    }
}

/// Default ordering declared on a property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultOrder {
    pub rank: i32,
    pub direction: SortDirection,
    /// For object properties: the member of the target class to sort by
    pub dependent_field: Option<String>,
}

/// Static metadata about one field of an entity
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: String,
    display_name: String,
    type_category: TypeCategory,
    is_nullable: bool,
    is_url_filterable: bool,
    is_persisted: bool,
    is_client_property: bool,
    is_primary_key: bool,
    search: Option<SearchConfig>,
    default_order: Option<DefaultOrder>,
    read_policy: AuthPolicy,
}

impl PropertyDescriptor {
    pub fn new(name: impl Into<String>, type_category: TypeCategory) -> Self {
        let name = name.into();
        let is_url_filterable = type_category.is_scalar();
        Self {
            display_name: display_name_for(&name),
            name,
            type_category,
            is_nullable: false,
            is_url_filterable,
            is_persisted: true,
            is_client_property: true,
            is_primary_key: false,
            search: None,
            default_order: None,
            read_policy: AuthPolicy::Public,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Object and collection properties stay unfilterable whatever the flag
    pub fn url_filterable(mut self, filterable: bool) -> Self {
        self.is_url_filterable = filterable && self.type_category.is_scalar();
        self
    }

    /// Computed property with no backing column
    pub fn not_persisted(mut self) -> Self {
        self.is_persisted = false;
        self
    }

    /// Server-side only; never readable through the API
    pub fn internal(mut self) -> Self {
        self.is_client_property = false;
        self
    }

    pub fn searchable(mut self, config: SearchConfig) -> Self {
        self.search = Some(config);
        self
    }

    pub fn with_default_order(mut self, rank: i32, direction: SortDirection) -> Self {
        self.default_order = Some(DefaultOrder {
            rank,
            direction,
            dependent_field: None,
        });
        self
    }

    pub fn with_default_order_by(
        mut self,
        rank: i32,
        direction: SortDirection,
        dependent_field: impl Into<String>,
    ) -> Self {
        self.default_order = Some(DefaultOrder {
            rank,
            direction,
            dependent_field: Some(dependent_field.into()),
        });
        self
    }

    pub fn readable_by(mut self, policy: AuthPolicy) -> Self {
        self.read_policy = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn type_category(&self) -> &TypeCategory {
        &self.type_category
    }

    pub fn is_nullable(&self) -> bool {
        self.is_nullable
    }

    pub fn is_url_filterable(&self) -> bool {
        self.is_url_filterable
    }

    pub fn is_persisted(&self) -> bool {
        self.is_persisted
    }

    pub fn is_client_property(&self) -> bool {
        self.is_client_property
    }

    pub fn is_primary_key(&self) -> bool {
        self.is_primary_key
    }

    pub fn search_config(&self) -> Option<&SearchConfig> {
        self.search.as_ref()
    }

    pub fn default_order(&self) -> Option<&DefaultOrder> {
        self.default_order.as_ref()
    }

    /// Whether `principal` may read this property; evaluated on every call
    pub fn is_client_readable(&self, principal: &AuthContext) -> bool {
        self.is_client_property && self.read_policy.check(principal)
    }
}

/// Render `firstName` / `first_name` as `First Name`
fn display_name_for(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c == '_' || c == ' ' {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            prev = Some(' ');
            continue;
        }
        let boundary = match prev {
            None => false,
            Some(p) => c.is_uppercase() && (p.is_lowercase() || p.is_ascii_digit()),
        };
        if boundary {
            out.push(' ');
        }
        if prev.is_none() || prev == Some(' ') {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev = Some(c);
    }
    out
}

/// A searchable leaf reached from a root class, possibly through object hops
#[derive(Debug, Clone)]
pub struct SearchLeaf<'a> {
    pub path: FieldPath,
    pub property: &'a PropertyDescriptor,
    pub config: SearchConfig,
    hops: Vec<(&'a PropertyDescriptor, &'a ClassDescriptor)>,
}

impl SearchLeaf<'_> {
    /// Every hop and the leaf itself must be readable by the principal
    pub fn is_readable_by(&self, principal: &AuthContext) -> bool {
        self.hops
            .iter()
            .all(|(prop, class)| prop.is_client_readable(principal) && class.is_readable_by(principal))
            && self.property.is_client_readable(principal)
    }
}

/// Ordered property metadata for one entity type
#[derive(Debug)]
pub struct ClassDescriptor {
    name: String,
    display_name: String,
    read_policy: AuthPolicy,
    properties: IndexMap<String, PropertyDescriptor>,
    primary_key: usize,
    default_ordering: OnceLock<Vec<OrderClause>>,
}

impl ClassDescriptor {
    pub fn builder(name: impl Into<String>) -> ClassDescriptorBuilder {
        ClassDescriptorBuilder {
            name: name.into(),
            display_name: None,
            read_policy: AuthPolicy::Public,
            properties: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether `principal` may read instances of this class through a parent
    pub fn is_readable_by(&self, principal: &AuthContext) -> bool {
        self.read_policy.check(principal)
    }

    /// Properties in declaration order
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.values()
    }

    /// Case-insensitive lookup by name
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.get(&name.to_ascii_lowercase())
    }

    /// Case-insensitive lookup by name, then by display name
    pub fn property_by_name_or_display(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.property(name).or_else(|| {
            self.properties()
                .find(|p| p.display_name().eq_ignore_ascii_case(name))
        })
    }

    pub fn primary_key(&self) -> &PropertyDescriptor {
        // index validated at build time
        &self.properties[self.primary_key]
    }

    /// Flattened searchable leaves of this class
    ///
    /// Scalar properties carrying a search configuration become leaves;
    /// searchable object properties contribute the leaves of their target
    /// class, re-based under the property path. Recursion stops at
    /// `max_depth`, and never goes past [`MAX_NESTING_DEPTH`] whatever the
    /// caller asks. A class declaring no searchable property falls back to
    /// its `name` property, then to its primary key.
    pub fn resolve_search_properties<'a>(
        &'a self,
        registry: &'a MetadataRegistry,
        root: &str,
        depth: usize,
        max_depth: usize,
    ) -> Vec<SearchLeaf<'a>> {
        let max_depth = max_depth.min(MAX_NESTING_DEPTH);
        let mut leaves = Vec::new();

        let declared: Vec<(&PropertyDescriptor, &SearchConfig)> = self
            .properties()
            .filter_map(|p| p.search_config().map(|c| (p, c)))
            .collect();

        if declared.is_empty() {
            let fallback = self
                .property("name")
                .filter(|p| p.is_client_property() && p.is_persisted() && p.type_category().is_scalar())
                .unwrap_or_else(|| self.primary_key());
            leaves.push(SearchLeaf {
                path: FieldPath::new(fallback.name()),
                property: fallback,
                config: SearchConfig::begins_with(),
                hops: Vec::new(),
            });
            return leaves;
        }

        for (prop, config) in declared {
            if !config.allows_root(root) || !prop.is_persisted() {
                continue;
            }
            match prop.type_category() {
                TypeCategory::Object(target) => {
                    if depth >= max_depth {
                        continue;
                    }
                    let Some(target) = registry.class(target) else {
                        continue;
                    };
                    let prefix = FieldPath::new(prop.name());
                    for mut leaf in
                        target.resolve_search_properties(registry, root, depth + 1, max_depth)
                    {
                        leaf.path = leaf.path.rebase(&prefix);
                        leaf.hops.insert(0, (prop, target.as_ref()));
                        leaves.push(leaf);
                    }
                }
                TypeCategory::Collection => {}
                _ => leaves.push(SearchLeaf {
                    path: FieldPath::new(prop.name()),
                    property: prop,
                    config: config.clone(),
                    hops: Vec::new(),
                }),
            }
        }
        leaves
    }

    /// Default ordering, computed once per class
    ///
    /// Uses properties with a declared default order (by rank, ties broken
    /// by declaration order); otherwise a client-visible persisted `name`
    /// property; otherwise the primary key ascending.
    pub fn default_ordering(&self, registry: &MetadataRegistry) -> &[OrderClause] {
        self.default_ordering
            .get_or_init(|| self.compute_default_ordering(registry, 0))
    }

    fn compute_default_ordering(&self, registry: &MetadataRegistry, depth: usize) -> Vec<OrderClause> {
        let mut declared: Vec<(&PropertyDescriptor, &DefaultOrder)> = self
            .properties()
            .filter_map(|p| p.default_order().map(|o| (p, o)))
            .collect();
        // stable: equal ranks keep declaration order
        declared.sort_by_key(|(_, order)| order.rank);

        let mut clauses = Vec::new();
        for (prop, order) in declared {
            let path = FieldPath::new(prop.name());
            match (prop.type_category(), &order.dependent_field) {
                (TypeCategory::Object(_), Some(dependent)) => clauses.push(OrderClause {
                    path: path.child(dependent.clone()),
                    direction: order.direction,
                }),
                (TypeCategory::Object(target), None) => {
                    if depth + 1 >= MAX_NESTING_DEPTH {
                        continue;
                    }
                    if let Some(target) = registry.class(target) {
                        clauses.extend(
                            target
                                .compute_default_ordering(registry, depth + 1)
                                .into_iter()
                                .map(|c| OrderClause {
                                    path: c.path.rebase(&path),
                                    direction: order.direction,
                                }),
                        );
                    }
                }
                (TypeCategory::Collection, _) => {}
                _ => clauses.push(OrderClause {
                    path,
                    direction: order.direction,
                }),
            }
        }
        if !clauses.is_empty() {
            return clauses;
        }

        if let Some(name) = self
            .property("name")
            .filter(|p| p.is_client_property() && p.is_persisted() && p.type_category().is_scalar())
        {
            return vec![OrderClause::ascending(FieldPath::new(name.name()))];
        }

        vec![OrderClause::ascending(FieldPath::new(self.primary_key().name()))]
    }
}

/// Builder for [`ClassDescriptor`]
#[derive(Debug)]
pub struct ClassDescriptorBuilder {
    name: String,
    display_name: Option<String>,
    read_policy: AuthPolicy,
    properties: Vec<PropertyDescriptor>,
}

impl ClassDescriptorBuilder {
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    pub fn readable_by(mut self, policy: AuthPolicy) -> Self {
        self.read_policy = policy;
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    /// Validate and freeze the descriptor
    ///
    /// Fails when property names collide case-insensitively, or when the
    /// class does not have exactly one primary key.
    pub fn build(self) -> Result<ClassDescriptor, QueryError> {
        let invalid = |message: String| QueryError::InvalidDescriptor {
            class: self.name.clone(),
            message,
        };

        let mut properties = IndexMap::with_capacity(self.properties.len());
        for prop in &self.properties {
            let key = prop.name().to_ascii_lowercase();
            if properties.insert(key, prop.clone()).is_some() {
                return Err(invalid(format!("duplicate property '{}'", prop.name())));
            }
        }

        let keys: Vec<usize> = properties
            .values()
            .enumerate()
            .filter(|(_, p)| p.is_primary_key())
            .map(|(i, _)| i)
            .collect();
        let primary_key = match keys.as_slice() {
            [index] => *index,
            [] => return Err(invalid("no primary key".to_string())),
            _ => return Err(invalid("more than one primary key".to_string())),
        };
        if !properties[primary_key].type_category().is_scalar() {
            return Err(invalid("primary key must be a scalar".to_string()));
        }

        Ok(ClassDescriptor {
            display_name: self
                .display_name
                .unwrap_or_else(|| display_name_for(&self.name)),
            name: self.name,
            read_policy: self.read_policy,
            properties,
            primary_key,
            default_ordering: OnceLock::new(),
        })
    }
}
