//! Typed predicate trees emitted by the pipeline stages
//!
//! Stages never build query text. They emit small trees of typed nodes that
//! a store adapter compiles into its own native, parameterized constructs.

use std::fmt;

use crate::core::field::FieldValue;

/// A property path, rooted at the queried class
///
/// Segments hold canonical property names as declared in the descriptors,
/// so `company.name` walks the `company` object property and then the
/// `name` property of its target class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// A single-segment path
    pub fn new(segment: impl Into<String>) -> Self {
        FieldPath(vec![segment.into()])
    }

    /// Split a dotted path, ignoring empty segments
    pub fn parse(dotted: &str) -> Self {
        FieldPath(
            dotted
                .split('.')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Append a segment
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        FieldPath(segments)
    }

    /// Re-root this path under `prefix`
    pub fn rebase(&self, prefix: &FieldPath) -> Self {
        let mut segments = prefix.0.clone();
        segments.extend(self.0.iter().cloned());
        FieldPath(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// A boolean condition over the fields of one record
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every record
    Always,

    /// Matches no record
    Never,

    /// The field is null
    IsNull(FieldPath),

    /// The field equals the value
    Equals(FieldPath, FieldValue),

    /// The field equals one of the values
    In(FieldPath, Vec<FieldValue>),

    /// Half-open range: `start <= field < end`
    Range {
        path: FieldPath,
        start: FieldValue,
        end: FieldValue,
    },

    /// Case-insensitive prefix match on a text field
    StartsWith { path: FieldPath, value: String },

    /// Case-insensitive substring match on a text field
    Contains { path: FieldPath, value: String },

    /// Every child matches
    And(Vec<Predicate>),

    /// At least one child matches
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Conjunction with constant folding and flattening
    ///
    /// An empty conjunction is `Always`; any `Never` child makes the whole
    /// conjunction `Never`.
    pub fn and(children: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut flat = Vec::new();
        for child in children {
            match child {
                Predicate::Always => {}
                Predicate::Never => return Predicate::Never,
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Predicate::Always,
            1 => flat.pop().unwrap_or(Predicate::Always),
            _ => Predicate::And(flat),
        }
    }

    /// Disjunction with constant folding and flattening
    ///
    /// An empty disjunction is `Never`; any `Always` child makes the whole
    /// disjunction `Always`.
    pub fn or(children: impl IntoIterator<Item = Predicate>) -> Predicate {
        let mut flat = Vec::new();
        for child in children {
            match child {
                Predicate::Never => {}
                Predicate::Always => return Predicate::Always,
                Predicate::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Predicate::Never,
            1 => flat.pop().unwrap_or(Predicate::Never),
            _ => Predicate::Or(flat),
        }
    }

    /// Membership test, degrading to `Equals` or `Never` for small sets
    pub fn one_of(path: FieldPath, mut values: Vec<FieldValue>) -> Predicate {
        match values.len() {
            0 => Predicate::Never,
            1 => match values.pop() {
                Some(value) => Predicate::Equals(path, value),
                None => Predicate::Never,
            },
            _ => Predicate::In(path, values),
        }
    }

    /// Visit every path referenced by this predicate
    pub fn paths(&self) -> Vec<&FieldPath> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a FieldPath>) {
        match self {
            Predicate::Always | Predicate::Never => {}
            Predicate::IsNull(path)
            | Predicate::Equals(path, _)
            | Predicate::In(path, _)
            | Predicate::Range { path, .. }
            | Predicate::StartsWith { path, .. }
            | Predicate::Contains { path, .. } => out.push(path),
            Predicate::And(children) | Predicate::Or(children) => {
                for child in children {
                    child.collect_paths(out);
                }
            }
        }
    }
}
