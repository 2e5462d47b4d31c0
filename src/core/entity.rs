//! Record trait: the runtime view of one entity instance

use crate::core::field::FieldValue;
use crate::core::predicate::FieldPath;

/// A stored entity whose fields can be read by name
///
/// Store adapters that evaluate queries in process (such as the in-memory
/// store) walk predicate paths through this trait. Nested objects are
/// returned as [`FieldValue::Object`] so that further segments can be
/// resolved without knowing the nested type.
pub trait Record: Clone + Send + Sync + 'static {
    /// Name of the class descriptor describing this record type
    fn class_name() -> &'static str;

    /// Get the value of a specific field by its canonical name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Resolve a dotted path; missing segments resolve to `Null`
    fn path_value(&self, path: &FieldPath) -> FieldValue {
        let mut segments = path.segments().iter();
        let Some(first) = segments.next() else {
            return FieldValue::Null;
        };
        let mut current = self.field_value(first).unwrap_or(FieldValue::Null);
        for segment in segments {
            current = match current.member(segment) {
                Some(value) => value.clone(),
                None => return FieldValue::Null,
            };
        }
        current
    }
}
