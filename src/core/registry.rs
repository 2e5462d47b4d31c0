//! Metadata registry: class descriptors by name

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::descriptor::ClassDescriptor;
use crate::core::entity::Record;
use crate::core::error::QueryError;

/// Registry for all class descriptors in the application
///
/// Built once at startup and then shared behind an `Arc`. Lookups are
/// case-insensitive. Object properties name their target class and are
/// resolved here, which keeps self-referential schemas representable.
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    classes: HashMap<String, Arc<ClassDescriptor>>,
}

impl MetadataRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// Register a class descriptor
    ///
    /// The class name will be used as the key; registering a name twice
    /// replaces the earlier descriptor.
    pub fn register(&mut self, descriptor: ClassDescriptor) -> Arc<ClassDescriptor> {
        let descriptor = Arc::new(descriptor);
        self.classes
            .insert(descriptor.name().to_ascii_lowercase(), descriptor.clone());
        descriptor
    }

    /// Look up a class by name
    pub fn class(&self, name: &str) -> Option<&Arc<ClassDescriptor>> {
        self.classes.get(&name.to_ascii_lowercase())
    }

    /// Look up a class by name, failing with [`QueryError::UnknownClass`]
    pub fn require(&self, name: &str) -> Result<Arc<ClassDescriptor>, QueryError> {
        self.class(name).cloned().ok_or_else(|| QueryError::UnknownClass {
            class: name.to_string(),
        })
    }

    /// Descriptor of a record type
    pub fn for_type<T: Record>(&self) -> Result<Arc<ClassDescriptor>, QueryError> {
        self.require(T::class_name())
    }

    /// Get all registered class names
    pub fn class_names(&self) -> Vec<&str> {
        self.classes.values().map(|c| c.name()).collect()
    }
}
