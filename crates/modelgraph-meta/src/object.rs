//! Run-time object instances.

use crate::ids::ClassId;

/// A run-time object in the model graph.
///
/// The resolver only ever needs an object's class; predicates may downcast
/// or wrap richer application objects behind this trait.
pub trait ModelObject {
    /// The runtime class of this object.
    fn class_id(&self) -> ClassId;
}

/// A minimal object carrying nothing but its class.
///
/// Useful in tests and tooling where only class-level compatibility matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instance {
    class: ClassId,
}

impl Instance {
    /// Create an instance of the given class.
    pub fn of(class: ClassId) -> Self {
        Self { class }
    }
}

impl ModelObject for Instance {
    fn class_id(&self) -> ClassId {
        self.class
    }
}
