//! Copyable handles for metamodel elements.
//!
//! Classes and slots are referred to by index handles rather than by
//! reference. Handles are issued by whichever metamodel implementation
//! owns the element data and are only meaningful against that metamodel.

use serde::{Deserialize, Serialize};

/// Handle to a class in a metamodel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassId(pub u32);

/// Handle to a reference slot declared on a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(pub u32);

impl ClassId {
    /// Index into the owning metamodel's class table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl SlotId {
    /// Index into the owning metamodel's slot table.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The role a reference slot plays in the object graph.
///
/// Only containment slots participate in containment resolution; connection
/// endpoint slots are plain references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    /// Parent-to-child structural relation; the slot owns its values.
    Containment,
    /// Non-owning typed reference (e.g., a connection endpoint).
    Reference,
}
