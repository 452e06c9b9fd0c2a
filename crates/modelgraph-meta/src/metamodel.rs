//! The read-only metamodel graph trait.

use crate::ids::{ClassId, SlotId, SlotKind};

/// Read-only access to a class/slot graph.
///
/// Implementations must be referentially stable: every method returns the
/// same answer for the same input for as long as the value is alive. Callers
/// (the resolver in particular) memoize answers under that assumption.
///
/// The supertype graph must be acyclic. [`InMemoryMetamodel`] enforces this
/// at build time; other implementations are expected to do the same.
///
/// [`InMemoryMetamodel`]: crate::memory::InMemoryMetamodel
pub trait Metamodel: Send + Sync {
    /// Name of a class.
    fn class_name(&self, class: ClassId) -> &str;

    /// Whether a class is abstract (cannot be instantiated).
    fn is_abstract(&self, class: ClassId) -> bool;

    /// Name of a slot.
    fn slot_name(&self, slot: SlotId) -> &str;

    /// The declared target class of a slot (the type of object it may hold).
    fn slot_target(&self, slot: SlotId) -> ClassId;

    /// The role of a slot.
    fn slot_kind(&self, slot: SlotId) -> SlotKind;

    /// Every containment-capable slot of a class, including inherited ones.
    ///
    /// Order is part of the contract: supertype slots come first (most
    /// distant supertype leading), then the class's own, each group in
    /// declaration order. Containment resolution walks this list front to
    /// back and the first acceptable slot wins.
    fn all_containments(&self, class: ClassId) -> &[SlotId];

    /// The full transitive supertype set of a class, nearest-first.
    ///
    /// Direct supertypes appear in declaration order, followed by their own
    /// supertypes, with duplicates removed on first occurrence.
    fn all_super_types(&self, class: ClassId) -> &[ClassId];

    /// Whether `source` is `target` or a (transitive) subtype of it.
    fn is_assignable(&self, target: ClassId, source: ClassId) -> bool;
}
