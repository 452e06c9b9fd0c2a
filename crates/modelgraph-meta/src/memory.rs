//! In-memory metamodel and its builder.
//!
//! The builder interns classes and slots and hands out [`ClassId`]/[`SlotId`]
//! handles. `build()` computes the derived tables the resolver relies on
//! (transitive supertype closures and the inherited-containment order) and
//! rejects malformed input: duplicate names and supertype cycles.

use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::{anyhow, bail, Result};
use tracing::debug;

use crate::ids::{ClassId, SlotId, SlotKind};
use crate::metamodel::Metamodel;

#[derive(Debug)]
struct ClassData {
    name: String,
    is_abstract: bool,
    direct_supers: Vec<ClassId>,
    declared_slots: Vec<SlotId>,
    /// Transitive supertypes, nearest-first, deduplicated.
    all_supers: Vec<ClassId>,
    /// All containment slots including inherited, most distant supertype first.
    all_containments: Vec<SlotId>,
}

#[derive(Debug)]
struct SlotData {
    name: String,
    owner: ClassId,
    target: ClassId,
    kind: SlotKind,
}

/// An immutable, fully-derived metamodel.
///
/// Construct through [`MetamodelBuilder`]; once built nothing can be added
/// or changed, which is what allows downstream consumers to memoize.
#[derive(Debug)]
pub struct InMemoryMetamodel {
    classes: Vec<ClassData>,
    slots: Vec<SlotData>,
    class_index: HashMap<String, ClassId>,
}

impl InMemoryMetamodel {
    /// Look up a class by name.
    pub fn class_by_name(&self, name: &str) -> Option<ClassId> {
        self.class_index.get(name).copied()
    }

    /// Look up a slot by name on a class, searching its own declarations
    /// first and then its supertypes nearest-first.
    pub fn slot_by_name(&self, class: ClassId, name: &str) -> Option<SlotId> {
        let own = &self.classes[class.index()];
        let chain = std::iter::once(class).chain(own.all_supers.iter().copied());
        for holder in chain {
            for &slot in &self.classes[holder.index()].declared_slots {
                if self.slots[slot.index()].name == name {
                    return Some(slot);
                }
            }
        }
        None
    }

    /// Slots declared directly on a class (no inherited ones).
    pub fn declared_slots(&self, class: ClassId) -> &[SlotId] {
        &self.classes[class.index()].declared_slots
    }

    /// Number of classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

impl Metamodel for InMemoryMetamodel {
    fn class_name(&self, class: ClassId) -> &str {
        &self.classes[class.index()].name
    }

    fn is_abstract(&self, class: ClassId) -> bool {
        self.classes[class.index()].is_abstract
    }

    fn slot_name(&self, slot: SlotId) -> &str {
        &self.slots[slot.index()].name
    }

    fn slot_target(&self, slot: SlotId) -> ClassId {
        self.slots[slot.index()].target
    }

    fn slot_kind(&self, slot: SlotId) -> SlotKind {
        self.slots[slot.index()].kind
    }

    fn all_containments(&self, class: ClassId) -> &[SlotId] {
        &self.classes[class.index()].all_containments
    }

    fn all_super_types(&self, class: ClassId) -> &[ClassId] {
        &self.classes[class.index()].all_supers
    }

    fn is_assignable(&self, target: ClassId, source: ClassId) -> bool {
        target == source || self.classes[source.index()].all_supers.contains(&target)
    }
}

struct BuildClass {
    name: String,
    is_abstract: bool,
    direct_supers: Vec<ClassId>,
    declared_slots: Vec<SlotId>,
}

/// Builder for [`InMemoryMetamodel`].
///
/// Handles returned by `add_*` are valid for the metamodel produced by
/// `build()` on the same builder.
#[derive(Default)]
pub struct MetamodelBuilder {
    classes: Vec<BuildClass>,
    slots: Vec<SlotData>,
    class_index: HashMap<String, ClassId>,
}

impl MetamodelBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a concrete class.
    pub fn add_class(&mut self, name: &str) -> Result<ClassId> {
        self.add_class_inner(name, false)
    }

    /// Declare an abstract class.
    pub fn add_abstract_class(&mut self, name: &str) -> Result<ClassId> {
        self.add_class_inner(name, true)
    }

    fn add_class_inner(&mut self, name: &str, is_abstract: bool) -> Result<ClassId> {
        if self.class_index.contains_key(name) {
            bail!("duplicate class name: {}", name);
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(BuildClass {
            name: name.to_string(),
            is_abstract,
            direct_supers: Vec::new(),
            declared_slots: Vec::new(),
        });
        self.class_index.insert(name.to_string(), id);
        Ok(id)
    }

    /// Declare `super_type` as a direct supertype of `class`.
    ///
    /// Declaration order matters: it drives the nearest-first supertype
    /// ordering of the built metamodel. Cycles are rejected by `build()`.
    pub fn add_super_type(&mut self, class: ClassId, super_type: ClassId) {
        let supers = &mut self.classes[class.index()].direct_supers;
        if !supers.contains(&super_type) {
            supers.push(super_type);
        }
    }

    /// Declare a containment slot on `owner` holding instances of `target`.
    pub fn add_containment(&mut self, owner: ClassId, name: &str, target: ClassId) -> Result<SlotId> {
        self.add_slot(owner, name, target, SlotKind::Containment)
    }

    /// Declare a plain reference slot on `owner` pointing at `target`.
    pub fn add_reference(&mut self, owner: ClassId, name: &str, target: ClassId) -> Result<SlotId> {
        self.add_slot(owner, name, target, SlotKind::Reference)
    }

    fn add_slot(&mut self, owner: ClassId, name: &str, target: ClassId, kind: SlotKind) -> Result<SlotId> {
        let declared = &self.classes[owner.index()].declared_slots;
        if declared
            .iter()
            .any(|&s| self.slots[s.index()].name == name)
        {
            bail!(
                "duplicate slot name {} on class {}",
                name,
                self.classes[owner.index()].name
            );
        }
        let id = SlotId(self.slots.len() as u32);
        self.slots.push(SlotData {
            name: name.to_string(),
            owner,
            target,
            kind,
        });
        self.classes[owner.index()].declared_slots.push(id);
        Ok(id)
    }

    /// Derive the closure tables and freeze the metamodel.
    pub fn build(self) -> Result<InMemoryMetamodel> {
        let MetamodelBuilder {
            classes: build_classes,
            slots,
            class_index,
        } = self;

        // Transitive supertype closure per class, nearest-first BFS.
        let mut all_supers: Vec<Vec<ClassId>> = Vec::with_capacity(build_classes.len());
        for (index, class) in build_classes.iter().enumerate() {
            let start = ClassId(index as u32);
            let mut order = Vec::new();
            let mut seen: HashSet<ClassId> = HashSet::new();
            let mut queue: VecDeque<ClassId> = class.direct_supers.iter().copied().collect();
            while let Some(next) = queue.pop_front() {
                if next == start {
                    return Err(anyhow!("supertype cycle through class {}", class.name));
                }
                if !seen.insert(next) {
                    continue;
                }
                order.push(next);
                queue.extend(build_classes[next.index()].direct_supers.iter().copied());
            }
            all_supers.push(order);
        }

        // Inherited-containment order: most distant supertype first, the
        // class's own declarations last. Each slot is declared exactly once,
        // so no dedup is needed.
        let mut classes: Vec<ClassData> = Vec::with_capacity(build_classes.len());
        for (index, class) in build_classes.into_iter().enumerate() {
            let supers = std::mem::take(&mut all_supers[index]);
            let mut containments = Vec::new();
            for &holder in supers.iter().rev().chain(std::iter::once(&ClassId(index as u32))) {
                // Slot ids increase in declaration order, so scanning the
                // slot table preserves each owner's declared order.
                containments.extend(
                    slots
                        .iter()
                        .enumerate()
                        .filter(|(_, s)| s.owner == holder && s.kind == SlotKind::Containment)
                        .map(|(i, _)| SlotId(i as u32)),
                );
            }
            classes.push(ClassData {
                name: class.name,
                is_abstract: class.is_abstract,
                direct_supers: class.direct_supers,
                declared_slots: class.declared_slots,
                all_supers: supers,
                all_containments: containments,
            });
        }

        debug!(
            classes = classes.len(),
            slots = slots.len(),
            "built in-memory metamodel"
        );

        Ok(InMemoryMetamodel {
            classes,
            slots,
            class_index,
        })
    }
}
