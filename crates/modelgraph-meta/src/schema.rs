//! JSON model documents.
//!
//! A model file describes classes (with supertypes and slot declarations)
//! plus the connection classes' endpoint slots:
//!
//! ```json
//! {
//!   "classes": [
//!     { "name": "Segment", "abstract": false, "extends": ["Element"],
//!       "slots": [
//!         { "name": "segments", "target": "Segment", "kind": "containment" }
//!       ] }
//!   ],
//!   "connections": [
//!     { "class": "Flow", "source": "from", "target": "to" }
//!   ]
//! }
//! ```
//!
//! Loading is a pure data transformation into an [`InMemoryMetamodel`] plus
//! the endpoint registrations; reading files is left to callers.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ids::{ClassId, SlotId, SlotKind};
use crate::memory::{InMemoryMetamodel, MetamodelBuilder};

/// Top-level model document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelDocument {
    pub classes: Vec<ClassDocument>,
    #[serde(default)]
    pub connections: Vec<ConnectionDocument>,
}

/// One class declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDocument {
    pub name: String,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Direct supertypes by name, in declaration order.
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub slots: Vec<SlotDocument>,
}

/// One slot declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDocument {
    pub name: String,
    /// Target class by name.
    pub target: String,
    #[serde(default = "default_slot_kind")]
    pub kind: SlotKind,
}

fn default_slot_kind() -> SlotKind {
    SlotKind::Reference
}

/// Endpoint slots of one connection class, by name.
///
/// Slot names may refer to slots inherited from supertypes. Either endpoint
/// may be omitted; an omitted target makes the class unconnectable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDocument {
    pub class: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
}

/// A resolved endpoint registration, ready to hand to a resolver builder.
#[derive(Debug, Clone, Copy)]
pub struct EndpointRegistration {
    pub class: ClassId,
    pub source: Option<SlotId>,
    pub target: Option<SlotId>,
}

/// A fully loaded model: the metamodel plus its endpoint registrations.
#[derive(Debug)]
pub struct LoadedModel {
    pub metamodel: InMemoryMetamodel,
    pub endpoints: Vec<EndpointRegistration>,
}

/// Parse a JSON string and load it.
pub fn load_str(json: &str) -> Result<LoadedModel> {
    let doc: ModelDocument = serde_json::from_str(json).context("failed to parse model JSON")?;
    load_document(&doc)
}

/// Turn a parsed document into a metamodel and endpoint registrations.
pub fn load_document(doc: &ModelDocument) -> Result<LoadedModel> {
    let mut builder = MetamodelBuilder::new();

    // First pass: declare every class so forward references work.
    let mut ids = Vec::with_capacity(doc.classes.len());
    for class in &doc.classes {
        let id = if class.is_abstract {
            builder.add_abstract_class(&class.name)?
        } else {
            builder.add_class(&class.name)?
        };
        ids.push(id);
    }
    let lookup = |name: &str, ids: &[ClassId], doc: &ModelDocument| -> Result<ClassId> {
        doc.classes
            .iter()
            .position(|c| c.name == name)
            .map(|i| ids[i])
            .ok_or_else(|| anyhow!("unknown class name: {}", name))
    };

    // Second pass: supertypes and slots.
    for (class, &id) in doc.classes.iter().zip(&ids) {
        for super_name in &class.extends {
            let super_id = lookup(super_name, &ids, doc)
                .with_context(|| format!("in supertypes of {}", class.name))?;
            builder.add_super_type(id, super_id);
        }
        for slot in &class.slots {
            let target = lookup(&slot.target, &ids, doc)
                .with_context(|| format!("in slot {} of {}", slot.name, class.name))?;
            match slot.kind {
                SlotKind::Containment => builder.add_containment(id, &slot.name, target)?,
                SlotKind::Reference => builder.add_reference(id, &slot.name, target)?,
            };
        }
    }

    let metamodel = builder.build()?;

    // Endpoint registrations resolve against the finished metamodel so that
    // inherited slot names are visible.
    let mut endpoints = Vec::with_capacity(doc.connections.len());
    for conn in &doc.connections {
        let class = metamodel
            .class_by_name(&conn.class)
            .ok_or_else(|| anyhow!("unknown connection class: {}", conn.class))?;
        let resolve_slot = |name: &Option<String>| -> Result<Option<SlotId>> {
            match name {
                None => Ok(None),
                Some(name) => metamodel
                    .slot_by_name(class, name)
                    .map(Some)
                    .ok_or_else(|| anyhow!("unknown slot {} on class {}", name, conn.class)),
            }
        };
        endpoints.push(EndpointRegistration {
            class,
            source: resolve_slot(&conn.source)?,
            target: resolve_slot(&conn.target)?,
        });
    }

    Ok(LoadedModel {
        metamodel,
        endpoints,
    })
}
