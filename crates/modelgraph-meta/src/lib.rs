//! Metamodel surface for modelgraph.
//!
//! This crate provides:
//! - [`ids`]: Copyable `ClassId`/`SlotId` handles and the slot kind
//! - [`metamodel`]: The read-only [`Metamodel`] graph trait
//! - [`object`]: The [`ModelObject`] run-time instance trait
//! - [`memory`]: An in-memory metamodel with a fallible builder
//! - [`schema`]: serde document types and a loader for JSON model files
//!
//! # Metamodel Access
//!
//! A metamodel is a catalog of classes connected by typed reference slots and
//! arranged in a multiple-supertype hierarchy. It is assumed immutable once
//! built: every consumer in the workspace (most importantly the resolver
//! crate) queries it through the [`Metamodel`] trait and caches answers for
//! the lifetime of the process.

pub mod ids;
pub mod memory;
pub mod metamodel;
pub mod object;
pub mod schema;

pub use ids::{ClassId, SlotId, SlotKind};
pub use memory::{InMemoryMetamodel, MetamodelBuilder};
pub use metamodel::Metamodel;
pub use object::{Instance, ModelObject};
pub use schema::{
    ClassDocument, ConnectionDocument, EndpointRegistration, LoadedModel, ModelDocument,
    SlotDocument,
};
