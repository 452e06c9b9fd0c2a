//! modelgraph
//!
//! Structural relationship resolution for object-graph metamodels:
//!
//! - **Metamodel surface**: class/slot handles, the read-only graph trait,
//!   and an in-memory implementation with a JSON loader ([`meta`])
//! - **Resolution**: memoized containment and connection-endpoint lookups
//!   plus instance-level connection validity ([`resolver`])
//!
//! The `modelgraph` binary answers one-off queries against a model file;
//! see `modelgraph --help`.

pub use modelgraph_meta as meta;
pub use modelgraph_resolver as resolver;

pub use modelgraph_meta::{ClassId, Instance, Metamodel, ModelObject, SlotId};
pub use modelgraph_resolver::{ClassPair, ConnectionContext, MetamodelResolver};
