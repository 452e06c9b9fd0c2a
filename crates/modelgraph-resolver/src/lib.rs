//! Structural relationship resolution for object-graph metamodels.
//!
//! This crate provides:
//! - [`resolver`]: The memoizing [`MetamodelResolver`] and its builder
//! - [`pair`]: The [`ClassPair`] cache key
//! - [`context`]: The [`ConnectionContext`] predicate parameter bundle
//! - [`predicates`]: Stateless predicate combinators
//! - [`metrics`]: Cache hit/miss counters
//!
//! # Resolution Model
//!
//! Given an immutable metamodel, three questions come up constantly in
//! graph-editing code:
//! - Which slot on a container class is meant to hold instances of a
//!   contained class? ([`MetamodelResolver::resolve_containment`])
//! - Which slots designate a connection class's endpoints?
//!   ([`MetamodelResolver::resolve_source_slot`] /
//!   [`MetamodelResolver::resolve_target_slot`])
//! - May a connection of some class join these two specific objects?
//!   ([`MetamodelResolver::can_connect`])
//!
//! Answers depend only on the metamodel and the resolver's configuration,
//! both frozen at construction, so every class-level answer (including "no
//! answer") is memoized for the lifetime of the resolver. Predicates add
//! run-time filtering on top of the static type walk.

pub mod context;
pub mod metrics;
pub mod pair;
pub mod predicates;
pub mod resolver;

pub use context::ConnectionContext;
pub use metrics::{MetricsSnapshot, ResolverMetrics};
pub use pair::ClassPair;
pub use resolver::{
    ContainmentPredicate, ConnectionPredicate, MetamodelResolver, ResolverBuilder,
};
