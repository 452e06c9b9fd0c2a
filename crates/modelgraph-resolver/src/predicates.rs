//! Stateless predicate combinators.
//!
//! Small helpers for the common registrations; anything fancier is written
//! as a closure at the registration site.

use std::sync::Arc;

use modelgraph_meta::{ClassId, Metamodel, ModelObject};

use crate::resolver::{ContainmentPredicate, ConnectionPredicate};

/// Accepts a context whose source object is an instance of `class`.
pub fn source_instance_of(meta: Arc<dyn Metamodel>, class: ClassId) -> ConnectionPredicate {
    Arc::new(move |ctx| meta.is_assignable(class, ctx.source_object.class_id()))
}

/// Accepts a context whose target object is an instance of `class`.
pub fn target_instance_of(meta: Arc<dyn Metamodel>, class: ClassId) -> ConnectionPredicate {
    Arc::new(move |ctx| meta.is_assignable(class, ctx.target_object.class_id()))
}

/// Accepts a pair whose contained class is concrete.
pub fn contained_is_concrete(meta: Arc<dyn Metamodel>) -> ContainmentPredicate {
    Arc::new(move |pair| !meta.is_abstract(pair.second))
}

/// Whether `object` is an instance of `class` (its runtime class or any
/// subtype of it).
pub fn is_instance(meta: &dyn Metamodel, class: ClassId, object: &dyn ModelObject) -> bool {
    meta.is_assignable(class, object.class_id())
}
