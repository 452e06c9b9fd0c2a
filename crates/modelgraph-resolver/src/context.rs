//! Connection creation context.

use modelgraph_meta::{ClassId, ModelObject};

/// The context of one connection-validity check.
///
/// An immutable parameter bundle handed to connection predicates: the two
/// run-time objects being joined and the class of the would-be connection.
#[derive(Clone, Copy)]
pub struct ConnectionContext<'a> {
    /// The object the connection starts from.
    pub source_object: &'a dyn ModelObject,
    /// The object the connection points at.
    pub target_object: &'a dyn ModelObject,
    /// The class of the connection being created.
    pub connection_class: ClassId,
}
