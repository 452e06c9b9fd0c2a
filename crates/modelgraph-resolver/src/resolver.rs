//! The memoizing metamodel resolver.
//!
//! The resolver answers three structural questions against an immutable
//! metamodel, caching every class-level answer for its own lifetime:
//!
//! - `resolve_containment(container, contained)`: the first containment slot
//!   on the container class (own or inherited) whose declared target accepts
//!   the contained class and whose registered predicate, if any, accepts the
//!   pair.
//! - `resolve_source_slot(class)` / `resolve_target_slot(class)`: the
//!   explicitly registered endpoint slot of a connection class, falling back
//!   through its supertypes.
//! - `can_connect(source, target, class)`: whether a connection of `class`
//!   may join two specific objects, composing the lookups above with
//!   instance-level checks.
//!
//! "Not found" is a stable, cacheable answer, stored as an explicit `None`
//! entry; an absent key means "not yet computed". Caches are never
//! invalidated because the metamodel and the configuration are frozen at
//! construction. Concurrent first-resolutions of the same key may both
//! compute, but compute the same answer; the first insert wins.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use modelgraph_meta::{ClassId, Metamodel, ModelObject, SlotId};

use crate::context::ConnectionContext;
use crate::metrics::ResolverMetrics;
use crate::pair::ClassPair;

/// Predicate refining containment resolution beyond type compatibility.
pub type ContainmentPredicate = Arc<dyn Fn(&ClassPair) -> bool + Send + Sync>;

/// Predicate refining connection validity with run-time context.
pub type ConnectionPredicate =
    Arc<dyn for<'a> Fn(&ConnectionContext<'a>) -> bool + Send + Sync>;

#[derive(Debug, Clone, Copy)]
enum EndpointRole {
    Source,
    Target,
}

/// Memoizing resolver over an immutable metamodel.
///
/// Construct through [`ResolverBuilder`]. Safe to share across threads
/// behind an `Arc`; all interior mutability is the memo tables.
pub struct MetamodelResolver {
    meta: Arc<dyn Metamodel>,

    // Immutable configuration.
    containment_predicates: HashMap<SlotId, ContainmentPredicate>,
    connection_predicates: HashMap<SlotId, ConnectionPredicate>,
    source_registrations: HashMap<ClassId, Option<SlotId>>,
    target_registrations: HashMap<ClassId, Option<SlotId>>,

    // Memo tables: absent key = not yet computed, `None` = known absent.
    containment_cache: RwLock<HashMap<ClassPair, Option<SlotId>>>,
    source_cache: RwLock<HashMap<ClassId, Option<SlotId>>>,
    target_cache: RwLock<HashMap<ClassId, Option<SlotId>>>,

    metrics: ResolverMetrics,
}

impl MetamodelResolver {
    /// Start building a resolver over a metamodel.
    pub fn builder(meta: Arc<dyn Metamodel>) -> ResolverBuilder {
        ResolverBuilder::new(meta)
    }

    /// The metamodel this resolver queries.
    pub fn metamodel(&self) -> &dyn Metamodel {
        self.meta.as_ref()
    }

    /// Cache hit/miss counters.
    pub fn metrics(&self) -> &ResolverMetrics {
        &self.metrics
    }

    /// Find the containment slot of `container` designed to hold instances
    /// of `contained`.
    ///
    /// Walks the container's containment slots (inherited included) in
    /// declared order and returns the first slot whose target type accepts
    /// `contained` and whose registered predicate, if any, accepts the pair.
    /// A predicate rejection moves on to the next compatible slot. `None` is
    /// an ordinary outcome, not an error.
    pub fn resolve_containment(
        &self,
        container: ClassId,
        contained: ClassId,
    ) -> Option<SlotId> {
        let key = ClassPair::of(container, contained);
        if let Some(&hit) = self.containment_cache.read().get(&key) {
            self.metrics.record_containment_hit();
            trace!(
                container = self.meta.class_name(container),
                contained = self.meta.class_name(contained),
                "containment cache hit"
            );
            return hit;
        }

        let answer = self.compute_containment(&key);
        self.metrics.record_containment_miss();
        debug!(
            container = self.meta.class_name(container),
            contained = self.meta.class_name(contained),
            slot = answer.map(|s| self.meta.slot_name(s)),
            "resolved containment slot"
        );
        // First insert wins; racing computations produce the same answer.
        self.containment_cache.write().entry(key).or_insert(answer);
        answer
    }

    fn compute_containment(&self, key: &ClassPair) -> Option<SlotId> {
        for &slot in self.meta.all_containments(key.first) {
            if !self.meta.is_assignable(self.meta.slot_target(slot), key.second) {
                continue;
            }
            match self.containment_predicates.get(&slot) {
                None => return Some(slot),
                Some(predicate) if predicate(key) => return Some(slot),
                Some(_) => {}
            }
        }
        None
    }

    /// The source endpoint slot of a connection class, inherited if the
    /// class has no direct registration.
    pub fn resolve_source_slot(&self, conn_class: ClassId) -> Option<SlotId> {
        self.resolve_endpoint(EndpointRole::Source, conn_class)
    }

    /// The target endpoint slot of a connection class, inherited if the
    /// class has no direct registration.
    pub fn resolve_target_slot(&self, conn_class: ClassId) -> Option<SlotId> {
        self.resolve_endpoint(EndpointRole::Target, conn_class)
    }

    fn resolve_endpoint(&self, role: EndpointRole, conn_class: ClassId) -> Option<SlotId> {
        let cache = match role {
            EndpointRole::Source => &self.source_cache,
            EndpointRole::Target => &self.target_cache,
        };
        if let Some(&hit) = cache.read().get(&conn_class) {
            self.metrics.record_endpoint_hit();
            return hit;
        }

        let registrations = match role {
            EndpointRole::Source => &self.source_registrations,
            EndpointRole::Target => &self.target_registrations,
        };
        let answer = match registrations.get(&conn_class) {
            Some(&registered) => registered,
            None => {
                // Fall back through the supertypes, nearest-first; each
                // recursive lookup memoizes its own fully-computed answer.
                let mut found = None;
                for &super_type in self.meta.all_super_types(conn_class) {
                    if let Some(slot) = self.resolve_endpoint(role, super_type) {
                        found = Some(slot);
                        break;
                    }
                }
                found
            }
        };

        self.metrics.record_endpoint_miss();
        debug!(
            class = self.meta.class_name(conn_class),
            role = ?role,
            slot = answer.map(|s| self.meta.slot_name(s)),
            "resolved connection endpoint"
        );
        cache.write().entry(conn_class).or_insert(answer);
        answer
    }

    /// Whether a new connection of `conn_class` can join `source_object`
    /// with `target_object`.
    ///
    /// All of the following must hold:
    /// 1. the source object's runtime class has a containment slot willing
    ///    to hold a `conn_class` instance,
    /// 2. `conn_class` has a target endpoint slot, direct or inherited — a
    ///    connection class without one is never connectable,
    /// 3. that endpoint slot's target type accepts the target object's
    ///    runtime class,
    /// 4. the connection predicate registered for the containment slot from
    ///    step 1, if any, accepts the full context.
    ///
    /// Not memoized: steps 1 and 2 read the memo tables, steps 3 and 4 are
    /// instance-specific.
    pub fn can_connect(
        &self,
        source_object: &dyn ModelObject,
        target_object: &dyn ModelObject,
        conn_class: ClassId,
    ) -> bool {
        let Some(containment_slot) =
            self.resolve_containment(source_object.class_id(), conn_class)
        else {
            return false;
        };
        let Some(target_slot) = self.resolve_target_slot(conn_class) else {
            return false;
        };
        if !self
            .meta
            .is_assignable(self.meta.slot_target(target_slot), target_object.class_id())
        {
            return false;
        }
        match self.connection_predicates.get(&containment_slot) {
            None => true,
            Some(predicate) => predicate(&ConnectionContext {
                source_object,
                target_object,
                connection_class: conn_class,
            }),
        }
    }
}

/// Builder assembling a resolver's immutable configuration.
pub struct ResolverBuilder {
    meta: Arc<dyn Metamodel>,
    containment_predicates: HashMap<SlotId, ContainmentPredicate>,
    connection_predicates: HashMap<SlotId, ConnectionPredicate>,
    source_registrations: HashMap<ClassId, Option<SlotId>>,
    target_registrations: HashMap<ClassId, Option<SlotId>>,
}

impl ResolverBuilder {
    /// Create a builder over a metamodel.
    pub fn new(meta: Arc<dyn Metamodel>) -> Self {
        Self {
            meta,
            containment_predicates: HashMap::new(),
            connection_predicates: HashMap::new(),
            source_registrations: HashMap::new(),
            target_registrations: HashMap::new(),
        }
    }

    /// Register a predicate refining containment resolution for one slot.
    ///
    /// The slot is only returned for a pair the predicate accepts; on
    /// rejection resolution moves on to the next type-compatible slot.
    pub fn containment_predicate<F>(mut self, slot: SlotId, predicate: F) -> Self
    where
        F: Fn(&ClassPair) -> bool + Send + Sync + 'static,
    {
        self.containment_predicates.insert(slot, Arc::new(predicate));
        self
    }

    /// Register a predicate gating connection creation for one containment
    /// slot (the slot on the source that would hold the connection).
    pub fn connection_predicate<F>(mut self, slot: SlotId, predicate: F) -> Self
    where
        F: for<'a> Fn(&ConnectionContext<'a>) -> bool + Send + Sync + 'static,
    {
        self.connection_predicates.insert(slot, Arc::new(predicate));
        self
    }

    /// Register the endpoint slots of a connection class.
    ///
    /// Either endpoint may be `None`; registering `None` still counts as a
    /// direct registration and stops the supertype fallback for that role.
    pub fn connection_endpoints(
        mut self,
        conn_class: ClassId,
        source: Option<SlotId>,
        target: Option<SlotId>,
    ) -> Self {
        self.source_registrations.insert(conn_class, source);
        self.target_registrations.insert(conn_class, target);
        self
    }

    /// Freeze the configuration and produce the resolver.
    pub fn build(self) -> MetamodelResolver {
        MetamodelResolver {
            meta: self.meta,
            containment_predicates: self.containment_predicates,
            connection_predicates: self.connection_predicates,
            source_registrations: self.source_registrations,
            target_registrations: self.target_registrations,
            containment_cache: RwLock::new(HashMap::new()),
            source_cache: RwLock::new(HashMap::new()),
            target_cache: RwLock::new(HashMap::new()),
            metrics: ResolverMetrics::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelgraph_meta::{Instance, InMemoryMetamodel, MetamodelBuilder};

    struct Fixture {
        meta: Arc<InMemoryMetamodel>,
        pipe: ClassId,
        segment: ClassId,
        valve: ClassId,
        abstract_segment: ClassId,
        flow: ClassId,
        checked_flow: ClassId,
        segments_slot: SlotId,
        flows_slot: SlotId,
        from_slot: SlotId,
        to_slot: SlotId,
    }

    /// Pipe contains Segments (Valve is-a Segment) and Flows; Flow is a
    /// connection between Segments via its `from`/`to` reference slots.
    fn fixture() -> Fixture {
        let mut builder = MetamodelBuilder::new();
        let element = builder.add_abstract_class("Element").unwrap();
        let pipe = builder.add_class("Pipe").unwrap();
        let abstract_segment = builder.add_abstract_class("AbstractSegmentBase").unwrap();
        let segment = builder.add_class("Segment").unwrap();
        let valve = builder.add_class("Valve").unwrap();
        let flow = builder.add_class("Flow").unwrap();
        let checked_flow = builder.add_class("CheckedFlow").unwrap();
        builder.add_super_type(pipe, element);
        builder.add_super_type(abstract_segment, element);
        builder.add_super_type(segment, abstract_segment);
        builder.add_super_type(valve, segment);
        builder.add_super_type(checked_flow, flow);

        let segments_slot = builder
            .add_containment(pipe, "segments", abstract_segment)
            .unwrap();
        let flows_slot = builder.add_containment(pipe, "flows", flow).unwrap();
        let from_slot = builder.add_reference(flow, "from", segment).unwrap();
        let to_slot = builder.add_reference(flow, "to", segment).unwrap();
        let meta = Arc::new(builder.build().unwrap());

        Fixture {
            meta,
            pipe,
            segment,
            valve,
            abstract_segment,
            flow,
            checked_flow,
            segments_slot,
            flows_slot,
            from_slot,
            to_slot,
        }
    }

    fn plain_resolver(fx: &Fixture) -> MetamodelResolver {
        MetamodelResolver::builder(fx.meta.clone())
            .connection_endpoints(fx.flow, Some(fx.from_slot), Some(fx.to_slot))
            .build()
    }

    #[test]
    fn test_containment_via_type_walk() {
        let fx = fixture();
        let resolver = plain_resolver(&fx);

        // Valve is-a Segment is-a AbstractSegmentBase, so `segments` wins.
        assert_eq!(
            resolver.resolve_containment(fx.pipe, fx.valve),
            Some(fx.segments_slot)
        );
        // Flow is not a segment; only `flows` accepts it.
        assert_eq!(
            resolver.resolve_containment(fx.pipe, fx.flow),
            Some(fx.flows_slot)
        );
        // Pipe itself is contained nowhere.
        assert_eq!(resolver.resolve_containment(fx.segment, fx.pipe), None);
    }

    #[test]
    fn test_containment_is_deterministic_across_calls() {
        let fx = fixture();
        let resolver = plain_resolver(&fx);

        let first = resolver.resolve_containment(fx.pipe, fx.valve);
        let second = resolver.resolve_containment(fx.pipe, fx.valve);
        assert_eq!(first, second);

        let snap = resolver.metrics().snapshot();
        assert_eq!(snap.containment_misses, 1);
        assert_eq!(snap.containment_hits, 1);
    }

    #[test]
    fn test_first_match_wins_in_declared_order() {
        // Two slots accept the same class; the first declared one must win.
        let mut builder = MetamodelBuilder::new();
        let container = builder.add_class("Container").unwrap();
        let item = builder.add_class("Item").unwrap();
        let primary = builder.add_containment(container, "primary", item).unwrap();
        let secondary = builder.add_containment(container, "secondary", item).unwrap();
        let meta = Arc::new(builder.build().unwrap());

        let resolver = MetamodelResolver::builder(meta).build();
        assert_ne!(primary, secondary);
        assert_eq!(resolver.resolve_containment(container, item), Some(primary));
    }

    #[test]
    fn test_predicate_rejection_falls_through_to_next_slot() {
        let mut builder = MetamodelBuilder::new();
        let container = builder.add_class("Container").unwrap();
        let item = builder.add_class("Item").unwrap();
        let primary = builder.add_containment(container, "primary", item).unwrap();
        let secondary = builder.add_containment(container, "secondary", item).unwrap();
        let meta = Arc::new(builder.build().unwrap());
        let resolver = MetamodelResolver::builder(meta)
            .containment_predicate(primary, |_| false)
            .build();
        assert_eq!(resolver.resolve_containment(container, item), Some(secondary));
    }

    #[test]
    fn test_predicate_veto_turns_found_into_not_found() {
        let fx = fixture();
        let meta = fx.meta.clone();
        let resolver = MetamodelResolver::builder(fx.meta.clone())
            .containment_predicate(fx.segments_slot, move |pair| {
                !meta.is_abstract(pair.second)
            })
            .build();

        // Concrete Valve is unaffected.
        assert_eq!(
            resolver.resolve_containment(fx.pipe, fx.valve),
            Some(fx.segments_slot)
        );
        // The abstract base is vetoed and no other slot accepts it.
        assert_eq!(
            resolver.resolve_containment(fx.pipe, fx.abstract_segment),
            None
        );
        // Other keys mapping to other slots are untouched.
        assert_eq!(
            resolver.resolve_containment(fx.pipe, fx.flow),
            Some(fx.flows_slot)
        );
    }

    #[test]
    fn test_endpoint_inheritance_fallback() {
        let fx = fixture();
        let resolver = plain_resolver(&fx);

        // CheckedFlow has no direct registration; Flow's answers apply.
        assert_eq!(
            resolver.resolve_source_slot(fx.checked_flow),
            Some(fx.from_slot)
        );
        assert_eq!(
            resolver.resolve_target_slot(fx.checked_flow),
            Some(fx.to_slot)
        );
        // Unrelated classes resolve to nothing.
        assert_eq!(resolver.resolve_source_slot(fx.pipe), None);
    }

    #[test]
    fn test_endpoint_fallback_is_memoized() {
        let fx = fixture();
        let resolver = plain_resolver(&fx);

        resolver.resolve_target_slot(fx.checked_flow);
        let cold = resolver.metrics().snapshot();
        resolver.resolve_target_slot(fx.checked_flow);
        let warm = resolver.metrics().snapshot();

        assert!(cold.endpoint_misses >= 1);
        assert_eq!(warm.endpoint_misses, cold.endpoint_misses);
        assert_eq!(warm.endpoint_hits, cold.endpoint_hits + 1);
    }

    #[test]
    fn test_registered_none_stops_fallback() {
        let fx = fixture();
        // CheckedFlow explicitly registers no target: the fallback to Flow
        // must not kick in for that role.
        let resolver = MetamodelResolver::builder(fx.meta.clone())
            .connection_endpoints(fx.flow, Some(fx.from_slot), Some(fx.to_slot))
            .connection_endpoints(fx.checked_flow, Some(fx.from_slot), None)
            .build();

        assert_eq!(resolver.resolve_target_slot(fx.checked_flow), None);
        assert_eq!(
            resolver.resolve_source_slot(fx.checked_flow),
            Some(fx.from_slot)
        );
    }

    #[test]
    fn test_can_connect_happy_path() {
        let fx = fixture();
        let resolver = plain_resolver(&fx);
        let pipe_obj = Instance::of(fx.pipe);
        let valve_obj = Instance::of(fx.valve);

        // Pipe contains Flows; Valve is acceptable as the `to` endpoint.
        assert!(resolver.can_connect(&pipe_obj, &valve_obj, fx.flow));
    }

    #[test]
    fn test_can_connect_rejects_incompatible_target() {
        let fx = fixture();
        let resolver = plain_resolver(&fx);
        let pipe_obj = Instance::of(fx.pipe);
        let other_pipe = Instance::of(fx.pipe);

        // `to` wants a Segment, not a Pipe.
        assert!(!resolver.can_connect(&pipe_obj, &other_pipe, fx.flow));
    }

    #[test]
    fn test_can_connect_strict_on_missing_target_endpoint() {
        let fx = fixture();
        // No endpoint registrations at all: containment alone would succeed
        // but the missing target endpoint is an unconditional reject.
        let resolver = MetamodelResolver::builder(fx.meta.clone()).build();
        let pipe_obj = Instance::of(fx.pipe);
        let valve_obj = Instance::of(fx.valve);

        assert!(resolver
            .resolve_containment(fx.pipe, fx.flow)
            .is_some());
        assert!(!resolver.can_connect(&pipe_obj, &valve_obj, fx.flow));
    }

    #[test]
    fn test_can_connect_consults_connection_predicate() {
        let fx = fixture();
        // Flows may only end on a Valve, a run-time restriction the static
        // `to: Segment` typing cannot express.
        let valve = fx.valve;
        let meta = fx.meta.clone();
        let resolver = MetamodelResolver::builder(fx.meta.clone())
            .connection_endpoints(fx.flow, Some(fx.from_slot), Some(fx.to_slot))
            .connection_predicate(fx.flows_slot, move |ctx| {
                meta.is_assignable(valve, ctx.target_object.class_id())
            })
            .build();
        let pipe_obj = Instance::of(fx.pipe);
        let valve_obj = Instance::of(fx.valve);
        let segment_obj = Instance::of(fx.segment);

        assert!(resolver.can_connect(&pipe_obj, &valve_obj, fx.flow));
        // A plain Segment passes every static check but trips the predicate.
        assert!(!resolver.can_connect(&pipe_obj, &segment_obj, fx.flow));
    }

    #[test]
    fn test_concurrent_resolution_is_idempotent() {
        let fx = fixture();
        let resolver = Arc::new(plain_resolver(&fx));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let resolver = Arc::clone(&resolver);
            let (pipe, valve, checked_flow) = (fx.pipe, fx.valve, fx.checked_flow);
            handles.push(std::thread::spawn(move || {
                (
                    resolver.resolve_containment(pipe, valve),
                    resolver.resolve_target_slot(checked_flow),
                )
            }));
        }
        let answers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for answer in &answers {
            assert_eq!(*answer, (Some(fx.segments_slot), Some(fx.to_slot)));
        }
    }
}
