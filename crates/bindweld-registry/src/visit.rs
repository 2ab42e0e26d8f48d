//! Deterministic traversal and aggregation.
//!
//! All walks visit module children sorted by name, so re-running generation
//! on an unchanged model reproduces byte-identical output. Aggregators
//! collect the reachable types (deduplicated by boundary spelling) and
//! functions (deduplicated by identity), optionally segmented into an
//! explicit front ordering.

use rustc_hash::FxHashSet;

use bindweld_core::{EntityId, EntityKind, Lang, Model, Type};

use crate::kind::EntityTag;
use crate::registry::Registry;

/// Whether a visitor keeps recursing below the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Depth-first walk over the entity tree, children sorted by name.
///
/// `visit` runs before recursion; returning [`Flow::Stop`] prunes the
/// subtree.
pub fn walk(model: &Model, from: EntityId, visit: &mut impl FnMut(EntityId) -> Flow) {
    if visit(from) == Flow::Stop {
        return;
    }
    for item in model.sorted_items(from) {
        walk(model, item, visit);
    }
}

/// Registry-driven compound walk.
///
/// At every node, each handler matching the node's tag along its dispatch
/// ancestry runs in order until one signals [`Flow::Stop`]; a stop also
/// prunes recursion below the node.
pub fn walk_dispatch<H>(
    model: &Model,
    registry: &Registry<'_, EntityTag, H>,
    lang: Lang,
    run: &mut impl FnMut(&H, EntityId) -> Flow,
) {
    fn go<H>(
        model: &Model,
        registry: &Registry<'_, EntityTag, H>,
        lang: Lang,
        id: EntityId,
        run: &mut impl FnMut(&H, EntityId) -> Flow,
    ) {
        let tag = EntityTag::of(model, id);
        for handler in registry.chain(lang, tag) {
            if run(handler, id) == Flow::Stop {
                return;
            }
        }
        if tag.is_module() {
            for item in model.sorted_items(id) {
                go(model, registry, lang, item, run);
            }
        }
    }
    go(model, registry, lang, model.root(), run);
}

/// Ordered collection with explicit front segments.
///
/// Iteration yields items matching the first segment predicate, then the
/// second, and so on; items matching no segment come last. Within a
/// segment the collection order is preserved.
pub struct Aggregator<T> {
    items: Vec<T>,
    segments: Vec<Box<dyn Fn(&T) -> bool>>,
}

impl<T> Aggregator<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            segments: Vec::new(),
        }
    }

    /// Append a front segment.
    pub fn add_segment(&mut self, predicate: impl Fn(&T) -> bool + 'static) {
        self.segments.push(Box::new(predicate));
    }

    /// Record an item in collection order.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in segment order.
    pub fn ordered(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.items.len());
        for segment in &self.segments {
            out.extend(self.items.iter().filter(|item| segment(item)));
        }
        out.extend(
            self.items
                .iter()
                .filter(|item| !self.segments.iter().any(|segment| segment(item))),
        );
        out
    }
}

impl<T> Default for Aggregator<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects every type reachable from the model, deduplicated by its
/// boundary spelling under `lang`, in deterministic first-reached order.
///
/// Reachable means: return and argument types of every boundary entry
/// point, their nested subtypes, and every class and enum declaration.
pub struct TypeAggregator {
    lang: Lang,
    seen: FxHashSet<String>,
    types: Vec<Type>,
}

impl TypeAggregator {
    pub fn collect(model: &Model, lang: Lang) -> Vec<Type> {
        let mut agg = TypeAggregator {
            lang,
            seen: FxHashSet::default(),
            types: Vec::new(),
        };
        walk(model, model.root(), &mut |id| {
            match &model.node(id).kind {
                EntityKind::Function(_) => {
                    agg.add(model, &model.boundary_ret(id));
                    for arg in model.boundary_args(id) {
                        agg.add(model, &arg.ty);
                    }
                }
                EntityKind::Class(_) => agg.add(model, &Type::Class(id)),
                EntityKind::Enum(_) => agg.add(model, &Type::Enum(id)),
                EntityKind::Namespace(_) => {}
            }
            Flow::Continue
        });
        agg.types
    }

    fn add(&mut self, model: &Model, ty: &Type) {
        if let Some(subtype) = ty.subtype() {
            self.add(model, subtype);
        }
        let key = ty.ffi_name(model, self.lang, &[]);
        if self.seen.insert(key) {
            self.types.push(ty.clone());
        }
    }
}

/// Collects every function entity, deduplicated by identity, free
/// functions segmented before methods.
pub struct FunctionAggregator;

impl FunctionAggregator {
    pub fn collect(model: &Model) -> Vec<EntityId> {
        let mut agg: Aggregator<(EntityId, EntityTag)> = Aggregator::new();
        // Free functions first, then everything attached to a class.
        agg.add_segment(|(_, tag)| *tag == EntityTag::Free);
        let mut seen = FxHashSet::default();
        walk(model, model.root(), &mut |id| {
            if matches!(model.node(id).kind, EntityKind::Function(_)) && seen.insert(id) {
                agg.push((id, EntityTag::of(model, id)));
            }
            Flow::Continue
        });
        agg.ordered().into_iter().map(|(id, _)| *id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindweld_core::{CtorNull, ModelBuilder, Scalar};

    fn sample_model() -> Model {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        builder
            .function(root, "zeta", Type::Bool, vec![(Type::Scalar(Scalar::I32), "x")])
            .unwrap();
        let class = builder.class(root, "Sample", &[]).unwrap();
        builder
            .constructor(class, "new", vec![(Type::const_str(), "name")], CtorNull::Nothrow)
            .unwrap();
        builder.destructor(class, "delete").unwrap();
        builder
            .method(class, "sayHi", Type::Void, Vec::new(), true)
            .unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn type_aggregation_deduplicates_by_boundary_spelling() {
        let model = sample_model();
        let types = TypeAggregator::collect(&model, Lang::Rust);

        let count = |ty: &Type| {
            types
                .iter()
                .filter(|t| t.ffi_name(&model, Lang::Rust, &[]) == ty.ffi_name(&model, Lang::Rust, &[]))
                .count()
        };
        // The class appears as declaration, constructor return subtype and
        // instance pointer subtype; it must be collected once.
        let class = types
            .iter()
            .find(|t| matches!(t, Type::Class(_)))
            .expect("class collected");
        assert_eq!(count(class), 1);
        assert_eq!(count(&Type::const_str()), 1);
    }

    #[test]
    fn free_functions_order_before_methods() {
        let model = sample_model();
        let funcs = FunctionAggregator::collect(&model);
        let names: Vec<&str> = funcs.iter().map(|id| model.name(*id)).collect();

        // "zeta" sorts after every method name, but the free segment wins.
        assert_eq!(names[0], "zeta");
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn aggregation_is_stable_across_runs() {
        let model = sample_model();
        let a = TypeAggregator::collect(&model, Lang::C);
        let b = TypeAggregator::collect(&model, Lang::C);
        assert_eq!(a, b);

        let fa = FunctionAggregator::collect(&model);
        let fb = FunctionAggregator::collect(&model);
        assert_eq!(fa, fb);
    }

    #[test]
    fn walk_dispatch_runs_the_ancestry_chain_until_stop() {
        let model = sample_model();
        let mut registry: Registry<'_, EntityTag, &str> = Registry::new("function");
        registry.register(Lang::C, EntityTag::Constructor, "ctor");
        registry.register(Lang::C, EntityTag::Function, "fn");
        registry.register_default(EntityTag::Module, "module");

        let mut ran: Vec<(String, &str)> = Vec::new();
        walk_dispatch(&model, &registry, Lang::C, &mut |handler, id| {
            ran.push((model.name(id).to_string(), *handler));
            // The constructor handler claims its nodes entirely.
            if *handler == "ctor" { Flow::Stop } else { Flow::Continue }
        });

        // "new" ran the constructor handler and stopped before "fn".
        assert!(ran.contains(&("new".into(), "ctor")));
        assert!(!ran.contains(&("new".into(), "fn")));
        // Plain methods fell through to the Function handler.
        assert!(ran.contains(&("sayHi".into(), "fn")));
        // The class recursed through the language-agnostic Module default.
        assert!(ran.contains(&("Sample".into(), "module")));
    }

    #[test]
    fn walk_prunes_on_stop() {
        let model = sample_model();
        let mut visited = Vec::new();
        walk(&model, model.root(), &mut |id| {
            visited.push(model.name(id).to_string());
            if model.name(id) == "Sample" {
                Flow::Stop
            } else {
                Flow::Continue
            }
        });

        assert!(visited.iter().any(|n| n == "Sample"));
        assert!(!visited.iter().any(|n| n == "sayHi"));
    }
}
