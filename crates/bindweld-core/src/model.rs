//! The interface model: arena storage, derived queries, and the builder.
//!
//! A model is constructed once through [`ModelBuilder`] and immutable
//! afterwards; every backend runs a read-only traversal over the same
//! instance. Classes reference their bases and downclasses by [`EntityId`],
//! so the inheritance DAG carries no ownership and cannot leak cycles into
//! the tree.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use crate::entity::{
    Arg, ClassDef, CtorNull, EntityId, EntityKind, EntityNode, EnumDef, EnumRepr, EnumValue,
    FunctionDef, FunctionKind, ModPath, NamespaceDef,
};
use crate::error::DescriptionError;
use crate::ty::{PtrNull, PtrType, Type};

/// An immutable interface description.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    entities: Vec<EntityNode>,
    root: EntityId,
}

impl Model {
    /// The root namespace.
    pub fn root(&self) -> EntityId {
        self.root
    }

    /// Access a node. Ids are only ever minted by the owning builder, so an
    /// out-of-range id is a programming error in the caller.
    pub fn node(&self, id: EntityId) -> &EntityNode {
        &self.entities[id.0 as usize]
    }

    /// Simple name of an entity.
    pub fn name(&self, id: EntityId) -> &str {
        &self.node(id).name
    }

    /// Root-to-self name sequence, skipping the root's empty name.
    pub fn path(&self, id: EntityId) -> Vec<String> {
        let mut path = match self.node(id).parent {
            Some(parent) => self.path(parent),
            None => Vec::new(),
        };
        if !self.node(id).name.is_empty() {
            path.push(self.node(id).name.clone());
        }
        path
    }

    /// Mangled `_`-joined path.
    pub fn flat_path(&self, id: EntityId) -> String {
        self.path(id).join("_")
    }

    /// `::`-joined path, used in diagnostics and panic messages.
    pub fn qualified_name(&self, id: EntityId) -> String {
        self.path(id).join("::")
    }

    /// Path with class segments replaced by their native spelling.
    pub fn native_path(&self, id: EntityId) -> Vec<String> {
        let mut path = match self.node(id).parent {
            Some(parent) => self.native_path(parent),
            None => Vec::new(),
        };
        let node = self.node(id);
        let segment = match &node.kind {
            EntityKind::Class(def) => def.native_name.clone().unwrap_or_else(|| node.name.clone()),
            _ => node.name.clone(),
        };
        if !segment.is_empty() {
            path.push(segment);
        }
        path
    }

    /// Child items of a namespace or class, declaration order.
    pub fn items(&self, id: EntityId) -> &[EntityId] {
        match &self.node(id).kind {
            EntityKind::Namespace(def) => &def.items,
            EntityKind::Class(def) => &def.items,
            _ => &[],
        }
    }

    /// Child items sorted by name; the order every traversal uses.
    pub fn sorted_items(&self, id: EntityId) -> Vec<EntityId> {
        let mut items = self.items(id).to_vec();
        items.sort_by(|a, b| self.name(*a).cmp(self.name(*b)));
        items
    }

    /// Class payload, if `id` is a class.
    pub fn class_def(&self, id: EntityId) -> Option<&ClassDef> {
        match &self.node(id).kind {
            EntityKind::Class(def) => Some(def),
            _ => None,
        }
    }

    /// Enum payload, if `id` is an enum.
    pub fn enum_def(&self, id: EntityId) -> Option<&EnumDef> {
        match &self.node(id).kind {
            EntityKind::Enum(def) => Some(def),
            _ => None,
        }
    }

    /// Function payload, if `id` is a function.
    pub fn function_def(&self, id: EntityId) -> Option<&FunctionDef> {
        match &self.node(id).kind {
            EntityKind::Function(def) => Some(def),
            _ => None,
        }
    }

    /// The name used to invoke the native function.
    pub fn call_name(&self, id: EntityId) -> &str {
        self.function_def(id)
            .and_then(|def| def.call_name.as_deref())
            .unwrap_or_else(|| self.name(id))
    }

    /// Destructor of a class, resolving through bases depth-first in
    /// declaration order. Documented policy: the first match wins.
    pub fn destructor_of(&self, class: EntityId) -> Option<EntityId> {
        let def = self.class_def(class)?;
        for item in &def.items {
            if matches!(
                self.function_def(*item).map(|f| f.kind),
                Some(FunctionKind::Destructor)
            ) {
                return Some(*item);
            }
        }
        for base in &def.bases {
            if let Some(dtor) = self.destructor_of(*base) {
                return Some(dtor);
            }
        }
        None
    }

    /// Every ancestor of a class: bases depth-first in declaration order,
    /// each listed once, base-most first.
    pub fn upcast_chain(&self, class: EntityId) -> Vec<EntityId> {
        fn walk(model: &Model, class: EntityId, out: &mut Vec<EntityId>) {
            if let Some(def) = model.class_def(class) {
                for base in &def.bases {
                    if !out.contains(base) {
                        walk(model, *base, out);
                        out.push(*base);
                    }
                }
            }
        }
        let mut out = Vec::new();
        walk(self, class, &mut out);
        out
    }

    /// The declared-or-implicit return type of a boundary entry point.
    pub fn boundary_ret(&self, func: EntityId) -> Type {
        let def = self
            .function_def(func)
            .expect("boundary_ret on a non-function");
        match def.kind {
            FunctionKind::Constructor { .. } => {
                let class = self.node(func).parent.expect("constructor without class");
                Type::Ptr(PtrType {
                    subtype: Box::new(Type::Class(class)),
                    is_const: false,
                    owned: true,
                    null: PtrNull::Panic,
                })
            }
            FunctionKind::Destructor => Type::Void,
            _ => def.ret.clone(),
        }
    }

    /// Full boundary argument list, with the implicit instance pointer
    /// prepended for methods and destructors.
    pub fn boundary_args(&self, func: EntityId) -> Vec<Arg> {
        let def = self
            .function_def(func)
            .expect("boundary_args on a non-function");
        let mut args = Vec::with_capacity(def.args.len() + 1);
        match def.kind {
            FunctionKind::Method { is_const } => {
                let class = self.node(func).parent.expect("method without class");
                args.push(Arg {
                    ty: Type::Ptr(PtrType {
                        subtype: Box::new(Type::Class(class)),
                        is_const,
                        owned: false,
                        null: PtrNull::Option,
                    }),
                    name: "inst".into(),
                });
            }
            FunctionKind::Destructor => {
                let class = self.node(func).parent.expect("destructor without class");
                args.push(Arg {
                    ty: Type::ptr(Type::Class(class)),
                    name: "inst".into(),
                });
            }
            _ => {}
        }
        if !matches!(def.kind, FunctionKind::Destructor) {
            args.extend(def.args.iter().cloned());
        }
        args
    }

    /// Effective module path of an entity in the generated library tree.
    ///
    /// Own override first; otherwise classes follow their first base,
    /// namespaces append their name to the parent path, and everything else
    /// follows its container.
    pub fn modpath(&self, id: EntityId) -> Vec<String> {
        let node = self.node(id);
        let own = match &node.kind {
            EntityKind::Namespace(def) => &def.modpath,
            EntityKind::Class(def) => &def.modpath,
            _ => &ModPath::Inherit,
        };
        match own {
            ModPath::Absolute(path) => path.clone(),
            ModPath::Children(extra) => {
                let mut path = self.inherited_modpath(id);
                path.extend(extra.iter().cloned());
                path
            }
            ModPath::Inherit => {
                let mut path = self.inherited_modpath(id);
                if matches!(node.kind, EntityKind::Namespace(_)) && !node.name.is_empty() {
                    path.push(node.name.clone());
                }
                path
            }
        }
    }

    fn inherited_modpath(&self, id: EntityId) -> Vec<String> {
        if let Some(def) = self.class_def(id)
            && let Some(first_base) = def.bases.first()
        {
            return self.modpath(*first_base);
        }
        match self.node(id).parent {
            Some(parent) => self.modpath(parent),
            None => Vec::new(),
        }
    }

    /// Native headers collected from every module in the tree, sorted.
    pub fn all_includes(&self) -> Vec<String> {
        let mut includes: Vec<String> = Vec::new();
        for node in &self.entities {
            let set = match &node.kind {
                EntityKind::Namespace(def) => &def.includes,
                EntityKind::Class(def) => &def.includes,
                _ => continue,
            };
            for include in set {
                if !includes.contains(include) {
                    includes.push(include.clone());
                }
            }
        }
        includes.sort();
        includes
    }
}

/// Builds a [`Model`], enforcing description invariants as items register.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    entities: Vec<EntityNode>,
    /// Running auto-value counter per enum.
    counters: FxHashMap<EntityId, i64>,
}

impl ModelBuilder {
    /// Start a description with an empty-named root namespace.
    pub fn new() -> Self {
        let mut builder = Self::default();
        builder.entities.push(EntityNode {
            name: String::new(),
            parent: None,
            kind: EntityKind::Namespace(NamespaceDef::default()),
        });
        builder
    }

    /// The root namespace id.
    pub fn root(&self) -> EntityId {
        EntityId(0)
    }

    fn node(&self, id: EntityId) -> &EntityNode {
        &self.entities[id.0 as usize]
    }

    fn push(
        &mut self,
        parent: EntityId,
        name: &str,
        kind: EntityKind,
    ) -> Result<EntityId, DescriptionError> {
        self.check_id(parent)?;
        let siblings = match &self.node(parent).kind {
            EntityKind::Namespace(def) => &def.items,
            EntityKind::Class(def) => &def.items,
            _ => {
                return Err(DescriptionError::NotAContainer {
                    owner: self.node(parent).name.clone(),
                });
            }
        };
        if siblings
            .iter()
            .any(|sibling| self.node(*sibling).name == name)
        {
            return Err(DescriptionError::DuplicateName {
                owner: self.node(parent).name.clone(),
                name: name.into(),
            });
        }

        let id = EntityId(self.entities.len() as u32);
        self.entities.push(EntityNode {
            name: name.into(),
            parent: Some(parent),
            kind,
        });
        match &mut self.entities[parent.0 as usize].kind {
            EntityKind::Namespace(def) => def.items.push(id),
            EntityKind::Class(def) => def.items.push(id),
            _ => unreachable!(),
        }
        Ok(id)
    }

    fn check_id(&self, id: EntityId) -> Result<(), DescriptionError> {
        if (id.0 as usize) < self.entities.len() {
            Ok(())
        } else {
            Err(DescriptionError::DanglingId { index: id.0 })
        }
    }

    /// Declare a nested namespace.
    pub fn namespace(&mut self, parent: EntityId, name: &str) -> Result<EntityId, DescriptionError> {
        self.push(parent, name, EntityKind::Namespace(NamespaceDef::default()))
    }

    /// Declare a class with the given bases (declaration order matters:
    /// the first base drives module placement and destructor resolution).
    pub fn class(
        &mut self,
        parent: EntityId,
        name: &str,
        bases: &[EntityId],
    ) -> Result<EntityId, DescriptionError> {
        for base in bases {
            self.check_id(*base)?;
            if !matches!(self.node(*base).kind, EntityKind::Class(_)) {
                return Err(DescriptionError::UnsupportedType {
                    detail: format!("base '{}' of '{name}' is not a class", self.node(*base).name),
                });
            }
        }
        let id = self.push(
            parent,
            name,
            EntityKind::Class(ClassDef {
                bases: bases.to_vec(),
                ..ClassDef::default()
            }),
        )?;
        for base in bases {
            if let EntityKind::Class(def) = &mut self.entities[base.0 as usize].kind {
                def.downclasses.push(id);
            }
        }
        Ok(id)
    }

    /// Override a class's native spelling.
    pub fn native_name(&mut self, class: EntityId, name: &str) -> Result<(), DescriptionError> {
        self.check_id(class)?;
        match &mut self.entities[class.0 as usize].kind {
            EntityKind::Class(def) => {
                def.native_name = Some(name.into());
                Ok(())
            }
            _ => Err(DescriptionError::NotAContainer {
                owner: self.entities[class.0 as usize].name.clone(),
            }),
        }
    }

    /// Override an entity's logical module placement.
    pub fn modpath(&mut self, id: EntityId, modpath: ModPath) -> Result<(), DescriptionError> {
        self.check_id(id)?;
        match &mut self.entities[id.0 as usize].kind {
            EntityKind::Namespace(def) => def.modpath = modpath,
            EntityKind::Class(def) => def.modpath = modpath,
            _ => {
                return Err(DescriptionError::NotAContainer {
                    owner: self.entities[id.0 as usize].name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Record a native header required by items of this module.
    pub fn include(&mut self, id: EntityId, header: &str) -> Result<(), DescriptionError> {
        self.check_id(id)?;
        match &mut self.entities[id.0 as usize].kind {
            EntityKind::Namespace(def) => {
                def.includes.insert(header.into());
            }
            EntityKind::Class(def) => {
                def.includes.insert(header.into());
            }
            _ => {
                return Err(DescriptionError::NotAContainer {
                    owner: self.entities[id.0 as usize].name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Declare an enum type.
    pub fn enum_type(&mut self, parent: EntityId, name: &str) -> Result<EntityId, DescriptionError> {
        let id = self.push(parent, name, EntityKind::Enum(EnumDef::default()))?;
        self.counters.insert(id, 0);
        Ok(id)
    }

    /// Add an auto-valued enum symbol (takes the counter, then increments).
    pub fn value(&mut self, enum_id: EntityId, name: &str) -> Result<(), DescriptionError> {
        let next = *self.counters.get(&enum_id).unwrap_or(&0);
        self.value_at(enum_id, name, next)
    }

    /// Add an explicitly valued enum symbol (resets the counter to value+1).
    pub fn value_at(
        &mut self,
        enum_id: EntityId,
        name: &str,
        value: i64,
    ) -> Result<(), DescriptionError> {
        self.push_enum_value(enum_id, name, EnumRepr::Value(value))?;
        self.counters.insert(enum_id, value + 1);
        Ok(())
    }

    /// Add an alias of an earlier symbol (does not advance the counter).
    pub fn alias(
        &mut self,
        enum_id: EntityId,
        name: &str,
        target: &str,
    ) -> Result<(), DescriptionError> {
        let known = match &self.node(enum_id).kind {
            EntityKind::Enum(def) => def.values.iter().any(|v| v.name == target),
            _ => false,
        };
        if !known {
            return Err(DescriptionError::UnsupportedType {
                detail: format!("enum alias '{name}' targets unknown symbol '{target}'"),
            });
        }
        self.push_enum_value(enum_id, name, EnumRepr::Alias(target.into()))
    }

    fn push_enum_value(
        &mut self,
        enum_id: EntityId,
        name: &str,
        repr: EnumRepr,
    ) -> Result<(), DescriptionError> {
        self.check_id(enum_id)?;
        match &mut self.entities[enum_id.0 as usize].kind {
            EntityKind::Enum(def) => {
                if def.values.iter().any(|v| v.name == name) {
                    return Err(DescriptionError::DuplicateName {
                        owner: self.entities[enum_id.0 as usize].name.clone(),
                        name: name.into(),
                    });
                }
                def.values.push(EnumValue {
                    name: name.into(),
                    repr,
                });
                Ok(())
            }
            _ => Err(DescriptionError::NotAContainer {
                owner: self.entities[enum_id.0 as usize].name.clone(),
            }),
        }
    }

    /// Declare a free function.
    pub fn function(
        &mut self,
        parent: EntityId,
        name: &str,
        ret: Type,
        args: Vec<(Type, &str)>,
    ) -> Result<EntityId, DescriptionError> {
        self.push_function(parent, name, FunctionKind::Free, ret, args)
    }

    /// Declare an instance method.
    pub fn method(
        &mut self,
        class: EntityId,
        name: &str,
        ret: Type,
        args: Vec<(Type, &str)>,
        is_const: bool,
    ) -> Result<EntityId, DescriptionError> {
        self.require_class(class)?;
        self.push_function(class, name, FunctionKind::Method { is_const }, ret, args)
    }

    /// Declare a static method.
    pub fn static_method(
        &mut self,
        class: EntityId,
        name: &str,
        ret: Type,
        args: Vec<(Type, &str)>,
    ) -> Result<EntityId, DescriptionError> {
        self.require_class(class)?;
        self.push_function(class, name, FunctionKind::Static, ret, args)
    }

    /// Declare a constructor. The owning-pointer return is implicit.
    pub fn constructor(
        &mut self,
        class: EntityId,
        name: &str,
        args: Vec<(Type, &str)>,
        null: CtorNull,
    ) -> Result<EntityId, DescriptionError> {
        self.require_class(class)?;
        self.push_function(class, name, FunctionKind::Constructor { null }, Type::Void, args)
    }

    /// Declare the destructor. At most one per class.
    pub fn destructor(&mut self, class: EntityId, name: &str) -> Result<EntityId, DescriptionError> {
        self.require_class(class)?;
        let has_dtor = match &self.node(class).kind {
            EntityKind::Class(def) => def.items.iter().any(|item| {
                matches!(
                    self.node(*item).kind,
                    EntityKind::Function(FunctionDef {
                        kind: FunctionKind::Destructor,
                        ..
                    })
                )
            }),
            _ => false,
        };
        if has_dtor {
            return Err(DescriptionError::MultipleDestructors {
                class: self.node(class).name.clone(),
            });
        }
        self.push_function(class, name, FunctionKind::Destructor, Type::Void, Vec::new())
    }

    /// Collapse this operation onto a differently named native overload.
    pub fn call_name(&mut self, func: EntityId, name: &str) -> Result<(), DescriptionError> {
        self.check_id(func)?;
        match &mut self.entities[func.0 as usize].kind {
            EntityKind::Function(def) => {
                def.call_name = Some(name.into());
                Ok(())
            }
            _ => Err(DescriptionError::NotAContainer {
                owner: self.entities[func.0 as usize].name.clone(),
            }),
        }
    }

    fn require_class(&self, id: EntityId) -> Result<(), DescriptionError> {
        self.check_id(id)?;
        match self.node(id).kind {
            EntityKind::Class(_) => Ok(()),
            _ => Err(DescriptionError::NotAContainer {
                owner: self.node(id).name.clone(),
            }),
        }
    }

    fn push_function(
        &mut self,
        parent: EntityId,
        name: &str,
        kind: FunctionKind,
        ret: Type,
        args: Vec<(Type, &str)>,
    ) -> Result<EntityId, DescriptionError> {
        let args = args
            .into_iter()
            .enumerate()
            .map(|(i, (ty, name))| Arg {
                ty,
                name: if name.is_empty() {
                    format!("arg_{}", i + 1)
                } else {
                    name.into()
                },
            })
            .collect();
        self.push(
            parent,
            name,
            EntityKind::Function(FunctionDef {
                kind,
                ret,
                args,
                call_name: None,
            }),
        )
    }

    /// Validate the finished description and freeze it.
    pub fn finish(self) -> Result<Model, DescriptionError> {
        // Acyclicity of the upcast DAG.
        let mut graph: DiGraph<EntityId, ()> = DiGraph::new();
        let mut nodes: FxHashMap<EntityId, NodeIndex> = FxHashMap::default();
        for (index, node) in self.entities.iter().enumerate() {
            if matches!(node.kind, EntityKind::Class(_)) {
                let id = EntityId(index as u32);
                nodes.insert(id, graph.add_node(id));
            }
        }
        for (id, node_index) in &nodes {
            if let EntityKind::Class(def) = &self.entities[id.0 as usize].kind {
                for base in &def.bases {
                    graph.add_edge(nodes[base], *node_index, ());
                }
            }
        }
        if let Err(cycle) = toposort(&graph, None) {
            let class = graph[cycle.node_id()];
            return Err(DescriptionError::CyclicInheritance {
                class: self.entities[class.0 as usize].name.clone(),
            });
        }

        Ok(Model {
            entities: self.entities,
            root: EntityId(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::Scalar;

    fn class_with_base() -> (Model, EntityId, EntityId) {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let base = builder.class(root, "Base", &[]).unwrap();
        builder.destructor(base, "delete").unwrap();
        let derived = builder.class(root, "Derived", &[base]).unwrap();
        (builder.finish().unwrap(), base, derived)
    }

    #[test]
    fn duplicate_sibling_names_rejected() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        builder.class(root, "Thing", &[]).unwrap();
        let err = builder.class(root, "Thing", &[]).unwrap_err();

        assert!(matches!(err, DescriptionError::DuplicateName { .. }));
    }

    #[test]
    fn second_destructor_rejected() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let class = builder.class(root, "Thing", &[]).unwrap();
        builder.destructor(class, "delete").unwrap();
        let err = builder.destructor(class, "destroy").unwrap_err();

        assert!(matches!(err, DescriptionError::MultipleDestructors { .. }));
    }

    #[test]
    fn destructor_resolves_through_first_base() {
        let (model, base, derived) = class_with_base();
        let dtor = model.destructor_of(derived).unwrap();

        assert_eq!(model.node(dtor).parent, Some(base));
    }

    #[test]
    fn downclasses_track_the_inverse_relation() {
        let (model, base, derived) = class_with_base();

        assert_eq!(model.class_def(base).unwrap().downclasses, vec![derived]);
        assert_eq!(model.class_def(derived).unwrap().bases, vec![base]);
    }

    #[test]
    fn upcast_chain_is_base_most_first_and_deduplicated() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let a = builder.class(root, "A", &[]).unwrap();
        let b = builder.class(root, "B", &[a]).unwrap();
        let c = builder.class(root, "C", &[a]).unwrap();
        let d = builder.class(root, "D", &[b, c]).unwrap();
        let model = builder.finish().unwrap();

        assert_eq!(model.upcast_chain(d), vec![a, b, c]);
    }

    #[test]
    fn method_gets_implicit_const_instance_argument() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let class = builder.class(root, "Sample", &[]).unwrap();
        let method = builder
            .method(class, "sayHi", Type::Void, Vec::new(), true)
            .unwrap();
        let model = builder.finish().unwrap();

        let args = model.boundary_args(method);
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].name, "inst");
        match &args[0].ty {
            Type::Ptr(p) => {
                assert!(p.is_const);
                assert_eq!(*p.subtype, Type::Class(class));
            }
            other => panic!("expected instance pointer, got {other:?}"),
        }
    }

    #[test]
    fn constructor_returns_owning_pointer() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let class = builder.class(root, "Sample", &[]).unwrap();
        let ctor = builder
            .constructor(class, "new", vec![(Type::const_str(), "name")], CtorNull::Nothrow)
            .unwrap();
        let model = builder.finish().unwrap();

        match model.boundary_ret(ctor) {
            Type::Ptr(p) => {
                assert!(p.owned);
                assert_eq!(p.null, PtrNull::Panic);
                assert_eq!(*p.subtype, Type::Class(class));
            }
            other => panic!("expected pointer, got {other:?}"),
        }
    }

    #[test]
    fn inheritance_cycle_rejected() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let a = builder.class(root, "A", &[]).unwrap();
        let b = builder.class(root, "B", &[a]).unwrap();
        // Close the loop behind the builder's back via a forward reference.
        if let EntityKind::Class(def) = &mut builder.entities[a.0 as usize].kind {
            def.bases.push(b);
        }
        let err = builder.finish().unwrap_err();

        assert!(matches!(err, DescriptionError::CyclicInheritance { .. }));
    }

    #[test]
    fn modpath_children_override_extends_parent() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let ns = builder.namespace(root, "llvm").unwrap();
        let ty = builder.class(ns, "Type", &[]).unwrap();
        builder
            .modpath(ty, ModPath::Children(vec!["ty".into()]))
            .unwrap();
        let seq = builder.class(ns, "SequentialType", &[ty]).unwrap();
        builder
            .modpath(seq, ModPath::Children(vec!["seq".into()]))
            .unwrap();
        let array = builder.class(ns, "ArrayType", &[seq]).unwrap();
        let model = builder.finish().unwrap();

        assert_eq!(model.modpath(ty), vec!["llvm", "ty"]);
        assert_eq!(model.modpath(seq), vec!["llvm", "ty", "seq"]);
        // No override: follows the first base.
        assert_eq!(model.modpath(array), vec!["llvm", "ty", "seq"]);
    }

    #[test]
    fn enum_counter_and_aliases() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let e = builder.enum_type(root, "TypeID").unwrap();
        builder.value_at(e, "Void", 0).unwrap();
        builder.value(e, "Half").unwrap();
        builder.value(e, "Float").unwrap();
        builder.value_at(e, "Label", 7).unwrap();
        builder.value(e, "Metadata").unwrap();
        builder.alias(e, "First", "Void").unwrap();
        let model = builder.finish().unwrap();

        let values = model.enum_def(e).unwrap().resolved_values();
        assert_eq!(
            values,
            vec![
                ("Void", 0),
                ("Half", 1),
                ("Float", 2),
                ("Label", 7),
                ("Metadata", 8),
                ("First", 0),
            ]
        );
    }

    #[test]
    fn scalar_args_keep_declared_names() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let f = builder
            .function(
                root,
                "clamp",
                Type::Scalar(Scalar::I32),
                vec![(Type::Scalar(Scalar::I32), "value"), (Type::Scalar(Scalar::I32), "")],
            )
            .unwrap();
        let model = builder.finish().unwrap();

        let args = model.boundary_args(f);
        assert_eq!(args[0].name, "value");
        assert_eq!(args[1].name, "arg_2");
    }
}
