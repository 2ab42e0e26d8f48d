//! Entity arena nodes.
//!
//! Every namespace, class, enum and function in a description is one
//! [`EntityNode`] in the model arena, identified by [`EntityId`]. Ownership
//! runs strictly downward through `items` lists; the only upward link is the
//! `parent` id, and a class's `downclasses` list is a relational inverse of
//! `bases` (lookup only, never ownership). This keeps the tree acyclic by
//! construction and lets inheritance form an arbitrary DAG over ids.

use std::collections::BTreeSet;

use crate::ty::Type;

/// Index of an entity in the model arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u32);

impl EntityId {
    /// Raw arena index.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// One node of the description tree.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityNode {
    /// Simple name. The root namespace has the empty name.
    pub name: String,
    /// Owning container, `None` for the root.
    pub parent: Option<EntityId>,
    pub kind: EntityKind,
}

/// Payload of an entity node.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Namespace(NamespaceDef),
    Class(ClassDef),
    Enum(EnumDef),
    Function(FunctionDef),
}

/// Namespace payload: an ordered, name-unique collection of children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamespaceDef {
    /// Child entities in declaration order.
    pub items: Vec<EntityId>,
    /// Logical placement override for generated module trees.
    pub modpath: ModPath,
    /// Native headers the shim must include for items declared here.
    pub includes: BTreeSet<String>,
}

/// Class payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassDef {
    /// Child items (nested enums/classes, methods, constructors, destructor).
    pub items: Vec<EntityId>,
    /// Direct bases in declaration order. Forms an acyclic upcast DAG.
    pub bases: Vec<EntityId>,
    /// Relational inverse of `bases`.
    pub downclasses: Vec<EntityId>,
    /// Native spelling when it differs from the declared name.
    pub native_name: Option<String>,
    pub modpath: ModPath,
    pub includes: BTreeSet<String>,
}

/// Enum payload: ordered unique-named symbols.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumDef {
    pub values: Vec<EnumValue>,
}

/// One declared enum symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub repr: EnumRepr,
}

/// How an enum symbol gets its integer representation.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumRepr {
    /// A concrete value (explicit, or assigned from the running counter).
    Value(i64),
    /// Shares the representation of an earlier symbol.
    Alias(String),
}

impl EnumDef {
    /// Resolve every symbol to `(name, value)`, following aliases.
    ///
    /// Aliases must point at an earlier symbol; the builder enforces that,
    /// so resolution here is a single forward pass.
    pub fn resolved_values(&self) -> Vec<(&str, i64)> {
        let mut out: Vec<(&str, i64)> = Vec::with_capacity(self.values.len());
        for value in &self.values {
            let repr = match &value.repr {
                EnumRepr::Value(v) => *v,
                EnumRepr::Alias(target) => out
                    .iter()
                    .find(|(name, _)| *name == target)
                    .map(|(_, v)| *v)
                    .unwrap_or(0),
            };
            out.push((value.name.as_str(), repr));
        }
        out
    }

    /// Symbols that introduce a new representation, in declaration order.
    pub fn distinct_values(&self) -> Vec<(&str, i64)> {
        let mut seen = Vec::new();
        let mut out = Vec::new();
        for (name, value) in self.resolved_values() {
            if !seen.contains(&value) {
                seen.push(value);
                out.push((name, value));
            }
        }
        out
    }
}

/// Function payload.
///
/// Declared arguments only; the implicit instance argument of methods and
/// destructors, and the implicit owning-pointer return of constructors, are
/// derived by [`crate::Model::boundary_args`] / [`crate::Model::boundary_ret`].
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub kind: FunctionKind,
    pub ret: Type,
    pub args: Vec<Arg>,
    /// Native name to invoke when it differs from the declared name.
    /// Lets several declared operations collapse onto one native overload.
    pub call_name: Option<String>,
}

/// A declared argument.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub ty: Type,
    pub name: String,
}

/// Function flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Free function in a namespace.
    Free,
    /// Static method of a class.
    Static,
    /// Instance method; `is_const` marks the receiver const.
    Method { is_const: bool },
    /// Constructor; returns an owning pointer to the enclosing class.
    Constructor { null: CtorNull },
    /// Destructor; single implicit instance argument, void return.
    Destructor,
}

/// Allocation-failure policy for constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CtorNull {
    /// `new(std::nothrow)`: the allocator's no-throw contract yields null.
    #[default]
    Nothrow,
    /// Plain `new` wrapped in try/catch; a thrown exception becomes null.
    Catch,
}

/// Logical module placement policy.
///
/// The effective path of an entity is its own override if any; otherwise a
/// class follows its first base, and everything else follows its parent.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModPath {
    /// No override: inherit per the rule above.
    #[default]
    Inherit,
    /// Parent's effective path plus these segments.
    Children(Vec<String>),
    /// A fixed path from the generated crate root.
    Absolute(Vec<String>),
}
