//! Node-kind tags and their dispatch ancestry.
//!
//! Handler lookup does not reflect over model structs; each node maps to a
//! tag, and each tag carries an explicit priority list of the tags it may
//! fall back to. `Method` falls back to `Function`, `Constructor` to
//! `Static` then `Function`, and so on. The lists are the dispatch order.

use bindweld_core::{EntityKind, FunctionKind, Model, Type};

/// A kind that participates in registry dispatch.
pub trait NodeKind: Copy + Eq + std::hash::Hash + std::fmt::Debug + 'static {
    /// Dispatch chain for this kind, most specific first. Always starts
    /// with the kind itself.
    fn ancestry(self) -> &'static [Self];
}

/// Dispatch tag of an entity node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityTag {
    /// Any container of items; the fallback of namespaces and classes.
    Module,
    Namespace,
    Class,
    Enum,
    /// Any callable; the fallback of the concrete function tags.
    Function,
    Free,
    Static,
    Method,
    Constructor,
    Destructor,
}

impl EntityTag {
    /// Tag of a concrete model node.
    pub fn of(model: &Model, id: bindweld_core::EntityId) -> EntityTag {
        match &model.node(id).kind {
            EntityKind::Namespace(_) => EntityTag::Namespace,
            EntityKind::Class(_) => EntityTag::Class,
            EntityKind::Enum(_) => EntityTag::Enum,
            EntityKind::Function(def) => match def.kind {
                FunctionKind::Free => EntityTag::Free,
                FunctionKind::Static => EntityTag::Static,
                FunctionKind::Method { .. } => EntityTag::Method,
                FunctionKind::Constructor { .. } => EntityTag::Constructor,
                FunctionKind::Destructor => EntityTag::Destructor,
            },
        }
    }

    /// Whether nodes of this tag contain recursable items.
    pub fn is_module(self) -> bool {
        matches!(
            self,
            EntityTag::Module | EntityTag::Namespace | EntityTag::Class
        )
    }
}

impl NodeKind for EntityTag {
    fn ancestry(self) -> &'static [EntityTag] {
        match self {
            EntityTag::Module => &[EntityTag::Module],
            EntityTag::Namespace => &[EntityTag::Namespace, EntityTag::Module],
            EntityTag::Class => &[EntityTag::Class, EntityTag::Module],
            EntityTag::Enum => &[EntityTag::Enum],
            EntityTag::Function => &[EntityTag::Function],
            EntityTag::Free => &[EntityTag::Free, EntityTag::Function],
            EntityTag::Static => &[EntityTag::Static, EntityTag::Function],
            EntityTag::Method => &[EntityTag::Method, EntityTag::Function],
            EntityTag::Constructor => &[
                EntityTag::Constructor,
                EntityTag::Static,
                EntityTag::Function,
            ],
            EntityTag::Destructor => &[
                EntityTag::Destructor,
                EntityTag::Method,
                EntityTag::Function,
            ],
        }
    }
}

/// Dispatch tag of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Void,
    Bool,
    Scalar,
    Str,
    Opt,
    Ref,
    Ptr,
    Class,
    Enum,
}

impl TypeTag {
    /// Tag of a concrete type.
    pub fn of(ty: &Type) -> TypeTag {
        match ty {
            Type::Void => TypeTag::Void,
            Type::Bool => TypeTag::Bool,
            Type::Scalar(_) => TypeTag::Scalar,
            Type::Str { .. } => TypeTag::Str,
            Type::Opt { .. } => TypeTag::Opt,
            Type::Ref { .. } => TypeTag::Ref,
            Type::Ptr(_) => TypeTag::Ptr,
            Type::Class(_) => TypeTag::Class,
            Type::Enum(_) => TypeTag::Enum,
        }
    }
}

impl NodeKind for TypeTag {
    fn ancestry(self) -> &'static [TypeTag] {
        match self {
            TypeTag::Void => &[TypeTag::Void],
            TypeTag::Bool => &[TypeTag::Bool],
            TypeTag::Scalar => &[TypeTag::Scalar],
            TypeTag::Str => &[TypeTag::Str],
            TypeTag::Opt => &[TypeTag::Opt],
            TypeTag::Ref => &[TypeTag::Ref],
            // A pointer dispatches like a reference when nothing more
            // specific is registered; their boundary shapes agree.
            TypeTag::Ptr => &[TypeTag::Ptr, TypeTag::Ref],
            TypeTag::Class => &[TypeTag::Class],
            TypeTag::Enum => &[TypeTag::Enum],
        }
    }
}
