//! Rust library backend.
//!
//! Produces the idiomatic, ownership- and inheritance-aware wrapper crate:
//! a module tree mirroring each entity's logical placement, three layered
//! traits per class (raw access / ownership transfer / user-facing
//! methods), a concrete handle struct with destructor-gated `Drop`, and
//! bidirectional enum conversions. Depends on the FFI backend's naming for
//! every proxy call.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bindweld_core::{
    DescriptionError, Direction, EntityId, EntityKind, FunctionKind, Lang, Model, PtrNull, Type,
};
use bindweld_registry::{EntityTag, Flow, Registry, walk};

use crate::error::GenerateError;
use crate::rust_ffi::proxy_call_path;
use crate::writer::CodeWriter;

type FnEmitter =
    fn(&Model, &mut CodeWriter, EntityId) -> Result<(), GenerateError>;

/// The wrapper-library generator.
pub struct RustLibBackend;

impl RustLibBackend {
    /// Render and write `lib.rs`, `traits.rs` and the module tree under
    /// `dest`. Expects the FFI backend to have produced `ffi.rs` beside
    /// them.
    pub fn generate(model: &Model, dest: &Path) -> Result<(), GenerateError> {
        for (path, text) in render_all(model, dest)? {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| GenerateError::io(parent, e))?;
            }
            fs::write(&path, text).map_err(|e| GenerateError::io(&path, e))?;
        }
        tracing::info!(dest = %dest.display(), "generated Rust library tree");
        Ok(())
    }
}

/// Every artifact of the library tree, fully rendered before any I/O.
fn render_all(model: &Model, dest: &Path) -> Result<Vec<(PathBuf, String)>, GenerateError> {
    let tree = ModTree::build(model);
    let mut files: Vec<(PathBuf, String)> = Vec::new();
    files.push((dest.join("lib.rs"), render_lib_entry(model, &tree)?));
    files.push((dest.join("traits.rs"), render_traits(model)));
    render_tree(model, &tree, dest, &mut files)?;
    Ok(files)
}

// ============================================================================
// Module tree
// ============================================================================

/// Logical module tree: classes, enums and free functions placed at their
/// effective module path.
#[derive(Debug, Default)]
struct ModTree {
    subtrees: BTreeMap<String, ModTree>,
    items: Vec<EntityId>,
}

impl ModTree {
    fn build(model: &Model) -> ModTree {
        let mut tree = ModTree::default();
        walk(model, model.root(), &mut |id| {
            let is_item = match &model.node(id).kind {
                EntityKind::Class(_) | EntityKind::Enum(_) => true,
                EntityKind::Function(def) => matches!(def.kind, FunctionKind::Free),
                EntityKind::Namespace(_) => false,
            };
            if is_item {
                tree.insert(&model.modpath(id), id);
            }
            Flow::Continue
        });
        tree
    }

    fn insert(&mut self, path: &[String], item: EntityId) {
        match path.split_first() {
            None => self.items.push(item),
            Some((head, rest)) => self
                .subtrees
                .entry(head.clone())
                .or_default()
                .insert(rest, item),
        }
    }
}

fn render_lib_entry(model: &Model, tree: &ModTree) -> Result<String, GenerateError> {
    let mut w = CodeWriter::new();
    w.line("#![allow(non_camel_case_types)]");
    w.line("#![allow(non_snake_case)]");
    w.line("#![allow(non_upper_case_globals)]");
    w.blank();
    w.line("pub mod ffi;");
    w.line("pub mod traits;");
    for name in tree.subtrees.keys() {
        w.line(format!("pub mod {name};"));
    }
    render_items(model, tree, &mut w)?;
    Ok(w.finish())
}

/// The `traits` re-export surface: every capability trait of every class.
fn render_traits(model: &Model) -> String {
    let mut classes: Vec<EntityId> = Vec::new();
    walk(model, model.root(), &mut |id| {
        if model.class_def(id).is_some() {
            classes.push(id);
        }
        Flow::Continue
    });
    classes.sort_by_key(|id| model.qualified_name(*id));

    let mut w = CodeWriter::new();
    for class in classes {
        let mut path = vec!["crate".to_string()];
        path.extend(model.modpath(class));
        let name = model.name(class);
        let mut names = vec![format!("{name}Obj"), format!("{name}Ext")];
        if model.destructor_of(class).is_some() {
            names.insert(1, format!("{name}Owned"));
        }
        w.line(format!(
            "pub use {}::{{{}}};",
            path.join("::"),
            names.join(", ")
        ));
    }
    w.finish()
}

fn render_tree(
    model: &Model,
    tree: &ModTree,
    dir: &Path,
    files: &mut Vec<(PathBuf, String)>,
) -> Result<(), GenerateError> {
    for (name, subtree) in &tree.subtrees {
        if subtree.subtrees.is_empty() {
            let mut w = CodeWriter::new();
            render_items(model, subtree, &mut w)?;
            files.push((dir.join(format!("{name}.rs")), w.finish()));
        } else {
            let subdir = dir.join(name);
            let mut w = CodeWriter::new();
            for child in subtree.subtrees.keys() {
                w.line(format!("pub mod {child};"));
            }
            render_items(model, subtree, &mut w)?;
            files.push((subdir.join("mod.rs"), w.finish()));
            render_tree(model, subtree, &subdir, files)?;
        }
    }
    Ok(())
}

/// Items of one module: enums, then classes, then free functions, each
/// group sorted by name.
fn render_items(model: &Model, tree: &ModTree, w: &mut CodeWriter) -> Result<(), GenerateError> {
    let registry = function_registry();

    let mut sorted = tree.items.clone();
    sorted.sort_by_key(|id| model.name(*id).to_string());

    for id in sorted.iter().filter(|id| model.enum_def(**id).is_some()) {
        render_enum(model, w, *id);
    }
    for id in sorted.iter().filter(|id| model.class_def(**id).is_some()) {
        render_class(model, w, &registry, *id)?;
    }
    for id in sorted.iter().filter(|id| model.function_def(**id).is_some()) {
        let emit = registry.require(Lang::RustLib, EntityTag::of(model, *id))?;
        emit(model, w, *id)?;
    }
    Ok(())
}

fn function_registry() -> Registry<'static, EntityTag, FnEmitter> {
    let mut reg: Registry<'static, EntityTag, FnEmitter> = Registry::new("function");
    reg.register(Lang::RustLib, EntityTag::Free, emit_free_fn);
    reg.register(Lang::RustLib, EntityTag::Static, emit_static_fn);
    reg.register(Lang::RustLib, EntityTag::Constructor, emit_constructor_fn);
    reg.register(Lang::RustLib, EntityTag::Method, emit_ext_method);
    reg
}

// ============================================================================
// Naming
// ============================================================================

/// `camelCase`/`PascalCase` to `snake_case`.
fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_ascii_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = i + 1 < chars.len() && chars[i + 1].is_ascii_lowercase();
            if i > 0 && chars[i - 1] != '_' && (prev_lower || next_lower) {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `crate::<modpath>::<Name><suffix>` for a class's trait or struct.
fn class_path(model: &Model, class: EntityId, suffix: &str) -> String {
    let mut path = vec!["crate".to_string()];
    path.extend(model.modpath(class));
    path.push(format!("{}{suffix}", model.name(class)));
    path.join("::")
}

/// `crate::ffi::<flat>` boundary type of a class.
fn ffi_type_path(model: &Model, class: EntityId) -> String {
    format!("crate::ffi::{}", model.flat_path(class))
}

/// Raw accessor name of a class's inner trait.
fn inner_method(model: &Model, class: EntityId) -> String {
    format!("inner_{}", model.flat_path(class))
}

/// Consuming accessor name of a class's owned trait.
fn into_inner_method(model: &Model, class: EntityId) -> String {
    format!("into_inner_{}", model.flat_path(class))
}

// ============================================================================
// Enums
// ============================================================================

/// An idiomatic enum plus bidirectional integer conversions. Aliases never
/// become second discriminants; they resolve at generation time into
/// associated constants.
fn render_enum(model: &Model, w: &mut CodeWriter, id: EntityId) {
    let def = model.enum_def(id).expect("enum entity");
    let name = model.name(id);
    let distinct = def.distinct_values();

    w.blank();
    w.line("#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
    w.open(format!("pub enum {name}"));
    for (symbol, value) in &distinct {
        w.line(format!("{symbol} = {value},"));
    }
    w.close("}");

    w.blank();
    w.open(format!("impl {name}"));

    let mut first = true;
    for (symbol, value) in def.resolved_values() {
        if distinct.iter().any(|(s, _)| *s == symbol) {
            continue;
        }
        let canonical = distinct
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(s, _)| *s)
            .expect("alias target resolved");
        if first {
            first = false;
        }
        w.line(format!("pub const {symbol}: {name} = {name}::{canonical};"));
    }
    if !first {
        w.blank();
    }

    w.open("pub fn to_ffi(self) -> libc::c_int");
    w.open("match self");
    for (symbol, value) in &distinct {
        w.line(format!("{name}::{symbol} => {value},"));
    }
    w.close("}");
    w.close("}");
    w.blank();
    w.open(format!("pub fn from_ffi(value: libc::c_int) -> {name}"));
    w.open("match i64::from(value)");
    for (symbol, value) in &distinct {
        w.line(format!("{value} => {name}::{symbol},"));
    }
    w.line(format!(
        "other => panic!(\"{}::from_ffi: unknown value {{other}}\"),",
        model.qualified_name(id)
    ));
    w.close("}");
    w.close("}");
    w.close("}");
}

// ============================================================================
// Classes
// ============================================================================

fn render_class(
    model: &Model,
    w: &mut CodeWriter,
    registry: &Registry<'_, EntityTag, FnEmitter>,
    class: EntityId,
) -> Result<(), GenerateError> {
    let name = model.name(class).to_string();
    let ffi_ty = ffi_type_path(model, class);
    let inner = inner_method(model, class);
    let dtor = model.destructor_of(class);
    tracing::debug!(class = %model.qualified_name(class), "emitting wrapper");

    let items = model.sorted_items(class);
    let methods: Vec<EntityId> = items
        .iter()
        .copied()
        .filter(|id| {
            matches!(
                model.function_def(*id).map(|def| def.kind),
                Some(FunctionKind::Method { .. })
            )
        })
        .collect();
    let statics: Vec<EntityId> = items
        .iter()
        .copied()
        .filter(|id| {
            matches!(
                model.function_def(*id).map(|def| def.kind),
                Some(FunctionKind::Static | FunctionKind::Constructor { .. })
            )
        })
        .collect();

    // Inner trait: raw boundary access, hidden from consumers.
    w.blank();
    w.open(format!("pub trait {name}Obj"));
    w.line("#[doc(hidden)]");
    w.line(format!("fn {inner}(&self) -> *mut {ffi_ty};"));
    w.close("}");

    // Owned trait: the ownership-transfer primitive. Only meaningful when
    // something would otherwise run the destructor.
    if dtor.is_some() {
        let into = into_inner_method(model, class);
        w.blank();
        w.open(format!("pub trait {name}Owned: {name}Obj + Sized"));
        w.line("#[doc(hidden)]");
        w.line(format!("fn {into}(self) -> *mut {ffi_ty};"));
        w.close("}");
    }

    // Ext trait: every instance method, blanket-implemented so each
    // descendant gains every ancestor's methods through its Obj impls.
    w.blank();
    w.open(format!("pub trait {name}Ext: {name}Obj"));
    for method in &methods {
        let emit = registry.require(Lang::RustLib, EntityTag::of(model, *method))?;
        emit(model, w, *method)?;
    }
    w.close("}");
    w.blank();
    w.line(format!("impl<T: {name}Obj + ?Sized> {name}Ext for T {{}}"));

    // Concrete handle.
    w.blank();
    if dtor.is_none() {
        w.line("#[derive(Clone, Copy)]");
    }
    w.open(format!("pub struct {name}"));
    w.line(format!("inner: ::std::ptr::NonNull<{ffi_ty}>,"));
    if dtor.is_some() {
        w.line("owned: bool,");
    }
    w.close("}");

    // Inherent impl: raw wrap, statics, constructors.
    w.blank();
    w.open(format!("impl {name}"));
    if dtor.is_some() {
        w.open(format!(
            "pub unsafe fn from_inner(inner: *mut {ffi_ty}, owned: bool) -> {name}"
        ));
        w.open(name.to_string());
        w.line("inner: unsafe { ::std::ptr::NonNull::new_unchecked(inner) },");
        w.line("owned,");
        w.close("}");
        w.close("}");
    } else {
        w.open(format!(
            "pub unsafe fn from_inner(inner: *mut {ffi_ty}) -> {name}"
        ));
        w.open(name.to_string());
        w.line("inner: unsafe { ::std::ptr::NonNull::new_unchecked(inner) },");
        w.close("}");
        w.close("}");
    }
    for func in &statics {
        let emit = registry.require(Lang::RustLib, EntityTag::of(model, *func))?;
        emit(model, w, *func)?;
    }
    w.close("}");

    // Own inner impl.
    w.blank();
    w.open(format!("impl {name}Obj for {name}"));
    w.open(format!("fn {inner}(&self) -> *mut {ffi_ty}"));
    w.line("self.inner.as_ptr()");
    w.close("}");
    w.close("}");

    if dtor.is_some() {
        let into = into_inner_method(model, class);
        w.blank();
        w.open(format!("impl {name}Owned for {name}"));
        w.open(format!("fn {into}(self) -> *mut {ffi_ty}"));
        w.line("let inner = self.inner.as_ptr();");
        w.line("::std::mem::forget(self);");
        w.line("inner");
        w.close("}");
        w.close("}");
    }

    // Ancestor inner impls: reinterpret the pointer for every class in the
    // upcast chain. Sound only while the base subobject sits at offset
    // zero; the generator never checks native layout.
    for base in model.upcast_chain(class) {
        let base_obj = class_path(model, base, "Obj");
        let base_inner = inner_method(model, base);
        let base_ffi = ffi_type_path(model, base);
        w.blank();
        w.open(format!("impl {base_obj} for {name}"));
        w.open(format!("fn {base_inner}(&self) -> *mut {base_ffi}"));
        w.line("self.inner.as_ptr().cast()");
        w.close("}");
        w.close("}");
    }

    // Drop: generated iff a destructor resolves, gated on `owned` so a
    // borrowed handle never destroys the native object.
    if let Some(dtor) = dtor {
        let dtor_class = model.node(dtor).parent.expect("destructor without class");
        let ptr = if dtor_class == class {
            "self.inner.as_ptr()".to_string()
        } else {
            "self.inner.as_ptr().cast()".to_string()
        };
        w.blank();
        w.open(format!("impl Drop for {name}"));
        w.open("fn drop(&mut self)");
        w.open("if self.owned");
        w.line(format!(
            "unsafe {{ {}({ptr}) }}",
            proxy_call_path(model, dtor)
        ));
        w.close("}");
        w.close("}");
        w.close("}");
    }

    Ok(())
}

// ============================================================================
// Functions
// ============================================================================

/// Surface spelling of a declared parameter.
fn param_type(model: &Model, ty: &Type) -> Result<String, GenerateError> {
    match ty {
        Type::Bool | Type::Scalar(_) | Type::Str { .. } | Type::Enum(_) => {
            Ok(ty.lib_name(model))
        }
        Type::Opt { subtype, .. } => {
            Ok(format!("Option<{}>", param_type(model, subtype)?))
        }
        Type::Ptr(p) => match p.subtype.as_ref() {
            Type::Class(class) => {
                if p.owned {
                    Ok(format!("impl {}", class_path(model, *class, "Owned")))
                } else {
                    Ok(format!("&impl {}", class_path(model, *class, "Obj")))
                }
            }
            _ => Ok(ty.ffi_name(model, Lang::Rust, &["crate", "ffi"])),
        },
        Type::Ref { subtype, .. } => match subtype.as_ref() {
            Type::Class(class) => Ok(format!("&impl {}", class_path(model, *class, "Obj"))),
            _ => Ok(ty.ffi_name(model, Lang::Rust, &["crate", "ffi"])),
        },
        Type::Void | Type::Class(_) => Err(GenerateError::Description(
            DescriptionError::UnsupportedType {
                detail: format!("'{}' cannot cross by value", ty.cpp_name(model)),
            },
        )),
    }
}

/// Expression forwarding a declared argument to the proxy.
fn argument_expr(model: &Model, ty: &Type, name: &str) -> String {
    match ty {
        Type::Enum(_) => ty.transform(model, Lang::RustLib, name, Direction::In),
        Type::Opt { subtype, .. } => match subtype.as_ref() {
            Type::Ptr(p) => match p.subtype.as_ref() {
                Type::Class(class) => format!(
                    "{name}.map(|value| value.{}())",
                    inner_method(model, *class)
                ),
                _ => name.to_string(),
            },
            _ => name.to_string(),
        },
        Type::Ptr(p) => match p.subtype.as_ref() {
            Type::Class(class) => {
                if p.owned {
                    format!("{name}.{}()", into_inner_method(model, *class))
                } else if p.is_const {
                    format!("{name}.{}() as *const _", inner_method(model, *class))
                } else {
                    format!("{name}.{}()", inner_method(model, *class))
                }
            }
            _ => name.to_string(),
        },
        Type::Ref { subtype, is_const } => match subtype.as_ref() {
            Type::Class(class) => {
                if *is_const {
                    format!("{name}.{}() as *const _", inner_method(model, *class))
                } else {
                    format!("{name}.{}()", inner_method(model, *class))
                }
            }
            _ => name.to_string(),
        },
        _ => name.to_string(),
    }
}

/// Surface spelling of a result, with its wrap strategy.
enum RetShape {
    /// No return value.
    Unit,
    /// Proxy result is already the surface value.
    Direct(String),
    /// Integer result converted through the enum pairing.
    Enum(String, Type),
    /// Descriptor result materialized into an owned `String`.
    Text,
    /// Class pointer wrapped into the concrete handle.
    Handle {
        spelling: String,
        class: EntityId,
        owned: bool,
        null: PtrNull,
        is_const: bool,
    },
}

fn ret_shape(model: &Model, func: EntityId, ty: &Type) -> Result<RetShape, GenerateError> {
    match ty {
        Type::Void => Ok(RetShape::Unit),
        Type::Bool | Type::Scalar(_) => Ok(RetShape::Direct(ty.lib_name(model))),
        Type::Enum(_) => Ok(RetShape::Enum(ty.lib_name(model), ty.clone())),
        Type::Str { .. } => Ok(RetShape::Text),
        Type::Ptr(p) => match p.subtype.as_ref() {
            Type::Class(class) => {
                let struct_path = class_path(model, *class, "");
                let spelling = match p.null {
                    PtrNull::Option => format!("Option<{struct_path}>"),
                    PtrNull::Panic => struct_path,
                };
                Ok(RetShape::Handle {
                    spelling,
                    class: *class,
                    owned: p.owned,
                    null: p.null,
                    is_const: p.is_const,
                })
            }
            _ => Ok(RetShape::Direct(
                ty.ffi_name(model, Lang::Rust, &["crate", "ffi"]),
            )),
        },
        Type::Ref { subtype, is_const } => match subtype.as_ref() {
            // A reference result is contractually non-null.
            Type::Class(class) => Ok(RetShape::Handle {
                spelling: class_path(model, *class, ""),
                class: *class,
                owned: false,
                null: PtrNull::Panic,
                is_const: *is_const,
            }),
            _ => Ok(RetShape::Direct(
                ty.ffi_name(model, Lang::Rust, &["crate", "ffi"]),
            )),
        },
        Type::Opt { .. } | Type::Class(_) => Err(GenerateError::Description(
            DescriptionError::UnsupportedType {
                detail: format!(
                    "unsupported result type for '{}'",
                    model.qualified_name(func)
                ),
            },
        )),
    }
}

/// The wrap expression for a freshly returned class pointer. Ownership is
/// taken iff the call is a constructor or the return is marked owning.
fn wrap_handle(model: &Model, class: EntityId, owned: bool, expr: &str) -> String {
    let struct_path = class_path(model, class, "");
    if model.destructor_of(class).is_some() {
        format!("unsafe {{ {struct_path}::from_inner({expr}, {owned}) }}")
    } else {
        format!("unsafe {{ {struct_path}::from_inner({expr}) }}")
    }
}

/// Shared function-body emission for every surface flavor.
fn emit_surface_fn(
    model: &Model,
    w: &mut CodeWriter,
    func: EntityId,
    receiver: Option<&str>,
    public: bool,
) -> Result<(), GenerateError> {
    let def = model.function_def(func).expect("function entity");
    let name = snake_case(model.name(func));
    let ret_ty = model.boundary_ret(func);
    let shape = ret_shape(model, func, &ret_ty)?;

    let mut params = Vec::new();
    if let Some(receiver) = receiver {
        params.push(receiver.to_string());
    }
    for arg in &def.args {
        params.push(format!(
            "{}: {}",
            snake_case(&arg.name),
            param_type(model, &arg.ty)?
        ));
    }

    let ret_spelling = match &shape {
        RetShape::Unit => None,
        RetShape::Direct(s) => Some(s.clone()),
        RetShape::Enum(s, _) => Some(s.clone()),
        RetShape::Text => Some("String".to_string()),
        RetShape::Handle { spelling, .. } => Some(spelling.clone()),
    };
    let ret_suffix = ret_spelling
        .map(|s| format!(" -> {s}"))
        .unwrap_or_default();
    let vis = if public { "pub " } else { "" };

    w.blank();
    w.open(format!("{vis}fn {name}({}){ret_suffix}", params.join(", ")));

    // Proxy call arguments.
    let mut call_args = Vec::new();
    if receiver.is_some() {
        let class = model.node(func).parent.expect("method without class");
        let is_const = matches!(def.kind, FunctionKind::Method { is_const: true });
        let mut inst = format!("self.{}()", inner_method(model, class));
        if is_const {
            inst.push_str(" as *const _");
        }
        call_args.push(inst);
    }
    for arg in &def.args {
        call_args.push(argument_expr(model, &arg.ty, &snake_case(&arg.name)));
    }

    let call = format!(
        "{}({})",
        proxy_call_path(model, func),
        call_args.join(", ")
    );

    match shape {
        RetShape::Unit => {
            w.line(format!("unsafe {{ {call} }}"));
        }
        RetShape::Direct(_) => {
            w.line(format!("unsafe {{ {call} }}"));
        }
        RetShape::Enum(_, ty) => {
            w.line(format!("let ret = unsafe {{ {call} }};"));
            w.line(format!(
                "{}",
                ty.transform(model, Lang::RustLib, "ret", Direction::Out)
            ));
        }
        RetShape::Text => {
            w.line(format!("let ret = unsafe {{ {call} }};"));
            w.line(
                "let bytes = unsafe { ::std::slice::from_raw_parts(ret.data as *const u8, ret.length as usize) };",
            );
            w.line("unsafe { ::std::str::from_utf8_unchecked(bytes) }.to_owned()");
        }
        RetShape::Handle {
            class,
            owned,
            null,
            is_const,
            ..
        } => {
            w.line(format!("let ret = unsafe {{ {call} }};"));
            if is_const {
                w.line("let ret = ret as *mut _;");
            }
            match null {
                PtrNull::Panic => {
                    w.open("if ret.is_null()");
                    w.line(format!(
                        "panic!(\"{} returned null\");",
                        model.qualified_name(func)
                    ));
                    w.close("}");
                    w.line(wrap_handle(model, class, owned, "ret"));
                }
                PtrNull::Option => {
                    w.open("if ret.is_null()");
                    w.line("None");
                    w.chain("} else {");
                    w.line(format!("Some({})", wrap_handle(model, class, owned, "ret")));
                    w.close("}");
                }
            }
        }
    }
    w.close("}");
    Ok(())
}

/// Free function at module level.
fn emit_free_fn(model: &Model, w: &mut CodeWriter, func: EntityId) -> Result<(), GenerateError> {
    emit_surface_fn(model, w, func, None, true)
}

/// Static method inside the inherent impl.
fn emit_static_fn(model: &Model, w: &mut CodeWriter, func: EntityId) -> Result<(), GenerateError> {
    emit_surface_fn(model, w, func, None, true)
}

/// Constructor inside the inherent impl.
fn emit_constructor_fn(
    model: &Model,
    w: &mut CodeWriter,
    func: EntityId,
) -> Result<(), GenerateError> {
    emit_surface_fn(model, w, func, None, true)
}

/// Instance method as a default-dispatched ext-trait method.
fn emit_ext_method(model: &Model, w: &mut CodeWriter, func: EntityId) -> Result<(), GenerateError> {
    let receiver = match model.function_def(func).map(|def| def.kind) {
        Some(FunctionKind::Method { is_const: true }) => "&self",
        _ => "&mut self",
    };
    emit_surface_fn(model, w, func, Some(receiver), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindweld_core::{CtorNull, ModelBuilder, Scalar};

    fn render_file(model: &Model, name: &str) -> String {
        let files = render_all(model, Path::new("out")).unwrap();
        files
            .iter()
            .find(|(path, _)| path == &Path::new("out").join(name))
            .map(|(_, text)| text.clone())
            .unwrap_or_else(|| panic!("artifact {name} not rendered"))
    }

    fn sample() -> Model {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
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
    fn sample_end_to_end_surface() {
        let model = sample();
        let text = render_file(&model, "lib.rs");

        assert!(text.contains("pub struct Sample {"));
        assert!(text.contains("pub fn new(name: &str) -> crate::Sample {"));
        assert!(text.contains("fn say_hi(&self) {"));
        assert!(text.contains(
            "unsafe { crate::ffi::Sample_sayHi(self.inner_Sample() as *const _) }"
        ));
        assert!(text.contains("impl Drop for Sample {"));
        assert!(text.contains("unsafe { crate::ffi::Sample_delete(self.inner.as_ptr()) }"));
    }

    #[test]
    fn drop_is_gated_on_ownership() {
        let model = sample();
        let text = render_file(&model, "lib.rs");

        assert!(text.contains("if self.owned {"));
        assert!(text.contains("owned: bool,"));
    }

    #[test]
    fn class_without_destructor_is_copy_and_has_no_drop() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let class = builder.class(root, "View", &[]).unwrap();
        builder
            .method(class, "size", Type::Scalar(Scalar::U32), Vec::new(), true)
            .unwrap();
        let model = builder.finish().unwrap();
        let text = render_file(&model, "lib.rs");

        assert!(text.contains("#[derive(Clone, Copy)]"));
        assert!(!text.contains("impl Drop for View"));
        assert!(!text.contains("owned: bool,"));
        assert!(text.contains("pub unsafe fn from_inner(inner: *mut crate::ffi::View) -> View {"));
    }

    #[test]
    fn base_methods_are_reachable_through_the_derived_ext_trait() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let b1 = builder.class(root, "Drawable", &[]).unwrap();
        builder
            .method(b1, "draw", Type::Void, Vec::new(), false)
            .unwrap();
        let b2 = builder.class(root, "Updatable", &[]).unwrap();
        builder
            .method(b2, "update", Type::Void, Vec::new(), false)
            .unwrap();
        let derived = builder.class(root, "Sprite", &[b1, b2]).unwrap();
        builder.destructor(derived, "delete").unwrap();
        let model = builder.finish().unwrap();
        let text = render_file(&model, "lib.rs");

        // Sprite implements both base inner traits, so the blanket ext
        // impls expose draw() and update() on Sprite.
        assert!(text.contains("impl crate::DrawableObj for Sprite {"));
        assert!(text.contains("impl crate::UpdatableObj for Sprite {"));
        assert!(text.contains("impl<T: DrawableObj + ?Sized> DrawableExt for T {}"));
        assert!(text.contains("fn draw(&mut self) {"));
        assert!(text.contains("self.inner.as_ptr().cast()"));
    }

    #[test]
    fn null_policies_map_to_option_or_panic() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let class = builder.class(root, "Node", &[]).unwrap();
        let maybe = Type::Ptr(bindweld_core::PtrType {
            subtype: Box::new(Type::Class(class)),
            is_const: false,
            owned: false,
            null: PtrNull::Option,
        });
        let surely = Type::Ptr(bindweld_core::PtrType {
            subtype: Box::new(Type::Class(class)),
            is_const: false,
            owned: false,
            null: PtrNull::Panic,
        });
        builder
            .method(class, "parent", maybe, Vec::new(), true)
            .unwrap();
        builder
            .method(class, "rootNode", surely, Vec::new(), true)
            .unwrap();
        let model = builder.finish().unwrap();
        let text = render_file(&model, "lib.rs");

        assert!(text.contains("fn parent(&self) -> Option<crate::Node> {"));
        assert!(text.contains("None"));
        assert!(text.contains("fn root_node(&self) -> crate::Node {"));
        assert!(text.contains("panic!(\"Node::rootNode returned null\");"));
    }

    #[test]
    fn owned_parameters_consume_through_the_owned_trait() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let item = builder.class(root, "Item", &[]).unwrap();
        builder.destructor(item, "delete").unwrap();
        let bag = builder.class(root, "Bag", &[]).unwrap();
        let owned_item = Type::Ptr(bindweld_core::PtrType {
            subtype: Box::new(Type::Class(item)),
            is_const: false,
            owned: true,
            null: PtrNull::Panic,
        });
        builder
            .method(bag, "store", Type::Void, vec![(owned_item, "item")], false)
            .unwrap();
        let model = builder.finish().unwrap();
        let text = render_file(&model, "lib.rs");

        assert!(text.contains("fn store(&mut self, item: impl crate::ItemOwned) {"));
        assert!(text.contains("item.into_inner_Item()"));
        assert!(text.contains("pub trait ItemOwned: ItemObj + Sized {"));
        assert!(text.contains("::std::mem::forget(self);"));
    }

    #[test]
    fn enums_render_with_alias_consts_and_conversions() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let class = builder.class(root, "Type", &[]).unwrap();
        let e = builder.enum_type(class, "TypeID").unwrap();
        builder.value_at(e, "VoidTy", 0).unwrap();
        builder.value(e, "HalfTy").unwrap();
        builder.alias(e, "FirstTy", "VoidTy").unwrap();
        builder
            .method(class, "getTypeID", Type::Enum(e), Vec::new(), true)
            .unwrap();
        let model = builder.finish().unwrap();
        let text = render_file(&model, "lib.rs");

        assert!(text.contains("pub enum TypeID {"));
        assert!(text.contains("VoidTy = 0,"));
        assert!(text.contains("HalfTy = 1,"));
        assert!(!text.contains("FirstTy = 0,"));
        assert!(text.contains("pub const FirstTy: TypeID = TypeID::VoidTy;"));
        assert!(text.contains("TypeID::VoidTy => 0,"));
        assert!(text.contains("0 => TypeID::VoidTy,"));
        assert!(text.contains("fn get_type_id(&self) -> crate::TypeID {"));
        assert!(text.contains("crate::TypeID::from_ffi(ret)"));
    }

    #[test]
    fn module_tree_mirrors_modpaths() {
        let mut builder = ModelBuilder::new();
        let root = builder.root();
        let ns = builder.namespace(root, "llvm").unwrap();
        let ty = builder.class(ns, "Type", &[]).unwrap();
        builder
            .modpath(ty, bindweld_core::ModPath::Children(vec!["ty".into()]))
            .unwrap();
        builder.class(ns, "IntegerType", &[ty]).unwrap();
        builder
            .method(ty, "dump", Type::Void, Vec::new(), true)
            .unwrap();
        let model = builder.finish().unwrap();

        let files = render_all(&model, Path::new("out")).unwrap();
        let paths: Vec<String> = files
            .iter()
            .map(|(p, _)| p.display().to_string())
            .collect();
        assert!(paths.contains(&"out/llvm/ty.rs".to_string()));
        assert!(paths.contains(&"out/lib.rs".to_string()));

        // IntegerType has no override: it follows its first base into
        // llvm::ty, and implements the base trait from there.
        let ty_mod = render_file(&model, "llvm/ty.rs");
        assert!(ty_mod.contains("pub struct IntegerType {"));
        assert!(ty_mod.contains("impl crate::llvm::ty::TypeObj for IntegerType {"));

        let lib = render_file(&model, "lib.rs");
        assert!(lib.contains("pub mod llvm;"));
        let traits = render_file(&model, "traits.rs");
        assert!(traits.contains("pub use crate::llvm::ty::{IntegerTypeObj, IntegerTypeExt};"));
        assert!(traits.contains("pub use crate::llvm::ty::{TypeObj, TypeExt};"));
    }

    #[test]
    fn rendering_is_idempotent() {
        let model = sample();
        let a = render_all(&model, Path::new("out")).unwrap();
        let b = render_all(&model, Path::new("out")).unwrap();
        assert_eq!(a, b);
    }
}
