//! Rust FFI backend: the raw and proxy layers of `ffi.rs`.
//!
//! The raw layer declares one `extern "C"` function per boundary entry
//! point in strictly ABI-safe shapes, grouped in a non-public module and
//! sorted by mangled flat name. The proxy layer wraps each raw declaration
//! in a same-named `unsafe` function performing the marshalling protocol;
//! only proxies are called by higher layers.

use std::fs;
use std::path::Path;

use bindweld_core::{Direction, EntityId, EntityKind, Lang, Model, Type};
use bindweld_registry::{EntityTag, FunctionAggregator, Registry, TypeAggregator, TypeTag};

use crate::error::GenerateError;
use crate::marshal::{Conversion, rust_conversion};
use crate::writer::CodeWriter;

type FnEmitter = fn(&Model, &mut CodeWriter, EntityId, usize) -> Result<(), GenerateError>;
type TyEmitter = fn(&Model, &mut CodeWriter, &Type);

/// The `ffi.rs` generator.
pub struct RustFfiBackend;

impl RustFfiBackend {
    /// Render and write `ffi.rs` under `dest`.
    pub fn generate(model: &Model, dest: &Path) -> Result<(), GenerateError> {
        fs::create_dir_all(dest).map_err(|e| GenerateError::io(dest, e))?;
        let text = render(model)?;
        let path = dest.join("ffi.rs");
        fs::write(&path, text).map_err(|e| GenerateError::io(&path, e))?;
        tracing::info!(dest = %dest.display(), "generated Rust FFI module");
        Ok(())
    }
}

/// Mangled entry-point name: the flat path of the function.
pub fn raw_name(model: &Model, func: EntityId) -> String {
    model.flat_path(func)
}

/// Namespace path the proxy lives under (class segments excluded).
pub fn namespace_path(model: &Model, func: EntityId) -> Vec<String> {
    let mut current = model.node(func).parent;
    while let Some(id) = current {
        if matches!(model.node(id).kind, EntityKind::Namespace(_)) {
            return model.path(id);
        }
        current = model.node(id).parent;
    }
    Vec::new()
}

/// Proxy function name: the flat path relative to the owning namespace.
pub fn proxy_name(model: &Model, func: EntityId) -> String {
    let ns_depth = namespace_path(model, func).len();
    model.path(func)[ns_depth..].join("_")
}

/// Full call path of a proxy from inside the generated library crate.
pub fn proxy_call_path(model: &Model, func: EntityId) -> String {
    let mut path = vec!["crate".to_string(), "ffi".to_string()];
    path.extend(namespace_path(model, func));
    path.push(proxy_name(model, func));
    path.join("::")
}

/// Surface type of a proxy parameter.
fn proxy_arg_type(model: &Model, ty: &Type, prefix: &[&str]) -> String {
    match ty {
        Type::Bool => "bool".into(),
        Type::Scalar(s) => s.rust_lib_name().into(),
        Type::Str { .. } => "&str".into(),
        Type::Opt { subtype, .. } => {
            format!("Option<{}>", proxy_arg_type(model, subtype, prefix))
        }
        other => other.ffi_name(model, Lang::Rust, prefix),
    }
}

/// Surface type of a proxy result. Strings and optionals pass through in
/// boundary form; only inline-convertible results change spelling.
fn proxy_ret_type(model: &Model, ty: &Type, prefix: &[&str]) -> Option<String> {
    match ty {
        Type::Void => None,
        Type::Bool => Some("bool".into()),
        Type::Scalar(s) => Some(s.rust_lib_name().into()),
        other => Some(other.ffi_name(model, Lang::Rust, prefix)),
    }
}

fn type_registry() -> Registry<'static, TypeTag, TyEmitter> {
    let mut reg: Registry<'static, TypeTag, TyEmitter> = Registry::new("type");
    reg.register(Lang::Rust, TypeTag::Class, emit_class_def);
    reg.register(Lang::Rust, TypeTag::Str, emit_string_def);
    reg.register(Lang::Rust, TypeTag::Enum, emit_enum_def);
    reg
}

fn function_registry() -> Registry<'static, EntityTag, FnEmitter> {
    let mut reg: Registry<'static, EntityTag, FnEmitter> = Registry::new("function");
    // One proxy shape serves every function kind; the implicit instance
    // argument and constructor return are already part of the boundary
    // signature. Ancestry dispatch routes the concrete kinds here.
    reg.register(Lang::Rust, EntityTag::Function, emit_proxy);
    reg
}

fn render(model: &Model) -> Result<String, GenerateError> {
    let mut w = CodeWriter::new();
    w.line("#![allow(dead_code)]");
    w.line("#![allow(non_camel_case_types)]");
    w.line("#![allow(non_snake_case)]");

    // Boundary type definitions, first-reachable order.
    let types = type_registry();
    for ty in TypeAggregator::collect(model, Lang::Rust) {
        if let Some(emit) = types.get(Lang::Rust, TypeTag::of(&ty)) {
            emit(model, &mut w, &ty);
        }
    }

    // Raw declarations, sorted by mangled name.
    let mut funcs = FunctionAggregator::collect(model);
    funcs.sort_by_key(|func| raw_name(model, *func));
    w.blank();
    w.open("mod raw");
    w.open("unsafe extern \"C\"");
    for func in &funcs {
        emit_raw_decl(model, &mut w, *func);
    }
    w.close("}");
    w.close("}");

    // Proxy layer, grouped by namespace, deterministic traversal order.
    let registry = function_registry();
    emit_proxy_mod(model, &mut w, &registry, model.root(), 0)?;

    Ok(w.finish())
}

fn emit_class_def(model: &Model, w: &mut CodeWriter, ty: &Type) {
    w.blank();
    w.line("#[repr(C)]");
    w.line(format!("pub struct {};", ty.flat_name(model)));
}

fn emit_string_def(model: &Model, w: &mut CodeWriter, ty: &Type) {
    let qual = match ty {
        Type::Str { is_const: true } => "*const",
        _ => "*mut",
    };
    w.blank();
    w.line("#[repr(C)]");
    w.line("#[derive(Clone, Copy)]");
    w.open(format!("pub struct {}", ty.flat_name(model)));
    w.line(format!("pub data: {qual} libc::c_char,"));
    w.line("pub length: libc::size_t,");
    w.close("}");
}

fn emit_enum_def(model: &Model, w: &mut CodeWriter, ty: &Type) {
    w.blank();
    w.line(format!("pub type {} = libc::c_int;", ty.flat_name(model)));
}

fn emit_raw_decl(model: &Model, w: &mut CodeWriter, func: EntityId) {
    let args: Vec<String> = model
        .boundary_args(func)
        .iter()
        .map(|arg| {
            format!(
                "{}: {}",
                arg.name,
                arg.ty.ffi_name(model, Lang::Rust, &["super"])
            )
        })
        .collect();
    let ret = match model.boundary_ret(func) {
        Type::Void => String::new(),
        ty => format!(" -> {}", ty.ffi_name(model, Lang::Rust, &["super"])),
    };
    w.line(format!(
        "pub fn {}({}){ret};",
        raw_name(model, func),
        args.join(", ")
    ));
}

fn emit_proxy_mod(
    model: &Model,
    w: &mut CodeWriter,
    registry: &Registry<'_, EntityTag, FnEmitter>,
    id: EntityId,
    depth: usize,
) -> Result<(), GenerateError> {
    for item in model.sorted_items(id) {
        match &model.node(item).kind {
            EntityKind::Namespace(_) => {
                w.blank();
                w.open(format!("pub mod {}", model.name(item)));
                emit_proxy_mod(model, w, registry, item, depth + 1)?;
                w.close("}");
            }
            EntityKind::Class(_) => {
                // Class members proxy into the enclosing namespace module
                // under their mangled names.
                emit_proxy_mod(model, w, registry, item, depth)?;
            }
            EntityKind::Function(_) => {
                let emit = registry.require(Lang::Rust, EntityTag::of(model, item))?;
                emit(model, w, item, depth)?;
            }
            EntityKind::Enum(_) => {}
        }
    }
    Ok(())
}

/// One proxy: same-named wrapper converting arguments, forwarding to the
/// raw declaration and converting the result.
fn emit_proxy(
    model: &Model,
    w: &mut CodeWriter,
    func: EntityId,
    depth: usize,
) -> Result<(), GenerateError> {
    // `depth` supers climb back to the ffi module, where the boundary
    // types and the raw module live.
    let supers: Vec<&str> = std::iter::repeat_n("super", depth).collect();
    let args = model.boundary_args(func);

    let mut params = Vec::with_capacity(args.len());
    for arg in &args {
        params.push(format!(
            "{}: {}",
            arg.name,
            proxy_arg_type(model, &arg.ty, &supers)
        ));
    }
    let ret_ty = model.boundary_ret(func);
    let ret = proxy_ret_type(model, &ret_ty, &supers)
        .map(|ty| format!(" -> {ty}"))
        .unwrap_or_default();

    w.blank();
    w.line(format!("// {}", model.qualified_name(func)));
    w.line("#[inline(always)]");
    w.open(format!(
        "pub unsafe fn {}({}){ret}",
        proxy_name(model, func),
        params.join(", ")
    ));

    let mut call_args = Vec::with_capacity(args.len());
    for arg in &args {
        match rust_conversion(model, &arg.ty, Direction::In, &supers) {
            Some(Conversion::Inline(apply)) => {
                let value = apply(w, &arg.name);
                w.line(format!("let {} = {value};", arg.name));
                call_args.push(arg.name.clone());
            }
            Some(Conversion::Complex(apply)) => {
                apply(w, &arg.name, &arg.name);
                call_args.push(arg.name.clone());
            }
            None => call_args.push(arg.name.clone()),
        }
    }

    let raw_path = if supers.is_empty() {
        "raw".to_string()
    } else {
        format!("{}::raw", supers.join("::"))
    };
    let mut call = format!(
        "{raw_path}::{}({})",
        raw_name(model, func),
        call_args.join(", ")
    );
    if let Some(Conversion::Inline(apply)) =
        rust_conversion(model, &ret_ty, Direction::Out, &supers)
    {
        call = apply(w, &call);
    }
    w.line(format!("unsafe {{ {call} }}"));
    w.close("}");
    Ok(())
}
