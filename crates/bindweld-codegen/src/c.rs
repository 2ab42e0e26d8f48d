//! C boundary backend.
//!
//! Emits the declarations header (`ffi.h`) and the shim translation unit
//! (`ffi.cpp`). Every class becomes an opaque alias that is transparent
//! under native compilation, every enum a parallel integer enum, and every
//! operation one `extern "C"` entry point marshalled per the protocol in
//! [`crate::marshal`].

use std::fs;
use std::path::Path;

use bindweld_core::{CtorNull, Direction, EntityId, FunctionKind, Lang, Model, Type};
use bindweld_registry::{EntityTag, FunctionAggregator, Registry, TypeAggregator, TypeTag};

use crate::error::GenerateError;
use crate::marshal::{Conversion, c_conversion};
use crate::writer::CodeWriter;

/// Emits one shim entry point. Registered per function kind.
type FnEmitter = fn(&Model, &mut CodeWriter, EntityId) -> Result<(), GenerateError>;

/// Emits one boundary type definition. Registered per type kind.
type TyEmitter = fn(&Model, &mut CodeWriter, &Type);

/// The C/C++ shim generator.
pub struct CBackend;

impl CBackend {
    /// Render and write `ffi.h` and `ffi.cpp` under `dest`.
    pub fn generate(model: &Model, dest: &Path) -> Result<(), GenerateError> {
        fs::create_dir_all(dest).map_err(|e| GenerateError::io(dest, e))?;

        let header = render_header(model)?;
        let unit = render_unit(model)?;

        let header_path = dest.join("ffi.h");
        fs::write(&header_path, header).map_err(|e| GenerateError::io(&header_path, e))?;
        let unit_path = dest.join("ffi.cpp");
        fs::write(&unit_path, unit).map_err(|e| GenerateError::io(&unit_path, e))?;

        tracing::info!(dest = %dest.display(), "generated C boundary shim");
        Ok(())
    }
}

fn function_registry() -> Registry<'static, EntityTag, FnEmitter> {
    let mut reg: Registry<'static, EntityTag, FnEmitter> = Registry::new("function");
    reg.register(Lang::C, EntityTag::Function, emit_plain_function);
    reg.register(Lang::C, EntityTag::Method, emit_method);
    reg.register(Lang::C, EntityTag::Constructor, emit_constructor);
    reg.register(Lang::C, EntityTag::Destructor, emit_destructor);
    reg
}

fn render_header(model: &Model) -> Result<String, GenerateError> {
    let mut w = CodeWriter::new();
    w.line("#ifndef FFI_H_");
    w.line("#define FFI_H_");
    w.blank();
    w.line("#ifdef __cplusplus");
    w.line("#include <string>");
    for include in model.all_includes() {
        w.line(format!("#include \"{include}\""));
    }
    w.line("#endif /* __cplusplus */");

    emit_type_defs(model, &mut w);

    let registry = function_registry();
    for func in FunctionAggregator::collect(model) {
        // Ensure an emitter exists even though the header only declares.
        registry.require(Lang::C, EntityTag::of(model, func))?;
        w.blank();
        w.line("extern \"C\"");
        w.line(format!("{};", shim_signature(model, func, false)?));
    }

    w.blank();
    w.line("#endif /* FFI_H_ */");
    Ok(w.finish())
}

fn render_unit(model: &Model) -> Result<String, GenerateError> {
    let mut w = CodeWriter::new();
    w.line("#include <string>");
    for include in model.all_includes() {
        w.line(format!("#include \"{include}\""));
    }

    emit_type_defs(model, &mut w);

    let registry = function_registry();
    for func in FunctionAggregator::collect(model) {
        let emit = registry.require(Lang::C, EntityTag::of(model, func))?;
        w.blank();
        w.line(format!("// {}", model.qualified_name(func)));
        emit(model, &mut w, func)?;
    }
    Ok(w.finish())
}

fn type_registry() -> Registry<'static, TypeTag, TyEmitter> {
    let mut reg: Registry<'static, TypeTag, TyEmitter> = Registry::new("type");
    reg.register(Lang::C, TypeTag::Class, emit_class_def);
    reg.register(Lang::C, TypeTag::Enum, emit_enum_def);
    reg.register(Lang::C, TypeTag::Str, emit_string_def);
    reg
}

fn emit_type_defs(model: &Model, w: &mut CodeWriter) {
    let registry = type_registry();
    for ty in TypeAggregator::collect(model, Lang::C) {
        if let Some(emit) = registry.get(Lang::C, TypeTag::of(&ty)) {
            emit(model, w, &ty);
        }
    }
}

/// Opaque alias: transparent under native compilation, opaque otherwise.
fn emit_class_def(model: &Model, w: &mut CodeWriter, ty: &Type) {
    let Type::Class(id) = ty else { return };
    let flat = ty.flat_name(model);
    let native = model.native_path(*id).join("::");
    w.blank();
    w.line("#ifdef __cplusplus");
    w.line(format!("typedef ::{native} {flat};"));
    w.line("#else");
    w.line(format!("typedef struct {{}} {flat};"));
    w.line("#endif /* __cplusplus */");
}

/// Parallel integer enum mirroring the declared values.
fn emit_enum_def(model: &Model, w: &mut CodeWriter, ty: &Type) {
    let Type::Enum(id) = ty else { return };
    let flat = ty.flat_name(model);
    let native = model.native_path(*id).join("::");
    let def = model.enum_def(*id).expect("enum entity");
    w.blank();
    w.line("#ifdef __cplusplus");
    w.line(format!("typedef ::{native} {flat};"));
    w.line("#else");
    w.open("typedef enum");
    for (name, value) in def.resolved_values() {
        w.line(format!("{flat}_{name} = {value},"));
    }
    w.close(format!("}} {flat};"));
    w.line("#endif /* __cplusplus */");
}

/// The `{pointer, length}` string descriptor.
fn emit_string_def(model: &Model, w: &mut CodeWriter, ty: &Type) {
    let Type::Str { is_const } = ty else { return };
    let flat = ty.flat_name(model);
    let qual = if *is_const { " const" } else { "" };
    w.blank();
    w.open("typedef struct");
    w.line(format!("char{qual}* data;"));
    w.line("size_t length;");
    w.close(format!("}} {flat};"));
}

/// `ret Flat_name(args)`. Complex-marshalled parameters get a `_` prefix in
/// the definition so the converted local can take the declared name.
fn shim_signature(model: &Model, func: EntityId, rename_complex: bool) -> Result<String, GenerateError> {
    let ret = model.boundary_ret(func).ffi_name(model, Lang::C, &[]);
    let mut params = Vec::new();
    for arg in model.boundary_args(func) {
        let complex = matches!(
            c_conversion(model, &arg.ty, Direction::In)?,
            Some(Conversion::Complex(_))
        );
        let name = if complex && rename_complex {
            format!("_{}", arg.name)
        } else {
            arg.name.clone()
        };
        params.push(format!("{} {name}", arg.ty.ffi_name(model, Lang::C, &[])));
    }
    Ok(format!(
        "{ret} {}({})",
        model.flat_path(func),
        params.join(", ")
    ))
}

/// Shared body emission: marshal arguments in, let `call` produce the native
/// call expression, marshal the result out.
fn emit_shim(
    model: &Model,
    w: &mut CodeWriter,
    func: EntityId,
    call: impl FnOnce(&mut CodeWriter, Vec<String>) -> Result<Option<String>, GenerateError>,
) -> Result<(), GenerateError> {
    w.line("extern \"C\"");
    w.line(shim_signature(model, func, true)?);
    w.open("");

    let args = model.boundary_args(func);
    let mut call_args = Vec::with_capacity(args.len());
    for arg in &args {
        match c_conversion(model, &arg.ty, Direction::In)? {
            Some(Conversion::Complex(apply)) => {
                apply(w, &arg.name, &format!("_{}", arg.name));
                call_args.push(arg.name.clone());
            }
            Some(Conversion::Inline(apply)) => {
                call_args.push(apply(w, &arg.name));
            }
            None => call_args.push(arg.name.clone()),
        }
    }

    if let Some(ret_expr) = call(w, call_args)? {
        let ret_ty = model.boundary_ret(func);
        if ret_ty == Type::Void {
            w.line(format!("{ret_expr};"));
        } else {
            match c_conversion(model, &ret_ty, Direction::Out)? {
                None => w.line(format!("return {ret_expr};")),
                Some(Conversion::Inline(apply)) => {
                    let expr = apply(w, &ret_expr);
                    w.line(format!("return {expr};"));
                }
                Some(Conversion::Complex(apply)) => {
                    w.line(format!("auto ret = {ret_expr};"));
                    apply(w, "__ret", "ret");
                    w.line("return __ret;");
                }
            }
        }
    }

    w.close("}");
    Ok(())
}

/// Free and static: call through the native qualified name.
fn emit_plain_function(
    model: &Model,
    w: &mut CodeWriter,
    func: EntityId,
) -> Result<(), GenerateError> {
    emit_shim(model, w, func, |_, args| {
        let parent = model.node(func).parent.expect("function without parent");
        let mut path = model.native_path(parent);
        path.push(model.call_name(func).to_string());
        Ok(Some(format!("::{}({})", path.join("::"), args.join(", "))))
    })
}

/// Instance methods call through the marshalled instance pointer.
fn emit_method(model: &Model, w: &mut CodeWriter, func: EntityId) -> Result<(), GenerateError> {
    emit_shim(model, w, func, |_, args| {
        let (inst, rest) = args.split_first().expect("method without instance");
        Ok(Some(format!(
            "{inst}->{}({})",
            model.call_name(func),
            rest.join(", ")
        )))
    })
}

/// Constructors allocate per their null policy and return the owning
/// pointer. Only the catch policy guards: a thrown exception becomes a
/// null return, so no native exception crosses the boundary.
fn emit_constructor(model: &Model, w: &mut CodeWriter, func: EntityId) -> Result<(), GenerateError> {
    let null = match model.function_def(func).map(|def| def.kind) {
        Some(FunctionKind::Constructor { null }) => null,
        _ => CtorNull::Nothrow,
    };
    emit_shim(model, w, func, |w, args| {
        let class = model.node(func).parent.expect("constructor without class");
        let native = format!("::{}", model.native_path(class).join("::"));
        let ret_ffi = model.boundary_ret(func).ffi_name(model, Lang::C, &[]);
        match null {
            CtorNull::Nothrow => Ok(Some(format!(
                "new(std::nothrow) {native}({})",
                args.join(", ")
            ))),
            CtorNull::Catch => {
                w.line(format!("{ret_ffi} __ret_try;"));
                w.open("try");
                w.line(format!("__ret_try = new {native}({});", args.join(", ")));
                w.chain("} catch (std::exception &) {");
                w.line("__ret_try = NULL;");
                w.close("}");
                Ok(Some("__ret_try".into()))
            }
        }
    })
}

/// Destructors delete and return nothing.
fn emit_destructor(model: &Model, w: &mut CodeWriter, func: EntityId) -> Result<(), GenerateError> {
    emit_shim(model, w, func, |w, args| {
        w.line(format!("delete {};", args[0]));
        Ok(None)
    })
}
