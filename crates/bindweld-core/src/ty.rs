//! The boundary type vocabulary.
//!
//! [`Type`] is a closed set of variants, held by value: structural equality
//! is derived equality, and every name function below is a pure function of
//! that structure. Two structurally equal types always spell identically,
//! which is what makes name-based deduplication in the aggregators sound.
//!
//! Three spellings exist per type:
//!
//! - [`Type::flat_name`] — mangled, ASCII, safe in every target language;
//! - [`Type::ffi_name`] — the boundary-representation spelling per language;
//! - [`Type::lib_name`] — the idiomatic surface spelling.
//!
//! [`Type::transform`] renders the *inline* expression-level conversions
//! (bool↔int, deref/address-of, scalar casts). Conversions that need a named
//! binding live in the marshalling layer of the codegen crate.

use crate::entity::EntityId;
use crate::model::Model;

/// Target language of a rendering step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lang {
    /// The C/C++ shim side.
    C,
    /// The raw/proxy Rust FFI side.
    Rust,
    /// The idiomatic Rust library surface.
    RustLib,
}

/// Direction of a conversion relative to the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Caller value → boundary/native representation.
    In,
    /// Computed value → back toward the safe caller.
    Out,
}

/// Null contract of a pointer-returning operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PtrNull {
    /// Null is a legal outcome, surfaced as an empty/optional value.
    #[default]
    Option,
    /// Null is contractually impossible; observing one is fatal.
    Panic,
}

/// Fixed-width numeric scalars plus the two boundary-support scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// C `char`; carries string data across the boundary.
    Char,
    /// C `size_t`; carries string lengths across the boundary.
    Size,
}

impl Scalar {
    /// Mangled spelling.
    pub fn flat_name(self) -> &'static str {
        match self {
            Scalar::I8 => "int8",
            Scalar::I16 => "int16",
            Scalar::I32 => "int32",
            Scalar::I64 => "int64",
            Scalar::U8 => "uint8",
            Scalar::U16 => "uint16",
            Scalar::U32 => "uint32",
            Scalar::U64 => "uint64",
            Scalar::F32 => "float",
            Scalar::F64 => "double",
            Scalar::Char => "char",
            Scalar::Size => "size",
        }
    }

    /// C spelling.
    pub fn c_name(self) -> &'static str {
        match self {
            Scalar::I8 => "int8_t",
            Scalar::I16 => "int16_t",
            Scalar::I32 => "int32_t",
            Scalar::I64 => "int64_t",
            Scalar::U8 => "uint8_t",
            Scalar::U16 => "uint16_t",
            Scalar::U32 => "uint32_t",
            Scalar::U64 => "uint64_t",
            Scalar::F32 => "float",
            Scalar::F64 => "double",
            Scalar::Char => "char",
            Scalar::Size => "size_t",
        }
    }

    /// Raw Rust boundary spelling.
    pub fn rust_ffi_name(self) -> &'static str {
        match self {
            Scalar::I8 => "i8",
            Scalar::I16 => "i16",
            Scalar::I32 => "i32",
            Scalar::I64 => "i64",
            Scalar::U8 => "u8",
            Scalar::U16 => "u16",
            Scalar::U32 => "u32",
            Scalar::U64 => "u64",
            Scalar::F32 => "f32",
            Scalar::F64 => "f64",
            Scalar::Char => "libc::c_char",
            Scalar::Size => "libc::size_t",
        }
    }

    /// Idiomatic Rust surface spelling.
    pub fn rust_lib_name(self) -> &'static str {
        match self {
            Scalar::Char => "i8",
            Scalar::Size => "usize",
            other => other.rust_ffi_name(),
        }
    }
}

/// A pointer across the boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct PtrType {
    pub subtype: Box<Type>,
    pub is_const: bool,
    /// Whether the pointer carries destructor responsibility.
    pub owned: bool,
    pub null: PtrNull,
}

/// The closed type vocabulary of a description.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Void,
    Bool,
    Scalar(Scalar),
    /// A native `std::string`, crossing as a `{pointer, length}` descriptor.
    Str { is_const: bool },
    Enum(EntityId),
    /// Optional value; `default` is the native expression used when absent.
    Opt { subtype: Box<Type>, default: String },
    Ref { subtype: Box<Type>, is_const: bool },
    Ptr(PtrType),
    Class(EntityId),
}

impl Type {
    /// Mutable pointer to `subtype`.
    pub fn ptr(subtype: Type) -> Type {
        Type::Ptr(PtrType {
            subtype: Box::new(subtype),
            is_const: false,
            owned: false,
            null: PtrNull::default(),
        })
    }

    /// Const pointer to `subtype`.
    pub fn const_ptr(subtype: Type) -> Type {
        Type::Ptr(PtrType {
            subtype: Box::new(subtype),
            is_const: true,
            owned: false,
            null: PtrNull::default(),
        })
    }

    /// Owning pointer with the given null contract.
    pub fn owned_ptr(subtype: Type, null: PtrNull) -> Type {
        Type::Ptr(PtrType {
            subtype: Box::new(subtype),
            is_const: false,
            owned: true,
            null,
        })
    }

    /// Mutable reference to `subtype`.
    pub fn reference(subtype: Type) -> Type {
        Type::Ref {
            subtype: Box::new(subtype),
            is_const: false,
        }
    }

    /// Const reference to `subtype`.
    pub fn const_ref(subtype: Type) -> Type {
        Type::Ref {
            subtype: Box::new(subtype),
            is_const: true,
        }
    }

    /// Const `std::string` argument.
    pub fn const_str() -> Type {
        Type::Str { is_const: true }
    }

    /// Optional value with a native default expression.
    pub fn opt(subtype: Type, default: impl Into<String>) -> Type {
        Type::Opt {
            subtype: Box::new(subtype),
            default: default.into(),
        }
    }

    /// The pointer payload when this is a pointer to a class.
    pub fn as_class_ptr(&self) -> Option<(&PtrType, EntityId)> {
        match self {
            Type::Ptr(p) => match p.subtype.as_ref() {
                Type::Class(id) => Some((p, *id)),
                _ => None,
            },
            _ => None,
        }
    }

    /// The terminal type after stripping Opt/Ref/Ptr wrappers.
    pub fn terminal(&self) -> &Type {
        match self {
            Type::Opt { subtype, .. } | Type::Ref { subtype, .. } => subtype.terminal(),
            Type::Ptr(p) => p.subtype.terminal(),
            other => other,
        }
    }

    /// Direct subtype, if this is a wrapper variant.
    pub fn subtype(&self) -> Option<&Type> {
        match self {
            Type::Opt { subtype, .. } | Type::Ref { subtype, .. } => Some(subtype),
            Type::Ptr(p) => Some(&p.subtype),
            _ => None,
        }
    }

    /// Mangled, cross-language-safe identifier.
    pub fn flat_name(&self, model: &Model) -> String {
        match self {
            Type::Void => "void".into(),
            Type::Bool => "bool".into(),
            Type::Scalar(s) => s.flat_name().into(),
            Type::Str { is_const } => {
                if *is_const {
                    "std_string_const".into()
                } else {
                    "std_string".into()
                }
            }
            Type::Enum(id) | Type::Class(id) => model.flat_path(*id),
            Type::Opt { subtype, .. } => format!("opt_{}", subtype.flat_name(model)),
            Type::Ref { subtype, is_const } => {
                let name = format!("ref_{}", subtype.flat_name(model));
                if *is_const { name + "_const" } else { name }
            }
            Type::Ptr(p) => {
                let name = format!("ptr_{}", p.subtype.flat_name(model));
                if p.is_const { name + "_const" } else { name }
            }
        }
    }

    /// Boundary-representation spelling.
    ///
    /// `prefix` is the module path under which flat-named items are reachable
    /// at the point of use (e.g. `["super"]` inside the raw module).
    pub fn ffi_name(&self, model: &Model, lang: Lang, prefix: &[&str]) -> String {
        match lang {
            Lang::C => self.c_ffi_name(model),
            Lang::Rust | Lang::RustLib => self.rust_ffi_name(model, prefix),
        }
    }

    fn c_ffi_name(&self, model: &Model) -> String {
        match self {
            Type::Void => "void".into(),
            Type::Bool => "int".into(),
            Type::Scalar(s) => s.c_name().into(),
            Type::Str { .. } | Type::Enum(_) | Type::Class(_) => self.flat_name(model),
            Type::Opt { subtype, .. } => format!("{}*", subtype.c_ffi_name(model)),
            Type::Ref { subtype, is_const } => {
                if *is_const {
                    format!("{} const*", subtype.c_ffi_name(model))
                } else {
                    format!("{}*", subtype.c_ffi_name(model))
                }
            }
            Type::Ptr(p) => {
                if p.is_const {
                    format!("{} const*", p.subtype.c_ffi_name(model))
                } else {
                    format!("{}*", p.subtype.c_ffi_name(model))
                }
            }
        }
    }

    fn rust_ffi_name(&self, model: &Model, prefix: &[&str]) -> String {
        let prefixed = |flat: String| {
            if prefix.is_empty() {
                flat
            } else {
                format!("{}::{}", prefix.join("::"), flat)
            }
        };
        match self {
            Type::Void => "libc::c_void".into(),
            Type::Bool => "libc::c_int".into(),
            Type::Scalar(s) => s.rust_ffi_name().into(),
            Type::Str { .. } | Type::Enum(_) | Type::Class(_) => prefixed(self.flat_name(model)),
            Type::Opt { subtype, .. } => {
                format!("*const {}", subtype.rust_ffi_name(model, prefix))
            }
            Type::Ref { subtype, is_const } => {
                let qual = if *is_const { "const" } else { "mut" };
                format!("*{} {}", qual, subtype.rust_ffi_name(model, prefix))
            }
            Type::Ptr(p) => {
                let qual = if p.is_const { "const" } else { "mut" };
                format!("*{} {}", qual, p.subtype.rust_ffi_name(model, prefix))
            }
        }
    }

    /// Native C++ spelling, used on the inside of the shim.
    pub fn cpp_name(&self, model: &Model) -> String {
        match self {
            Type::Void => "void".into(),
            Type::Bool => "bool".into(),
            Type::Scalar(s) => s.c_name().into(),
            Type::Str { .. } => "std::string".into(),
            Type::Enum(id) | Type::Class(id) => format!("::{}", model.native_path(*id).join("::")),
            Type::Opt { subtype, .. } => format!("{}*", subtype.cpp_name(model)),
            Type::Ref { subtype, is_const } => {
                if *is_const {
                    format!("{} const&", subtype.cpp_name(model))
                } else {
                    format!("{}&", subtype.cpp_name(model))
                }
            }
            Type::Ptr(p) => {
                if p.is_const {
                    format!("{} const*", p.subtype.cpp_name(model))
                } else {
                    format!("{}*", p.subtype.cpp_name(model))
                }
            }
        }
    }

    /// Idiomatic surface spelling in the generated library.
    ///
    /// Class-typed values spell as the concrete struct path; argument
    /// positions widen that to a trait bound in the library backend.
    pub fn lib_name(&self, model: &Model) -> String {
        match self {
            Type::Void => "()".into(),
            Type::Bool => "bool".into(),
            Type::Scalar(s) => s.rust_lib_name().into(),
            Type::Str { .. } => "&str".into(),
            Type::Enum(id) | Type::Class(id) => {
                let mut path = vec!["crate".to_string()];
                path.extend(model.modpath(*id));
                path.push(model.node(*id).name.clone());
                path.join("::")
            }
            Type::Opt { subtype, .. } => format!("Option<{}>", subtype.lib_name(model)),
            Type::Ref { subtype, .. } | Type::Ptr(PtrType { subtype, .. }) => {
                format!("&{}", subtype.lib_name(model))
            }
        }
    }

    /// Inline expression-level conversion, or `expr` unchanged.
    pub fn transform(&self, model: &Model, lang: Lang, expr: &str, dir: Direction) -> String {
        match (self, lang) {
            (Type::Bool, Lang::C) => match dir {
                Direction::Out => format!("({expr} ? 1 : 0)"),
                Direction::In => format!("({expr} == 1 ? true : false)"),
            },
            (Type::Bool, Lang::Rust) => match dir {
                Direction::Out => format!("{expr} != 0"),
                Direction::In => format!("if {expr} {{ 1 }} else {{ 0 }}"),
            },
            (Type::Ref { .. }, Lang::C) => match dir {
                Direction::Out => format!("&({expr})"),
                Direction::In => format!("*{expr}"),
            },
            (Type::Scalar(s), Lang::Rust) if s.rust_ffi_name() != s.rust_lib_name() => match dir {
                Direction::In => format!("{expr} as {}", s.rust_ffi_name()),
                Direction::Out => format!("{expr} as {}", s.rust_lib_name()),
            },
            (Type::Enum(_), Lang::RustLib) => match dir {
                Direction::Out => format!("{}::from_ffi({expr})", self.lib_name(model)),
                Direction::In => format!("{expr}.to_ffi()"),
            },
            _ => expr.to_string(),
        }
    }
}
