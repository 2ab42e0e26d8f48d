//! The cross-boundary marshalling protocol.
//!
//! For each type, per target language and per direction, a conversion has
//! one of two shapes:
//!
//! - **inline**: expression to expression, no intermediate binding
//!   (bool↔int, deref/address-of, scalar casts);
//! - **complex**: needs a named binding before use (a string built from its
//!   `{pointer, length}` descriptor, an optional lowered to a null-guarded
//!   temporary).
//!
//! A type with no entry crosses the boundary unchanged. The library
//! backend layers ownership transfer and null policy on top of this.

use bindweld_core::{Direction, Lang, Model, Type};

use crate::error::GenerateError;
use crate::writer::CodeWriter;

/// Shape of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionKind {
    Inline,
    Complex,
}

/// A rendered conversion step.
pub enum Conversion {
    /// `(writer, expr) -> replacement expression`.
    Inline(Box<dyn Fn(&mut CodeWriter, &str) -> String>),
    /// `(writer, dest, src)`: emits statements binding `dest` from `src`.
    Complex(Box<dyn Fn(&mut CodeWriter, &str, &str)>),
}

impl std::fmt::Debug for Conversion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Conversion::Inline(_) => f.write_str("Conversion::Inline(..)"),
            Conversion::Complex(_) => f.write_str("Conversion::Complex(..)"),
        }
    }
}

impl Conversion {
    pub fn inline(f: impl Fn(&mut CodeWriter, &str) -> String + 'static) -> Self {
        Conversion::Inline(Box::new(f))
    }

    pub fn complex(f: impl Fn(&mut CodeWriter, &str, &str) + 'static) -> Self {
        Conversion::Complex(Box::new(f))
    }

    pub fn kind(&self) -> ConversionKind {
        match self {
            Conversion::Inline(_) => ConversionKind::Inline,
            Conversion::Complex(_) => ConversionKind::Complex,
        }
    }
}

/// Conversion applied on the C side of the boundary.
///
/// `In` runs on incoming boundary values before the native call; `Out`
/// lowers a computed native value to its boundary form before `return`.
pub fn c_conversion(
    model: &Model,
    ty: &Type,
    dir: Direction,
) -> Result<Option<Conversion>, GenerateError> {
    match ty {
        Type::Bool | Type::Ref { .. } => {
            let ty = ty.clone();
            let model = model.clone();
            Ok(Some(Conversion::inline(move |_, expr| {
                ty.transform(&model, Lang::C, expr, dir)
            })))
        }
        Type::Str { .. } => match dir {
            Direction::In => Ok(Some(Conversion::complex(|w, dest, src| {
                w.line(format!("std::string {dest}({src}.data, {src}.length);"));
            }))),
            Direction::Out => {
                let ffi = ty.ffi_name(model, Lang::C, &[]);
                Ok(Some(Conversion::complex(move |w, dest, src| {
                    w.line(format!("{ffi} {dest};"));
                    w.line(format!("{dest}.data = {src}.data();"));
                    w.line(format!("{dest}.length = {src}.length();"));
                })))
            }
        },
        Type::Opt { subtype, default } => match dir {
            Direction::In => {
                let sub_cpp = subtype.cpp_name(model);
                let sub_conv = c_conversion(model, subtype, Direction::In)?;
                let default = default.clone();
                Ok(Some(Conversion::complex(move |w, dest, src| {
                    w.line(format!("{sub_cpp} {dest} = {default};"));
                    w.open(format!("if ({src} != NULL)"));
                    let value = format!("(*{src})");
                    match &sub_conv {
                        None => w.line(format!("{dest} = {value};")),
                        Some(Conversion::Inline(apply)) => {
                            let value = apply(w, &value);
                            w.line(format!("{dest} = {value};"));
                        }
                        Some(Conversion::Complex(apply)) => {
                            let tmp = format!("__{dest}_value");
                            apply(w, &tmp, &value);
                            w.line(format!("{dest} = {tmp};"));
                        }
                    }
                    w.close("}");
                })))
            }
            Direction::Out => Err(GenerateError::Description(
                bindweld_core::DescriptionError::UnsupportedType {
                    detail: "optional result at the C boundary".into(),
                },
            )),
        },
        _ => Ok(None),
    }
}

/// Conversion applied in the Rust proxy layer.
///
/// `prefix` is the module path under which the raw boundary types are
/// visible at the point of emission.
pub fn rust_conversion(
    model: &Model,
    ty: &Type,
    dir: Direction,
    prefix: &[&str],
) -> Option<Conversion> {
    match ty {
        Type::Bool => {
            let ty = ty.clone();
            let model = model.clone();
            Some(Conversion::inline(move |_, expr| {
                ty.transform(&model, Lang::Rust, expr, dir)
            }))
        }
        Type::Scalar(s) if s.rust_ffi_name() != s.rust_lib_name() => {
            let ty = ty.clone();
            let model = model.clone();
            Some(Conversion::inline(move |_, expr| {
                ty.transform(&model, Lang::Rust, expr, dir)
            }))
        }
        Type::Str { is_const } => match dir {
            Direction::In => {
                let ffi = ty.ffi_name(model, Lang::Rust, prefix);
                let cast = if *is_const {
                    "*const libc::c_char"
                } else {
                    "*mut libc::c_char"
                };
                Some(Conversion::complex(move |w, dest, src| {
                    w.open(format!("let {dest} = {ffi}"));
                    w.line(format!("data: {src}.as_ptr() as {cast},"));
                    w.line(format!("length: {src}.len() as libc::size_t,"));
                    w.close("};");
                }))
            }
            Direction::Out => None,
        },
        Type::Opt { subtype, .. } => match dir {
            Direction::In => {
                // Strings lower inside the map so the descriptor outlives
                // the pointer taken from it.
                let mapped = match subtype.as_ref() {
                    Type::Str { is_const } => {
                        let ffi = subtype.ffi_name(model, Lang::Rust, prefix);
                        let cast = if *is_const {
                            "*const libc::c_char"
                        } else {
                            "*mut libc::c_char"
                        };
                        Some(format!(
                            "{ffi} {{ data: value.as_ptr() as {cast}, length: value.len() as libc::size_t }}"
                        ))
                    }
                    _ => None,
                };
                let sub_conv = rust_conversion(model, subtype, Direction::In, prefix);
                Some(Conversion::complex(move |w, dest, src| {
                    if let Some(mapped) = &mapped {
                        w.line(format!("let {dest} = {src}.map(|value| {mapped});"));
                    } else if let Some(Conversion::Inline(apply)) = &sub_conv {
                        let value = apply(w, "value");
                        w.line(format!("let {dest} = {src}.map(|value| {value});"));
                    } else if dest != src {
                        w.line(format!("let {dest} = {src};"));
                    }
                    w.line(format!(
                        "let {dest} = {dest}.as_ref().map(|value| value as *const _).unwrap_or(::std::ptr::null());"
                    ));
                }))
            }
            Direction::Out => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bindweld_core::ModelBuilder;

    fn model() -> Model {
        ModelBuilder::new().finish().unwrap()
    }

    #[test]
    fn bool_is_inline_both_ways() {
        let model = model();
        for dir in [Direction::In, Direction::Out] {
            let conv = c_conversion(&model, &Type::Bool, dir).unwrap().unwrap();
            assert_eq!(conv.kind(), ConversionKind::Inline);
        }
    }

    #[test]
    fn string_in_is_complex_on_the_c_side() {
        let model = model();
        let conv = c_conversion(&model, &Type::const_str(), Direction::In)
            .unwrap()
            .unwrap();
        assert_eq!(conv.kind(), ConversionKind::Complex);

        let mut w = CodeWriter::new();
        match conv {
            Conversion::Complex(apply) => apply(&mut w, "name", "_name"),
            _ => unreachable!(),
        }
        assert_eq!(w.finish(), "std::string name(_name.data, _name.length);\n");
    }

    #[test]
    fn option_out_is_rejected_at_the_c_boundary() {
        let model = model();
        let err = c_conversion(
            &model,
            &Type::opt(Type::Bool, "false"),
            Direction::Out,
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::Description(_)));
    }

    #[test]
    fn rust_string_in_builds_the_descriptor() {
        let model = model();
        let conv = rust_conversion(&model, &Type::const_str(), Direction::In, &["super"]).unwrap();

        let mut w = CodeWriter::new();
        match conv {
            Conversion::Complex(apply) => apply(&mut w, "name", "name"),
            _ => unreachable!(),
        }
        let text = w.finish();
        assert!(text.contains("let name = super::std_string_const {"));
        assert!(text.contains("data: name.as_ptr() as *const libc::c_char,"));
        assert!(text.contains("length: name.len() as libc::size_t,"));
    }

    #[test]
    fn plain_scalars_cross_unchanged() {
        let model = model();
        assert!(
            c_conversion(&model, &Type::Scalar(bindweld_core::Scalar::I32), Direction::In)
                .unwrap()
                .is_none()
        );
        assert!(
            rust_conversion(
                &model,
                &Type::Scalar(bindweld_core::Scalar::U64),
                Direction::Out,
                &[]
            )
            .is_none()
        );
    }
}
