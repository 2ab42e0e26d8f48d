//! bindweld: a cross-language FFI binding generator.
//!
//! Describe a native C++ object-oriented interface once — namespaces,
//! classes with bases, enums, free functions, methods, constructors and
//! destructors — and generate:
//!
//! - an `extern "C"` shim layer compiled against the native implementation,
//! - raw unsafe Rust declarations plus marshalling proxies for it,
//! - an idiomatic, ownership- and inheritance-aware Rust wrapper library.
//!
//! # Example
//!
//! ```
//! use bindweld::{CtorNull, ModelBuilder, Type};
//!
//! let mut builder = ModelBuilder::new();
//! let root = builder.root();
//! let sample = builder.class(root, "Sample", &[]).unwrap();
//! builder
//!     .constructor(sample, "new", vec![(Type::const_str(), "name")], CtorNull::Nothrow)
//!     .unwrap();
//! builder.destructor(sample, "delete").unwrap();
//! builder.method(sample, "sayHi", Type::Void, Vec::new(), true).unwrap();
//! let model = builder.finish().unwrap();
//! assert_eq!(model.flat_path(sample), "Sample");
//! ```

use std::path::Path;

pub use bindweld_codegen::{CBackend, GenerateError, RustFfiBackend, RustLibBackend};
pub use bindweld_core::{
    CtorNull, DescriptionError, Direction, EntityId, EntityKind, Lang, ModPath, Model,
    ModelBuilder, PtrNull, PtrType, Scalar, Type,
};
pub use bindweld_registry::{LookupError, Registry};

/// Which backends to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The C boundary shim (`ffi.h` + `ffi.cpp`).
    C,
    /// The Rust side: FFI module plus the wrapper library tree. The
    /// library backend depends on the FFI backend's naming, so they
    /// always run together.
    Rust,
}

/// Run the selected backends (or all of them) against one model.
///
/// Every artifact is rendered completely before it is written; a failing
/// backend leaves no partial file behind.
pub fn generate(model: &Model, target: Option<Target>, dest: &Path) -> Result<(), GenerateError> {
    if target.is_none() || target == Some(Target::C) {
        CBackend::generate(model, dest)?;
    }
    if target.is_none() || target == Some(Target::Rust) {
        RustFfiBackend::generate(model, dest)?;
        RustLibBackend::generate(model, dest)?;
    }
    Ok(())
}
