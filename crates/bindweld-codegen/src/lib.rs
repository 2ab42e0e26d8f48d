//! Code generation backends for bindweld.
//!
//! Three independent emitters consume the model: the C boundary backend
//! (shim header and translation unit), the Rust FFI backend (raw and proxy
//! layers of `ffi.rs`), and the Rust library backend (the idiomatic wrapper
//! crate). All three share the marshalling protocol in [`marshal`] and the
//! text plumbing in [`writer`].

pub mod c;
pub mod error;
pub mod marshal;
pub mod rust_ffi;
pub mod rust_lib;
pub mod writer;

pub use c::CBackend;
pub use error::GenerateError;
pub use marshal::{Conversion, ConversionKind, c_conversion, rust_conversion};
pub use rust_ffi::RustFfiBackend;
pub use rust_lib::RustLibBackend;
pub use writer::CodeWriter;
