//! End-to-end generation over a small but complete description.

use std::fs;
use std::path::Path;

use bindweld::{CtorNull, Model, ModelBuilder, PtrNull, PtrType, Scalar, Target, Type};

fn sample_model() -> Model {
    let mut builder = ModelBuilder::new();
    let root = builder.root();
    builder.include(root, "extern_lib.hpp").unwrap();

    let sample = builder.class(root, "Sample", &[]).unwrap();
    builder
        .constructor(
            sample,
            "new",
            vec![(Type::const_str(), "name")],
            CtorNull::Nothrow,
        )
        .unwrap();
    builder.destructor(sample, "delete").unwrap();
    builder
        .method(sample, "sayHi", Type::Void, Vec::new(), true)
        .unwrap();
    builder.finish().unwrap()
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name))
        .unwrap_or_else(|e| panic!("missing artifact {name}: {e}"))
}

#[test]
fn sample_generates_all_three_layers() {
    let model = sample_model();
    let dir = tempfile::tempdir().unwrap();
    bindweld::generate(&model, None, dir.path()).unwrap();

    // C++ shim: string-descriptor constructor returning an opaque pointer.
    let shim = read(dir.path(), "ffi.cpp");
    assert!(shim.contains("Sample* Sample_new(std_string_const _name)"));
    assert!(shim.contains("std::string name(_name.data, _name.length);"));
    assert!(shim.contains("return new(std::nothrow) ::Sample(name);"));
    assert!(shim.contains("delete inst;"));

    let header = read(dir.path(), "ffi.h");
    assert!(header.contains("typedef ::Sample Sample;"));
    assert!(header.contains("void Sample_sayHi(Sample const* inst);"));

    // Raw extern "C" declaration.
    let ffi = read(dir.path(), "ffi.rs");
    assert!(ffi.contains("pub fn Sample_new(name: super::std_string_const) -> *mut super::Sample;"));

    // Idiomatic wrapper: new, say_hi, destructor-backed Drop.
    let lib = read(dir.path(), "lib.rs");
    assert!(lib.contains("pub fn new(name: &str) -> crate::Sample {"));
    assert!(lib.contains("fn say_hi(&self) {"));
    assert!(lib.contains("impl Drop for Sample {"));
    assert!(lib.contains("unsafe { crate::ffi::Sample_delete(self.inner.as_ptr()) }"));

    let traits = read(dir.path(), "traits.rs");
    assert!(traits.contains("pub use crate::{SampleObj, SampleOwned, SampleExt};"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let model = sample_model();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    bindweld::generate(&model, None, first.path()).unwrap();
    bindweld::generate(&model, None, second.path()).unwrap();

    for name in ["ffi.h", "ffi.cpp", "ffi.rs", "lib.rs", "traits.rs"] {
        assert_eq!(
            read(first.path(), name),
            read(second.path(), name),
            "artifact {name} differs between runs"
        );
    }
}

#[test]
fn c_target_only_emits_the_shim() {
    let model = sample_model();
    let dir = tempfile::tempdir().unwrap();
    bindweld::generate(&model, Some(Target::C), dir.path()).unwrap();

    assert!(dir.path().join("ffi.cpp").exists());
    assert!(dir.path().join("ffi.h").exists());
    assert!(!dir.path().join("ffi.rs").exists());
    assert!(!dir.path().join("lib.rs").exists());
}

#[test]
fn inheritance_chain_surfaces_every_ancestor_method() {
    let mut builder = ModelBuilder::new();
    let root = builder.root();
    let ns = builder.namespace(root, "llvm").unwrap();

    let ty = builder.class(ns, "Type", &[]).unwrap();
    builder
        .method(ty, "dump", Type::Void, Vec::new(), true)
        .unwrap();
    builder
        .method(ty, "isSized", Type::Bool, Vec::new(), true)
        .unwrap();
    let composite = builder.class(ns, "CompositeType", &[ty]).unwrap();
    builder
        .method(
            composite,
            "indexValid",
            Type::Bool,
            vec![(Type::Scalar(Scalar::U32), "idx")],
            true,
        )
        .unwrap();
    let structty = builder.class(ns, "StructType", &[composite]).unwrap();
    builder
        .method(structty, "isPacked", Type::Bool, Vec::new(), true)
        .unwrap();
    let model = builder.finish().unwrap();

    let dir = tempfile::tempdir().unwrap();
    bindweld::generate(&model, Some(Target::Rust), dir.path()).unwrap();

    let llvm = read(dir.path(), "llvm.rs");
    // StructType reaches Type's and CompositeType's methods through its
    // ancestor Obj impls plus the blanket Ext impls.
    assert!(llvm.contains("impl crate::llvm::TypeObj for StructType {"));
    assert!(llvm.contains("impl crate::llvm::CompositeTypeObj for StructType {"));
    assert!(llvm.contains("fn index_valid(&self, idx: u32) -> bool {"));
    assert!(llvm.contains("fn is_packed(&self) -> bool {"));
}

#[test]
fn null_policy_reaches_the_generated_surface() {
    let mut builder = ModelBuilder::new();
    let root = builder.root();
    let node = builder.class(root, "Node", &[]).unwrap();
    builder
        .method(
            node,
            "next",
            Type::Ptr(PtrType {
                subtype: Box::new(Type::Class(node)),
                is_const: false,
                owned: false,
                null: PtrNull::Option,
            }),
            Vec::new(),
            true,
        )
        .unwrap();
    builder
        .method(
            node,
            "owner",
            Type::Ptr(PtrType {
                subtype: Box::new(Type::Class(node)),
                is_const: false,
                owned: false,
                null: PtrNull::Panic,
            }),
            Vec::new(),
            true,
        )
        .unwrap();
    let model = builder.finish().unwrap();

    let dir = tempfile::tempdir().unwrap();
    bindweld::generate(&model, Some(Target::Rust), dir.path()).unwrap();

    let lib = read(dir.path(), "lib.rs");
    assert!(lib.contains("fn next(&self) -> Option<crate::Node> {"));
    assert!(lib.contains("fn owner(&self) -> crate::Node {"));
    assert!(lib.contains("panic!(\"Node::owner returned null\");"));
}
