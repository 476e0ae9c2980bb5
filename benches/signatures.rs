//! Benchmarks for property signature encoding and parsing.
//!
//! Covers the blob paths that touch `TypeDefOrRef` signatures:
//! - Parsing against a loaded module (token lookup and classification)
//! - Encoding through the token based coded index provider
//! - Visiting a decoded signature

extern crate dotmodel;

use std::{hint::black_box, sync::Arc};

use criterion::{criterion_group, criterion_main, Criterion};
use dotmodel::{
    metadata::{
        identity::{AssemblyIdentity, AssemblyVersion},
        signatures::{
            encode_property_signature, parse_property_signature, TokenCodedIndexProvider,
        },
        tables::{CodedIndex, TableId},
    },
    prelude::*,
};

fn module() -> Arc<ModuleDefinition> {
    let mut builder = MetadataImageBuilder::new("Bench.dll");
    builder.assembly(AssemblyIdentity::new("Bench", AssemblyVersion::new(1, 0, 0, 0)));
    let corlib = builder.assembly_ref(&AssemblyIdentity::new(
        "mscorlib",
        AssemblyVersion::new(4, 0, 0, 0),
    ));
    let corlib = CodedIndex::new(TableId::AssemblyRef, corlib.row());
    let object = builder.type_ref(corlib.clone(), "System", "Object");
    let value_type = builder.type_ref(corlib, "System", "ValueType");

    builder.type_def(
        0x0000_0001,
        "Bench",
        "Node",
        CodedIndex::new(TableId::TypeRef, object.row()),
    );
    builder.type_def(
        0x0000_0109,
        "Bench",
        "Cell",
        CodedIndex::new(TableId::TypeRef, value_type.row()),
    );

    load_module(builder.build().unwrap(), ModuleOptions::default()).unwrap()
}

/// Benchmark parsing a property of a primitive type.
/// Signature: instance int32 Property
fn bench_parse_primitive(c: &mut Criterion) {
    let module = module();
    let signature = [0x28, 0x00, 0x08];

    c.bench_function("sig_property_primitive", |b| {
        b.iter(|| {
            let sig = parse_property_signature(black_box(&signature), module.as_ref()).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark parsing an indexer over definitions and references.
/// Signature: instance Bench.Cell Item[Bench.Node, System.Object]
fn bench_parse_type_def_or_ref(c: &mut Criterion) {
    let module = module();
    let signature = [0x28, 0x02, 0x11, 0x08, 0x12, 0x04, 0x12, 0x05];

    c.bench_function("sig_property_typedeforref", |b| {
        b.iter(|| {
            let sig = parse_property_signature(black_box(&signature), module.as_ref()).unwrap();
            black_box(sig)
        });
    });
}

/// Benchmark encoding the same indexer back into a blob.
fn bench_encode_type_def_or_ref(c: &mut Criterion) {
    let module = module();
    let signature =
        parse_property_signature(&[0x28, 0x02, 0x11, 0x08, 0x12, 0x04, 0x12, 0x05], module.as_ref())
            .unwrap();

    c.bench_function("sig_encode_typedeforref", |b| {
        b.iter(|| {
            let blob =
                encode_property_signature(black_box(&signature), &TokenCodedIndexProvider).unwrap();
            black_box(blob)
        });
    });
}

struct FullNames(Vec<String>);

impl TypeSignatureVisitor for FullNames {
    type Output = ();

    fn visit_corlib_type(&mut self, ty: CorLibType) {
        self.0.push(ty.to_string());
    }

    fn visit_type_def_or_ref(&mut self, signature: &TypeDefOrRefSignature) {
        self.0.push(signature.full_name());
    }
}

/// Benchmark visiting every type of a decoded signature.
fn bench_visit(c: &mut Criterion) {
    let module = module();
    let signature =
        parse_property_signature(&[0x28, 0x02, 0x11, 0x08, 0x12, 0x04, 0x08], module.as_ref())
            .unwrap();

    c.bench_function("sig_visit_typedeforref", |b| {
        b.iter(|| {
            let mut names = FullNames(Vec::with_capacity(3));
            for ty in black_box(&signature).types() {
                ty.accept(&mut names);
            }
            black_box(names.0)
        });
    });
}

criterion_group!(
    benches,
    bench_parse_primitive,
    bench_parse_type_def_or_ref,
    bench_encode_type_def_or_ref,
    bench_visit
);
criterion_main!(benches);
