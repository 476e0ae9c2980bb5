//! Integration tests for `TypeDefOrRef` signatures against loaded modules.

use std::sync::Arc;

use dotmodel::{
    metadata::{
        identity::{AssemblyIdentity, AssemblyVersion},
        signatures::{encode_property_signature, TokenCodedIndexProvider},
        tables::{CodedIndex, TableId},
    },
    prelude::*,
};

/// `Sample.Shape` (class, row 1) and `Sample.Point` (value type, row 2) deriving from
/// `System.Object` and `System.ValueType` in `mscorlib`
fn loaded() -> Arc<ModuleDefinition> {
    let mut builder = MetadataImageBuilder::new("Shapes.dll");
    builder.assembly(AssemblyIdentity::new("Shapes", AssemblyVersion::new(1, 2, 0, 0)));
    let corlib = builder.assembly_ref(&AssemblyIdentity::new(
        "mscorlib",
        AssemblyVersion::new(4, 0, 0, 0),
    ));
    let corlib = CodedIndex::new(TableId::AssemblyRef, corlib.row());
    let object = builder.type_ref(corlib.clone(), "System", "Object");
    let value_type = builder.type_ref(corlib, "System", "ValueType");

    builder.type_def(
        0x0000_0001,
        "Sample",
        "Shape",
        CodedIndex::new(TableId::TypeRef, object.row()),
    );
    builder.type_def(
        0x0000_0109,
        "Sample",
        "Point",
        CodedIndex::new(TableId::TypeRef, value_type.row()),
    );

    load_module(builder.build().unwrap(), ModuleOptions::default()).unwrap()
}

fn handle(module: &ModuleDefinition, name: &str) -> TypeDefOrRef {
    TypeDefOrRef::from(&module.find_type("Sample", name).unwrap())
}

#[test]
fn signatures_round_trip_through_the_reader() {
    let module = loaded();
    let signature = PropertySignature {
        has_this: true,
        property_type: TypeSignature::TypeDefOrRef(TypeDefOrRefSignature::new(handle(
            &module, "Point",
        ))),
        parameters: vec![
            TypeSignature::TypeDefOrRef(TypeDefOrRefSignature::new(handle(&module, "Shape"))),
            TypeSignature::TypeDefOrRef(TypeDefOrRefSignature::new(
                module.lookup_type(Token::from_parts(TableId::TypeRef, 1)).unwrap(),
            )),
        ],
    };

    let bytes = encode_property_signature(&signature, &TokenCodedIndexProvider).unwrap();
    assert_eq!(bytes, vec![0x28, 0x02, 0x11, 0x08, 0x12, 0x04, 0x12, 0x05]);

    let mut reader = SignatureReader::new(&bytes, module.as_ref());
    let decoded = reader.read_property_signature().unwrap();
    assert!(!reader.has_more_data());
    assert_eq!(decoded, signature);
    assert_eq!(
        decoded.to_string(),
        "instance Sample.Point[Sample.Shape, System.Object]"
    );
}

#[test]
fn classification_defaults_from_the_referent_and_then_diverges() {
    let module = loaded();
    let point = module.find_type("Sample", "Point").unwrap();
    let signature = TypeDefOrRefSignature::new(TypeDefOrRef::from(&point));
    assert_eq!(signature.classification(), TypeClassification::ValueType);

    point.set_base_type(Some(
        module
            .lookup_type(Token::from_parts(TableId::TypeRef, 1))
            .unwrap(),
    ));
    assert!(!point.is_value_type());
    assert_eq!(signature.classification(), TypeClassification::ValueType);

    let provider = TokenCodedIndexProvider;
    let mut ctx = BlobWriterContext::new(&provider);
    signature.write(&mut ctx).unwrap();
    assert_eq!(ctx.bytes(), &[0x11, 0x08]);

    let fresh = TypeDefOrRefSignature::new(TypeDefOrRef::from(&point));
    assert_eq!(fresh.classification(), TypeClassification::Class);
}

/// Collects the full name of every type a signature mentions
struct Names(Vec<String>);

impl TypeSignatureVisitor for Names {
    type Output = ();

    fn visit_corlib_type(&mut self, ty: CorLibType) {
        self.0.push(TypeSignature::CorLib(ty).full_name());
    }

    fn visit_type_def_or_ref(&mut self, signature: &TypeDefOrRefSignature) {
        self.0.push(signature.full_name());
    }
}

#[test]
fn visitors_see_every_variant() {
    let module = loaded();
    let signatures = [
        TypeSignature::CorLib(CorLibType::String),
        TypeSignature::TypeDefOrRef(TypeDefOrRefSignature::new(handle(&module, "Shape"))),
    ];

    let mut names = Names(Vec::new());
    for signature in &signatures {
        signature.accept(&mut names);
    }
    assert_eq!(names.0, vec!["System.String", "Sample.Shape"]);
}

#[test]
fn importing_creates_reusable_references() {
    let source = loaded();
    let target = ModuleDefinition::new("Consumer.dll");
    let importer = ReferenceImporter::new(&target);

    let point = TypeSignature::TypeDefOrRef(TypeDefOrRefSignature::new(handle(&source, "Point")));
    assert!(!point.is_imported_in(&target));

    let imported = importer.import_type_signature(&point).unwrap();
    assert!(imported.is_imported_in(&target));
    assert!(imported.is_value_type());
    assert_eq!(imported.full_name(), "Sample.Point");

    let TypeSignature::TypeDefOrRef(reference) = &imported else {
        panic!("expected a type reference signature");
    };
    let scope = reference.scope().unwrap();
    assert_eq!(scope.name().as_deref(), Some("Shapes"));

    importer.import_type_signature(&point).unwrap();
    assert_eq!(target.type_references().len(), 1);
    assert_eq!(target.assembly_references().len(), 1);
}
