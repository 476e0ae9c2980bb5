//! Integration tests for properties, their accessor links and the ownership model.

use std::{sync::Arc, thread};

use dotmodel::{
    metadata::tables::{CodedIndex, TableId},
    prelude::*,
};

fn int_property(name: &str) -> Arc<PropertyDefinition> {
    PropertyDefinition::new(
        name,
        PropertyAttributes::empty(),
        Some(PropertySignature::instance(TypeSignature::CorLib(
            CorLibType::I4,
        ))),
    )
}

#[test]
fn property_moves_between_types() {
    let first = TypeDefinition::new("Sample", "First", TypeAttributes::PUBLIC, None);
    let second = TypeDefinition::new("Sample", "Second", TypeAttributes::PUBLIC, None);
    let count = int_property("Count");

    first.properties().add(count.clone());
    assert!(Arc::ptr_eq(&count.declaring_type().unwrap(), &first));

    second.properties().add(count.clone());
    assert!(first.properties().is_empty());
    assert_eq!(second.properties().len(), 1);
    assert!(Arc::ptr_eq(&count.declaring_type().unwrap(), &second));
    assert_eq!(count.full_name().unwrap(), "System.Int32 Sample.Second::Count");

    assert!(second.properties().remove(&count));
    assert!(count.declaring_type().is_none());
    assert_eq!(count.full_name().unwrap(), "System.Int32 Count");
}

#[test]
fn first_link_of_each_role_is_the_accessor() {
    let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
    let first = MethodDefinition::new("get_First", MethodAttributes::PUBLIC);
    let second = MethodDefinition::new("get_Second", MethodAttributes::PUBLIC);
    widget.methods().add(first.clone());
    widget.methods().add(second.clone());

    let value = int_property("Value");
    widget.properties().add(value.clone());
    assert!(value.get_method().is_none());

    value
        .semantics()
        .add(MethodSemantics::new(second.clone(), MethodSemanticsAttributes::GETTER));
    value
        .semantics()
        .add(MethodSemantics::new(first.clone(), MethodSemanticsAttributes::GETTER));
    assert!(Arc::ptr_eq(&value.get_method().unwrap(), &second));
    assert!(value.set_method().is_none());

    value.set_semantic_methods(Some(first.clone()), Some(second.clone()));
    assert_eq!(value.semantics().len(), 2);
    assert!(Arc::ptr_eq(&value.get_method().unwrap(), &first));
    assert!(Arc::ptr_eq(&value.set_method().unwrap(), &second));

    let link = value.semantics().get(0).unwrap();
    assert_eq!(link.association().unwrap().token(), value.token());
}

#[test]
fn other_links_never_shadow_the_first_getter() {
    let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
    let notify = MethodDefinition::new("Notify", MethodAttributes::PUBLIC);
    let first = MethodDefinition::new("get_First", MethodAttributes::PUBLIC);
    let second = MethodDefinition::new("get_Second", MethodAttributes::PUBLIC);
    for method in [&notify, &first, &second] {
        widget.methods().add(method.clone());
    }

    let value = int_property("Value");
    widget.properties().add(value.clone());
    value
        .semantics()
        .add(MethodSemantics::new(notify.clone(), MethodSemanticsAttributes::OTHER));
    value
        .semantics()
        .add(MethodSemantics::new(first.clone(), MethodSemanticsAttributes::GETTER));
    value
        .semantics()
        .add(MethodSemantics::new(second.clone(), MethodSemanticsAttributes::GETTER));

    assert!(Arc::ptr_eq(&value.get_method().unwrap(), &first));
    assert!(value.set_method().is_none());
    assert_eq!(value.semantics().len(), 3);
}

#[test]
fn accessibility_follows_the_accessors() {
    let module = ModuleDefinition::new("Sample.dll");
    let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
    let stranger = TypeDefinition::new("Sample", "Stranger", TypeAttributes::PUBLIC, None);
    module.types().add(widget.clone());
    module.types().add(stranger.clone());

    let getter = MethodDefinition::new("get_Secret", MethodAttributes::PRIVATE);
    widget.methods().add(getter.clone());

    let secret = int_property("Secret");
    widget.properties().add(secret.clone());
    secret.set_semantic_methods(Some(getter.clone()), None);

    assert!(secret.is_accessible_from(&widget));
    assert!(!secret.is_accessible_from(&stranger));

    getter.set_attributes(MethodAttributes::ASSEMBLY);
    assert!(secret.is_accessible_from(&stranger));
}

#[test]
fn properties_refuse_to_be_imported() {
    let source = ModuleDefinition::new("Source.dll");
    let target = ModuleDefinition::new("Target.dll");
    let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
    source.types().add(widget.clone());

    let size = int_property("Size");
    widget.properties().add(size.clone());

    assert!(size.is_imported_in(&source));
    assert!(!size.is_imported_in(&target));
    assert!(matches!(
        size.import_with(&ReferenceImporter::new(&target)),
        Err(Error::NotSupported)
    ));
}

fn widget_image() -> MetadataImage {
    let mut builder = MetadataImageBuilder::new("Sample.dll");
    builder.type_def(0x0000_0001, "Sample", "Widget", CodedIndex::new(TableId::TypeDef, 0));
    for index in 0..32 {
        let getter = builder.method(0x0886, &format!("get_P{index}"));
        let property = builder
            .property(0, &format!("P{index}"), &[0x28, 0x00, 0x08])
            .unwrap();
        builder.semantics(0x0002, getter, property);
    }
    builder.build().unwrap()
}

#[test]
fn backed_properties_materialize_consistently_across_threads() {
    let module = load_module(widget_image(), ModuleOptions::default()).unwrap();
    let widget = module.find_type("Sample", "Widget").unwrap();

    let names = thread::scope(|scope| {
        let workers = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    widget
                        .properties()
                        .iter()
                        .map(|property| {
                            let getter = property.get_method().unwrap();
                            format!("{} {}", property.name().unwrap(), getter.name().unwrap())
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        workers
            .into_iter()
            .map(|worker| worker.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(names[0].len(), 32);
    assert_eq!(names[0][7], "P7 get_P7");
    assert!(names.iter().all(|list| list == &names[0]));
    assert_eq!(widget.properties().len(), 32);
}

#[test]
fn backed_fields_can_be_overwritten() {
    let module = load_module(widget_image(), ModuleOptions::default()).unwrap();
    let widget = module.find_type("Sample", "Widget").unwrap();
    let property = widget.find_property("P3").unwrap();

    assert_eq!(property.token(), Token::from_parts(TableId::Property, 4));
    property.set_name("Renamed");
    property.set_signature(None);
    assert_eq!(property.full_name().unwrap(), "<Unknown> Sample.Widget::Renamed");
}

#[test]
fn moving_a_backed_method_survives_enumerating_its_old_type() {
    let module = load_module(widget_image(), ModuleOptions::default()).unwrap();
    let widget = module.find_type("Sample", "Widget").unwrap();
    let other = TypeDefinition::new("Sample", "Other", TypeAttributes::PUBLIC, None);
    module.types().add(other.clone());

    let getter = widget
        .find_property("P0")
        .and_then(|property| property.get_method())
        .unwrap();
    other.methods().add(getter.clone());

    assert_eq!(widget.methods().len(), 31);
    assert!(!widget.methods().contains(&getter));
    assert_eq!(other.methods().len(), 1);
    assert!(Arc::ptr_eq(&getter.declaring_type().unwrap(), &other));
}
