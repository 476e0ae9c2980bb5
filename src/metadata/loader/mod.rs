//! Building a module graph from metadata tables.
//!
//! [`load_module`] turns a [`MetadataImage`] into a [`ModuleDefinition`]. Loading is split
//! into one loader per table, run in parallel. Loaders validate cross-table indexes, derive the
//! relation indexes (member lists, nesting, semantics, constants, attributes) and register one
//! entity shell per row. They never decode heaps: every field of every entity is a source over
//! the image that runs on first access.
//!
//! Dangling or inconsistent indexes fail a strict load with [`crate::Error::Malformed`]. A
//! lenient load ([`ModuleOptions::lenient`]) reports them to the module's
//! [`crate::metadata::diagnostics::Diagnostics`] and leaves the offending link out.
//!
//! # Examples
//!
//! ```rust
//! use dotmodel::metadata::config::ModuleOptions;
//! use dotmodel::metadata::loader::{load_module, MetadataImageBuilder};
//! use dotmodel::metadata::tables::{CodedIndex, TableId};
//!
//! let mut builder = MetadataImageBuilder::new("Sample.dll");
//! builder.type_def(0x0000_0001, "Sample", "Widget", CodedIndex::new(TableId::TypeDef, 0));
//! let getter = builder.method(0x0886, "get_Size");
//! let size = builder.property(0, "Size", &[0x28, 0x00, 0x08])?;
//! builder.semantics(0x0002, getter, size);
//!
//! let module = load_module(builder.build()?, ModuleOptions::default())?;
//! let widget = module.find_type("Sample", "Widget").unwrap();
//! let property = widget.find_property("Size").unwrap();
//!
//! assert_eq!(property.get_method().unwrap().name()?, "get_Size");
//! assert_eq!(property.full_name()?, "System.Int32 Sample.Widget::Size");
//! # Ok::<(), dotmodel::Error>(())
//! ```

mod assemblyref;
mod constant;
mod context;
mod customattribute;
mod image;
mod methoddef;
mod methodsemantics;
mod nestedclass;
mod property;
mod propertymap;
mod typedef;
mod typeref;

use std::sync::{Arc, Weak};

use rayon::prelude::*;

pub(crate) use context::LoadContext;
pub use image::{MetadataImage, MetadataImageBuilder};

use crate::{
    metadata::{
        config::ModuleOptions,
        diagnostics::{DiagnosticCategory, Diagnostics},
        lazy::LazyCell,
        module::{ModuleDefinition, ModuleParts},
        tables::TableId,
        token::Token,
    },
    Result,
};

/// A loader for one metadata table
trait MetadataLoader: Send + Sync {
    /// Validates the rows of the table and registers what they describe
    fn load(&self, context: &LoadContext) -> Result<()>;

    /// The table this loader processes
    fn table_id(&self) -> TableId;
}

static LOADERS: [&dyn MetadataLoader; 10] = [
    &assemblyref::AssemblyRefLoader,
    &typeref::TypeRefLoader,
    &typedef::TypeDefLoader,
    &methoddef::MethodDefLoader,
    &property::PropertyLoader,
    &propertymap::PropertyMapLoader,
    &nestedclass::NestedClassLoader,
    &methodsemantics::MethodSemanticsLoader,
    &constant::ConstantLoader,
    &customattribute::CustomAttributeLoader,
];

impl MetadataImage {
    /// Number of rows of `table`; tables the image does not carry are empty
    #[must_use]
    pub fn row_count(&self, table: TableId) -> u32 {
        match table {
            TableId::TypeRef => self.type_ref.row_count(),
            TableId::TypeDef => self.type_def.row_count(),
            TableId::MethodDef => self.method_def.row_count(),
            TableId::Property => self.property.row_count(),
            TableId::PropertyMap => self.property_map.row_count(),
            TableId::MethodSemantics => self.method_semantics.row_count(),
            TableId::Constant => self.constant.row_count(),
            TableId::CustomAttribute => self.custom_attribute.row_count(),
            TableId::NestedClass => self.nested_class.row_count(),
            TableId::AssemblyRef => self.assembly_ref.row_count(),
            _ => 0,
        }
    }
}

/// Builds a module whose entities decode their fields from `image` on first access.
///
/// # Errors
/// In strict mode, returns [`crate::Error::Malformed`] for the first dangling or inconsistent
/// index found. Lenient loads only fail if the image cannot be processed at all.
pub fn load_module(
    image: impl Into<Arc<MetadataImage>>,
    options: ModuleOptions,
) -> Result<Arc<ModuleDefinition>> {
    let image = image.into();
    let diagnostics = Arc::new(Diagnostics::new());
    let context = LoadContext::new(image.clone(), options, diagnostics.clone());

    let module = ModuleDefinition::from_parts(ModuleParts {
        name: lazy_string(&context.me, image.module_name),
        mvid: image.mvid,
        assembly: image.assembly.clone(),
        types: Some(Box::new({
            let weak = context.me.clone();
            move || {
                let Ok(context) = LoadContext::upgrade(&weak) else {
                    return Vec::new();
                };
                context
                    .type_defs
                    .iter()
                    .filter(|entry| !context.enclosing_type.contains_key(entry.key()))
                    .map(|entry| entry.value().clone())
                    .collect()
            }
        })),
        type_references: Some(Box::new({
            let weak = context.me.clone();
            move || {
                let Ok(context) = LoadContext::upgrade(&weak) else {
                    return Vec::new();
                };
                context
                    .type_refs
                    .iter()
                    .map(|entry| entry.value().clone())
                    .collect()
            }
        })),
        options,
        diagnostics,
        backing: Some(context.clone()),
    });
    let _ = context.module.set(Arc::downgrade(&module));

    LOADERS
        .par_iter()
        .filter(|loader| image.row_count(loader.table_id()) > 0)
        .try_for_each(|loader| loader.load(&context))?;

    for entry in &context.assembly_refs {
        module.add_assembly_reference(entry.value().clone());
    }

    Ok(module)
}

fn lazy_string(context: &Weak<LoadContext>, index: u32) -> LazyCell<String> {
    let weak = context.clone();
    LazyCell::from_source(move || LoadContext::upgrade(&weak)?.string(index))
}

fn lazy_blob(context: &Weak<LoadContext>, index: u32) -> LazyCell<Vec<u8>> {
    let weak = context.clone();
    LazyCell::from_source(move || LoadContext::upgrade(&weak)?.blob(index))
}

/// The rows `start..end` of a member list owned by `owner`.
///
/// Lists running past the member table, or ending before they start, are dangling; lenient
/// loads keep the part that exists.
fn member_range(
    context: &LoadContext,
    owner: Token,
    start: u32,
    end: u32,
    table: TableId,
) -> Result<Vec<Token>> {
    let count = context.image.row_count(table);
    let start = start.max(1);

    if start > count + 1 || end < start || end > count + 1 {
        context.dangling(
            DiagnosticCategory::Table,
            owner,
            format!("{table:?} list {start}..{end} exceeds a table of {count} rows"),
        )?;
    }

    let end = end.min(count + 1);
    Ok((start..end)
        .map(|row| Token::from_parts(table, row))
        .collect())
}

/// Returns false and reports if `row` is not a row of `table`
fn row_exists(
    context: &LoadContext,
    category: DiagnosticCategory,
    referrer: Token,
    table: TableId,
    row: u32,
) -> Result<bool> {
    if row >= 1 && row <= context.image.row_count(table) {
        return Ok(true);
    }

    context.dangling(
        category,
        referrer,
        format!("Reference to missing {table:?} row {row}"),
    )?;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::{
            identity::{AssemblyIdentity, AssemblyVersion},
            members::MethodSemanticsAttributes,
            signatures::ELEMENT_TYPE,
            tables::{CodedIndex, MetadataTable, MethodSemanticsRaw, TypeDefRaw},
            traits::MetadataMember,
            typesystem::ResolutionScope,
        },
        Error,
    };

    fn sample() -> MetadataImageBuilder {
        let mut builder = MetadataImageBuilder::new("Sample.dll");
        let corlib = builder.assembly_ref(&AssemblyIdentity::new(
            "mscorlib",
            AssemblyVersion::new(4, 0, 0, 0),
        ));
        let value_type = builder.type_ref(
            CodedIndex::new(TableId::AssemblyRef, corlib.row()),
            "System",
            "ValueType",
        );

        builder.type_def(0, "", "<Module>", CodedIndex::new(TableId::TypeDef, 0));
        let widget = builder.type_def(
            0x0000_0001,
            "Sample",
            "Widget",
            CodedIndex::new(TableId::TypeDef, 0),
        );
        let getter = builder.method(0x0886, "get_Size");
        let setter = builder.method(0x0886, "set_Size");
        let size = builder.property(0x1000, "Size", &[0x28, 0x00, 0x08]).unwrap();
        builder.semantics(0x0002, getter, size);
        builder.semantics(0x0001, setter, size);
        builder
            .constant(size, ELEMENT_TYPE::I4, &42i32.to_le_bytes())
            .unwrap();
        builder
            .custom_attribute(size, Token::from_parts(TableId::MemberRef, 1), &[0x01, 0x00, 0x00, 0x00])
            .unwrap();

        let point = builder.type_def(
            0x0000_0102,
            "",
            "Point",
            CodedIndex::new(TableId::TypeRef, value_type.row()),
        );
        builder.nested(point, widget);
        builder
    }

    #[test]
    fn loads_types_members_and_relations() {
        let module = load_module(sample().build().unwrap(), ModuleOptions::default()).unwrap();
        assert_eq!(module.name().unwrap(), "Sample.dll");
        assert_eq!(module.types().len(), 2);
        assert_eq!(module.type_references().len(), 1);
        assert_eq!(module.assembly_references().len(), 1);

        let widget = module.find_type("Sample", "Widget").unwrap();
        assert_eq!(widget.methods().len(), 2);
        assert_eq!(widget.nested_types().len(), 1);

        let point = widget.nested_types().get(0).unwrap();
        assert_eq!(point.full_name().unwrap(), "Sample.Widget/Point");
        assert!(point.is_value_type());

        let size = widget.find_property("Size").unwrap();
        assert!(size.has_default());
        assert_eq!(size.semantics().len(), 2);
        assert_eq!(size.get_method().unwrap().name().unwrap(), "get_Size");
        assert_eq!(size.set_method().unwrap().name().unwrap(), "set_Size");
        assert_eq!(
            size.semantics().get(1).unwrap().attributes(),
            MethodSemanticsAttributes::SETTER
        );
        assert_eq!(size.constant().unwrap().unwrap().read::<i32>().unwrap(), 42);
        assert_eq!(size.custom_attributes().len(), 1);
        assert!(!module.diagnostics().has_any());
    }

    #[test]
    fn type_reference_scopes_resolve_to_assembly_references() {
        let module = load_module(sample().build().unwrap(), ModuleOptions::default()).unwrap();
        let reference = module.type_references().get(0).unwrap();

        assert!(matches!(
            reference.scope().unwrap(),
            Some(ResolutionScope::AssemblyRef(_))
        ));
        assert_eq!(reference.full_name().unwrap(), "System.ValueType");
    }

    #[test]
    fn declaring_type_is_known_before_enumeration() {
        let module = load_module(sample().build().unwrap(), ModuleOptions::default()).unwrap();
        let token = Token::from_parts(TableId::Property, 1);

        let context = module_context(&module);
        let property = context.properties.get(&token).unwrap().value().clone();
        let declaring = property.declaring_type().unwrap();
        assert_eq!(declaring.name().unwrap(), "Widget");
        assert!(declaring.properties().contains(&property));

        let nested = context
            .type_defs
            .get(&Token::from_parts(TableId::TypeDef, 3))
            .unwrap()
            .value()
            .clone();
        assert_eq!(nested.declaring_type().unwrap().token(), declaring.token());
        assert!(nested.module().is_some());
    }

    fn module_context(module: &ModuleDefinition) -> Arc<LoadContext> {
        module.backing().cloned().expect("loaded modules are backed")
    }

    fn dangling_semantics() -> MetadataImage {
        let mut image = sample().build().unwrap();
        image.method_semantics = MetadataTable::from_rows(vec![
            MethodSemanticsRaw::new(1, 0x0002, 1, CodedIndex::new(TableId::Property, 1)),
            MethodSemanticsRaw::new(2, 0x0001, 9, CodedIndex::new(TableId::Property, 1)),
        ])
        .unwrap();
        image
    }

    #[test]
    fn strict_load_rejects_dangling_indexes() {
        let result = load_module(dangling_semantics(), ModuleOptions::strict());
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn lenient_load_reports_and_skips() {
        let module = load_module(dangling_semantics(), ModuleOptions::lenient()).unwrap();
        assert!(module.diagnostics().has_warnings());

        let size = module
            .find_type("Sample", "Widget")
            .unwrap()
            .find_property("Size")
            .unwrap();
        assert_eq!(size.semantics().len(), 1);
        assert!(size.set_method().is_none());
    }

    #[test]
    fn method_list_past_the_table_is_dangling() {
        let mut image = sample().build().unwrap();
        let mut rows = image.type_def.iter().cloned().collect::<Vec<TypeDefRaw>>();
        rows[2].method_list = 7;
        image.type_def = MetadataTable::from_rows(rows).unwrap();

        assert!(load_module(image, ModuleOptions::strict()).is_err());
    }

    #[test]
    fn materialize_all_forces_everything() {
        let module = load_module(sample().build().unwrap(), ModuleOptions::default()).unwrap();
        module.materialize_all().unwrap();

        let widget = module.find_type("Sample", "Widget").unwrap();
        let size = widget.find_property("Size").unwrap();
        assert!(size.signature().unwrap().is_some());
    }

    #[test]
    fn bad_heap_offsets_fail_on_access_only() {
        let mut image = sample().build().unwrap();
        image.module_name = 0xFFFF;
        let module = load_module(image, ModuleOptions::default()).unwrap();

        assert!(module.name().is_err());
        assert!(module.materialize_all().is_err());
    }
}
