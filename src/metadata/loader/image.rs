//! In-memory metadata: heaps and table rows.

use uguid::Guid;

use crate::{
    metadata::{
        identity::AssemblyIdentity,
        streams::{Blob, Strings},
        tables::{
            AssemblyRefRaw, CodedIndex, ConstantRaw, CustomAttributeRaw, MetadataTable,
            MethodDefRaw, MethodSemanticsRaw, NestedClassRaw, PropertyMapRaw, PropertyRaw,
            TableId, TypeDefRaw, TypeRefRaw,
        },
        token::Token,
    },
    Result,
};

/// The heaps and tables of one module, as produced by a metadata reader.
///
/// Rows reference heaps by offset and other rows by 1-based row id. The loader keeps the image
/// alive for as long as the module it builds and decodes fields from it on demand.
pub struct MetadataImage {
    /// `#Strings` offset of the module name
    pub module_name: u32,
    /// Module version id
    pub mvid: Guid,
    /// Identity of the assembly, if this is a manifest module
    pub assembly: Option<AssemblyIdentity>,
    /// `#Strings` heap
    pub strings: Strings,
    /// `#Blob` heap
    pub blob: Blob,
    /// `TypeRef` rows
    pub type_ref: MetadataTable<TypeRefRaw>,
    /// `TypeDef` rows
    pub type_def: MetadataTable<TypeDefRaw>,
    /// `MethodDef` rows
    pub method_def: MetadataTable<MethodDefRaw>,
    /// `Property` rows
    pub property: MetadataTable<PropertyRaw>,
    /// `PropertyMap` rows
    pub property_map: MetadataTable<PropertyMapRaw>,
    /// `MethodSemantics` rows
    pub method_semantics: MetadataTable<MethodSemanticsRaw>,
    /// `Constant` rows
    pub constant: MetadataTable<ConstantRaw>,
    /// `CustomAttribute` rows
    pub custom_attribute: MetadataTable<CustomAttributeRaw>,
    /// `NestedClass` rows
    pub nested_class: MetadataTable<NestedClassRaw>,
    /// `AssemblyRef` rows
    pub assembly_ref: MetadataTable<AssemblyRefRaw>,
}

impl Default for MetadataImage {
    fn default() -> Self {
        MetadataImage {
            module_name: 0,
            mvid: Guid::from_bytes([0; 16]),
            assembly: None,
            strings: Strings::new(),
            blob: Blob::new(),
            type_ref: MetadataTable::default(),
            type_def: MetadataTable::default(),
            method_def: MetadataTable::default(),
            property: MetadataTable::default(),
            property_map: MetadataTable::default(),
            method_semantics: MetadataTable::default(),
            constant: MetadataTable::default(),
            custom_attribute: MetadataTable::default(),
            nested_class: MetadataTable::default(),
            assembly_ref: MetadataTable::default(),
        }
    }
}

/// Assembles a [`MetadataImage`] row by row.
///
/// Methods and properties belong to the most recently added type, the way the `TypeDef` and
/// `PropertyMap` member lists lay them out.
///
/// # Examples
///
/// ```rust
/// use dotmodel::metadata::loader::{load_module, MetadataImageBuilder};
/// use dotmodel::metadata::config::ModuleOptions;
/// use dotmodel::metadata::tables::{CodedIndex, TableId};
///
/// let mut builder = MetadataImageBuilder::new("Sample.dll");
/// builder.type_def(0x0010_0001, "Sample", "Widget", CodedIndex::new(TableId::TypeDef, 0));
/// builder.method(0x0886, "get_Size");
/// builder.property(0, "Size", &[0x28, 0x00, 0x08])?;
///
/// let module = load_module(builder.build()?, ModuleOptions::default())?;
/// let widget = module.find_type("Sample", "Widget").unwrap();
/// assert_eq!(widget.methods().len(), 1);
/// assert_eq!(widget.properties().get(0).unwrap().name()?, "Size");
/// # Ok::<(), dotmodel::Error>(())
/// ```
pub struct MetadataImageBuilder {
    module_name: u32,
    mvid: Guid,
    assembly: Option<AssemblyIdentity>,
    strings: Strings,
    blob: Blob,
    type_ref: Vec<TypeRefRaw>,
    type_def: Vec<TypeDefRaw>,
    method_def: Vec<MethodDefRaw>,
    property: Vec<PropertyRaw>,
    property_map: Vec<PropertyMapRaw>,
    method_semantics: Vec<MethodSemanticsRaw>,
    constant: Vec<ConstantRaw>,
    custom_attribute: Vec<CustomAttributeRaw>,
    nested_class: Vec<NestedClassRaw>,
    assembly_ref: Vec<AssemblyRefRaw>,
}

fn next_rid<T>(rows: &[T]) -> u32 {
    rows.len() as u32 + 1
}

impl MetadataImageBuilder {
    /// Starts an image for a module called `name`
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut strings = Strings::new();
        let module_name = strings.push(name);

        MetadataImageBuilder {
            module_name,
            mvid: Guid::from_bytes([0; 16]),
            assembly: None,
            strings,
            blob: Blob::new(),
            type_ref: Vec::new(),
            type_def: Vec::new(),
            method_def: Vec::new(),
            property: Vec::new(),
            property_map: Vec::new(),
            method_semantics: Vec::new(),
            constant: Vec::new(),
            custom_attribute: Vec::new(),
            nested_class: Vec::new(),
            assembly_ref: Vec::new(),
        }
    }

    /// Sets the module version id
    pub fn mvid(&mut self, mvid: Guid) -> &mut Self {
        self.mvid = mvid;
        self
    }

    /// Makes the module the manifest module of `assembly`
    pub fn assembly(&mut self, assembly: AssemblyIdentity) -> &mut Self {
        self.assembly = Some(assembly);
        self
    }

    /// Adds an `AssemblyRef` row
    pub fn assembly_ref(&mut self, identity: &AssemblyIdentity) -> Token {
        let rid = next_rid(&self.assembly_ref);
        let name = self.strings.push(&identity.name);
        let culture = match &identity.culture {
            Some(culture) => self.strings.push(culture),
            None => 0,
        };
        let version = [
            u32::from(identity.version.major),
            u32::from(identity.version.minor),
            u32::from(identity.version.build),
            u32::from(identity.version.revision),
        ];

        let row = AssemblyRefRaw::new(rid, version, name, culture);
        let token = row.token;
        self.assembly_ref.push(row);
        token
    }

    /// Adds a `TypeRef` row
    pub fn type_ref(&mut self, scope: CodedIndex, namespace: &str, name: &str) -> Token {
        let rid = next_rid(&self.type_ref);
        let name = self.strings.push(name);
        let namespace = self.strings.push(namespace);

        let row = TypeRefRaw::new(rid, scope, name, namespace);
        let token = row.token;
        self.type_ref.push(row);
        token
    }

    /// Adds a `TypeDef` row; methods and properties added next belong to it
    pub fn type_def(&mut self, flags: u32, namespace: &str, name: &str, extends: CodedIndex) -> Token {
        let rid = next_rid(&self.type_def);
        let name = self.strings.push(name);
        let namespace = self.strings.push(namespace);
        let method_list = next_rid(&self.method_def);

        let row = TypeDefRaw::new(rid, flags, name, namespace, extends, method_list);
        let token = row.token;
        self.type_def.push(row);
        token
    }

    /// Adds a `MethodDef` row to the last type
    pub fn method(&mut self, flags: u32, name: &str) -> Token {
        let rid = next_rid(&self.method_def);
        let name = self.strings.push(name);

        let row = MethodDefRaw::new(rid, 0, flags, name);
        let token = row.token;
        self.method_def.push(row);
        token
    }

    /// Adds a `Property` row to the last type, opening its `PropertyMap` run if needed
    ///
    /// # Errors
    /// Returns an error if the signature does not fit the blob heap.
    pub fn property(&mut self, flags: u32, name: &str, signature: &[u8]) -> Result<Token> {
        let rid = next_rid(&self.property);
        let parent = self.type_def.len() as u32;
        if self.property_map.last().map(|map| map.parent) != Some(parent) {
            let map_rid = next_rid(&self.property_map);
            self.property_map.push(PropertyMapRaw::new(map_rid, parent, rid));
        }

        let name = self.strings.push(name);
        let signature = self.blob.push(signature)?;

        let row = PropertyRaw::new(rid, flags, name, signature);
        let token = row.token;
        self.property.push(row);
        Ok(token)
    }

    /// Adds a `MethodSemantics` row linking `method` to `property`
    pub fn semantics(&mut self, semantics: u32, method: Token, property: Token) -> Token {
        let rid = next_rid(&self.method_semantics);
        let row = MethodSemanticsRaw::new(
            rid,
            semantics,
            method.row(),
            CodedIndex::new(TableId::Property, property.row()),
        );
        let token = row.token;
        self.method_semantics.push(row);
        token
    }

    /// Adds a `Constant` row
    ///
    /// # Errors
    /// Returns an error if `parent` names no table or the value does not fit the blob heap.
    pub fn constant(&mut self, parent: Token, element_type: u8, value: &[u8]) -> Result<Token> {
        let rid = next_rid(&self.constant);
        let value = self.blob.push(value)?;

        let row = ConstantRaw::new(rid, element_type, CodedIndex::from_token(parent)?, value);
        let token = row.token;
        self.constant.push(row);
        Ok(token)
    }

    /// Adds a `CustomAttribute` row
    ///
    /// # Errors
    /// Returns an error if a token names no table or the value does not fit the blob heap.
    pub fn custom_attribute(
        &mut self,
        parent: Token,
        constructor: Token,
        value: &[u8],
    ) -> Result<Token> {
        let rid = next_rid(&self.custom_attribute);
        let value = self.blob.push(value)?;

        let row = CustomAttributeRaw::new(
            rid,
            CodedIndex::from_token(parent)?,
            CodedIndex::from_token(constructor)?,
            value,
        );
        let token = row.token;
        self.custom_attribute.push(row);
        Ok(token)
    }

    /// Adds a `NestedClass` row
    pub fn nested(&mut self, nested: Token, enclosing: Token) -> Token {
        let rid = next_rid(&self.nested_class);
        let row = NestedClassRaw::new(rid, nested.row(), enclosing.row());
        let token = row.token;
        self.nested_class.push(row);
        token
    }

    /// Finishes the image
    ///
    /// # Errors
    /// Returns an error if a table is inconsistent.
    pub fn build(self) -> Result<MetadataImage> {
        Ok(MetadataImage {
            module_name: self.module_name,
            mvid: self.mvid,
            assembly: self.assembly,
            strings: self.strings,
            blob: self.blob,
            type_ref: MetadataTable::from_rows(self.type_ref)?,
            type_def: MetadataTable::from_rows(self.type_def)?,
            method_def: MetadataTable::from_rows(self.method_def)?,
            property: MetadataTable::from_rows(self.property)?,
            property_map: MetadataTable::from_rows(self.property_map)?,
            method_semantics: MetadataTable::from_rows(self.method_semantics)?,
            constant: MetadataTable::from_rows(self.constant)?,
            custom_attribute: MetadataTable::from_rows(self.custom_attribute)?,
            nested_class: MetadataTable::from_rows(self.nested_class)?,
            assembly_ref: MetadataTable::from_rows(self.assembly_ref)?,
        })
    }
}
