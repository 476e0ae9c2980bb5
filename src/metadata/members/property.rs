//! Property definitions.
//!
//! A property has no code of its own: its accessors are methods of the declaring type linked
//! through [`crate::metadata::members::MethodSemantics`]. The declaring type is set by the
//! type's `properties` collection and never directly.

use std::{
    fmt,
    sync::{Arc, RwLock, Weak},
};

use bitflags::bitflags;

use crate::{
    metadata::{
        importer::ReferenceImporter,
        lazy::LazyCell,
        members::{
            Constant, CustomAttribute, MethodDefinition, MethodSemantics,
            MethodSemanticsAttributes,
        },
        module::ModuleDefinition,
        owned::{ItemSource, LazyOwnedCollection, Owned, OwnedCollection, OwnerLink},
        signatures::{PropertySignature, UNKNOWN_TYPE_NAME},
        tables::TableId,
        token::Token,
        traits::{
            HasConstant, HasCustomAttributes, HasSemantics, Importable, MemberDefinition,
            MetadataMember,
        },
        typesystem::TypeDefinition,
    },
    Error::NotSupported,
    Result,
};

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    /// Flags of a `Property` row (ECMA-335 II.23.1.14)
    pub struct PropertyAttributes: u16 {
        /// Name has special meaning
        const SPECIAL_NAME = 0x0200;
        /// Name has special meaning to the runtime
        const RT_SPECIAL_NAME = 0x0400;
        /// Property has a default value in the `Constant` table
        const HAS_DEFAULT = 0x1000;
    }
}

/// Everything a backed [`PropertyDefinition`] is built from.
pub(crate) struct PropertyDefinitionParts {
    pub token: Token,
    pub attributes: PropertyAttributes,
    pub name: LazyCell<String>,
    pub signature: LazyCell<Option<PropertySignature>>,
    pub constant: LazyCell<Option<Arc<Constant>>>,
    pub semantics: Option<ItemSource<MethodSemantics>>,
    pub custom_attributes: Option<ItemSource<CustomAttribute>>,
    pub link: OwnerLink<TypeDefinition, PropertyDefinition>,
}

/// A property declared by a type (a `Property` row).
///
/// A property has no code of its own: its behaviour is the getter, setter and other accessor
/// methods linked through [`PropertyDefinition::semantics`]. The declaring type is whatever
/// type's property collection holds it.
///
/// # Examples
///
/// ```rust
/// use dotmodel::prelude::*;
///
/// let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
/// let getter = MethodDefinition::new("get_Size", MethodAttributes::PUBLIC);
/// widget.methods().add(getter.clone());
///
/// let size = PropertyDefinition::new(
///     "Size",
///     PropertyAttributes::empty(),
///     Some(PropertySignature::instance(TypeSignature::CorLib(CorLibType::I4))),
/// );
/// widget.properties().add(size.clone());
/// size.set_semantic_methods(Some(getter), None);
///
/// assert_eq!(size.full_name()?, "System.Int32 Sample.Widget::Size");
/// assert!(size.get_method().is_some());
/// assert!(size.set_method().is_none());
/// # Ok::<(), dotmodel::Error>(())
/// ```
pub struct PropertyDefinition {
    me: Weak<PropertyDefinition>,
    token: Token,
    attributes: RwLock<PropertyAttributes>,
    name: LazyCell<String>,
    signature: LazyCell<Option<PropertySignature>>,
    constant: LazyCell<Option<Arc<Constant>>>,
    semantics: LazyOwnedCollection<dyn HasSemantics, MethodSemantics>,
    custom_attributes: LazyOwnedCollection<dyn HasCustomAttributes, CustomAttribute>,
    link: OwnerLink<TypeDefinition, PropertyDefinition>,
}

impl PropertyDefinition {
    /// Creates a property that has not been assigned a row
    #[must_use]
    pub fn new(
        name: &str,
        attributes: PropertyAttributes,
        signature: Option<PropertySignature>,
    ) -> Arc<Self> {
        Self::with_token(Token::unbound(TableId::Property), name, attributes, signature)
    }

    /// Creates a property for an existing `Property` row
    #[must_use]
    pub fn with_token(
        token: Token,
        name: &str,
        attributes: PropertyAttributes,
        signature: Option<PropertySignature>,
    ) -> Arc<Self> {
        Self::from_parts(PropertyDefinitionParts {
            token,
            attributes,
            name: LazyCell::new(name.to_string()),
            signature: LazyCell::new(signature),
            constant: LazyCell::new(None),
            semantics: None,
            custom_attributes: None,
            link: OwnerLink::new(),
        })
    }

    pub(crate) fn from_parts(parts: PropertyDefinitionParts) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<PropertyDefinition>| {
            let semantics_owner: Weak<dyn HasSemantics> = me.clone();
            let attribute_owner: Weak<dyn HasCustomAttributes> = me.clone();
            PropertyDefinition {
                me: me.clone(),
                token: parts.token,
                attributes: RwLock::new(parts.attributes),
                name: parts.name,
                signature: parts.signature,
                constant: parts.constant,
                semantics: LazyOwnedCollection::with_source(semantics_owner, parts.semantics),
                custom_attributes: LazyOwnedCollection::with_source(
                    attribute_owner,
                    parts.custom_attributes,
                ),
                link: parts.link,
            }
        })
    }

    /// Flags of the property
    pub fn attributes(&self) -> PropertyAttributes {
        *read_lock!(self.attributes)
    }

    /// Replaces the flags of the property
    pub fn set_attributes(&self, attributes: PropertyAttributes) {
        *write_lock!(self.attributes) = attributes;
    }

    fn set_flag(&self, flag: PropertyAttributes, value: bool) {
        write_lock!(self.attributes).set(flag, value);
    }

    /// Returns true if the name has special meaning
    pub fn is_special_name(&self) -> bool {
        self.attributes().contains(PropertyAttributes::SPECIAL_NAME)
    }

    /// Sets or clears [`PropertyAttributes::SPECIAL_NAME`]
    pub fn set_special_name(&self, value: bool) {
        self.set_flag(PropertyAttributes::SPECIAL_NAME, value);
    }

    /// Returns true if the name has special meaning to the runtime
    pub fn is_runtime_special_name(&self) -> bool {
        self.attributes().contains(PropertyAttributes::RT_SPECIAL_NAME)
    }

    /// Sets or clears [`PropertyAttributes::RT_SPECIAL_NAME`]
    pub fn set_runtime_special_name(&self, value: bool) {
        self.set_flag(PropertyAttributes::RT_SPECIAL_NAME, value);
    }

    /// Returns true if the property has a default value
    pub fn has_default(&self) -> bool {
        self.attributes().contains(PropertyAttributes::HAS_DEFAULT)
    }

    /// Sets or clears [`PropertyAttributes::HAS_DEFAULT`]
    pub fn set_has_default(&self, value: bool) {
        self.set_flag(PropertyAttributes::HAS_DEFAULT, value);
    }

    /// Simple name
    ///
    /// # Errors
    /// Returns an error if the backing string cannot be read.
    pub fn name(&self) -> Result<String> {
        self.name.get()
    }

    /// Replaces the simple name
    pub fn set_name(&self, name: &str) {
        self.name.set(name.to_string());
    }

    /// Type and index parameters of the property
    ///
    /// # Errors
    /// Returns an error if the backing blob is not a valid property signature.
    pub fn signature(&self) -> Result<Option<PropertySignature>> {
        self.signature.get()
    }

    /// Replaces the signature
    pub fn set_signature(&self, signature: Option<PropertySignature>) {
        self.signature.set(signature);
    }

    /// Default value of the property
    ///
    /// # Errors
    /// Returns an error if the backing constant cannot be read.
    pub fn constant(&self) -> Result<Option<Arc<Constant>>> {
        self.constant.get()
    }

    /// Replaces the default value. Does not touch [`PropertyAttributes::HAS_DEFAULT`].
    pub fn set_constant(&self, constant: Option<Arc<Constant>>) {
        self.constant.set(constant);
    }

    /// Accessor links, in metadata order
    pub fn semantics(&self) -> &OwnedCollection<dyn HasSemantics, MethodSemantics> {
        self.semantics.get()
    }

    /// Custom attributes applied to this property
    pub fn custom_attributes(&self) -> &OwnedCollection<dyn HasCustomAttributes, CustomAttribute> {
        self.custom_attributes.get()
    }

    /// Replaces every accessor link with a getter and a setter link, in that order.
    ///
    /// Other accessors are dropped; a `None` accessor produces no link.
    pub fn set_semantic_methods(
        &self,
        getter: Option<Arc<MethodDefinition>>,
        setter: Option<Arc<MethodDefinition>>,
    ) {
        let semantics = self.semantics();
        semantics.clear();

        if let Some(getter) = getter {
            semantics.add(MethodSemantics::new(getter, MethodSemanticsAttributes::GETTER));
        }
        if let Some(setter) = setter {
            semantics.add(MethodSemantics::new(setter, MethodSemanticsAttributes::SETTER));
        }
    }

    fn accessor(&self, role: MethodSemanticsAttributes) -> Option<Arc<MethodDefinition>> {
        self.semantics()
            .find(|link| link.has_role(role))
            .map(|link| link.method())
    }

    /// The first getter link's method
    pub fn get_method(&self) -> Option<Arc<MethodDefinition>> {
        self.accessor(MethodSemanticsAttributes::GETTER)
    }

    /// The first setter link's method
    pub fn set_method(&self) -> Option<Arc<MethodDefinition>> {
        self.accessor(MethodSemanticsAttributes::SETTER)
    }

    /// The type whose property collection holds this property
    pub fn declaring_type(&self) -> Option<Arc<TypeDefinition>> {
        self.link.owner()
    }

    /// The module of the declaring type
    pub fn module(&self) -> Option<Arc<ModuleDefinition>> {
        self.declaring_type()?.module()
    }

    /// `PropertyType Declaring.Type::Name`, with `[p1, p2]` appended for indexers.
    ///
    /// A detached property renders as `PropertyType Name`.
    ///
    /// # Errors
    /// Returns an error if a backing name or the signature cannot be read.
    pub fn full_name(&self) -> Result<String> {
        let name = self.name()?;
        let signature = self.signature()?;

        let property_type = signature.as_ref().map_or_else(
            || UNKNOWN_TYPE_NAME.to_string(),
            |signature| signature.property_type.full_name(),
        );

        let mut full_name = match self.declaring_type() {
            Some(declaring) => format!("{} {}::{}", property_type, declaring.full_name()?, name),
            None => format!("{property_type} {name}"),
        };

        if let Some(signature) = signature.filter(|signature| !signature.parameters.is_empty()) {
            let parameters = signature
                .parameters
                .iter()
                .map(|parameter| parameter.full_name())
                .collect::<Vec<_>>();
            full_name.push('[');
            full_name.push_str(&parameters.join(", "));
            full_name.push(']');
        }

        Ok(full_name)
    }

    /// Returns true if any accessor method may be called from `from`
    pub fn is_accessible_from(&self, from: &TypeDefinition) -> bool {
        self.semantics()
            .iter()
            .any(|link| link.method().is_accessible_from(from))
    }

    /// A strong reference to this property; properties resolve to themselves
    pub fn resolve(&self) -> Option<Arc<PropertyDefinition>> {
        self.me.upgrade()
    }

    /// Returns true if the property belongs to `module` and its signature only uses types
    /// usable from `module`
    pub fn is_imported_in(&self, module: &ModuleDefinition) -> bool {
        let in_module = self
            .module()
            .is_some_and(|owner| std::ptr::eq(Arc::as_ptr(&owner), module));

        in_module
            && match self.signature() {
                Ok(Some(signature)) => signature.is_imported_in(module),
                Ok(None) => true,
                Err(_) => false,
            }
    }

    /// Properties cannot be imported on their own.
    ///
    /// # Errors
    /// Always returns [`crate::Error::NotSupported`].
    pub fn import_with(&self, _importer: &ReferenceImporter) -> Result<Arc<PropertyDefinition>> {
        Err(NotSupported)
    }
}

impl MetadataMember for PropertyDefinition {
    fn token(&self) -> Token {
        self.token
    }
}

impl MemberDefinition for PropertyDefinition {
    fn name(&self) -> Result<String> {
        PropertyDefinition::name(self)
    }

    fn declaring_type(&self) -> Option<Arc<TypeDefinition>> {
        PropertyDefinition::declaring_type(self)
    }

    fn module(&self) -> Option<Arc<ModuleDefinition>> {
        PropertyDefinition::module(self)
    }

    fn full_name(&self) -> Result<String> {
        PropertyDefinition::full_name(self)
    }

    fn is_accessible_from(&self, ty: &TypeDefinition) -> bool {
        PropertyDefinition::is_accessible_from(self, ty)
    }
}

impl HasSemantics for PropertyDefinition {
    fn semantics(&self) -> &OwnedCollection<dyn HasSemantics, MethodSemantics> {
        PropertyDefinition::semantics(self)
    }
}

impl HasCustomAttributes for PropertyDefinition {
    fn custom_attributes(&self) -> &OwnedCollection<dyn HasCustomAttributes, CustomAttribute> {
        PropertyDefinition::custom_attributes(self)
    }
}

impl HasConstant for PropertyDefinition {
    fn constant(&self) -> Result<Option<Arc<Constant>>> {
        PropertyDefinition::constant(self)
    }

    fn set_constant(&self, constant: Option<Arc<Constant>>) {
        PropertyDefinition::set_constant(self, constant);
    }
}

impl Importable for PropertyDefinition {
    type Imported = Arc<PropertyDefinition>;

    fn is_imported_in(&self, module: &ModuleDefinition) -> bool {
        PropertyDefinition::is_imported_in(self, module)
    }

    fn import_with(&self, importer: &ReferenceImporter) -> Result<Self::Imported> {
        PropertyDefinition::import_with(self, importer)
    }
}

impl Owned<TypeDefinition> for PropertyDefinition {
    fn owner_link(&self) -> &OwnerLink<TypeDefinition, PropertyDefinition> {
        &self.link
    }
}

impl fmt::Debug for PropertyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDefinition")
            .field("token", &self.token)
            .field("name", &self.name().unwrap_or_default())
            .field("attributes", &self.attributes())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        members::MethodAttributes,
        signatures::{CorLibType, TypeSignature},
        typesystem::TypeAttributes,
    };

    fn int_signature() -> Option<PropertySignature> {
        Some(PropertySignature::instance(TypeSignature::CorLib(
            CorLibType::I4,
        )))
    }

    #[test]
    fn flag_accessors_touch_one_bit() {
        let property = PropertyDefinition::new(
            "Value",
            PropertyAttributes::HAS_DEFAULT | PropertyAttributes::RT_SPECIAL_NAME,
            None,
        );

        property.set_special_name(true);
        assert_eq!(
            property.attributes(),
            PropertyAttributes::SPECIAL_NAME
                | PropertyAttributes::RT_SPECIAL_NAME
                | PropertyAttributes::HAS_DEFAULT
        );

        property.set_special_name(false);
        property.set_has_default(false);
        assert!(!property.is_special_name());
        assert!(!property.has_default());
        assert!(property.is_runtime_special_name());

        property.set_runtime_special_name(false);
        assert!(property.attributes().is_empty());
    }

    #[test]
    fn semantic_methods_replace_existing_links() {
        let getter = MethodDefinition::new("get_Value", MethodAttributes::PUBLIC);
        let setter = MethodDefinition::new("set_Value", MethodAttributes::PUBLIC);
        let other = MethodDefinition::new("reset_Value", MethodAttributes::PUBLIC);

        let property = PropertyDefinition::new("Value", PropertyAttributes::empty(), None);
        property
            .semantics()
            .add(MethodSemantics::new(other, MethodSemanticsAttributes::OTHER));

        property.set_semantic_methods(Some(getter.clone()), Some(setter.clone()));
        let roles = property
            .semantics()
            .iter()
            .map(|link| link.attributes())
            .collect::<Vec<_>>();
        assert_eq!(
            roles,
            vec![
                MethodSemanticsAttributes::GETTER,
                MethodSemanticsAttributes::SETTER
            ]
        );
        assert!(Arc::ptr_eq(&property.get_method().unwrap(), &getter));
        assert!(Arc::ptr_eq(&property.set_method().unwrap(), &setter));

        property.set_semantic_methods(None, None);
        assert!(property.semantics().is_empty());
        assert!(property.get_method().is_none());
    }

    #[test]
    fn first_link_of_a_role_wins() {
        let first = MethodDefinition::new("get_A", MethodAttributes::PUBLIC);
        let second = MethodDefinition::new("get_B", MethodAttributes::PUBLIC);
        let property = PropertyDefinition::new("Value", PropertyAttributes::empty(), None);

        property
            .semantics()
            .add(MethodSemantics::new(first.clone(), MethodSemanticsAttributes::GETTER));
        property
            .semantics()
            .add(MethodSemantics::new(second, MethodSemanticsAttributes::GETTER));

        assert!(Arc::ptr_eq(&property.get_method().unwrap(), &first));
    }

    #[test]
    fn semantic_links_know_their_association() {
        let getter = MethodDefinition::new("get_Value", MethodAttributes::PUBLIC);
        let property = PropertyDefinition::new("Value", PropertyAttributes::empty(), None);
        property.set_semantic_methods(Some(getter), None);

        let link = property.semantics().get(0).unwrap();
        let association = link.association().unwrap();
        assert_eq!(association.token(), property.token());

        property.semantics().clear();
        assert!(link.association().is_none());
    }

    #[test]
    fn full_names() {
        let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
        let plain = PropertyDefinition::new("Count", PropertyAttributes::empty(), int_signature());
        assert_eq!(plain.full_name().unwrap(), "System.Int32 Count");

        widget.properties().add(plain.clone());
        assert_eq!(plain.full_name().unwrap(), "System.Int32 Sample.Widget::Count");

        let mut indexer_signature =
            PropertySignature::instance(TypeSignature::CorLib(CorLibType::String));
        indexer_signature.parameters = vec![
            TypeSignature::CorLib(CorLibType::I4),
            TypeSignature::CorLib(CorLibType::Object),
        ];
        let indexer =
            PropertyDefinition::new("Item", PropertyAttributes::empty(), Some(indexer_signature));
        widget.properties().add(indexer.clone());
        assert_eq!(
            indexer.full_name().unwrap(),
            "System.String Sample.Widget::Item[System.Int32, System.Object]"
        );

        let untyped = PropertyDefinition::new("Loose", PropertyAttributes::empty(), None);
        assert_eq!(
            untyped.full_name().unwrap(),
            format!("{UNKNOWN_TYPE_NAME} Loose")
        );
    }

    #[test]
    fn accessibility_follows_accessors() {
        let module = ModuleDefinition::new("Sample.dll");
        let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
        let stranger = TypeDefinition::new("Sample", "Stranger", TypeAttributes::PUBLIC, None);
        module.types().add(widget.clone());
        module.types().add(stranger.clone());

        let getter = MethodDefinition::new("get_Value", MethodAttributes::PRIVATE);
        let setter = MethodDefinition::new("set_Value", MethodAttributes::PUBLIC);
        widget.methods().add(getter.clone());
        widget.methods().add(setter.clone());

        let property = PropertyDefinition::new("Value", PropertyAttributes::empty(), None);
        widget.properties().add(property.clone());
        assert!(!property.is_accessible_from(&stranger));

        property.set_semantic_methods(Some(getter.clone()), None);
        assert!(!property.is_accessible_from(&stranger));
        assert!(property.is_accessible_from(&widget));

        property.set_semantic_methods(Some(getter), Some(setter));
        assert!(property.is_accessible_from(&stranger));
    }

    #[test]
    fn resolve_and_import() {
        let module = ModuleDefinition::new("Sample.dll");
        let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
        module.types().add(widget.clone());

        let property = PropertyDefinition::new("Value", PropertyAttributes::empty(), int_signature());
        assert!(!property.is_imported_in(&module));

        widget.properties().add(property.clone());
        assert!(property.is_imported_in(&module));
        assert!(Arc::ptr_eq(&property.resolve().unwrap(), &property));

        let other = ModuleDefinition::new("Other.dll");
        assert!(!property.is_imported_in(&other));

        let importer = ReferenceImporter::new(&other);
        assert!(matches!(property.import_with(&importer), Err(NotSupported)));
    }

    #[test]
    fn constants() {
        let property = PropertyDefinition::new("Value", PropertyAttributes::HAS_DEFAULT, None);
        assert!(property.constant().unwrap().is_none());

        property.set_constant(Some(Constant::from_i32(7)));
        let constant = property.constant().unwrap().unwrap();
        assert_eq!(constant.read::<i32>().unwrap(), 7);
    }
}
