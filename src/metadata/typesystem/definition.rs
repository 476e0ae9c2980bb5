//! Type definitions and their member collections.

use std::{
    fmt,
    sync::{Arc, RwLock, Weak},
};

use crate::{
    metadata::{
        config::ModuleOptions,
        lazy::LazyCell,
        members::{CustomAttribute, MethodDefinition, PropertyDefinition},
        module::ModuleDefinition,
        owned::{ItemSource, LazyOwnedCollection, Owned, OwnedCollection, OwnerLink},
        tables::TableId,
        token::Token,
        traits::{HasCustomAttributes, MetadataMember},
        typesystem::{same_module, TypeAttributes, TypeDefOrRef, TypeVisibility},
    },
    Error::RecursionLimit,
    Result,
};

/// Everything a backed [`TypeDefinition`] is built from.
pub(crate) struct TypeDefinitionParts {
    pub token: Token,
    pub attributes: TypeAttributes,
    pub namespace: LazyCell<String>,
    pub name: LazyCell<String>,
    pub base_type: LazyCell<Option<TypeDefOrRef>>,
    pub methods: Option<ItemSource<MethodDefinition>>,
    pub properties: Option<ItemSource<PropertyDefinition>>,
    pub nested_types: Option<ItemSource<TypeDefinition>>,
    pub custom_attributes: Option<ItemSource<CustomAttribute>>,
    pub module_link: OwnerLink<ModuleDefinition, TypeDefinition>,
    pub declaring_link: OwnerLink<TypeDefinition, TypeDefinition>,
}

/// A type defined in a module (a `TypeDef` row).
///
/// A type is owned by its module if it is top-level, or by its enclosing type if it is nested.
/// Members and nested types are held in owned collections, so `declaring_type` of every member
/// always names the type whose collection holds it.
///
/// # Examples
///
/// ```rust
/// use dotmodel::prelude::*;
///
/// let module = ModuleDefinition::new("Sample.dll");
/// let outer = TypeDefinition::new("Sample", "Outer", TypeAttributes::PUBLIC, None);
/// let inner = TypeDefinition::new("", "Inner", TypeAttributes::NESTED_PUBLIC, None);
///
/// module.types().add(outer.clone());
/// outer.nested_types().add(inner.clone());
///
/// assert_eq!(inner.full_name()?, "Sample.Outer/Inner");
/// assert!(inner.is_nested_within(&outer));
/// # Ok::<(), dotmodel::Error>(())
/// ```
pub struct TypeDefinition {
    me: Weak<TypeDefinition>,
    token: Token,
    attributes: RwLock<TypeAttributes>,
    namespace: LazyCell<String>,
    name: LazyCell<String>,
    base_type: LazyCell<Option<TypeDefOrRef>>,
    methods: LazyOwnedCollection<TypeDefinition, MethodDefinition>,
    properties: LazyOwnedCollection<TypeDefinition, PropertyDefinition>,
    nested_types: LazyOwnedCollection<TypeDefinition, TypeDefinition>,
    custom_attributes: LazyOwnedCollection<dyn HasCustomAttributes, CustomAttribute>,
    module_link: OwnerLink<ModuleDefinition, TypeDefinition>,
    declaring_link: OwnerLink<TypeDefinition, TypeDefinition>,
}

impl TypeDefinition {
    /// Creates a type that has not been assigned a row
    #[must_use]
    pub fn new(
        namespace: &str,
        name: &str,
        attributes: TypeAttributes,
        base_type: Option<TypeDefOrRef>,
    ) -> Arc<Self> {
        Self::with_token(
            Token::unbound(TableId::TypeDef),
            namespace,
            name,
            attributes,
            base_type,
        )
    }

    /// Creates a type for an existing `TypeDef` row
    #[must_use]
    pub fn with_token(
        token: Token,
        namespace: &str,
        name: &str,
        attributes: TypeAttributes,
        base_type: Option<TypeDefOrRef>,
    ) -> Arc<Self> {
        Self::from_parts(TypeDefinitionParts {
            token,
            attributes,
            namespace: LazyCell::new(namespace.to_string()),
            name: LazyCell::new(name.to_string()),
            base_type: LazyCell::new(base_type),
            methods: None,
            properties: None,
            nested_types: None,
            custom_attributes: None,
            module_link: OwnerLink::new(),
            declaring_link: OwnerLink::new(),
        })
    }

    pub(crate) fn from_parts(parts: TypeDefinitionParts) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<TypeDefinition>| {
            let attribute_owner: Weak<dyn HasCustomAttributes> = me.clone();
            TypeDefinition {
                me: me.clone(),
                token: parts.token,
                attributes: RwLock::new(parts.attributes),
                namespace: parts.namespace,
                name: parts.name,
                base_type: parts.base_type,
                methods: LazyOwnedCollection::with_source(me.clone(), parts.methods),
                properties: LazyOwnedCollection::with_source(me.clone(), parts.properties),
                nested_types: LazyOwnedCollection::with_source(me.clone(), parts.nested_types),
                custom_attributes: LazyOwnedCollection::with_source(
                    attribute_owner,
                    parts.custom_attributes,
                ),
                module_link: parts.module_link,
                declaring_link: parts.declaring_link,
            }
        })
    }

    /// Flags of the type
    pub fn attributes(&self) -> TypeAttributes {
        *read_lock!(self.attributes)
    }

    /// Replaces the flags of the type
    pub fn set_attributes(&self, attributes: TypeAttributes) {
        *write_lock!(self.attributes) = attributes;
    }

    /// Visibility decoded from the flags
    pub fn visibility(&self) -> TypeVisibility {
        TypeVisibility::from_attributes(self.attributes())
    }

    /// Returns true if the type is an interface
    pub fn is_interface(&self) -> bool {
        self.attributes().contains(TypeAttributes::INTERFACE)
    }

    /// Namespace, empty for nested types and the global namespace
    ///
    /// # Errors
    /// Returns an error if the backing string cannot be read.
    pub fn namespace(&self) -> Result<String> {
        self.namespace.get()
    }

    /// Replaces the namespace
    pub fn set_namespace(&self, namespace: &str) {
        self.namespace.set(namespace.to_string());
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

    /// Name qualified by namespace, or by the enclosing type for nested types (`Outer/Inner`)
    ///
    /// # Errors
    /// Returns an error if a backing string cannot be read, or
    /// [`crate::Error::RecursionLimit`] if the enclosing chain is cyclic.
    pub fn full_name(&self) -> Result<String> {
        self.full_name_bounded(0)
    }

    fn full_name_bounded(&self, depth: usize) -> Result<String> {
        let limit = self.max_depth();
        if depth > limit {
            return Err(RecursionLimit(limit));
        }

        let name = self.name()?;
        if let Some(declaring) = self.declaring_type() {
            return Ok(format!("{}/{}", declaring.full_name_bounded(depth + 1)?, name));
        }

        let namespace = self.namespace()?;
        if namespace.is_empty() {
            Ok(name)
        } else {
            Ok(format!("{namespace}.{name}"))
        }
    }

    /// Base type, `None` for `System.Object`, interfaces and the `<Module>` type
    ///
    /// # Errors
    /// Returns an error if the backing row references a missing type.
    pub fn base_type(&self) -> Result<Option<TypeDefOrRef>> {
        self.base_type.get()
    }

    /// Replaces the base type
    pub fn set_base_type(&self, base_type: Option<TypeDefOrRef>) {
        self.base_type.set(base_type);
    }

    /// Methods declared by this type
    pub fn methods(&self) -> &OwnedCollection<TypeDefinition, MethodDefinition> {
        self.methods.get()
    }

    /// Properties declared by this type
    pub fn properties(&self) -> &OwnedCollection<TypeDefinition, PropertyDefinition> {
        self.properties.get()
    }

    /// Types nested inside this type
    pub fn nested_types(&self) -> &OwnedCollection<TypeDefinition, TypeDefinition> {
        self.nested_types.get()
    }

    /// Custom attributes applied to this type
    pub fn custom_attributes(&self) -> &OwnedCollection<dyn HasCustomAttributes, CustomAttribute> {
        self.custom_attributes.get()
    }

    /// The first method named `name`
    pub fn find_method(&self, name: &str) -> Option<Arc<MethodDefinition>> {
        self.methods()
            .find(|method| method.name().is_ok_and(|candidate| candidate == name))
    }

    /// The first property named `name`
    pub fn find_property(&self, name: &str) -> Option<Arc<PropertyDefinition>> {
        self.properties()
            .find(|property| property.name().is_ok_and(|candidate| candidate == name))
    }

    /// The enclosing type, if this type is nested
    pub fn declaring_type(&self) -> Option<Arc<TypeDefinition>> {
        self.declaring_link.owner()
    }

    /// The module that contains this type, directly or through its enclosing types
    pub fn module(&self) -> Option<Arc<ModuleDefinition>> {
        if let Some(module) = self.module_link.owner() {
            return Some(module);
        }

        let mut current = self.declaring_type();
        for _ in 0..self.max_depth() {
            let declaring = current?;
            if let Some(module) = declaring.module_link.owner() {
                return Some(module);
            }
            current = declaring.declaring_type();
        }
        None
    }

    /// Returns true if this type derives, directly or indirectly, from `System.ValueType`.
    ///
    /// `System.Enum` itself derives from `System.ValueType` but is a reference type; enums
    /// derive from `System.Enum` and are value types.
    pub fn is_value_type(&self) -> bool {
        let Ok(Some(base)) = self.base_type() else {
            return false;
        };

        match base.full_name().as_deref() {
            Some("System.ValueType") => self
                .full_name()
                .map_or(true, |name| name != "System.Enum"),
            Some("System.Enum") => true,
            _ => false,
        }
    }

    /// Returns true if `other` is this type or encloses it at any depth
    pub fn is_nested_within(&self, other: &TypeDefinition) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }

        let mut current = self.declaring_type();
        for _ in 0..self.max_depth() {
            let Some(declaring) = current else {
                return false;
            };
            if std::ptr::eq(Arc::as_ptr(&declaring), other) {
                return true;
            }
            current = declaring.declaring_type();
        }
        false
    }

    /// Resolved base types, nearest first
    ///
    /// The walk stops at the first base that cannot be resolved.
    ///
    /// # Errors
    /// Returns [`crate::Error::RecursionLimit`] if the chain is longer than the module's
    /// resolution depth, which is also how inheritance cycles surface.
    pub fn inheritance_chain(&self) -> Result<Vec<Arc<TypeDefinition>>> {
        let limit = self.max_depth();
        let mut chain = Vec::new();

        let mut current = self.base_type()?.and_then(|base| base.resolve());
        while let Some(base) = current {
            if chain.len() >= limit {
                return Err(RecursionLimit(limit));
            }
            current = base.base_type()?.and_then(|next| next.resolve());
            chain.push(base);
        }

        Ok(chain)
    }

    /// Returns true if `other` appears in this type's resolved inheritance chain
    pub fn is_derived_from(&self, other: &TypeDefinition) -> bool {
        self.inheritance_chain().is_ok_and(|chain| {
            chain
                .iter()
                .any(|base| std::ptr::eq(Arc::as_ptr(base), other))
        })
    }

    /// Returns true if code in `from` may refer to this type (ECMA-335 II.8.5.3).
    ///
    /// A nested type is only accessible where its enclosing type is.
    pub fn is_accessible_from(&self, from: &TypeDefinition) -> bool {
        self.is_accessible_from_bounded(from, 0)
    }

    fn is_accessible_from_bounded(&self, from: &TypeDefinition, depth: usize) -> bool {
        if depth > self.max_depth() {
            return false;
        }

        let declaring = self.declaring_type();
        if let Some(declaring) = &declaring {
            if !declaring.is_accessible_from_bounded(from, depth + 1) {
                return false;
            }
        }

        let same_assembly = same_module(self.module(), from.module());
        match self.visibility() {
            TypeVisibility::Public | TypeVisibility::NestedPublic => true,
            TypeVisibility::NotPublic | TypeVisibility::NestedAssembly => same_assembly,
            TypeVisibility::NestedPrivate => declaring
                .as_ref()
                .is_some_and(|declaring| from.is_nested_within(declaring)),
            TypeVisibility::NestedFamily => {
                declaring.as_ref().is_some_and(|declaring| {
                    from.is_nested_within(declaring) || from.is_derived_from(declaring)
                })
            }
            TypeVisibility::NestedFamAndAssem => {
                same_assembly
                    && declaring.as_ref().is_some_and(|declaring| {
                        from.is_nested_within(declaring) || from.is_derived_from(declaring)
                    })
            }
            TypeVisibility::NestedFamOrAssem => {
                same_assembly
                    || declaring.as_ref().is_some_and(|declaring| {
                        from.is_nested_within(declaring) || from.is_derived_from(declaring)
                    })
            }
        }
    }

    /// A strong reference to this type
    pub fn resolve(&self) -> Option<Arc<TypeDefinition>> {
        self.me.upgrade()
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.module_link
            .owner()
            .map_or(ModuleOptions::default().max_resolution_depth, |module| {
                module.options().max_resolution_depth
            })
    }
}

impl MetadataMember for TypeDefinition {
    fn token(&self) -> Token {
        self.token
    }
}

impl HasCustomAttributes for TypeDefinition {
    fn custom_attributes(&self) -> &OwnedCollection<dyn HasCustomAttributes, CustomAttribute> {
        TypeDefinition::custom_attributes(self)
    }
}

impl Owned<ModuleDefinition> for TypeDefinition {
    fn owner_link(&self) -> &OwnerLink<ModuleDefinition, TypeDefinition> {
        &self.module_link
    }
}

impl Owned<TypeDefinition> for TypeDefinition {
    fn owner_link(&self) -> &OwnerLink<TypeDefinition, TypeDefinition> {
        &self.declaring_link
    }
}

impl fmt::Debug for TypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefinition")
            .field("token", &self.token)
            .field("name", &self.full_name().unwrap_or_default())
            .field("attributes", &self.attributes())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::typesystem::TypeReference;

    fn module_with(types: &[&Arc<TypeDefinition>]) -> Arc<ModuleDefinition> {
        let module = ModuleDefinition::new("Sample.dll");
        for ty in types {
            module.types().add(Arc::clone(ty));
        }
        module
    }

    #[test]
    fn full_names() {
        let outer = TypeDefinition::new("Sample", "Outer", TypeAttributes::PUBLIC, None);
        let inner = TypeDefinition::new("", "Inner", TypeAttributes::NESTED_PUBLIC, None);
        let global = TypeDefinition::new("", "<Module>", TypeAttributes::empty(), None);
        outer.nested_types().add(inner.clone());

        assert_eq!(outer.full_name().unwrap(), "Sample.Outer");
        assert_eq!(inner.full_name().unwrap(), "Sample.Outer/Inner");
        assert_eq!(global.full_name().unwrap(), "<Module>");
    }

    #[test]
    fn nested_type_module_comes_from_enclosing_type() {
        let outer = TypeDefinition::new("Sample", "Outer", TypeAttributes::PUBLIC, None);
        let inner = TypeDefinition::new("", "Inner", TypeAttributes::NESTED_PUBLIC, None);
        let module = module_with(&[&outer]);
        outer.nested_types().add(inner.clone());

        assert!(Arc::ptr_eq(&inner.module().unwrap(), &module));
        assert!(Arc::ptr_eq(&inner.declaring_type().unwrap(), &outer));
    }

    #[test]
    fn value_type_classification() {
        let value_type = TypeReference::new("System", "ValueType", None);
        let enum_ref = TypeReference::new("System", "Enum", None);

        let point = TypeDefinition::new(
            "Sample",
            "Point",
            TypeAttributes::SEALED,
            Some(TypeDefOrRef::from(&value_type)),
        );
        let color = TypeDefinition::new(
            "Sample",
            "Color",
            TypeAttributes::SEALED,
            Some(TypeDefOrRef::from(&enum_ref)),
        );
        let system_enum = TypeDefinition::new(
            "System",
            "Enum",
            TypeAttributes::ABSTRACT,
            Some(TypeDefOrRef::from(&value_type)),
        );
        let class = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);

        assert!(point.is_value_type());
        assert!(color.is_value_type());
        assert!(!system_enum.is_value_type());
        assert!(!class.is_value_type());
    }

    #[test]
    fn inheritance_chain_and_cycles() {
        let base = TypeDefinition::new("Sample", "Base", TypeAttributes::PUBLIC, None);
        let middle = TypeDefinition::new(
            "Sample",
            "Middle",
            TypeAttributes::PUBLIC,
            Some(TypeDefOrRef::from(&base)),
        );
        let leaf = TypeDefinition::new(
            "Sample",
            "Leaf",
            TypeAttributes::PUBLIC,
            Some(TypeDefOrRef::from(&middle)),
        );

        assert_eq!(leaf.inheritance_chain().unwrap().len(), 2);
        assert!(leaf.is_derived_from(&base));
        assert!(!base.is_derived_from(&leaf));

        base.set_base_type(Some(TypeDefOrRef::from(&leaf)));
        assert!(matches!(
            leaf.inheritance_chain(),
            Err(crate::Error::RecursionLimit(_))
        ));
        assert!(!leaf.is_derived_from(&base));
    }

    #[test]
    fn type_accessibility() {
        let outer = TypeDefinition::new("Sample", "Outer", TypeAttributes::PUBLIC, None);
        let hidden = TypeDefinition::new("", "Hidden", TypeAttributes::NESTED_PRIVATE, None);
        let family = TypeDefinition::new("", "Family", TypeAttributes::NESTED_FAMILY, None);
        let derived = TypeDefinition::new(
            "Sample",
            "Derived",
            TypeAttributes::PUBLIC,
            Some(TypeDefOrRef::from(&outer)),
        );
        let stranger = TypeDefinition::new("Sample", "Stranger", TypeAttributes::PUBLIC, None);
        let internal = TypeDefinition::new("Sample", "Internal", TypeAttributes::NOT_PUBLIC, None);
        let _module = module_with(&[&outer, &derived, &stranger, &internal]);
        outer.nested_types().add(hidden.clone());
        outer.nested_types().add(family.clone());

        assert!(hidden.is_accessible_from(&outer));
        assert!(hidden.is_accessible_from(&family));
        assert!(!hidden.is_accessible_from(&stranger));
        assert!(family.is_accessible_from(&derived));
        assert!(!family.is_accessible_from(&stranger));
        assert!(internal.is_accessible_from(&stranger));

        let foreign = TypeDefinition::new("Other", "Foreign", TypeAttributes::PUBLIC, None);
        let _other = module_with(&[&foreign]);
        assert!(!internal.is_accessible_from(&foreign));
        assert!(outer.is_accessible_from(&foreign));
    }

    #[test]
    fn find_members_by_name() {
        let ty = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
        let method = MethodDefinition::new("get_Size", crate::metadata::members::MethodAttributes::PUBLIC);
        let property = PropertyDefinition::new(
            "Size",
            crate::metadata::members::PropertyAttributes::empty(),
            None,
        );
        ty.methods().add(method.clone());
        ty.properties().add(property.clone());

        assert!(Arc::ptr_eq(&ty.find_method("get_Size").unwrap(), &method));
        assert!(Arc::ptr_eq(&ty.find_property("Size").unwrap(), &property));
        assert!(ty.find_method("set_Size").is_none());
    }
}
