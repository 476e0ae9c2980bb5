use std::{
    fmt,
    sync::{Arc, RwLock, Weak},
};

use bitflags::bitflags;

use crate::{
    metadata::{
        lazy::LazyCell,
        members::CustomAttribute,
        module::ModuleDefinition,
        owned::{ItemSource, LazyOwnedCollection, Owned, OwnedCollection, OwnerLink},
        tables::TableId,
        token::Token,
        traits::{HasCustomAttributes, MemberDefinition, MetadataMember},
        typesystem::{same_module, TypeDefinition},
    },
    Result,
};

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    /// Flags of a `MethodDef` row (ECMA-335 II.23.1.10)
    pub struct MethodAttributes: u16 {
        /// Mask selecting the member access bits
        const MEMBER_ACCESS_MASK = 0x0007;
        /// Not referenceable by name
        const COMPILER_CONTROLLED = 0x0000;
        /// Accessible only to the declaring type and its nested types
        const PRIVATE = 0x0001;
        /// Accessible to derived types inside the assembly
        const FAM_AND_ASSEM = 0x0002;
        /// Accessible inside the assembly
        const ASSEMBLY = 0x0003;
        /// Accessible to derived types
        const FAMILY = 0x0004;
        /// Accessible to derived types and inside the assembly
        const FAM_OR_ASSEM = 0x0005;
        /// Accessible everywhere the declaring type is
        const PUBLIC = 0x0006;
        /// Defined on the type rather than per instance
        const STATIC = 0x0010;
        /// Cannot be overridden
        const FINAL = 0x0020;
        /// Virtual
        const VIRTUAL = 0x0040;
        /// Hidden by name and signature
        const HIDE_BY_SIG = 0x0080;
        /// Always gets a new vtable slot
        const NEW_SLOT = 0x0100;
        /// No implementation
        const ABSTRACT = 0x0400;
        /// Name has special meaning
        const SPECIAL_NAME = 0x0800;
        /// Name has special meaning to the runtime
        const RT_SPECIAL_NAME = 0x1000;
    }
}

/// Member access decoded from [`MethodAttributes::MEMBER_ACCESS_MASK`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberAccess {
    /// Never accessible by name
    CompilerControlled,
    /// Declaring type and nested types
    Private,
    /// Derived types in the same assembly
    FamAndAssem,
    /// Same assembly
    Assembly,
    /// Derived types
    Family,
    /// Derived types or same assembly
    FamOrAssem,
    /// Everywhere
    Public,
}

impl MemberAccess {
    /// Decodes the access bits. The reserved value 7 is treated as compiler controlled.
    #[must_use]
    pub fn from_attributes(attributes: MethodAttributes) -> Self {
        match attributes.bits() & MethodAttributes::MEMBER_ACCESS_MASK.bits() {
            0x1 => MemberAccess::Private,
            0x2 => MemberAccess::FamAndAssem,
            0x3 => MemberAccess::Assembly,
            0x4 => MemberAccess::Family,
            0x5 => MemberAccess::FamOrAssem,
            0x6 => MemberAccess::Public,
            _ => MemberAccess::CompilerControlled,
        }
    }
}

/// A method defined by a type (a `MethodDef` row).
///
/// Only what accessors need is modelled: name, flags, custom attributes and the declaring type.
pub struct MethodDefinition {
    token: Token,
    attributes: RwLock<MethodAttributes>,
    name: LazyCell<String>,
    custom_attributes: LazyOwnedCollection<dyn HasCustomAttributes, CustomAttribute>,
    link: OwnerLink<TypeDefinition, MethodDefinition>,
}

impl MethodDefinition {
    /// Creates a method that has not been assigned a row
    #[must_use]
    pub fn new(name: &str, attributes: MethodAttributes) -> Arc<Self> {
        Self::with_token(Token::unbound(TableId::MethodDef), name, attributes)
    }

    /// Creates a method for an existing `MethodDef` row
    #[must_use]
    pub fn with_token(token: Token, name: &str, attributes: MethodAttributes) -> Arc<Self> {
        Self::backed(
            token,
            attributes,
            LazyCell::new(name.to_string()),
            None,
            OwnerLink::new(),
        )
    }

    pub(crate) fn backed(
        token: Token,
        attributes: MethodAttributes,
        name: LazyCell<String>,
        custom_attributes: Option<ItemSource<CustomAttribute>>,
        link: OwnerLink<TypeDefinition, MethodDefinition>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<MethodDefinition>| {
            let attribute_owner: Weak<dyn HasCustomAttributes> = me.clone();
            MethodDefinition {
                token,
                attributes: RwLock::new(attributes),
                name,
                custom_attributes: LazyOwnedCollection::with_source(
                    attribute_owner,
                    custom_attributes,
                ),
                link,
            }
        })
    }

    /// Flags of the method
    pub fn attributes(&self) -> MethodAttributes {
        *read_lock!(self.attributes)
    }

    /// Replaces the flags of the method
    pub fn set_attributes(&self, attributes: MethodAttributes) {
        *write_lock!(self.attributes) = attributes;
    }

    /// Access decoded from the flags
    pub fn access(&self) -> MemberAccess {
        MemberAccess::from_attributes(self.attributes())
    }

    /// Returns true for static methods
    pub fn is_static(&self) -> bool {
        self.attributes().contains(MethodAttributes::STATIC)
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

    /// The type whose method collection holds this method
    pub fn declaring_type(&self) -> Option<Arc<TypeDefinition>> {
        self.link.owner()
    }

    /// The module of the declaring type
    pub fn module(&self) -> Option<Arc<ModuleDefinition>> {
        self.declaring_type()?.module()
    }

    /// `Declaring.Type::Name`, or the bare name for detached methods
    ///
    /// # Errors
    /// Returns an error if a backing string cannot be read.
    pub fn full_name(&self) -> Result<String> {
        let name = self.name()?;
        match self.declaring_type() {
            Some(declaring) => Ok(format!("{}::{}", declaring.full_name()?, name)),
            None => Ok(name),
        }
    }

    /// Custom attributes applied to this method
    pub fn custom_attributes(&self) -> &OwnedCollection<dyn HasCustomAttributes, CustomAttribute> {
        self.custom_attributes.get()
    }

    /// Returns true if code in `from` may call this method (ECMA-335 II.8.5.3.2).
    ///
    /// The declaring type has to be accessible first; detached methods are never accessible.
    pub fn is_accessible_from(&self, from: &TypeDefinition) -> bool {
        let Some(declaring) = self.declaring_type() else {
            return false;
        };
        if !declaring.is_accessible_from(from) {
            return false;
        }

        let family = || from.is_nested_within(&declaring) || from.is_derived_from(&declaring);
        let same_assembly = || same_module(declaring.module(), from.module());

        match self.access() {
            MemberAccess::CompilerControlled => false,
            MemberAccess::Private => from.is_nested_within(&declaring),
            MemberAccess::FamAndAssem => family() && same_assembly(),
            MemberAccess::Assembly => same_assembly(),
            MemberAccess::Family => family(),
            MemberAccess::FamOrAssem => family() || same_assembly(),
            MemberAccess::Public => true,
        }
    }
}

impl MetadataMember for MethodDefinition {
    fn token(&self) -> Token {
        self.token
    }
}

impl MemberDefinition for MethodDefinition {
    fn name(&self) -> Result<String> {
        MethodDefinition::name(self)
    }

    fn declaring_type(&self) -> Option<Arc<TypeDefinition>> {
        MethodDefinition::declaring_type(self)
    }

    fn module(&self) -> Option<Arc<ModuleDefinition>> {
        MethodDefinition::module(self)
    }

    fn full_name(&self) -> Result<String> {
        MethodDefinition::full_name(self)
    }

    fn is_accessible_from(&self, ty: &TypeDefinition) -> bool {
        MethodDefinition::is_accessible_from(self, ty)
    }
}

impl HasCustomAttributes for MethodDefinition {
    fn custom_attributes(&self) -> &OwnedCollection<dyn HasCustomAttributes, CustomAttribute> {
        MethodDefinition::custom_attributes(self)
    }
}

impl Owned<TypeDefinition> for MethodDefinition {
    fn owner_link(&self) -> &OwnerLink<TypeDefinition, MethodDefinition> {
        &self.link
    }
}

impl fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("token", &self.token)
            .field("name", &self.name().unwrap_or_default())
            .field("attributes", &self.attributes())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::typesystem::{TypeAttributes, TypeDefOrRef};

    #[test]
    fn access_decoding() {
        assert_eq!(
            MemberAccess::from_attributes(MethodAttributes::PUBLIC | MethodAttributes::STATIC),
            MemberAccess::Public
        );
        assert_eq!(
            MemberAccess::from_attributes(MethodAttributes::FAM_OR_ASSEM),
            MemberAccess::FamOrAssem
        );
        assert_eq!(
            MemberAccess::from_attributes(MethodAttributes::from_bits_retain(0x7)),
            MemberAccess::CompilerControlled
        );
    }

    #[test]
    fn full_name_includes_declaring_type() {
        let ty = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
        let method = MethodDefinition::new("get_Size", MethodAttributes::PUBLIC);
        assert_eq!(method.full_name().unwrap(), "get_Size");

        ty.methods().add(method.clone());
        assert_eq!(method.full_name().unwrap(), "Sample.Widget::get_Size");
    }

    #[test]
    fn member_accessibility() {
        let module = ModuleDefinition::new("Sample.dll");
        let base = TypeDefinition::new("Sample", "Base", TypeAttributes::PUBLIC, None);
        let derived = TypeDefinition::new(
            "Sample",
            "Derived",
            TypeAttributes::PUBLIC,
            Some(TypeDefOrRef::from(&base)),
        );
        let stranger = TypeDefinition::new("Sample", "Stranger", TypeAttributes::PUBLIC, None);
        module.types().add(base.clone());
        module.types().add(derived.clone());
        module.types().add(stranger.clone());

        let private = MethodDefinition::new("Secret", MethodAttributes::PRIVATE);
        let family = MethodDefinition::new("Hook", MethodAttributes::FAMILY);
        let internal = MethodDefinition::new("Helper", MethodAttributes::ASSEMBLY);
        let hidden = MethodDefinition::new(".ctor", MethodAttributes::COMPILER_CONTROLLED);
        for method in [&private, &family, &internal, &hidden] {
            base.methods().add(Arc::clone(method));
        }

        assert!(private.is_accessible_from(&base));
        assert!(!private.is_accessible_from(&derived));
        assert!(family.is_accessible_from(&derived));
        assert!(!family.is_accessible_from(&stranger));
        assert!(internal.is_accessible_from(&stranger));
        assert!(!hidden.is_accessible_from(&base));

        let detached = MethodDefinition::new("Orphan", MethodAttributes::PUBLIC);
        assert!(!detached.is_accessible_from(&base));
    }
}
