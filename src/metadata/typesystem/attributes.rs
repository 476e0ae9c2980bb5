use bitflags::bitflags;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    /// Flags of a `TypeDef` row (ECMA-335 II.23.1.15)
    pub struct TypeAttributes: u32 {
        /// Mask selecting the visibility bits
        const VISIBILITY_MASK = 0x0000_0007;
        /// Top-level type visible only inside its assembly
        const NOT_PUBLIC = 0x0000_0000;
        /// Top-level type visible everywhere
        const PUBLIC = 0x0000_0001;
        /// Nested type visible wherever its enclosing type is
        const NESTED_PUBLIC = 0x0000_0002;
        /// Nested type visible only inside its enclosing type
        const NESTED_PRIVATE = 0x0000_0003;
        /// Nested type visible to its enclosing type and types derived from it
        const NESTED_FAMILY = 0x0000_0004;
        /// Nested type visible inside its assembly
        const NESTED_ASSEMBLY = 0x0000_0005;
        /// Nested type visible to derived types inside its assembly
        const NESTED_FAM_AND_ASSEM = 0x0000_0006;
        /// Nested type visible to derived types and to its assembly
        const NESTED_FAM_OR_ASSEM = 0x0000_0007;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Type cannot be instantiated
        const ABSTRACT = 0x0000_0080;
        /// Type cannot be derived from
        const SEALED = 0x0000_0100;
        /// Name has special meaning
        const SPECIAL_NAME = 0x0000_0400;
        /// Type is imported from external metadata
        const IMPORT = 0x0000_1000;
        /// Type is serializable
        const SERIALIZABLE = 0x0000_2000;
        /// Static initializer may run before first static field access
        const BEFORE_FIELD_INIT = 0x0010_0000;
        /// Name has special meaning to the runtime
        const RT_SPECIAL_NAME = 0x0000_0800;
    }
}

/// Visibility of a type, decoded from [`TypeAttributes::VISIBILITY_MASK`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeVisibility {
    /// Top-level, assembly only
    NotPublic,
    /// Top-level, everywhere
    Public,
    /// Nested, wherever the enclosing type is visible
    NestedPublic,
    /// Nested, enclosing type only
    NestedPrivate,
    /// Nested, enclosing and derived types
    NestedFamily,
    /// Nested, assembly only
    NestedAssembly,
    /// Nested, derived types inside the assembly
    NestedFamAndAssem,
    /// Nested, derived types or the assembly
    NestedFamOrAssem,
}

impl TypeVisibility {
    /// Extracts the visibility from type flags
    #[must_use]
    pub fn from_attributes(attributes: TypeAttributes) -> Self {
        match attributes.bits() & TypeAttributes::VISIBILITY_MASK.bits() {
            0 => TypeVisibility::NotPublic,
            1 => TypeVisibility::Public,
            2 => TypeVisibility::NestedPublic,
            3 => TypeVisibility::NestedPrivate,
            4 => TypeVisibility::NestedFamily,
            5 => TypeVisibility::NestedAssembly,
            6 => TypeVisibility::NestedFamAndAssem,
            _ => TypeVisibility::NestedFamOrAssem,
        }
    }

    /// Returns true for the nested visibilities
    #[must_use]
    pub fn is_nested(&self) -> bool {
        !matches!(self, TypeVisibility::NotPublic | TypeVisibility::Public)
    }
}
