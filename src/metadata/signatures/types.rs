use std::fmt;

use strum::{EnumIter, IntoEnumIterator};

#[allow(non_snake_case, dead_code, missing_docs)]
/// Element type bytes used in signature blobs (ECMA-335 II.23.1.16)
pub mod ELEMENT_TYPE {
    //Marks end of a list
    pub const END: u8 = 0x00;
    pub const VOID: u8 = 0x01;
    pub const BOOLEAN: u8 = 0x02;
    pub const CHAR: u8 = 0x03;
    pub const I1: u8 = 0x04;
    pub const U1: u8 = 0x05;
    pub const I2: u8 = 0x06;
    pub const U2: u8 = 0x07;
    pub const I4: u8 = 0x08;
    pub const U4: u8 = 0x09;
    pub const I8: u8 = 0x0a;
    pub const U8: u8 = 0x0b;
    pub const R4: u8 = 0x0c;
    pub const R8: u8 = 0x0d;
    pub const STRING: u8 = 0x0e;
    // Followed by TypeDef or TypeRef token
    pub const VALUETYPE: u8 = 0x11;
    // Followed by TypeDef or TypeRef token
    pub const CLASS: u8 = 0x12;
    pub const TYPEDBYREF: u8 = 0x16;
    // System.IntPtr
    pub const I: u8 = 0x18;
    // System.UIntPtr
    pub const U: u8 = 0x19;
    // System.Object
    pub const OBJECT: u8 = 0x1c;
}

#[allow(non_snake_case, dead_code, missing_docs)]
/// Leading bytes of standalone signature blobs (ECMA-335 II.23.2)
pub mod SIGNATURE_HEADER {
    pub const FIELD: u8 = 0x06;
    pub const LOCAL_SIG: u8 = 0x07;
    pub const PROPERTY: u8 = 0x08;
}

#[allow(non_snake_case, dead_code, missing_docs)]
/// Calling convention flags or'd into a signature header
pub mod CALLING_CONVENTION {
    pub const HASTHIS: u8 = 0x20;
    pub const EXPLICITTHIS: u8 = 0x40;
}

/// The primitive types of the core library, each encoded by a single element type byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter)]
pub enum CorLibType {
    /// `System.Void`
    Void,
    /// `System.Boolean`
    Boolean,
    /// `System.Char`
    Char,
    /// `System.SByte`
    I1,
    /// `System.Byte`
    U1,
    /// `System.Int16`
    I2,
    /// `System.UInt16`
    U2,
    /// `System.Int32`
    I4,
    /// `System.UInt32`
    U4,
    /// `System.Int64`
    I8,
    /// `System.UInt64`
    U8,
    /// `System.Single`
    R4,
    /// `System.Double`
    R8,
    /// `System.String`
    String,
    /// `System.TypedReference`
    TypedByRef,
    /// `System.IntPtr`
    I,
    /// `System.UIntPtr`
    U,
    /// `System.Object`
    Object,
}

impl CorLibType {
    /// The element type byte of this type
    #[must_use]
    pub fn element_type(&self) -> u8 {
        match self {
            CorLibType::Void => ELEMENT_TYPE::VOID,
            CorLibType::Boolean => ELEMENT_TYPE::BOOLEAN,
            CorLibType::Char => ELEMENT_TYPE::CHAR,
            CorLibType::I1 => ELEMENT_TYPE::I1,
            CorLibType::U1 => ELEMENT_TYPE::U1,
            CorLibType::I2 => ELEMENT_TYPE::I2,
            CorLibType::U2 => ELEMENT_TYPE::U2,
            CorLibType::I4 => ELEMENT_TYPE::I4,
            CorLibType::U4 => ELEMENT_TYPE::U4,
            CorLibType::I8 => ELEMENT_TYPE::I8,
            CorLibType::U8 => ELEMENT_TYPE::U8,
            CorLibType::R4 => ELEMENT_TYPE::R4,
            CorLibType::R8 => ELEMENT_TYPE::R8,
            CorLibType::String => ELEMENT_TYPE::STRING,
            CorLibType::TypedByRef => ELEMENT_TYPE::TYPEDBYREF,
            CorLibType::I => ELEMENT_TYPE::I,
            CorLibType::U => ELEMENT_TYPE::U,
            CorLibType::Object => ELEMENT_TYPE::OBJECT,
        }
    }

    /// Maps an element type byte back to its primitive type
    #[must_use]
    pub fn from_element_type(element_type: u8) -> Option<CorLibType> {
        CorLibType::iter().find(|ty| ty.element_type() == element_type)
    }

    /// Simple name within the `System` namespace
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CorLibType::Void => "Void",
            CorLibType::Boolean => "Boolean",
            CorLibType::Char => "Char",
            CorLibType::I1 => "SByte",
            CorLibType::U1 => "Byte",
            CorLibType::I2 => "Int16",
            CorLibType::U2 => "UInt16",
            CorLibType::I4 => "Int32",
            CorLibType::U4 => "UInt32",
            CorLibType::I8 => "Int64",
            CorLibType::U8 => "UInt64",
            CorLibType::R4 => "Single",
            CorLibType::R8 => "Double",
            CorLibType::String => "String",
            CorLibType::TypedByRef => "TypedReference",
            CorLibType::I => "IntPtr",
            CorLibType::U => "UIntPtr",
            CorLibType::Object => "Object",
        }
    }

    /// Namespace of every core library primitive
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        "System"
    }

    /// Returns false for the two primitive reference types, `String` and `Object`
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        !matches!(self, CorLibType::String | CorLibType::Object)
    }
}

impl fmt::Display for CorLibType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_types_are_unique_and_invertible() {
        for ty in CorLibType::iter() {
            assert_eq!(CorLibType::from_element_type(ty.element_type()), Some(ty));
        }
        assert_eq!(CorLibType::from_element_type(ELEMENT_TYPE::CLASS), None);
        assert_eq!(CorLibType::from_element_type(0x0f), None);
    }

    #[test]
    fn names_and_classification() {
        assert_eq!(CorLibType::I4.to_string(), "System.Int32");
        assert_eq!(CorLibType::TypedByRef.name(), "TypedReference");
        assert!(CorLibType::I4.is_value_type());
        assert!(!CorLibType::String.is_value_type());
        assert!(!CorLibType::Object.is_value_type());
    }
}
