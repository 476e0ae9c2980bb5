use std::{fmt, sync::Arc};

use crate::Result;

/// Type indexes below this value name simple types; the rest index the type stream
pub const FIRST_LEAF_INDEX: u32 = 0x1000;

/// The built-in types a simple type index can name
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimpleTypeKind {
    /// `void`
    Void,
    /// `HRESULT`
    HResult,
    /// `signed char`
    SignedCharacter,
    /// `unsigned char`
    UnsignedCharacter,
    /// `char`
    NarrowCharacter,
    /// `wchar_t`
    WideCharacter,
    /// `char16_t`
    Character16,
    /// `char32_t`
    Character32,
    /// 8 bit signed integer
    SByte,
    /// 8 bit unsigned integer
    Byte,
    /// 16 bit signed integer
    Int16Short,
    /// 16 bit unsigned integer
    UInt16Short,
    /// 16 bit signed integer
    Int16,
    /// 16 bit unsigned integer
    UInt16,
    /// 32 bit signed `long`
    Int32Long,
    /// 32 bit unsigned `long`
    UInt32Long,
    /// 32 bit signed integer
    Int32,
    /// 32 bit unsigned integer
    UInt32,
    /// 64 bit signed `__int64`
    Int64Quad,
    /// 64 bit unsigned `__int64`
    UInt64Quad,
    /// 64 bit signed integer
    Int64,
    /// 64 bit unsigned integer
    UInt64,
    /// `float`
    Float32,
    /// `double`
    Float64,
    /// 8 bit `bool`
    Boolean8,
    /// Any other simple type
    Other(u8),
}

impl SimpleTypeKind {
    /// Decodes the kind stored in the low byte of a simple type index
    #[must_use]
    pub fn from_byte(value: u8) -> Self {
        match value {
            0x03 => SimpleTypeKind::Void,
            0x08 => SimpleTypeKind::HResult,
            0x10 => SimpleTypeKind::SignedCharacter,
            0x20 => SimpleTypeKind::UnsignedCharacter,
            0x70 => SimpleTypeKind::NarrowCharacter,
            0x71 => SimpleTypeKind::WideCharacter,
            0x7A => SimpleTypeKind::Character16,
            0x7B => SimpleTypeKind::Character32,
            0x68 => SimpleTypeKind::SByte,
            0x69 => SimpleTypeKind::Byte,
            0x11 => SimpleTypeKind::Int16Short,
            0x21 => SimpleTypeKind::UInt16Short,
            0x72 => SimpleTypeKind::Int16,
            0x73 => SimpleTypeKind::UInt16,
            0x12 => SimpleTypeKind::Int32Long,
            0x22 => SimpleTypeKind::UInt32Long,
            0x74 => SimpleTypeKind::Int32,
            0x75 => SimpleTypeKind::UInt32,
            0x13 => SimpleTypeKind::Int64Quad,
            0x23 => SimpleTypeKind::UInt64Quad,
            0x76 => SimpleTypeKind::Int64,
            0x77 => SimpleTypeKind::UInt64,
            0x40 => SimpleTypeKind::Float32,
            0x41 => SimpleTypeKind::Float64,
            0x30 => SimpleTypeKind::Boolean8,
            other => SimpleTypeKind::Other(other),
        }
    }

    /// The C name of the type
    #[must_use]
    pub fn name(&self) -> String {
        let name = match self {
            SimpleTypeKind::Void => "void",
            SimpleTypeKind::HResult => "HRESULT",
            SimpleTypeKind::SignedCharacter => "signed char",
            SimpleTypeKind::UnsignedCharacter => "unsigned char",
            SimpleTypeKind::NarrowCharacter => "char",
            SimpleTypeKind::WideCharacter => "wchar_t",
            SimpleTypeKind::Character16 => "char16_t",
            SimpleTypeKind::Character32 => "char32_t",
            SimpleTypeKind::SByte => "__int8",
            SimpleTypeKind::Byte => "unsigned __int8",
            SimpleTypeKind::Int16Short | SimpleTypeKind::Int16 => "short",
            SimpleTypeKind::UInt16Short | SimpleTypeKind::UInt16 => "unsigned short",
            SimpleTypeKind::Int32Long => "long",
            SimpleTypeKind::UInt32Long => "unsigned long",
            SimpleTypeKind::Int32 => "int",
            SimpleTypeKind::UInt32 => "unsigned int",
            SimpleTypeKind::Int64Quad | SimpleTypeKind::Int64 => "__int64",
            SimpleTypeKind::UInt64Quad | SimpleTypeKind::UInt64 => "unsigned __int64",
            SimpleTypeKind::Float32 => "float",
            SimpleTypeKind::Float64 => "double",
            SimpleTypeKind::Boolean8 => "bool",
            SimpleTypeKind::Other(value) => return format!("<simple 0x{value:02X}>"),
        };
        name.to_string()
    }
}

/// A built-in type, optionally accessed through a pointer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimpleTypeRecord {
    /// The pointee or value type
    pub kind: SimpleTypeKind,
    /// Pointer mode, `0` for a direct value
    pub mode: u8,
}

impl SimpleTypeRecord {
    /// Splits a simple type index into kind (bits 0-7) and pointer mode (bits 8-11)
    #[must_use]
    pub fn from_index(index: u32) -> Self {
        SimpleTypeRecord {
            kind: SimpleTypeKind::from_byte((index & 0xFF) as u8),
            mode: ((index >> 8) & 0x0F) as u8,
        }
    }

    /// Returns true if the value is accessed through a pointer
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        self.mode != 0
    }
}

impl fmt::Display for SimpleTypeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind.name())?;
        if self.is_pointer() {
            write!(f, "*")?;
        }
        Ok(())
    }
}

/// A record of the type stream
#[derive(Debug, PartialEq, Eq)]
pub struct LeafRecord {
    /// Type index of the record
    pub index: u32,
    /// `LF_*` leaf kind
    pub kind: u16,
    /// Name of the described type, for the kinds that carry one
    pub name: Option<String>,
    /// Record body after the leaf kind
    pub data: Vec<u8>,
}

impl fmt::Display for LeafRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "<leaf 0x{:04X}>", self.index),
        }
    }
}

/// The type a symbol refers to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRecord {
    /// A built-in type named by the index itself
    Simple(SimpleTypeRecord),
    /// A record of the type stream
    Leaf(Arc<LeafRecord>),
}

impl fmt::Display for TypeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRecord::Simple(simple) => simple.fmt(f),
            TypeRecord::Leaf(leaf) => leaf.fmt(f),
        }
    }
}

/// Resolves type indexes found in symbol records
pub trait TypeRecordSource: Send + Sync {
    /// The type record for `index`
    ///
    /// # Errors
    /// Returns an error if `index` names no record.
    fn type_record(&self, index: u32) -> Result<TypeRecord>;
}

/// The leaf records of a type stream, in index order starting at [`FIRST_LEAF_INDEX`].
///
/// Simple type indexes are answered without consulting the table.
#[derive(Debug, Default)]
pub struct TypeRecordTable {
    records: Vec<Arc<LeafRecord>>,
}

impl TypeRecordTable {
    /// Creates an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a leaf record and returns its type index
    pub fn push(&mut self, kind: u16, name: Option<&str>, data: Vec<u8>) -> u32 {
        let index = FIRST_LEAF_INDEX + self.records.len() as u32;
        self.records.push(Arc::new(LeafRecord {
            index,
            kind,
            name: name.map(str::to_string),
            data,
        }));
        index
    }

    /// Number of leaf records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the table holds no leaf records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl TypeRecordSource for TypeRecordTable {
    fn type_record(&self, index: u32) -> Result<TypeRecord> {
        if index < FIRST_LEAF_INDEX {
            return Ok(TypeRecord::Simple(SimpleTypeRecord::from_index(index)));
        }

        self.records
            .get((index - FIRST_LEAF_INDEX) as usize)
            .map(|record| TypeRecord::Leaf(record.clone()))
            .ok_or_else(|| malformed_error!("Type index 0x{:X} is not in the type stream", index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_indexes_decode_kind_and_mode() {
        let int = SimpleTypeRecord::from_index(0x74);
        assert_eq!(int.kind, SimpleTypeKind::Int32);
        assert!(!int.is_pointer());
        assert_eq!(int.to_string(), "int");

        let pointer = SimpleTypeRecord::from_index(0x0474);
        assert!(pointer.is_pointer());
        assert_eq!(pointer.to_string(), "int*");

        assert_eq!(SimpleTypeRecord::from_index(0xEE).to_string(), "<simple 0xEE>");
    }

    #[test]
    fn table_answers_simple_and_leaf_indexes() {
        let mut table = TypeRecordTable::new();
        let color = table.push(0x1507, Some("Color"), vec![0x00]);
        assert_eq!(color, FIRST_LEAF_INDEX);
        assert_eq!(table.len(), 1);

        assert_eq!(table.type_record(0x75).unwrap().to_string(), "unsigned int");
        assert_eq!(table.type_record(color).unwrap().to_string(), "Color");
        assert!(table.type_record(color + 1).is_err());
    }

    #[test]
    fn unnamed_leaves_render_their_index() {
        let mut table = TypeRecordTable::new();
        let index = table.push(0x1002, None, Vec::new());
        assert_eq!(table.type_record(index).unwrap().to_string(), "<leaf 0x1000>");
    }
}
