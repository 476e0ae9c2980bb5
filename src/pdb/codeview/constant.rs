//! `S_CONSTANT` debug symbols: a named compile-time value of a CodeView type.

use std::{
    fmt,
    sync::{
        atomic::{AtomicU16, Ordering},
        Arc,
    },
};

use crate::{
    file::{io::read_le_at, parser::Parser},
    metadata::lazy::LazyCell,
    pdb::codeview::{SymbolKind, TypeRecord, TypeRecordSource},
    Result,
};

const LF_CHAR: u16 = 0x8000;
const LF_SHORT: u16 = 0x8001;
const LF_USHORT: u16 = 0x8002;
const LF_LONG: u16 = 0x8003;
const LF_ULONG: u16 = 0x8004;

/// A named constant of a symbol stream (`S_CONSTANT`).
///
/// Name and type are read from the record on first access. The value is decoded when the
/// symbol is built and held as a 16 bit integer.
///
/// # Examples
///
/// ```rust
/// use dotmodel::pdb::codeview::{ConstantSymbol, SimpleTypeRecord, TypeRecord};
///
/// let symbol = ConstantSymbol::new(
///     "MaxRetries",
///     TypeRecord::Simple(SimpleTypeRecord::from_index(0x73)),
///     5,
/// );
/// assert_eq!(symbol.to_string(), "Constant: unsigned short MaxRetries = 5");
/// ```
pub struct ConstantSymbol {
    name: LazyCell<String>,
    constant_type: LazyCell<TypeRecord>,
    value: AtomicU16,
}

impl ConstantSymbol {
    /// Creates a constant that does not come from a symbol stream
    #[must_use]
    pub fn new(name: &str, constant_type: TypeRecord, value: u16) -> Self {
        ConstantSymbol {
            name: LazyCell::new(name.to_string()),
            constant_type: LazyCell::new(constant_type),
            value: AtomicU16::new(value),
        }
    }

    /// Decodes the body of an `S_CONSTANT` record: type index, numeric leaf, name.
    ///
    /// The name is decoded on first access, but its terminator must follow the value: a leaf
    /// whose payload runs into the name leaves none and the record is rejected.
    ///
    /// # Errors
    /// Returns an error if the body is truncated, has no terminated name after the value, or
    /// the value does not fit 16 bits.
    pub fn from_record(body: &[u8], types: Arc<dyn TypeRecordSource>) -> Result<Self> {
        let mut offset = 0;
        let type_index = read_le_at::<u32>(body, &mut offset)?;
        let value = read_numeric_leaf(body, &mut offset)?;

        let name_data = body[offset..].to_vec();
        if !name_data.contains(&0) {
            return Err(malformed_error!(
                "Constant record has no terminated name after its value at offset {}",
                offset
            ));
        }

        Ok(ConstantSymbol {
            name: LazyCell::from_source(move || Parser::new(&name_data).read_string_utf8()),
            constant_type: LazyCell::from_source(move || types.type_record(type_index)),
            value: AtomicU16::new(value),
        })
    }

    /// Always [`SymbolKind::Constant`]
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        SymbolKind::Constant
    }

    /// Name of the constant
    ///
    /// # Errors
    /// Returns an error if the name in the record is not terminated or not UTF-8.
    pub fn name(&self) -> Result<String> {
        self.name.get()
    }

    /// Replaces the name
    pub fn set_name(&self, name: &str) {
        self.name.set(name.to_string());
    }

    /// Type of the constant
    ///
    /// # Errors
    /// Returns an error if the type index names no record.
    pub fn constant_type(&self) -> Result<TypeRecord> {
        self.constant_type.get()
    }

    /// Replaces the type
    pub fn set_constant_type(&self, constant_type: TypeRecord) {
        self.constant_type.set(constant_type);
    }

    /// Value of the constant
    #[must_use]
    pub fn value(&self) -> u16 {
        self.value.load(Ordering::Acquire)
    }

    /// Replaces the value
    pub fn set_value(&self, value: u16) {
        self.value.store(value, Ordering::Release);
    }
}

/// Reads a CodeView numeric leaf whose value fits 16 bits
fn read_numeric_leaf(data: &[u8], offset: &mut usize) -> Result<u16> {
    let leaf = read_le_at::<u16>(data, offset)?;
    if leaf < LF_CHAR {
        return Ok(leaf);
    }

    let value = match leaf {
        LF_CHAR => i64::from(read_le_at::<i8>(data, offset)?),
        LF_SHORT => i64::from(read_le_at::<i16>(data, offset)?),
        LF_USHORT => i64::from(read_le_at::<u16>(data, offset)?),
        LF_LONG => i64::from(read_le_at::<i32>(data, offset)?),
        LF_ULONG => i64::from(read_le_at::<u32>(data, offset)?),
        other => {
            return Err(malformed_error!(
                "Numeric leaf 0x{:04X} is not supported for constants",
                other
            ))
        }
    };

    u16::try_from(value)
        .map_err(|_| malformed_error!("Constant value {} does not fit 16 bits", value))
}

impl fmt::Display for ConstantSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constant_type = self
            .constant_type()
            .map_or_else(|_| "<unknown type>".to_string(), |ty| ty.to_string());
        let name = self.name().unwrap_or_else(|_| "<unknown>".to_string());

        write!(
            f,
            "{}: {} {} = {}",
            self.kind(),
            constant_type,
            name,
            self.value()
        )
    }
}

impl fmt::Debug for ConstantSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstantSymbol")
            .field("name", &self.name().ok())
            .field("value", &self.value())
            .finish_non_exhaustive()
    }
}
