use std::{fmt, sync::Arc};

use crate::{
    file::io::{read_le_at, CilIO},
    metadata::{
        lazy::LazyCell, signatures::ELEMENT_TYPE, tables::TableId, token::Token,
        traits::MetadataMember,
    },
    Error::TypeError,
    Result,
};

/// A compile-time constant attached to a field, parameter or property (a `Constant` row).
///
/// The value is kept as the raw little-endian blob; [`Constant::read`] and the typed helpers
/// decode it on demand.
pub struct Constant {
    token: Token,
    element_type: u8,
    value: LazyCell<Vec<u8>>,
}

impl Constant {
    /// Creates a constant that has not been assigned a row
    #[must_use]
    pub fn new(element_type: u8, value: Vec<u8>) -> Arc<Self> {
        Self::backed(
            Token::unbound(TableId::Constant),
            element_type,
            LazyCell::new(value),
        )
    }

    /// A 32-bit integer constant
    #[must_use]
    pub fn from_i32(value: i32) -> Arc<Self> {
        Self::new(ELEMENT_TYPE::I4, value.to_le_bytes().to_vec())
    }

    /// A UTF-16 string constant
    #[must_use]
    pub fn from_string(value: &str) -> Arc<Self> {
        let bytes = value
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect::<Vec<u8>>();
        Self::new(ELEMENT_TYPE::STRING, bytes)
    }

    pub(crate) fn backed(token: Token, element_type: u8, value: LazyCell<Vec<u8>>) -> Arc<Self> {
        Arc::new(Constant {
            token,
            element_type,
            value,
        })
    }

    /// `ELEMENT_TYPE_*` of the value
    pub fn element_type(&self) -> u8 {
        self.element_type
    }

    /// Raw value bytes
    ///
    /// # Errors
    /// Returns an error if the backing blob cannot be read.
    pub fn value(&self) -> Result<Vec<u8>> {
        self.value.get()
    }

    /// Decodes the value as a little-endian primitive
    ///
    /// # Errors
    /// Returns an error if the value is shorter than `T`.
    pub fn read<T: CilIO>(&self) -> Result<T> {
        let value = self.value()?;
        let mut offset = 0;
        read_le_at::<T>(&value, &mut offset)
    }

    /// Decodes a string constant
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] if the constant is not a string, or an error if
    /// the value is not valid UTF-16.
    pub fn as_string(&self) -> Result<String> {
        if self.element_type != ELEMENT_TYPE::STRING {
            return Err(TypeError(format!(
                "constant of element type 0x{:02x} is not a string",
                self.element_type
            )));
        }

        let value = self.value()?;
        let units = value
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect::<Vec<u16>>();
        String::from_utf16(&units).map_err(|_| malformed_error!("Invalid UTF-16 string constant"))
    }
}

impl MetadataMember for Constant {
    fn token(&self) -> Token {
        self.token
    }
}

impl fmt::Debug for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constant")
            .field("token", &self.token)
            .field("element_type", &format_args!("0x{:02x}", self.element_type))
            .field("value", &self.value().unwrap_or_default())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads() {
        let constant = Constant::from_i32(-2);
        assert_eq!(constant.element_type(), ELEMENT_TYPE::I4);
        assert_eq!(constant.read::<i32>().unwrap(), -2);
        assert!(constant.read::<u64>().is_err());
        assert!(constant.as_string().is_err());
    }

    #[test]
    fn string_constants() {
        let constant = Constant::from_string("hi");
        assert_eq!(constant.value().unwrap(), vec![b'h', 0, b'i', 0]);
        assert_eq!(constant.as_string().unwrap(), "hi");
    }
}
