//! Metadata entity identity.
//!
//! Every entity in the object model carries a [`Token`]: the table it belongs to in the high
//! byte and its 1-based row in the low 24 bits. Entities that were built in memory and have
//! not been assigned a row yet carry an *unbound* token, which keeps the table but uses row 0.
//!
//! # Examples
//!
//! ```rust
//! use dotmodel::metadata::{tables::TableId, token::Token};
//!
//! let backed = Token::from_parts(TableId::Property, 3);
//! assert_eq!(backed.value(), 0x1700_0003);
//! assert_eq!(backed.table_id(), Some(TableId::Property));
//!
//! let synthetic = Token::unbound(TableId::Property);
//! assert!(synthetic.is_unbound());
//! assert!(!backed.is_unbound());
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::metadata::tables::TableId;

/// A metadata token representing a reference to a metadata table entry.
///
/// Tokens in .NET metadata consist of a 32-bit value where:
/// - The high byte (bits 24-31) indicates the table type
/// - The low 24 bits (bits 0-23) indicate the row index within that table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token for `row` in `table`
    #[must_use]
    pub fn from_parts(table: TableId, row: u32) -> Self {
        Token(((table as u32) << 24) | (row & 0x00FF_FFFF))
    }

    /// Creates the unbound token of `table`, used by entities that have no row yet
    #[must_use]
    pub fn unbound(table: TableId) -> Self {
        Token::from_parts(table, 0)
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the table type from the token (high byte)
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Returns the [`TableId`] encoded in the high byte, if it names a known table
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_raw(self.table())
    }

    /// Extracts the row index from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Returns true if the token does not point at a row
    #[must_use]
    pub fn is_unbound(&self) -> bool {
        self.row() == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_token_parts() {
        let token = Token(0x06000001);
        assert_eq!(token.table(), 0x06);
        assert_eq!(token.row(), 1);
        assert_eq!(token.table_id(), Some(TableId::MethodDef));

        let token = Token::from_parts(TableId::TypeRef, 0x00FF_FFFF);
        assert_eq!(token.value(), 0x01FF_FFFF);
    }

    #[test]
    fn test_token_unbound() {
        let token = Token::unbound(TableId::TypeDef);
        assert_eq!(token.value(), 0x0200_0000);
        assert!(token.is_unbound());
        assert!(!token.is_null());
        assert_eq!(token.table_id(), Some(TableId::TypeDef));

        assert!(!Token(0x02000001).is_unbound());
    }

    #[test]
    fn test_token_unknown_table() {
        assert_eq!(Token(0x7F000001).table_id(), None);
    }

    #[test]
    fn test_token_from_conversion() {
        let value = 0x06000001u32;
        let token: Token = value.into();
        assert_eq!(token.value(), value);

        let back_to_u32: u32 = token.into();
        assert_eq!(back_to_u32, value);
    }

    #[test]
    fn test_token_display() {
        assert_eq!(format!("{}", Token(0x17000002)), "0x17000002");

        let debug_str = format!("{:?}", Token(0x06000001));
        assert!(debug_str.contains("table: 0x06"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_ordering_and_hash() {
        let token1 = Token(0x06000001);
        let token2 = Token(0x06000002);
        let token3 = Token(0x07000001);

        assert!(token1 < token2);
        assert!(token2 < token3);

        let mut map = HashMap::new();
        map.insert(token1, "Method1");
        map.insert(token2, "Method2");
        assert_eq!(map.get(&token2), Some(&"Method2"));
    }
}
