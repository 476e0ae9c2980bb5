use crate::metadata::{
    tables::{table::impl_row_definition, TableId},
    token::Token,
};

#[derive(Clone, Debug)]
/// The `Property` table defines properties for types. Each entry includes the property name, flags, and signature. `TableId` = 0x17
pub struct PropertyRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// a 2-byte bitmask of type `PropertyAttributes`, §II.23.1.14
    pub flags: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the Blob heap
    pub signature: u32,
}

impl PropertyRaw {
    /// Creates a row, deriving the token from `rid`
    #[must_use]
    pub fn new(rid: u32, flags: u32, name: u32, signature: u32) -> Self {
        PropertyRaw {
            rid,
            token: Token::from_parts(TableId::Property, rid),
            flags,
            name,
            signature,
        }
    }
}

impl_row_definition!(PropertyRaw);
