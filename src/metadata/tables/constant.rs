use crate::metadata::{
    tables::{table::impl_row_definition, CodedIndex, TableId},
    token::Token,
};

#[derive(Clone, Debug)]
/// The `Constant` table stores compile-time default values of fields, parameters and properties. `TableId` = 0x0B
pub struct ConstantRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// a 1-byte element type constant, followed by a 1-byte padding zero
    pub base: u8,
    /// an index into the `Param`, `Field`, or `Property` table; more precisely, a `HasConstant` coded index
    pub parent: CodedIndex,
    /// an index into the Blob heap
    pub value: u32,
}

impl ConstantRaw {
    /// Creates a row, deriving the token from `rid`
    #[must_use]
    pub fn new(rid: u32, base: u8, parent: CodedIndex, value: u32) -> Self {
        ConstantRaw {
            rid,
            token: Token::from_parts(TableId::Constant, rid),
            base,
            parent,
            value,
        }
    }
}

impl_row_definition!(ConstantRaw);
