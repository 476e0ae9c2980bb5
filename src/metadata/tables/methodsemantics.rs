use crate::metadata::{
    tables::{table::impl_row_definition, CodedIndex, TableId},
    token::Token,
};

#[derive(Clone, Debug)]
/// The `MethodSemantics` table links accessor methods to properties and events. `TableId` = 0x18
pub struct MethodSemanticsRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// a 2-byte bitmask of type `MethodSemanticsAttributes`, §II.23.1.12
    pub semantics: u32,
    /// an index into the `MethodDef` table
    pub method: u32,
    /// an index into the `Event` or `Property` table; more precisely, a `HasSemantics` coded index
    pub association: CodedIndex,
}

impl MethodSemanticsRaw {
    /// Creates a row, deriving the token from `rid`
    #[must_use]
    pub fn new(rid: u32, semantics: u32, method: u32, association: CodedIndex) -> Self {
        MethodSemanticsRaw {
            rid,
            token: Token::from_parts(TableId::MethodSemantics, rid),
            semantics,
            method,
            association,
        }
    }
}

impl_row_definition!(MethodSemanticsRaw);
