use crate::metadata::{
    tables::{table::impl_row_definition, CodedIndex, TableId},
    token::Token,
};

#[derive(Clone, Debug)]
/// The `CustomAttribute` table attaches attribute instances to metadata entities. `TableId` = 0x0C
pub struct CustomAttributeRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// an index into a metadata table that has an associated `HasCustomAttribute` coded index
    pub parent: CodedIndex,
    /// an index into the `MethodDef` or `MemberRef` table; more precisely, a `CustomAttributeType` coded index
    pub constructor: CodedIndex,
    /// an index into the Blob heap
    pub value: u32,
}

impl CustomAttributeRaw {
    /// Creates a row, deriving the token from `rid`
    #[must_use]
    pub fn new(rid: u32, parent: CodedIndex, constructor: CodedIndex, value: u32) -> Self {
        CustomAttributeRaw {
            rid,
            token: Token::from_parts(TableId::CustomAttribute, rid),
            parent,
            constructor,
            value,
        }
    }
}

impl_row_definition!(CustomAttributeRaw);
