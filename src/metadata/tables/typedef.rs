use crate::metadata::{
    tables::{table::impl_row_definition, CodedIndex, TableId},
    token::Token,
};

#[derive(Clone, Debug)]
/// The `TypeDef` table defines types in the current module. `TableId` = 0x02
pub struct TypeDefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// a 4-byte bitmask of type `TypeAttributes`, §II.23.1.15
    pub flags: u32,
    /// an index into the String heap
    pub type_name: u32,
    /// an index into the String heap
    pub type_namespace: u32,
    /// an index into the `TypeDef`, `TypeRef`, or `TypeSpec` table; more precisely, a `TypeDefOrRef` coded index
    pub extends: CodedIndex,
    /// an index into the `MethodDef` table; it marks the first of a contiguous run of methods owned by this type
    pub method_list: u32,
}

impl TypeDefRaw {
    /// Creates a row, deriving the token from `rid`
    #[must_use]
    pub fn new(
        rid: u32,
        flags: u32,
        type_name: u32,
        type_namespace: u32,
        extends: CodedIndex,
        method_list: u32,
    ) -> Self {
        TypeDefRaw {
            rid,
            token: Token::from_parts(TableId::TypeDef, rid),
            flags,
            type_name,
            type_namespace,
            extends,
            method_list,
        }
    }
}

impl_row_definition!(TypeDefRaw);
