use crate::metadata::{
    tables::{table::impl_row_definition, CodedIndex, TableId},
    token::Token,
};

#[derive(Clone, Debug)]
/// The `TypeRef` table references types defined in other modules or assemblies. `TableId` = 0x01
pub struct TypeRefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// an index into a `Module`, `ModuleRef`, `AssemblyRef` or `TypeRef` table, or null; more precisely, a `ResolutionScope` coded index
    pub resolution_scope: CodedIndex,
    /// an index into the String heap
    pub type_name: u32,
    /// an index into the String heap
    pub type_namespace: u32,
}

impl TypeRefRaw {
    /// Creates a row, deriving the token from `rid`
    #[must_use]
    pub fn new(rid: u32, resolution_scope: CodedIndex, type_name: u32, type_namespace: u32) -> Self {
        TypeRefRaw {
            rid,
            token: Token::from_parts(TableId::TypeRef, rid),
            resolution_scope,
            type_name,
            type_namespace,
        }
    }
}

impl_row_definition!(TypeRefRaw);
