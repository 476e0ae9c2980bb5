use crate::metadata::{
    tables::{table::impl_row_definition, TableId},
    token::Token,
};

#[derive(Clone, Debug)]
/// The `NestedClass` table records which types are nested in which. `TableId` = 0x29
pub struct NestedClassRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// an index into the `TypeDef` table, the nested type
    pub nested_class: u32,
    /// an index into the `TypeDef` table, the enclosing type
    pub enclosing_class: u32,
}

impl NestedClassRaw {
    /// Creates a row, deriving the token from `rid`
    #[must_use]
    pub fn new(rid: u32, nested_class: u32, enclosing_class: u32) -> Self {
        NestedClassRaw {
            rid,
            token: Token::from_parts(TableId::NestedClass, rid),
            nested_class,
            enclosing_class,
        }
    }
}

impl_row_definition!(NestedClassRaw);
