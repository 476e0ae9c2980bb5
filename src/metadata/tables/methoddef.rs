use crate::metadata::{
    tables::{table::impl_row_definition, TableId},
    token::Token,
};

#[derive(Clone, Debug)]
/// The `MethodDef` table defines methods of types in the current module. `TableId` = 0x06
pub struct MethodDefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// a 2-byte bitmask of type `MethodImplAttributes`, §II.23.1.10
    pub impl_flags: u32,
    /// a 2-byte bitmask of type `MethodAttributes`, §II.23.1.10
    pub flags: u32,
    /// an index into the String heap
    pub name: u32,
}

impl MethodDefRaw {
    /// Creates a row, deriving the token from `rid`
    #[must_use]
    pub fn new(rid: u32, impl_flags: u32, flags: u32, name: u32) -> Self {
        MethodDefRaw {
            rid,
            token: Token::from_parts(TableId::MethodDef, rid),
            impl_flags,
            flags,
            name,
        }
    }
}

impl_row_definition!(MethodDefRaw);
