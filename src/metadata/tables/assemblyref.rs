use crate::metadata::{
    tables::{table::impl_row_definition, TableId},
    token::Token,
};

#[derive(Clone, Debug)]
/// The `AssemblyRef` table lists the assemblies this module references. `TableId` = 0x23
pub struct AssemblyRefRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// a 2-byte constant
    pub major_version: u32,
    /// a 2-byte constant
    pub minor_version: u32,
    /// a 2-byte constant
    pub build_number: u32,
    /// a 2-byte constant
    pub revision_number: u32,
    /// an index into the String heap
    pub name: u32,
    /// an index into the String heap
    pub culture: u32,
}

impl AssemblyRefRaw {
    /// Creates a row for `name` with the given version, deriving the token from `rid`
    #[must_use]
    pub fn new(rid: u32, version: [u32; 4], name: u32, culture: u32) -> Self {
        AssemblyRefRaw {
            rid,
            token: Token::from_parts(TableId::AssemblyRef, rid),
            major_version: version[0],
            minor_version: version[1],
            build_number: version[2],
            revision_number: version[3],
            name,
            culture,
        }
    }
}

impl_row_definition!(AssemblyRefRaw);
