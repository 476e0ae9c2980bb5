use crate::metadata::{
    tables::{table::impl_row_definition, TableId},
    token::Token,
};

#[derive(Clone, Debug)]
/// The `PropertyMap` table maps a type to the first of a contiguous run of its properties. `TableId` = 0x15
pub struct PropertyMapRaw {
    /// `RowID`
    pub rid: u32,
    /// Token
    pub token: Token,
    /// an index into the `TypeDef` table
    pub parent: u32,
    /// an index into the `Property` table; it marks the first of a contiguous run of properties owned by `parent`
    pub property_list: u32,
}

impl PropertyMapRaw {
    /// Creates a row, deriving the token from `rid`
    #[must_use]
    pub fn new(rid: u32, parent: u32, property_list: u32) -> Self {
        PropertyMapRaw {
            rid,
            token: Token::from_parts(TableId::PropertyMap, rid),
            parent,
            property_list,
        }
    }
}

impl_row_definition!(PropertyMapRaw);
