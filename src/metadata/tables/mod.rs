//! Raw metadata table rows.
//!
//! Rows are plain structs holding heap offsets, row indexes and coded indexes exactly as they
//! appear in the `#~` stream (ECMA-335 II.22). Decoding rows from bytes is done elsewhere; the
//! loader only consumes these structs through [`MetadataTable`].
//!
//! # Key Components
//!
//! - [`TableId`] - Table identifiers and their token prefixes
//! - [`CodedIndex`] / [`CodedIndexType`] - Tagged cross-table references
//! - [`MetadataTable`] - Row storage addressed by 1-based row id

mod assemblyref;
mod codedindex;
mod constant;
mod customattribute;
mod methoddef;
mod methodsemantics;
mod nestedclass;
mod property;
mod propertymap;
mod table;
mod tableid;
mod typedef;
mod typeref;

pub use assemblyref::AssemblyRefRaw;
pub use codedindex::{CodedIndex, CodedIndexType};
pub use constant::ConstantRaw;
pub use customattribute::CustomAttributeRaw;
pub use methoddef::MethodDefRaw;
pub use methodsemantics::MethodSemanticsRaw;
pub use nestedclass::NestedClassRaw;
pub use property::PropertyRaw;
pub use propertymap::PropertyMapRaw;
pub use table::{MetadataTable, RowDefinition};
pub use tableid::TableId;
pub use typedef::TypeDefRaw;
pub use typeref::TypeRefRaw;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lookup_by_rid() {
        let table = MetadataTable::from_rows(vec![
            PropertyRaw::new(1, 0, 1, 1),
            PropertyRaw::new(2, 0x0200, 5, 3),
        ])
        .unwrap();

        assert_eq!(table.row_count(), 2);
        assert!(table.get(0).is_none());
        assert_eq!(table.get(2).unwrap().flags, 0x0200);
        assert_eq!(table.get(2).unwrap().token().value(), 0x1700_0002);
        assert!(table.get(3).is_none());
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn table_rejects_out_of_order_rows() {
        let result = MetadataTable::from_rows(vec![MethodDefRaw::new(2, 0, 0, 1)]);
        assert!(result.is_err());
    }
}
