//! `PropertyMap` loader.
//!
//! Each row hands the run of `Property` rows starting at `property_list`, up to the next row's
//! `property_list`, to its parent type.

use crate::{
    metadata::{
        diagnostics::DiagnosticCategory,
        loader::{member_range, row_exists, LoadContext, MetadataLoader},
        tables::TableId,
        token::Token,
    },
    Result,
};

pub(crate) struct PropertyMapLoader;

impl MetadataLoader for PropertyMapLoader {
    fn load(&self, context: &LoadContext) -> Result<()> {
        let table = &context.image.property_map;
        let property_count = context.image.property.row_count();

        for row in table {
            if !row_exists(
                context,
                DiagnosticCategory::Property,
                row.token,
                TableId::TypeDef,
                row.parent,
            )? {
                continue;
            }

            let parent = Token::from_parts(TableId::TypeDef, row.parent);
            if context.type_properties.contains_key(&parent) {
                context.dangling(
                    DiagnosticCategory::Property,
                    row.token,
                    format!("Type {parent} has more than one PropertyMap row"),
                )?;
                continue;
            }

            let end = table
                .get(row.rid + 1)
                .map_or(property_count + 1, |next| next.property_list);
            let properties =
                member_range(context, row.token, row.property_list, end, TableId::Property)?;

            for property in &properties {
                context.property_owner.insert(*property, parent);
            }
            context.type_properties.insert(parent, properties);
        }
        Ok(())
    }

    fn table_id(&self) -> TableId {
        TableId::PropertyMap
    }
}
