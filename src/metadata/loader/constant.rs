//! `Constant` loader.

use crate::{
    metadata::{
        diagnostics::DiagnosticCategory,
        loader::{row_exists, LoadContext, MetadataLoader},
        tables::TableId,
    },
    Result,
};

pub(crate) struct ConstantLoader;

impl MetadataLoader for ConstantLoader {
    fn load(&self, context: &LoadContext) -> Result<()> {
        for row in &context.image.constant {
            // Field and parameter defaults are not modelled
            if row.parent.tag != TableId::Property {
                continue;
            }

            if !row_exists(
                context,
                DiagnosticCategory::Property,
                row.token,
                TableId::Property,
                row.parent.row,
            )? {
                continue;
            }

            if context.constants.contains_key(&row.parent.token) {
                context.dangling(
                    DiagnosticCategory::Property,
                    row.token,
                    format!("Property {} has more than one Constant row", row.parent.token),
                )?;
                continue;
            }
            context.constants.insert(row.parent.token, row.rid);
        }
        Ok(())
    }

    fn table_id(&self) -> TableId {
        TableId::Constant
    }
}
