//! `MethodSemantics` loader.

use crate::{
    metadata::{
        diagnostics::DiagnosticCategory,
        loader::{row_exists, LoadContext, MetadataLoader},
        tables::TableId,
    },
    Result,
};

pub(crate) struct MethodSemanticsLoader;

impl MetadataLoader for MethodSemanticsLoader {
    fn load(&self, context: &LoadContext) -> Result<()> {
        for row in &context.image.method_semantics {
            // Event accessors are not modelled
            if row.association.tag != TableId::Property {
                continue;
            }

            if row_exists(
                context,
                DiagnosticCategory::Method,
                row.token,
                TableId::MethodDef,
                row.method,
            )? && row_exists(
                context,
                DiagnosticCategory::Property,
                row.token,
                TableId::Property,
                row.association.row,
            )? {
                LoadContext::relate(&context.semantics, row.association.token, row.rid);
            }
        }
        Ok(())
    }

    fn table_id(&self) -> TableId {
        TableId::MethodSemantics
    }
}
