//! `NestedClass` loader.

use crate::{
    metadata::{
        diagnostics::DiagnosticCategory,
        loader::{row_exists, LoadContext, MetadataLoader},
        tables::TableId,
        token::Token,
    },
    Result,
};

pub(crate) struct NestedClassLoader;

impl MetadataLoader for NestedClassLoader {
    fn load(&self, context: &LoadContext) -> Result<()> {
        for row in &context.image.nested_class {
            if !row_exists(
                context,
                DiagnosticCategory::Type,
                row.token,
                TableId::TypeDef,
                row.nested_class,
            )? || !row_exists(
                context,
                DiagnosticCategory::Type,
                row.token,
                TableId::TypeDef,
                row.enclosing_class,
            )? {
                continue;
            }

            let nested = Token::from_parts(TableId::TypeDef, row.nested_class);
            let enclosing = Token::from_parts(TableId::TypeDef, row.enclosing_class);

            if nested == enclosing {
                context.dangling(
                    DiagnosticCategory::Type,
                    row.token,
                    format!("Type {nested} is nested in itself"),
                )?;
                continue;
            }

            if context.enclosing_type.contains_key(&nested) {
                context.dangling(
                    DiagnosticCategory::Type,
                    row.token,
                    format!("Type {nested} has more than one enclosing type"),
                )?;
                continue;
            }

            context.enclosing_type.insert(nested, enclosing);
            LoadContext::relate(&context.nested_types, enclosing, nested);
        }
        Ok(())
    }

    fn table_id(&self) -> TableId {
        TableId::NestedClass
    }
}
