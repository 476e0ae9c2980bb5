//! `CustomAttribute` loader.

use std::sync::Weak;

use crate::{
    metadata::{
        diagnostics::DiagnosticCategory,
        loader::{lazy_blob, row_exists, LoadContext, MetadataLoader},
        members::CustomAttribute,
        owned::ItemSource,
        tables::TableId,
        token::Token,
    },
    Result,
};

pub(crate) struct CustomAttributeLoader;

impl MetadataLoader for CustomAttributeLoader {
    fn load(&self, context: &LoadContext) -> Result<()> {
        for row in &context.image.custom_attribute {
            if row.constructor.tag == TableId::MethodDef
                && !row_exists(
                    context,
                    DiagnosticCategory::CustomAttribute,
                    row.token,
                    TableId::MethodDef,
                    row.constructor.row,
                )?
            {
                continue;
            }

            // Attributes of entities outside the model are not indexed
            if !matches!(
                row.parent.tag,
                TableId::TypeDef | TableId::MethodDef | TableId::Property
            ) {
                continue;
            }

            if row_exists(
                context,
                DiagnosticCategory::CustomAttribute,
                row.token,
                row.parent.tag,
                row.parent.row,
            )? {
                LoadContext::relate(&context.custom_attributes, row.parent.token, row.rid);
            }
        }
        Ok(())
    }

    fn table_id(&self) -> TableId {
        TableId::CustomAttribute
    }
}

/// Source for the custom attributes attached to `parent`
pub(crate) fn custom_attribute_source(
    context: &Weak<LoadContext>,
    parent: Token,
) -> ItemSource<CustomAttribute> {
    let weak = context.clone();
    Box::new(move || {
        let Ok(context) = LoadContext::upgrade(&weak) else {
            return Vec::new();
        };
        let Some(rows) = context
            .custom_attributes
            .get(&parent)
            .map(|entry| entry.value().clone())
        else {
            return Vec::new();
        };

        rows.iter()
            .filter_map(|rid| context.image.custom_attribute.get(*rid))
            .map(|row| {
                CustomAttribute::backed(
                    row.token,
                    row.constructor.token,
                    lazy_blob(&weak, row.value),
                )
            })
            .collect()
    })
}
