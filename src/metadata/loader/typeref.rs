//! `TypeRef` loader.

use std::sync::Arc;

use crate::{
    metadata::{
        diagnostics::DiagnosticCategory,
        lazy::LazyCell,
        loader::{lazy_string, row_exists, LoadContext, MetadataLoader},
        owned::OwnerLink,
        tables::{CodedIndex, TableId},
        typesystem::{ResolutionScope, TypeReference},
    },
    Result,
};

pub(crate) struct TypeRefLoader;

impl MetadataLoader for TypeRefLoader {
    fn load(&self, context: &LoadContext) -> Result<()> {
        for row in &context.image.type_ref {
            let scope_index = row.resolution_scope.clone();
            let valid = match scope_index.tag {
                _ if scope_index.is_null() => true,
                TableId::TypeRef if scope_index.row == row.rid => {
                    context.dangling(
                        DiagnosticCategory::Type,
                        row.token,
                        "Type reference is its own resolution scope".to_string(),
                    )?;
                    false
                }
                TableId::TypeRef | TableId::AssemblyRef => row_exists(
                    context,
                    DiagnosticCategory::Type,
                    row.token,
                    scope_index.tag,
                    scope_index.row,
                )?,
                _ => true,
            };

            let scope = if valid {
                let weak = context.me.clone();
                LazyCell::from_source(move || {
                    resolution_scope(&*LoadContext::upgrade(&weak)?, &scope_index)
                })
            } else {
                LazyCell::new(None)
            };

            let weak = context.me.clone();
            let link = OwnerLink::deferred(move || {
                if let Ok(module) = LoadContext::upgrade(&weak).and_then(|ctx| ctx.module()) {
                    module.type_references();
                }
            });

            let reference = TypeReference::backed(
                row.token,
                lazy_string(&context.me, row.type_namespace),
                lazy_string(&context.me, row.type_name),
                scope,
                link,
            );
            context.type_refs.insert(row.token, reference);
        }
        Ok(())
    }

    fn table_id(&self) -> TableId {
        TableId::TypeRef
    }
}

fn resolution_scope(
    context: &LoadContext,
    index: &CodedIndex,
) -> Result<Option<ResolutionScope>> {
    if index.is_null() {
        return Ok(None);
    }

    match index.tag {
        TableId::Module => Ok(Some(ResolutionScope::Module(Arc::downgrade(
            &context.module()?,
        )))),
        TableId::AssemblyRef => match context.assembly_refs.get(&index.token) {
            Some(entry) => Ok(Some(ResolutionScope::AssemblyRef(entry.value().clone()))),
            // Rejected at load; only lenient loads get here
            None => Ok(None),
        },
        TableId::TypeRef => Ok(context
            .type_refs
            .get(&index.token)
            .map(|entry| ResolutionScope::TypeRef(Arc::downgrade(entry.value())))),
        _ => Ok(None),
    }
}
