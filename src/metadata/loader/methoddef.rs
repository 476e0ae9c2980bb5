//! `MethodDef` loader.

use crate::{
    metadata::{
        loader::{
            customattribute::custom_attribute_source, lazy_string, LoadContext, MetadataLoader,
        },
        members::{MethodAttributes, MethodDefinition},
        owned::OwnerLink,
        tables::TableId,
    },
    Result,
};

pub(crate) struct MethodDefLoader;

impl MetadataLoader for MethodDefLoader {
    fn load(&self, context: &LoadContext) -> Result<()> {
        for row in &context.image.method_def {
            let token = row.token;
            let weak = context.me.clone();
            let link = OwnerLink::deferred(move || {
                let Ok(context) = LoadContext::upgrade(&weak) else {
                    return;
                };
                let owner = context.method_owner.get(&token).map(|entry| *entry.value());
                let owner = owner.and_then(|owner| {
                    context
                        .type_defs
                        .get(&owner)
                        .map(|entry| entry.value().clone())
                });
                if let Some(owner) = owner {
                    owner.methods();
                }
            });

            let method = MethodDefinition::backed(
                token,
                MethodAttributes::from_bits_retain((row.flags & 0xFFFF) as u16),
                lazy_string(&context.me, row.name),
                Some(custom_attribute_source(&context.me, token)),
                link,
            );
            context.methods.insert(token, method);
        }
        Ok(())
    }

    fn table_id(&self) -> TableId {
        TableId::MethodDef
    }
}
