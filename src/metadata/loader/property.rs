//! `Property` loader.

use std::sync::Weak;

use crate::{
    metadata::{
        lazy::LazyCell,
        loader::{
            customattribute::custom_attribute_source, lazy_blob, lazy_string, LoadContext,
            MetadataLoader,
        },
        members::{
            Constant, MethodSemantics, MethodSemanticsAttributes, PropertyAttributes,
            PropertyDefinition, PropertyDefinitionParts,
        },
        owned::{ItemSource, OwnerLink},
        signatures::parse_property_signature,
        tables::TableId,
        token::Token,
    },
    Result,
};

pub(crate) struct PropertyLoader;

impl MetadataLoader for PropertyLoader {
    fn load(&self, context: &LoadContext) -> Result<()> {
        for row in &context.image.property {
            let token = row.token;
            let signature_index = row.signature;

            let signature = {
                let weak = context.me.clone();
                LazyCell::from_source(move || {
                    if signature_index == 0 {
                        return Ok(None);
                    }

                    let context = LoadContext::upgrade(&weak)?;
                    let data = context.blob(signature_index)?;
                    let module = context.module()?;
                    parse_property_signature(&data, module.as_ref()).map(Some)
                })
            };

            let constant = {
                let weak = context.me.clone();
                LazyCell::from_source(move || {
                    let context = LoadContext::upgrade(&weak)?;
                    let rid = context.constants.get(&token).map(|entry| *entry.value());
                    let constant = rid
                        .and_then(|rid| context.image.constant.get(rid))
                        .map(|row| {
                            Constant::backed(row.token, row.base, lazy_blob(&weak, row.value))
                        });
                    Ok(constant)
                })
            };

            let link = {
                let weak = context.me.clone();
                OwnerLink::deferred(move || {
                    let Ok(context) = LoadContext::upgrade(&weak) else {
                        return;
                    };
                    let owner = context.property_owner.get(&token).map(|entry| *entry.value());
                    let owner = owner.and_then(|owner| {
                        context
                            .type_defs
                            .get(&owner)
                            .map(|entry| entry.value().clone())
                    });
                    if let Some(owner) = owner {
                        owner.properties();
                    }
                })
            };

            let property = PropertyDefinition::from_parts(PropertyDefinitionParts {
                token,
                attributes: PropertyAttributes::from_bits_retain((row.flags & 0xFFFF) as u16),
                name: lazy_string(&context.me, row.name),
                signature,
                constant,
                semantics: Some(semantics_source(&context.me, token)),
                custom_attributes: Some(custom_attribute_source(&context.me, token)),
                link,
            });
            context.properties.insert(token, property);
        }
        Ok(())
    }

    fn table_id(&self) -> TableId {
        TableId::Property
    }
}

/// Source for the accessor links of `property`, in `MethodSemantics` row order
fn semantics_source(context: &Weak<LoadContext>, property: Token) -> ItemSource<MethodSemantics> {
    let weak = context.clone();
    Box::new(move || {
        let Ok(context) = LoadContext::upgrade(&weak) else {
            return Vec::new();
        };
        let Some(rows) = context
            .semantics
            .get(&property)
            .map(|entry| entry.value().clone())
        else {
            return Vec::new();
        };

        rows.iter()
            .filter_map(|rid| context.image.method_semantics.get(*rid))
            .filter_map(|row| {
                let method = context
                    .methods
                    .get(&Token::from_parts(TableId::MethodDef, row.method))
                    .map(|entry| entry.value().clone())?;
                Some(MethodSemantics::with_token(
                    row.token,
                    method,
                    MethodSemanticsAttributes::from_bits_retain((row.semantics & 0xFFFF) as u16),
                ))
            })
            .collect()
    })
}
