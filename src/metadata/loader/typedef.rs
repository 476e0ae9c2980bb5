//! `TypeDef` loader.
//!
//! Besides registering the types, this loader splits the `MethodDef` table into per-type method
//! lists. A type owns the methods from its `method_list` up to the next type's `method_list`.

use std::sync::Arc;

use crossbeam_skiplist::SkipMap;

use crate::{
    metadata::{
        diagnostics::DiagnosticCategory,
        lazy::LazyCell,
        loader::{
            customattribute::custom_attribute_source, lazy_string, member_range, row_exists,
            LoadContext, MetadataLoader,
        },
        owned::{ItemSource, OwnerLink},
        tables::{CodedIndex, TableId, TypeDefRaw},
        token::Token,
        typesystem::{TypeAttributes, TypeDefOrRef, TypeDefinition, TypeDefinitionParts},
    },
    Error, Result,
};

pub(crate) struct TypeDefLoader;

impl MetadataLoader for TypeDefLoader {
    fn load(&self, context: &LoadContext) -> Result<()> {
        let table = &context.image.type_def;
        let method_count = context.image.method_def.row_count();

        for row in table {
            let end = table
                .get(row.rid + 1)
                .map_or(method_count + 1, |next| next.method_list);
            let methods =
                member_range(context, row.token, row.method_list, end, TableId::MethodDef)?;
            for method in &methods {
                context.method_owner.insert(*method, row.token);
            }
            context.type_methods.insert(row.token, methods);

            let base_valid = match row.extends.tag {
                _ if row.extends.is_null() => true,
                TableId::TypeDef | TableId::TypeRef => row_exists(
                    context,
                    DiagnosticCategory::Type,
                    row.token,
                    row.extends.tag,
                    row.extends.row,
                )?,
                _ => {
                    context.diagnostics.info(
                        DiagnosticCategory::Type,
                        format!(
                            "Base type of {} is a TypeSpec and is not modelled",
                            row.token
                        ),
                    );
                    false
                }
            };

            context
                .type_defs
                .insert(row.token, type_definition(context, row, base_valid));
        }
        Ok(())
    }

    fn table_id(&self) -> TableId {
        TableId::TypeDef
    }
}

fn type_definition(
    context: &LoadContext,
    row: &TypeDefRaw,
    base_valid: bool,
) -> Arc<TypeDefinition> {
    let token = row.token;

    let base_type = if base_valid {
        let weak = context.me.clone();
        let extends = row.extends.clone();
        LazyCell::from_source(move || base_type(&*LoadContext::upgrade(&weak)?, &extends))
    } else {
        LazyCell::new(None)
    };

    let module_link = {
        let weak = context.me.clone();
        OwnerLink::deferred(move || {
            let Ok(context) = LoadContext::upgrade(&weak) else {
                return;
            };
            if !context.enclosing_type.contains_key(&token) {
                if let Ok(module) = context.module() {
                    module.types();
                }
            }
        })
    };

    let declaring_link = {
        let weak = context.me.clone();
        OwnerLink::deferred(move || {
            let Ok(context) = LoadContext::upgrade(&weak) else {
                return;
            };
            let enclosing = context.enclosing_type.get(&token).map(|entry| *entry.value());
            let enclosing = enclosing.and_then(|enclosing| {
                context
                    .type_defs
                    .get(&enclosing)
                    .map(|entry| entry.value().clone())
            });
            if let Some(enclosing) = enclosing {
                enclosing.nested_types();
            }
        })
    };

    TypeDefinition::from_parts(TypeDefinitionParts {
        token,
        attributes: TypeAttributes::from_bits_retain(row.flags),
        namespace: lazy_string(&context.me, row.type_namespace),
        name: lazy_string(&context.me, row.type_name),
        base_type,
        methods: Some(relation_source(
            context,
            token,
            |ctx| &ctx.type_methods,
            |ctx, tokens| LoadContext::collect(&ctx.methods, tokens),
        )),
        properties: Some(relation_source(
            context,
            token,
            |ctx| &ctx.type_properties,
            |ctx, tokens| LoadContext::collect(&ctx.properties, tokens),
        )),
        nested_types: Some(relation_source(
            context,
            token,
            |ctx| &ctx.nested_types,
            |ctx, tokens| LoadContext::collect(&ctx.type_defs, tokens),
        )),
        custom_attributes: Some(custom_attribute_source(&context.me, token)),
        module_link,
        declaring_link,
    })
}

/// Source collecting the entities a relation index lists for `owner`
fn relation_source<T: 'static>(
    context: &LoadContext,
    owner: Token,
    relation: fn(&LoadContext) -> &SkipMap<Token, Vec<Token>>,
    collect: fn(&LoadContext, &[Token]) -> Vec<Arc<T>>,
) -> ItemSource<T> {
    let weak = context.me.clone();
    Box::new(move || {
        let Ok(context) = LoadContext::upgrade(&weak) else {
            return Vec::new();
        };
        let tokens = relation(&context)
            .get(&owner)
            .map(|entry| entry.value().clone());
        match tokens {
            Some(tokens) => collect(&context, &tokens),
            None => Vec::new(),
        }
    })
}

fn base_type(context: &LoadContext, extends: &CodedIndex) -> Result<Option<TypeDefOrRef>> {
    if extends.is_null() {
        return Ok(None);
    }

    context
        .type_by_token(extends.token)
        .map(Some)
        .ok_or(Error::TypeNotFound(extends.token))
}
