//! Entity graphs with row tokens, for tests that encode or resolve tokens.

use std::sync::Arc;

use crate::metadata::{
    identity::{AssemblyIdentity, AssemblyVersion},
    module::ModuleDefinition,
    tables::TableId,
    token::Token,
    typesystem::{
        AssemblyReference, ResolutionScope, TypeAttributes, TypeDefOrRef, TypeDefinition,
        TypeReference,
    },
};

/// A module with two bound type references and two bound type definitions.
///
/// - `class_ref`: `TypeRef` row 1, `System.Object` from `mscorlib`
/// - `value_type_ref`: `TypeRef` row 2, `System.ValueType` from `mscorlib`
/// - `class_def`: `TypeDef` row 1, `Sample.Widget`, a class
/// - `value_def`: `TypeDef` row 2, `Sample.Point`, a value type
pub(crate) struct BoundTypes {
    pub module: Arc<ModuleDefinition>,
    pub corlib: Arc<AssemblyReference>,
    pub class_ref: Arc<TypeReference>,
    pub value_type_ref: Arc<TypeReference>,
    pub class_def: Arc<TypeDefinition>,
    pub value_def: Arc<TypeDefinition>,
}

impl BoundTypes {
    pub fn new() -> Self {
        let module = ModuleDefinition::new("Sample.dll");
        let corlib = AssemblyReference::with_token(
            Token::from_parts(TableId::AssemblyRef, 1),
            AssemblyIdentity::new("mscorlib", AssemblyVersion::new(4, 0, 0, 0)),
        );
        module.add_assembly_reference(corlib.clone());

        let scope = Some(ResolutionScope::AssemblyRef(corlib.clone()));
        let class_ref = TypeReference::with_token(
            Token::from_parts(TableId::TypeRef, 1),
            "System",
            "Object",
            scope.clone(),
        );
        let value_type_ref = TypeReference::with_token(
            Token::from_parts(TableId::TypeRef, 2),
            "System",
            "ValueType",
            scope,
        );
        module.type_references().add(class_ref.clone());
        module.type_references().add(value_type_ref.clone());

        let class_def = TypeDefinition::with_token(
            Token::from_parts(TableId::TypeDef, 1),
            "Sample",
            "Widget",
            TypeAttributes::PUBLIC,
            Some(TypeDefOrRef::from(&class_ref)),
        );
        let value_def = TypeDefinition::with_token(
            Token::from_parts(TableId::TypeDef, 2),
            "Sample",
            "Point",
            TypeAttributes::PUBLIC | TypeAttributes::SEALED,
            Some(TypeDefOrRef::from(&value_type_ref)),
        );
        module.types().add(class_def.clone());
        module.types().add(value_def.clone());

        BoundTypes {
            module,
            corlib,
            class_ref,
            value_type_ref,
            class_def,
            value_def,
        }
    }
}
