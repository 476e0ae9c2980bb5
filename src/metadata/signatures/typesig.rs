use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        module::ModuleDefinition,
        signatures::{
            BlobWriterContext, CorLibType, TypeDefOrRefSignature, TypeSignatureVisitor,
        },
        typesystem::TypeDefinition,
    },
    Result,
};

/// A type as it appears in a signature blob.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeSignature {
    /// A primitive of the core library
    CorLib(CorLibType),
    /// A class or value type referenced through a `TypeDef` or `TypeRef`
    TypeDefOrRef(TypeDefOrRefSignature),
}

impl TypeSignature {
    /// Dispatches to the visitor method of this variant
    pub fn accept<V: TypeSignatureVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            TypeSignature::CorLib(ty) => visitor.visit_corlib_type(*ty),
            TypeSignature::TypeDefOrRef(signature) => signature.accept(visitor),
        }
    }

    /// Writes the binary encoding of this type
    ///
    /// # Errors
    /// Propagates encoding failures of referenced types.
    pub fn write(&self, ctx: &mut BlobWriterContext<'_>) -> Result<()> {
        match self {
            TypeSignature::CorLib(ty) => {
                ctx.write_u8(ty.element_type());
                Ok(())
            }
            TypeSignature::TypeDefOrRef(signature) => signature.write(ctx),
        }
    }

    /// Simple name of the type
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            TypeSignature::CorLib(ty) => ty.name().to_string(),
            TypeSignature::TypeDefOrRef(signature) => signature.name(),
        }
    }

    /// Namespace of the type
    #[must_use]
    pub fn namespace(&self) -> Option<String> {
        match self {
            TypeSignature::CorLib(ty) => Some(ty.namespace().to_string()),
            TypeSignature::TypeDefOrRef(signature) => signature.namespace(),
        }
    }

    /// Namespace-qualified name of the type
    #[must_use]
    pub fn full_name(&self) -> String {
        match self {
            TypeSignature::CorLib(ty) => ty.to_string(),
            TypeSignature::TypeDefOrRef(signature) => signature.full_name(),
        }
    }

    /// Returns true if values of this type are passed by value
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match self {
            TypeSignature::CorLib(ty) => ty.is_value_type(),
            TypeSignature::TypeDefOrRef(signature) => signature.is_value_type(),
        }
    }

    /// Resolves the type to its definition. Primitives have no definition in the model.
    #[must_use]
    pub fn resolve(&self) -> Option<Arc<TypeDefinition>> {
        match self {
            TypeSignature::CorLib(_) => None,
            TypeSignature::TypeDefOrRef(signature) => signature.resolve(),
        }
    }

    /// Returns true if the type can be used from `module` as is. Primitives always can.
    #[must_use]
    pub fn is_imported_in(&self, module: &ModuleDefinition) -> bool {
        match self {
            TypeSignature::CorLib(_) => true,
            TypeSignature::TypeDefOrRef(signature) => signature.is_imported_in(module),
        }
    }
}

impl From<CorLibType> for TypeSignature {
    fn from(ty: CorLibType) -> Self {
        TypeSignature::CorLib(ty)
    }
}

impl From<TypeDefOrRefSignature> for TypeSignature {
    fn from(signature: TypeDefOrRefSignature) -> Self {
        TypeSignature::TypeDefOrRef(signature)
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}
