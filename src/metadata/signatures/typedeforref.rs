//! Signature element naming a type definition or type reference.
//!
//! Encoded as `ELEMENT_TYPE_CLASS` or `ELEMENT_TYPE_VALUETYPE` followed by a compressed
//! `TypeDefOrRef` coded index (ECMA-335 II.23.2.12). The tag comes from a cached flag that is
//! taken from the referent on construction and can be changed independently afterwards.

use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        module::ModuleDefinition,
        signatures::{
            BlobWriterContext, TypeSignatureVisitor, ELEMENT_TYPE, UNKNOWN_TYPE_NAME,
        },
        typesystem::{ResolutionScope, TypeDefOrRef, TypeDefinition},
    },
    utils::write_compressed_uint,
    Result,
};

/// Whether a type is passed by reference or by value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeClassification {
    /// A reference type, encoded with `ELEMENT_TYPE_CLASS`
    Class,
    /// A value type, encoded with `ELEMENT_TYPE_VALUETYPE`
    ValueType,
}

/// A signature naming a type through a `TypeDef` or `TypeRef` (ECMA-335 II.23.2.12).
///
/// The value-type flag decides the tag byte written in front of the coded index. It is
/// captured from the referenced type when the signature is created and kept independently
/// afterwards, because the bytes already on disk say what they say even if the referenced type
/// later changes. Everything else (name, namespace, scope, module) is read live from the
/// referenced type on every call.
#[derive(Clone, PartialEq)]
pub struct TypeDefOrRefSignature {
    handle: TypeDefOrRef,
    is_value_type: bool,
}

impl TypeDefOrRefSignature {
    /// Creates a signature whose classification is taken from the referenced type
    #[must_use]
    pub fn new(handle: TypeDefOrRef) -> Self {
        let is_value_type = handle.is_value_type();
        TypeDefOrRefSignature {
            handle,
            is_value_type,
        }
    }

    /// Creates a signature with an explicit classification
    #[must_use]
    pub fn with_classification(handle: TypeDefOrRef, is_value_type: bool) -> Self {
        TypeDefOrRefSignature {
            handle,
            is_value_type,
        }
    }

    /// The referenced type
    #[must_use]
    pub fn type_handle(&self) -> &TypeDefOrRef {
        &self.handle
    }

    /// Points the signature at another type. The classification flag is left as is.
    pub fn set_type_handle(&mut self, handle: TypeDefOrRef) {
        self.handle = handle;
    }

    /// The cached value-type flag
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        self.is_value_type
    }

    /// Overrides the cached value-type flag
    pub fn set_is_value_type(&mut self, is_value_type: bool) {
        self.is_value_type = is_value_type;
    }

    /// Classification derived from the cached flag
    #[must_use]
    pub fn classification(&self) -> TypeClassification {
        if self.is_value_type {
            TypeClassification::ValueType
        } else {
            TypeClassification::Class
        }
    }

    /// Name of the referenced type, or [`UNKNOWN_TYPE_NAME`] if it is gone
    #[must_use]
    pub fn name(&self) -> String {
        self.handle
            .name()
            .unwrap_or_else(|| UNKNOWN_TYPE_NAME.to_string())
    }

    /// Namespace of the referenced type
    #[must_use]
    pub fn namespace(&self) -> Option<String> {
        self.handle.namespace()
    }

    /// Namespace-qualified name of the referenced type
    #[must_use]
    pub fn full_name(&self) -> String {
        self.handle
            .full_name()
            .unwrap_or_else(|| UNKNOWN_TYPE_NAME.to_string())
    }

    /// Resolution scope of the referenced type
    #[must_use]
    pub fn scope(&self) -> Option<ResolutionScope> {
        self.handle.scope()
    }

    /// Module the referenced type belongs to
    #[must_use]
    pub fn module(&self) -> Option<Arc<ModuleDefinition>> {
        self.handle.module()
    }

    /// Resolves the referenced type to its definition
    #[must_use]
    pub fn resolve(&self) -> Option<Arc<TypeDefinition>> {
        self.handle.resolve()
    }

    /// Returns true if the referenced type can be used from `module` as is
    #[must_use]
    pub fn is_imported_in(&self, module: &ModuleDefinition) -> bool {
        self.handle.is_imported_in(module)
    }

    /// Dispatches to [`TypeSignatureVisitor::visit_type_def_or_ref`]
    pub fn accept<V: TypeSignatureVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        visitor.visit_type_def_or_ref(self)
    }

    /// Writes the tag byte followed by the compressed `TypeDefOrRef` coded index.
    ///
    /// The coded index is obtained and encoded before anything is written, so a failure leaves
    /// the output untouched.
    ///
    /// # Errors
    /// Propagates the provider's error, typically [`crate::Error::EncodingInvalid`].
    pub fn write(&self, ctx: &mut BlobWriterContext<'_>) -> Result<()> {
        let index = ctx.provider().type_def_or_ref_index(&self.handle)?;
        let tag = match self.classification() {
            TypeClassification::Class => ELEMENT_TYPE::CLASS,
            TypeClassification::ValueType => ELEMENT_TYPE::VALUETYPE,
        };

        let mut encoded = Vec::with_capacity(4);
        write_compressed_uint(index, &mut encoded)?;

        ctx.write_u8(tag);
        ctx.write_bytes(&encoded);
        Ok(())
    }
}

impl fmt::Debug for TypeDefOrRefSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDefOrRefSignature")
            .field("type", &self.full_name())
            .field("is_value_type", &self.is_value_type)
            .finish()
    }
}

impl fmt::Display for TypeDefOrRefSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}
