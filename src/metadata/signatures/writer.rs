use crate::{
    metadata::{
        tables::{CodedIndex, CodedIndexType, TableId},
        typesystem::TypeDefOrRef,
    },
    utils::write_compressed_uint,
    Error, Result,
};

/// Supplies the `TypeDefOrRef` coded index under which a type is emitted.
///
/// The serialization pipeline decides which row each type ends up in; signatures only ask.
pub trait TypeCodedIndexProvider {
    /// The raw `TypeDefOrRef` coded index for `ty` (ECMA-335 II.24.2.6)
    ///
    /// # Errors
    /// Returns [`crate::Error::EncodingInvalid`] if `ty` cannot be given a row.
    fn type_def_or_ref_index(&self, ty: &TypeDefOrRef) -> Result<u32>;
}

/// Encodes types under the token they already carry.
///
/// `TypeDef` rows encode as `rid << 2`, `TypeRef` as `(rid << 2) | 1` and `TypeSpec` as
/// `(rid << 2) | 2`. Dead handles, unbound tokens and tokens of other tables are rejected.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenCodedIndexProvider;

impl TypeCodedIndexProvider for TokenCodedIndexProvider {
    fn type_def_or_ref_index(&self, ty: &TypeDefOrRef) -> Result<u32> {
        let Some(token) = ty.token() else {
            return Err(Error::EncodingInvalid(
                "Referenced type no longer exists".to_string(),
            ));
        };

        if token.is_unbound() {
            return Err(Error::EncodingInvalid(format!(
                "Type {} has not been assigned a row",
                ty.full_name().unwrap_or_default()
            )));
        }

        match token.table_id() {
            Some(table @ (TableId::TypeDef | TableId::TypeRef | TableId::TypeSpec)) => {
                CodedIndex::new(table, token.row()).encode(CodedIndexType::TypeDefOrRef)
            }
            _ => Err(Error::EncodingInvalid(format!(
                "Token {} is not a TypeDefOrRef",
                token
            ))),
        }
    }
}

/// Output sink plus index provider for signature serialization.
pub struct BlobWriterContext<'a> {
    buffer: Vec<u8>,
    provider: &'a dyn TypeCodedIndexProvider,
}

impl<'a> BlobWriterContext<'a> {
    /// Creates a context writing into a fresh buffer
    pub fn new(provider: &'a dyn TypeCodedIndexProvider) -> Self {
        BlobWriterContext {
            buffer: Vec::new(),
            provider,
        }
    }

    /// The provider consulted for type coded indexes
    #[must_use]
    pub fn provider(&self) -> &'a dyn TypeCodedIndexProvider {
        self.provider
    }

    /// Appends one byte
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Appends raw bytes
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.buffer.extend_from_slice(value);
    }

    /// Appends a compressed unsigned integer
    ///
    /// # Errors
    /// Returns [`crate::Error::EncodingInvalid`] if the value does not fit; nothing is written.
    pub fn write_compressed_uint(&mut self, value: u32) -> Result<()> {
        write_compressed_uint(value, &mut self.buffer)
    }

    /// Bytes written so far
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of bytes written so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been written
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consumes the context and returns the written bytes
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}
