//! Signature model and binary codec.
//!
//! Signatures describe types as they appear in member signatures. The model is a closed set
//! of variants ([`TypeSignature`]) with double dispatch through [`TypeSignatureVisitor`], and
//! every variant can write itself in the compact ECMA-335 encoding (II.23.2).
//!
//! # Key Components
//!
//! - [`TypeSignature`] - Core library primitives and `TypeDef`/`TypeRef` references
//! - [`TypeDefOrRefSignature`] - A reference carrying its own value-type flag
//! - [`PropertySignature`] - Property and indexer signatures
//! - [`BlobWriterContext`] / [`TypeCodedIndexProvider`] - Serialization sink and row mapping
//! - [`SignatureReader`] - Decoding of signature blobs back into the model
//!
//! # Examples
//!
//! ```rust
//! use dotmodel::prelude::*;
//! use dotmodel::metadata::signatures::{BlobWriterContext, TokenCodedIndexProvider};
//!
//! let signature = PropertySignature::instance(TypeSignature::CorLib(CorLibType::I4));
//!
//! let provider = TokenCodedIndexProvider;
//! let mut ctx = BlobWriterContext::new(&provider);
//! signature.write(&mut ctx)?;
//!
//! assert_eq!(ctx.bytes(), &[0x28, 0x00, 0x08]);
//! # Ok::<(), dotmodel::Error>(())
//! ```

mod property;
mod reader;
mod typedeforref;
mod types;
mod typesig;
mod visitor;
mod writer;

pub use property::PropertySignature;
pub use reader::{SignatureReader, TypeTokenResolver};
pub use typedeforref::{TypeClassification, TypeDefOrRefSignature};
pub use types::{CorLibType, CALLING_CONVENTION, ELEMENT_TYPE, SIGNATURE_HEADER};
pub use typesig::TypeSignature;
pub use visitor::TypeSignatureVisitor;
pub use writer::{BlobWriterContext, TokenCodedIndexProvider, TypeCodedIndexProvider};

/// Name reported for a referenced type that no longer exists
pub const UNKNOWN_TYPE_NAME: &str = "<Unknown>";

/// Parses a property signature blob
///
/// # Errors
/// Returns an error if the blob is not a valid property signature.
pub fn parse_property_signature(
    data: &[u8],
    resolver: &dyn TypeTokenResolver,
) -> crate::Result<PropertySignature> {
    SignatureReader::new(data, resolver).read_property_signature()
}

/// Encodes a property signature into a new blob
///
/// # Errors
/// Propagates encoding failures of contained types.
pub fn encode_property_signature(
    signature: &PropertySignature,
    provider: &dyn TypeCodedIndexProvider,
) -> crate::Result<Vec<u8>> {
    let mut ctx = BlobWriterContext::new(provider);
    signature.write(&mut ctx)?;
    Ok(ctx.into_bytes())
}
