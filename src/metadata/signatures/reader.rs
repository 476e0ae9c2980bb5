use crate::{
    file::parser::Parser,
    metadata::{
        signatures::{
            CorLibType, PropertySignature, TypeDefOrRefSignature, TypeSignature,
            CALLING_CONVENTION, ELEMENT_TYPE, SIGNATURE_HEADER,
        },
        token::Token,
        typesystem::TypeDefOrRef,
    },
    Error::TypeNotFound,
    Result,
};

/// Maps the tokens found in signature blobs to type handles.
pub trait TypeTokenResolver {
    /// The `TypeDef` or `TypeRef` named by `token`, if it exists
    fn resolve_type_token(&self, token: Token) -> Option<TypeDefOrRef>;
}

/// Decodes type and property signature blobs into the signature model.
///
/// Only the variants the model carries are accepted: core library primitives and
/// `CLASS`/`VALUETYPE` references. Anything else is reported as malformed.
pub struct SignatureReader<'a> {
    parser: Parser<'a>,
    resolver: &'a dyn TypeTokenResolver,
}

impl<'a> SignatureReader<'a> {
    /// Create a new `SignatureReader` over `data`, resolving tokens through `resolver`
    #[must_use]
    pub fn new(data: &'a [u8], resolver: &'a dyn TypeTokenResolver) -> Self {
        SignatureReader {
            parser: Parser::new(data),
            resolver,
        }
    }

    /// Read one type signature at the current position
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for element types outside the model,
    /// [`crate::Error::TypeNotFound`] if a token does not resolve, and
    /// [`crate::Error::OutOfBounds`] for truncated data.
    pub fn read_type_signature(&mut self) -> Result<TypeSignature> {
        let current_byte = self.parser.read_le::<u8>()?;
        match current_byte {
            ELEMENT_TYPE::VALUETYPE | ELEMENT_TYPE::CLASS => {
                let token = self.parser.read_compressed_token()?;
                let Some(handle) = self.resolver.resolve_type_token(token) else {
                    return Err(TypeNotFound(token));
                };

                Ok(TypeSignature::TypeDefOrRef(
                    TypeDefOrRefSignature::with_classification(
                        handle,
                        current_byte == ELEMENT_TYPE::VALUETYPE,
                    ),
                ))
            }
            _ => match CorLibType::from_element_type(current_byte) {
                Some(ty) => Ok(TypeSignature::CorLib(ty)),
                None => Err(malformed_error!(
                    "Unsupported element type - {}",
                    current_byte
                )),
            },
        }
    }

    /// Read a property signature (II.23.2.5)
    ///
    /// # Errors
    /// Returns an error if the header is invalid or a contained type cannot be read.
    pub fn read_property_signature(&mut self) -> Result<PropertySignature> {
        let head_byte = self.parser.read_le::<u8>()?;
        if (head_byte & !CALLING_CONVENTION::HASTHIS) != SIGNATURE_HEADER::PROPERTY {
            return Err(malformed_error!(
                "SignatureProperty - invalid start - {}",
                head_byte
            ));
        }

        let has_this = (head_byte & CALLING_CONVENTION::HASTHIS) != 0;
        let param_count = self.parser.read_compressed_uint()?;
        let property_type = self.read_type_signature()?;

        let mut parameters = Vec::with_capacity(param_count.min(64) as usize);
        for _ in 0..param_count {
            parameters.push(self.read_type_signature()?);
        }

        Ok(PropertySignature {
            has_this,
            property_type,
            parameters,
        })
    }

    /// Returns true if unread bytes remain
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.parser.has_more_data()
    }
}
