use std::fmt;

use crate::{
    metadata::{
        module::ModuleDefinition,
        signatures::{BlobWriterContext, TypeSignature, CALLING_CONVENTION, SIGNATURE_HEADER},
    },
    Error, Result,
};

/// Property signature (ECMA-335 II.23.2.5)
///
/// `parameters` is non-empty for indexers.
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySignature {
    /// Indicates the passing of a 'this' pointer
    pub has_this: bool,
    /// The type of the property
    pub property_type: TypeSignature,
    /// The parameters of an indexed property
    pub parameters: Vec<TypeSignature>,
}

impl PropertySignature {
    /// Creates the signature of an instance property without parameters
    #[must_use]
    pub fn instance(property_type: TypeSignature) -> Self {
        PropertySignature {
            has_this: true,
            property_type,
            parameters: Vec::new(),
        }
    }

    /// Creates the signature of a static property without parameters
    #[must_use]
    pub fn static_property(property_type: TypeSignature) -> Self {
        PropertySignature {
            has_this: false,
            property_type,
            parameters: Vec::new(),
        }
    }

    /// Writes header, parameter count, property type and parameter types.
    ///
    /// # Errors
    /// Propagates encoding failures of contained types. Bytes of types written before the
    /// failing one remain in the context; callers discard the context on error.
    pub fn write(&self, ctx: &mut BlobWriterContext<'_>) -> Result<()> {
        let mut prolog = SIGNATURE_HEADER::PROPERTY;
        if self.has_this {
            prolog |= CALLING_CONVENTION::HASTHIS;
        }

        let param_count = u32::try_from(self.parameters.len()).map_err(|_| {
            Error::EncodingInvalid(format!(
                "Too many parameters in property signature: {}",
                self.parameters.len()
            ))
        })?;

        ctx.write_u8(prolog);
        ctx.write_compressed_uint(param_count)?;

        self.property_type.write(ctx)?;
        for parameter in &self.parameters {
            parameter.write(ctx)?;
        }

        Ok(())
    }

    /// Every contained type signature
    pub fn types(&self) -> impl Iterator<Item = &TypeSignature> {
        std::iter::once(&self.property_type).chain(self.parameters.iter())
    }

    /// Returns true if every contained type is imported in `module`
    #[must_use]
    pub fn is_imported_in(&self, module: &ModuleDefinition) -> bool {
        self.types().all(|ty| ty.is_imported_in(module))
    }
}

impl fmt::Display for PropertySignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_this {
            write!(f, "instance ")?;
        }
        write!(f, "{}", self.property_type)?;

        if !self.parameters.is_empty() {
            let parameters: Vec<String> =
                self.parameters.iter().map(TypeSignature::full_name).collect();
            write!(f, "[{}]", parameters.join(", "))?;
        }

        Ok(())
    }
}
