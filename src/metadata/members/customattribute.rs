use std::{fmt, sync::Arc};

use crate::{
    metadata::{
        lazy::LazyCell,
        owned::{Owned, OwnerLink},
        tables::TableId,
        token::Token,
        traits::{HasCustomAttributes, MetadataMember},
    },
    Result,
};

/// An attribute applied to a metadata entity (a `CustomAttribute` row).
///
/// The constructor is kept as a `MethodDef` or `MemberRef` token and the argument blob is left
/// undecoded. The attribute is owned by the custom attribute collection of its parent.
pub struct CustomAttribute {
    token: Token,
    constructor: Token,
    value: LazyCell<Vec<u8>>,
    link: OwnerLink<dyn HasCustomAttributes, CustomAttribute>,
}

impl CustomAttribute {
    /// Creates an attribute that has not been assigned a row
    #[must_use]
    pub fn new(constructor: Token, value: Vec<u8>) -> Arc<Self> {
        Self::backed(
            Token::unbound(TableId::CustomAttribute),
            constructor,
            LazyCell::new(value),
        )
    }

    pub(crate) fn backed(token: Token, constructor: Token, value: LazyCell<Vec<u8>>) -> Arc<Self> {
        Arc::new(CustomAttribute {
            token,
            constructor,
            value,
            link: OwnerLink::new(),
        })
    }

    /// Token of the attribute constructor
    pub fn constructor(&self) -> Token {
        self.constructor
    }

    /// Raw argument blob, starting with the 0x0001 prolog
    ///
    /// # Errors
    /// Returns an error if the backing blob cannot be read.
    pub fn value(&self) -> Result<Vec<u8>> {
        self.value.get()
    }

    /// Replaces the argument blob
    pub fn set_value(&self, value: Vec<u8>) {
        self.value.set(value);
    }

    /// The entity whose custom attribute collection holds this attribute
    pub fn parent(&self) -> Option<Arc<dyn HasCustomAttributes>> {
        self.link.owner()
    }
}

impl MetadataMember for CustomAttribute {
    fn token(&self) -> Token {
        self.token
    }
}

impl Owned<dyn HasCustomAttributes> for CustomAttribute {
    fn owner_link(&self) -> &OwnerLink<dyn HasCustomAttributes, CustomAttribute> {
        &self.link
    }
}

impl fmt::Debug for CustomAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAttribute")
            .field("token", &self.token)
            .field("constructor", &self.constructor)
            .finish_non_exhaustive()
    }
}
