//! Links between a property and its accessor methods.

use std::{
    fmt,
    sync::{Arc, RwLock},
};

use bitflags::bitflags;

use crate::metadata::{
    members::MethodDefinition,
    owned::{Owned, OwnerLink},
    tables::TableId,
    token::Token,
    traits::{HasSemantics, MetadataMember},
};

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    /// Role of a method in a `MethodSemantics` row (ECMA-335 II.23.1.12)
    pub struct MethodSemanticsAttributes: u16 {
        /// Property setter
        const SETTER = 0x0001;
        /// Property getter
        const GETTER = 0x0002;
        /// Other accessor of a property or event
        const OTHER = 0x0004;
        /// Event add accessor
        const ADD_ON = 0x0008;
        /// Event remove accessor
        const REMOVE_ON = 0x0010;
        /// Event raise accessor
        const FIRE = 0x0020;
    }
}

/// Links an accessor method to the property or event it implements.
///
/// The link is owned by the semantics collection of its association, so
/// [`MethodSemantics::association`] always names the entity whose collection holds it.
pub struct MethodSemantics {
    token: Token,
    attributes: RwLock<MethodSemanticsAttributes>,
    method: RwLock<Arc<MethodDefinition>>,
    link: OwnerLink<dyn HasSemantics, MethodSemantics>,
}

impl MethodSemantics {
    /// Creates a link that has not been assigned a row
    #[must_use]
    pub fn new(method: Arc<MethodDefinition>, attributes: MethodSemanticsAttributes) -> Arc<Self> {
        Self::with_token(Token::unbound(TableId::MethodSemantics), method, attributes)
    }

    /// Creates a link for an existing `MethodSemantics` row
    #[must_use]
    pub fn with_token(
        token: Token,
        method: Arc<MethodDefinition>,
        attributes: MethodSemanticsAttributes,
    ) -> Arc<Self> {
        Arc::new(MethodSemantics {
            token,
            attributes: RwLock::new(attributes),
            method: RwLock::new(method),
            link: OwnerLink::new(),
        })
    }

    /// Role of the method
    pub fn attributes(&self) -> MethodSemanticsAttributes {
        *read_lock!(self.attributes)
    }

    /// Replaces the role of the method
    pub fn set_attributes(&self, attributes: MethodSemanticsAttributes) {
        *write_lock!(self.attributes) = attributes;
    }

    /// Returns true if the method has the given role
    pub fn has_role(&self, role: MethodSemanticsAttributes) -> bool {
        self.attributes().contains(role)
    }

    /// The accessor method
    pub fn method(&self) -> Arc<MethodDefinition> {
        read_lock!(self.method).clone()
    }

    /// Replaces the accessor method
    pub fn set_method(&self, method: Arc<MethodDefinition>) {
        *write_lock!(self.method) = method;
    }

    /// The property or event whose semantics collection holds this link
    pub fn association(&self) -> Option<Arc<dyn HasSemantics>> {
        self.link.owner()
    }
}

impl MetadataMember for MethodSemantics {
    fn token(&self) -> Token {
        self.token
    }
}

impl Owned<dyn HasSemantics> for MethodSemantics {
    fn owner_link(&self) -> &OwnerLink<dyn HasSemantics, MethodSemantics> {
        &self.link
    }
}

impl fmt::Debug for MethodSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSemantics")
            .field("token", &self.token)
            .field("attributes", &self.attributes())
            .field("method", &self.method().name().unwrap_or_default())
            .finish()
    }
}
