use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::metadata::{
    identity::AssemblyIdentity,
    module::ModuleDefinition,
    tables::TableId,
    token::Token,
    traits::MetadataMember,
    typesystem::TypeReference,
};

/// A reference to another assembly, the target of an `AssemblyRef` resolution scope.
#[derive(Debug)]
pub struct AssemblyReference {
    token: Token,
    identity: AssemblyIdentity,
}

impl AssemblyReference {
    /// Creates a reference that has not been assigned a row
    #[must_use]
    pub fn new(identity: AssemblyIdentity) -> Arc<Self> {
        Self::with_token(Token::unbound(TableId::AssemblyRef), identity)
    }

    /// Creates a reference for an existing `AssemblyRef` row
    #[must_use]
    pub fn with_token(token: Token, identity: AssemblyIdentity) -> Arc<Self> {
        Arc::new(AssemblyReference { token, identity })
    }

    /// Identity of the referenced assembly
    #[must_use]
    pub fn identity(&self) -> &AssemblyIdentity {
        &self.identity
    }

    /// Simple name of the referenced assembly
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }
}

impl MetadataMember for AssemblyReference {
    fn token(&self) -> Token {
        self.token
    }
}

/// Where a type reference is to be looked up (ECMA-335 II.22.38).
///
/// Module and enclosing type reference scopes are weak: scopes never keep the graph alive.
#[derive(Clone)]
pub enum ResolutionScope {
    /// The type lives in a module
    Module(Weak<ModuleDefinition>),
    /// The type lives in another assembly
    AssemblyRef(Arc<AssemblyReference>),
    /// The type is nested inside another referenced type
    TypeRef(Weak<TypeReference>),
}

impl ResolutionScope {
    /// Name of the scope: module name, assembly name or enclosing type's full name
    #[must_use]
    pub fn name(&self) -> Option<String> {
        match self {
            ResolutionScope::Module(module) => module.upgrade().and_then(|m| m.name().ok()),
            ResolutionScope::AssemblyRef(assembly) => Some(assembly.name().to_string()),
            ResolutionScope::TypeRef(enclosing) => {
                enclosing.upgrade().and_then(|t| t.full_name().ok())
            }
        }
    }

    /// Returns false if the scope refers to an entity that has been dropped
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match self {
            ResolutionScope::Module(module) => module.strong_count() > 0,
            ResolutionScope::AssemblyRef(_) => true,
            ResolutionScope::TypeRef(enclosing) => enclosing.strong_count() > 0,
        }
    }
}

impl PartialEq for ResolutionScope {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ResolutionScope::Module(a), ResolutionScope::Module(b)) => Weak::ptr_eq(a, b),
            (ResolutionScope::AssemblyRef(a), ResolutionScope::AssemblyRef(b)) => {
                Arc::ptr_eq(a, b)
            }
            (ResolutionScope::TypeRef(a), ResolutionScope::TypeRef(b)) => Weak::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ResolutionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ResolutionScope::Module(_) => "Module",
            ResolutionScope::AssemblyRef(_) => "AssemblyRef",
            ResolutionScope::TypeRef(_) => "TypeRef",
        };
        write!(f, "{}({})", kind, self.name().unwrap_or_default())
    }
}
