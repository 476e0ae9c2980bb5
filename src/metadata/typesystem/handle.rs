//! Non-owning handle to a type definition or a type reference.
//!
//! Handles compare by identity of the referent and never keep it alive.

use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::metadata::{
    module::ModuleDefinition,
    token::Token,
    traits::MetadataMember,
    typesystem::{ResolutionScope, TypeDefinition, TypeReference},
};

/// A non-owning handle to a type definition or type reference.
///
/// Signatures and base-type slots hold these instead of strong references, so the entity
/// graph stays acyclic. Every accessor returns `None` once the referenced entity is dropped.
/// Equality is identity of the referenced entity.
#[derive(Clone)]
pub enum TypeDefOrRef {
    /// A type defined in a module
    Definition(Weak<TypeDefinition>),
    /// A reference to a type defined elsewhere
    Reference(Weak<TypeReference>),
}

impl TypeDefOrRef {
    /// Returns true while the referenced entity exists
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match self {
            TypeDefOrRef::Definition(def) => def.strong_count() > 0,
            TypeDefOrRef::Reference(reference) => reference.strong_count() > 0,
        }
    }

    /// Token of the referenced entity
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        match self {
            TypeDefOrRef::Definition(def) => def.upgrade().map(|def| def.token()),
            TypeDefOrRef::Reference(reference) => reference.upgrade().map(|r| r.token()),
        }
    }

    /// Simple name of the referenced type
    #[must_use]
    pub fn name(&self) -> Option<String> {
        match self {
            TypeDefOrRef::Definition(def) => def.upgrade()?.name().ok(),
            TypeDefOrRef::Reference(reference) => reference.upgrade()?.name().ok(),
        }
    }

    /// Namespace of the referenced type
    #[must_use]
    pub fn namespace(&self) -> Option<String> {
        match self {
            TypeDefOrRef::Definition(def) => def.upgrade()?.namespace().ok(),
            TypeDefOrRef::Reference(reference) => reference.upgrade()?.namespace().ok(),
        }
    }

    /// Full name of the referenced type
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        match self {
            TypeDefOrRef::Definition(def) => def.upgrade()?.full_name().ok(),
            TypeDefOrRef::Reference(reference) => reference.upgrade()?.full_name().ok(),
        }
    }

    /// Resolution scope: the owning module for definitions, the recorded scope for references
    #[must_use]
    pub fn scope(&self) -> Option<ResolutionScope> {
        match self {
            TypeDefOrRef::Definition(def) => {
                let module = def.upgrade()?.module()?;
                Some(ResolutionScope::Module(Arc::downgrade(&module)))
            }
            TypeDefOrRef::Reference(reference) => reference.upgrade()?.scope().ok()?,
        }
    }

    /// Module that contains the referenced entity
    #[must_use]
    pub fn module(&self) -> Option<Arc<ModuleDefinition>> {
        match self {
            TypeDefOrRef::Definition(def) => def.upgrade()?.module(),
            TypeDefOrRef::Reference(reference) => reference.upgrade()?.module(),
        }
    }

    /// Returns true if the referenced type is a value type
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        match self {
            TypeDefOrRef::Definition(def) => def.upgrade().is_some_and(|def| def.is_value_type()),
            TypeDefOrRef::Reference(reference) => reference
                .upgrade()
                .is_some_and(|reference| reference.is_value_type()),
        }
    }

    /// Resolves the handle to a type definition
    #[must_use]
    pub fn resolve(&self) -> Option<Arc<TypeDefinition>> {
        match self {
            TypeDefOrRef::Definition(def) => def.upgrade(),
            TypeDefOrRef::Reference(reference) => reference.upgrade()?.resolve(),
        }
    }

    /// Returns true if the referenced entity belongs to `module`
    #[must_use]
    pub fn is_imported_in(&self, module: &ModuleDefinition) -> bool {
        self.module()
            .is_some_and(|owner| std::ptr::eq(Arc::as_ptr(&owner), module))
    }
}

impl From<&Arc<TypeDefinition>> for TypeDefOrRef {
    fn from(def: &Arc<TypeDefinition>) -> Self {
        TypeDefOrRef::Definition(Arc::downgrade(def))
    }
}

impl From<&Arc<TypeReference>> for TypeDefOrRef {
    fn from(reference: &Arc<TypeReference>) -> Self {
        TypeDefOrRef::Reference(Arc::downgrade(reference))
    }
}

impl PartialEq for TypeDefOrRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeDefOrRef::Definition(a), TypeDefOrRef::Definition(b)) => Weak::ptr_eq(a, b),
            (TypeDefOrRef::Reference(a), TypeDefOrRef::Reference(b)) => Weak::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for TypeDefOrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            TypeDefOrRef::Definition(_) => "Definition",
            TypeDefOrRef::Reference(_) => "Reference",
        };
        match self.full_name() {
            Some(name) => write!(f, "{kind}({name})"),
            None => write!(f, "{kind}(<dropped>)"),
        }
    }
}
