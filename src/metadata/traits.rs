//! Capability traits shared by metadata entities.
//!
//! Entities do not form a class hierarchy. Each one implements the capabilities it has, and
//! code that works across entity kinds (custom attribute owners, semantic associations)
//! is written against these traits.

use std::sync::Arc;

use crate::{
    metadata::{
        importer::ReferenceImporter,
        members::{Constant, CustomAttribute, MethodSemantics},
        module::ModuleDefinition,
        owned::OwnedCollection,
        token::Token,
        typesystem::TypeDefinition,
    },
    Result,
};

/// Anything identified by a metadata token
pub trait MetadataMember {
    /// The token of this entity; unbound for entities not yet assigned a row
    fn token(&self) -> Token;
}

/// Entities that can carry custom attributes
pub trait HasCustomAttributes: MetadataMember + Send + Sync {
    /// The attributes applied to this entity, in metadata order
    fn custom_attributes(&self) -> &OwnedCollection<dyn HasCustomAttributes, CustomAttribute>;
}

/// Entities that own accessor links (properties; events would be the other kind)
pub trait HasSemantics: MetadataMember + Send + Sync {
    /// The accessor links of this entity, in metadata order
    fn semantics(&self) -> &OwnedCollection<dyn HasSemantics, MethodSemantics>;
}

/// Entities that can carry a compile-time constant
pub trait HasConstant: MetadataMember {
    /// The constant, if any
    ///
    /// # Errors
    /// Returns an error if the backing constant cannot be loaded.
    fn constant(&self) -> Result<Option<Arc<Constant>>>;

    /// Replaces the constant
    fn set_constant(&self, constant: Option<Arc<Constant>>);
}

/// Members declared by a type
pub trait MemberDefinition: MetadataMember {
    /// Simple name
    ///
    /// # Errors
    /// Returns an error if the backing name cannot be loaded.
    fn name(&self) -> Result<String>;

    /// The type whose member collection holds this member
    fn declaring_type(&self) -> Option<Arc<TypeDefinition>>;

    /// The module of the declaring type
    fn module(&self) -> Option<Arc<ModuleDefinition>>;

    /// Fully qualified, human readable name
    ///
    /// # Errors
    /// Returns an error if a backing name cannot be loaded.
    fn full_name(&self) -> Result<String>;

    /// Returns true if code in `ty` may use this member
    fn is_accessible_from(&self, ty: &TypeDefinition) -> bool;
}

/// Things that can be made usable from another module
pub trait Importable {
    /// The imported counterpart
    type Imported;

    /// Returns true if this can be used from `module` without importing
    fn is_imported_in(&self, module: &ModuleDefinition) -> bool;

    /// Imports this into the importer's target module
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] for entities that cannot be imported on their
    /// own, or the importer's error.
    fn import_with(&self, importer: &ReferenceImporter) -> Result<Self::Imported>;
}
