//! # dotmodel Prelude
//!
//! The types and traits needed to build, traverse and mutate an entity graph. Import it with
//! a glob:
//!
//! ```rust
//! use dotmodel::prelude::*;
//!
//! let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
//! assert_eq!(widget.token(), Token::unbound(TableId::TypeDef));
//! ```

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotmodel operations
pub use crate::Error;

/// The result type used throughout dotmodel
pub use crate::Result;

/// Loading and resolution options
pub use crate::metadata::config::ModuleOptions;

/// Non-fatal findings of loading and resolution
pub use crate::metadata::diagnostics::{
    Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics,
};

// ================================================================================================
// Entity Model Building Blocks
// ================================================================================================

/// Deferred fields and owner-tracking collections
pub use crate::metadata::{
    lazy::LazyCell,
    owned::{LazyOwnedCollection, Owned, OwnedCollection, OwnerLink},
};

/// Entity identity
pub use crate::metadata::{tables::TableId, token::Token};

/// Capabilities shared by entities
pub use crate::metadata::traits::{
    HasConstant, HasCustomAttributes, HasSemantics, Importable, MemberDefinition, MetadataMember,
};

// ================================================================================================
// Modules, Types and Members
// ================================================================================================

/// The module and cross-module plumbing
pub use crate::metadata::{
    identity::{AssemblyIdentity, AssemblyVersion},
    importer::ReferenceImporter,
    module::ModuleDefinition,
    resolver::{AssemblyResolver, ModuleCache},
};

/// Type definitions and references
pub use crate::metadata::typesystem::{
    AssemblyReference, ResolutionScope, TypeAttributes, TypeDefOrRef, TypeDefinition,
    TypeReference, TypeVisibility,
};

/// Methods, properties and what hangs off them
pub use crate::metadata::members::{
    Constant, CustomAttribute, MemberAccess, MethodAttributes, MethodDefinition, MethodSemantics,
    MethodSemanticsAttributes, PropertyAttributes, PropertyDefinition,
};

// ================================================================================================
// Signatures
// ================================================================================================

/// Signature model, visitor and codec
pub use crate::metadata::signatures::{
    BlobWriterContext, CorLibType, PropertySignature, SignatureReader, TypeClassification,
    TypeCodedIndexProvider, TypeDefOrRefSignature, TypeSignature, TypeSignatureVisitor,
};

// ================================================================================================
// Loading
// ================================================================================================

/// Backed modules from metadata tables
pub use crate::metadata::loader::{load_module, MetadataImage, MetadataImageBuilder};

// ================================================================================================
// Debug Symbols
// ================================================================================================

/// CodeView constants
pub use crate::pdb::codeview::{
    ConstantSymbol, DebugSymbol, SymbolKind, SymbolStreamReader, TypeRecord, TypeRecordTable,
};
