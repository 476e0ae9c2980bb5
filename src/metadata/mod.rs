//! The .NET metadata object model.
//!
//! Entities form a graph rooted at a [`module::ModuleDefinition`]: modules own types, types own
//! methods, properties and nested types, and properties own their accessor links and custom
//! attributes. Ownership is tracked by [`owned::OwnedCollection`]; fields that come from the
//! metadata heaps are [`lazy::LazyCell`]s decoded on first access.
//!
//! # Key Components
//!
//! - [`module`] - The module, root of the entity graph
//! - [`typesystem`] - Type definitions, type references and resolution scopes
//! - [`members`] - Methods, properties, accessor semantics, constants and custom attributes
//! - [`signatures`] - Type and property signature model, blob decoding and encoding
//! - [`importer`] - Rewriting references so they can be used from another module
//! - [`loader`] - Building a backed module from metadata tables
//! - [`resolver`] - Cross-assembly resolution of type references
//! - [`tables`] / [`streams`] - Raw table rows and heaps
//!
//! # Examples
//!
//! ```rust
//! use dotmodel::prelude::*;
//!
//! let module = ModuleDefinition::new("Sample.dll");
//! let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
//! module.types().add(widget.clone());
//!
//! let size = PropertyDefinition::new(
//!     "Size",
//!     PropertyAttributes::empty(),
//!     Some(PropertySignature::instance(TypeSignature::CorLib(CorLibType::I4))),
//! );
//! widget.properties().add(size.clone());
//!
//! assert_eq!(size.full_name()?, "System.Int32 Sample.Widget::Size");
//! # Ok::<(), dotmodel::Error>(())
//! ```

/// Loading and resolution options
pub mod config;
/// Non-fatal findings collected while loading and resolving
pub mod diagnostics;
/// Assembly names and versions
pub mod identity;
/// Importing references into another module
pub mod importer;
/// Fields computed on first access
pub mod lazy;
/// Building backed modules from metadata tables
pub mod loader;
/// Methods, properties and what hangs off them
pub mod members;
/// The module entity
pub mod module;
/// Owner-tracking collections
pub mod owned;
/// Cross-assembly resolution
pub mod resolver;
/// Type and property signatures
pub mod signatures;
/// `#Strings` and `#Blob` heaps
pub mod streams;
/// Raw metadata table rows
pub mod tables;
/// Metadata tokens
pub mod token;
/// Capabilities shared by metadata entities
pub mod traits;
/// Type definitions and references
pub mod typesystem;
