// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotmodel
//!
//! A lazily materialized, mutable object model for .NET (ECMA-335) metadata and CodeView debug
//! records.
//!
//! Every entity of the graph (modules, types, type references, methods, properties, accessor
//! links, constants, custom attributes, debug constants) can either be backed by metadata, in
//! which case each field is decoded from the heaps on first access, or be built by hand. Both
//! kinds are traversed and mutated through the same API.
//!
//! ## Features
//!
//! - **Deferred materialization** - [`metadata::lazy::LazyCell`] fields run their source once
//!   and commit the first result
//! - **Tracked ownership** - [`metadata::owned::OwnedCollection`] keeps every back-reference in
//!   sync; an item lives in at most one collection
//! - **Exact signature encoding** - `TypeDefOrRef` signatures round-trip through the compact
//!   ECMA-335 encoding, with visitor based traversal
//! - **Cross-module references** - resolution through [`metadata::resolver`] and importing
//!   through [`metadata::importer`]
//! - **CodeView constants** - `S_CONSTANT` records read lazily from a symbol stream
//!
//! ## Quick Start
//!
//! ```rust
//! use dotmodel::prelude::*;
//!
//! let module = ModuleDefinition::new("Sample.dll");
//! let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
//! module.types().add(widget.clone());
//!
//! let getter = MethodDefinition::new("get_Count", MethodAttributes::PUBLIC);
//! widget.methods().add(getter.clone());
//!
//! let count = PropertyDefinition::new(
//!     "Count",
//!     PropertyAttributes::empty(),
//!     Some(PropertySignature::instance(TypeSignature::CorLib(CorLibType::I4))),
//! );
//! widget.properties().add(count.clone());
//! count.set_semantic_methods(Some(getter), None);
//!
//! assert_eq!(count.full_name()?, "System.Int32 Sample.Widget::Count");
//! assert_eq!(count.declaring_type().unwrap().name()?, "Widget");
//! # Ok::<(), dotmodel::Error>(())
//! ```
//!
//! Backed modules come from [`metadata::loader::load_module`].

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub(crate) mod file;
pub(crate) mod utils;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotmodel::prelude::*;
///
/// let module = ModuleDefinition::new("Sample.dll");
/// assert!(module.types().is_empty());
/// ```
pub mod prelude;

/// The .NET metadata object model
///
/// # Key Components
///
/// - [`metadata::module`] - The module, root of the entity graph
/// - [`metadata::typesystem`] - Type definitions and references
/// - [`metadata::members`] - Methods, properties and what hangs off them
/// - [`metadata::signatures`] - Signature model and codec
/// - [`metadata::loader`] - Backed modules from metadata tables
pub mod metadata;

/// CodeView debug records
///
/// See [`pdb::codeview::ConstantSymbol`] and [`pdb::codeview::SymbolStreamReader`].
pub mod pdb;

/// `dotmodel` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotmodel` Error type
///
/// # Examples
///
/// ```rust
/// use dotmodel::{prelude::*, Error};
///
/// let property = PropertyDefinition::new("Size", PropertyAttributes::empty(), None);
/// let importer = ReferenceImporter::new(&ModuleDefinition::new("Other.dll"));
///
/// match property.import_with(&importer) {
///     Err(Error::NotSupported) => {}
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub use error::Error;

/// Cursor over a byte slice with ECMA-335 compressed integer decoding
pub use file::parser::Parser;
