//! Types defined in and referenced by a module.
//!
//! [`TypeDefinition`] and [`TypeReference`] are the two type entities of the model. Code that
//! only needs to point at a type, such as signatures and base-type slots, uses the weak
//! [`TypeDefOrRef`] handle instead of holding either entity.
//!
//! # Key Components
//!
//! - [`TypeDefinition`] - A `TypeDef` row with its members and nested types
//! - [`TypeReference`] - A `TypeRef` row and its [`ResolutionScope`]
//! - [`TypeDefOrRef`] - Weak handle to either
//! - [`AssemblyReference`] - Target of an assembly resolution scope

mod attributes;
mod definition;
mod handle;
mod reference;
mod scope;

use std::sync::Arc;

pub use attributes::{TypeAttributes, TypeVisibility};
pub(crate) use definition::TypeDefinitionParts;
pub use definition::TypeDefinition;
pub use handle::TypeDefOrRef;
pub use reference::TypeReference;
pub use scope::{AssemblyReference, ResolutionScope};

use crate::metadata::module::ModuleDefinition;

/// Returns true if both entities live in the same module, or both are detached
pub(crate) fn same_module(
    first: Option<Arc<ModuleDefinition>>,
    second: Option<Arc<ModuleDefinition>>,
) -> bool {
    match (first, second) {
        (Some(first), Some(second)) => Arc::ptr_eq(&first, &second),
        (None, None) => true,
        _ => false,
    }
}
