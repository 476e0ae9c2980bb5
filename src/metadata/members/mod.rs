//! Members declared by types and the entities attached to them.
//!
//! # Key Components
//!
//! - [`PropertyDefinition`] - Properties with their accessor links, default value and attributes
//! - [`MethodDefinition`] - Methods, as far as accessors and accessibility need them
//! - [`MethodSemantics`] - Links between an accessor method and its property or event
//! - [`Constant`] - Compile-time default values
//! - [`CustomAttribute`] - Attributes applied to any [`crate::metadata::traits::HasCustomAttributes`]

mod constant;
mod customattribute;
mod method;
mod property;
mod semantics;

pub use constant::Constant;
pub use customattribute::CustomAttribute;
pub use method::{MemberAccess, MethodAttributes, MethodDefinition};
pub(crate) use property::PropertyDefinitionParts;
pub use property::{PropertyAttributes, PropertyDefinition};
pub use semantics::{MethodSemantics, MethodSemanticsAttributes};
