//! Metadata heaps.
//!
//! - [`Strings`] - the `#Strings` heap of identifiers
//! - [`Blob`] - the `#Blob` heap holding signatures and constant values
//!
//! Both heaps own their bytes and follow the lookup rules of ECMA-335 II.24.2.

mod blob;
mod strings;

pub use blob::Blob;
pub use strings::Strings;
