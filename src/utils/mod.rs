//! Shared helpers that do not belong to a specific metadata component.
//!
//! - [`write_compressed_uint`] - ECMA-335 II.23.2 integer encoding

mod compression;

pub use compression::write_compressed_uint;
