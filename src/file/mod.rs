//! Byte-level access to backing storage.
//!
//! The physical image reader is not part of this crate; these helpers only decode the small
//! encodings that the object model consumes directly: heap entries, signature blobs and
//! CodeView records.
//!
//! - [`io`] - Endian-aware primitive reads with bounds checking
//! - [`parser::Parser`] - Cursor over a byte slice with ECMA-335 compressed encodings

pub mod io;
pub mod parser;
