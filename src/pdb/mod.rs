//! Debug symbol records.
//!
//! Program databases describe debug-time entities in the CodeView format, independent from
//! the module's own metadata. Only the records the object model needs are decoded: constants
//! and the type records they refer to.
//!
//! - [`codeview`] - CodeView type records, symbol records and the symbol stream reader

pub mod codeview;
