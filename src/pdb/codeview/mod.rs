//! CodeView records.
//!
//! # Key Components
//!
//! - [`TypeRecord`] - A type referenced by a symbol: a built-in simple type or a leaf record
//! - [`TypeRecordTable`] - The leaf records of a type stream, addressed by type index
//! - [`SymbolStreamReader`] - Iterates the length-prefixed records of a symbol stream
//! - [`ConstantSymbol`] - An `S_CONSTANT` record
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use dotmodel::pdb::codeview::{DebugSymbol, SymbolStreamReader, TypeRecordTable};
//!
//! // S_CONSTANT: type 0x74 (int), value 42, name "Answer"
//! let mut stream = vec![0x10, 0x00, 0x07, 0x11, 0x74, 0x00, 0x00, 0x00, 0x2A, 0x00];
//! stream.extend_from_slice(b"Answer\0");
//! stream.push(0x00);
//!
//! let types = Arc::new(TypeRecordTable::new());
//! let symbols = SymbolStreamReader::new(&stream, types).collect::<Result<Vec<_>, _>>()?;
//!
//! let DebugSymbol::Constant(constant) = &symbols[0] else { unreachable!() };
//! assert_eq!(constant.value(), 42);
//! assert_eq!(constant.to_string(), "Constant: int Answer = 42");
//! # Ok::<(), dotmodel::Error>(())
//! ```

mod constant;
mod leaf;
mod symbols;

pub use constant::ConstantSymbol;
pub use leaf::{
    LeafRecord, SimpleTypeKind, SimpleTypeRecord, TypeRecord, TypeRecordSource,
    TypeRecordTable, FIRST_LEAF_INDEX,
};
pub use symbols::{DebugSymbol, SymbolKind, SymbolStreamReader};
