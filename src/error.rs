use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The object model distinguishes three kinds of failure. Absence (no declaring type yet, a
/// reference that cannot be resolved, a property without a getter) is never an error and is
/// reported through `Option`. Structurally meaningless requests, such as importing a property on
/// its own, fail with [`Error::NotSupported`]. Serializing a signature whose referenced type
/// cannot be turned into a token fails with [`Error::EncodingInvalid`] instead of producing
/// malformed bytes.
///
/// # Examples
///
/// ```rust
/// use dotmodel::{Error, metadata::importer::ReferenceImporter, prelude::*};
///
/// let module = ModuleDefinition::new("Target.dll");
/// let property = PropertyDefinition::new("Value", PropertyAttributes::empty(), None);
///
/// let importer = ReferenceImporter::new(&module);
/// match property.import_with(&importer) {
///     Err(Error::NotSupported) => println!("properties are imported through their type"),
///     other => unreachable!("{:?}", other.is_ok()),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The backing data is damaged and could not be decoded.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted.
    ///
    /// Raised by the byte parser when reading past the end of a heap or record, and by
    /// owned collections when inserting past their end.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The requested operation is not meaningful for this kind of entity.
    ///
    /// Importing a property on its own is the canonical example: a property can only move
    /// between modules together with its declaring type and accessor methods.
    #[error("This operation is not supported")]
    NotSupported,

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    /// A token did not resolve to a type in the module that was asked.
    ///
    /// The associated [`Token`] identifies which type was not found.
    #[error("Failed to find type - {0}")]
    TypeNotFound(Token),

    /// General error while working with the type graph.
    #[error("{0}")]
    TypeError(String),

    /// Recursion limit reached.
    ///
    /// Walking scope or inheritance chains is bounded to protect against cyclic metadata.
    /// The associated value shows the limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// A signature could not be serialized.
    ///
    /// Raised when a referenced type has been dropped, is still unbound, or lives in a table
    /// that the target encoding cannot express.
    #[error("Invalid encoding - {0}")]
    EncodingInvalid(String),
}
