//! Symbol records and a reader over a CodeView symbol stream.
//!
//! Each record is a `u16` length (excluding itself), a `u16` kind and the body.

use std::{fmt, sync::Arc};

use crate::{
    file::parser::Parser,
    metadata::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
    pdb::codeview::{ConstantSymbol, TypeRecordSource},
    Result,
};

/// The `S_*` kind of a symbol record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    /// `S_CONSTANT`
    Constant,
    /// `S_UDT`
    UserDefinedType,
    /// `S_PUB32`
    Public,
    /// Any kind without a model
    Unknown(u16),
}

impl SymbolKind {
    /// `S_CONSTANT`
    pub const S_CONSTANT: u16 = 0x1107;
    /// `S_UDT`
    pub const S_UDT: u16 = 0x1108;
    /// `S_PUB32`
    pub const S_PUB32: u16 = 0x110E;

    /// Decodes a record kind
    #[must_use]
    pub fn from_u16(value: u16) -> Self {
        match value {
            Self::S_CONSTANT => SymbolKind::Constant,
            Self::S_UDT => SymbolKind::UserDefinedType,
            Self::S_PUB32 => SymbolKind::Public,
            other => SymbolKind::Unknown(other),
        }
    }

    /// The raw record kind
    #[must_use]
    pub fn value(&self) -> u16 {
        match self {
            SymbolKind::Constant => Self::S_CONSTANT,
            SymbolKind::UserDefinedType => Self::S_UDT,
            SymbolKind::Public => Self::S_PUB32,
            SymbolKind::Unknown(value) => *value,
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Constant => write!(f, "Constant"),
            SymbolKind::UserDefinedType => write!(f, "UserDefinedType"),
            SymbolKind::Public => write!(f, "Public"),
            SymbolKind::Unknown(value) => write!(f, "Unknown(0x{value:04X})"),
        }
    }
}

/// A record of a symbol stream
#[derive(Debug)]
pub enum DebugSymbol {
    /// An `S_CONSTANT` record
    Constant(Arc<ConstantSymbol>),
    /// A record kept as raw bytes
    Unknown {
        /// Kind of the record
        kind: SymbolKind,
        /// Record body after the kind
        data: Vec<u8>,
    },
}

impl DebugSymbol {
    /// Kind of the record
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        match self {
            DebugSymbol::Constant(constant) => constant.kind(),
            DebugSymbol::Unknown { kind, .. } => *kind,
        }
    }
}

/// Iterates the records of a CodeView symbol stream.
///
/// Each record is a `u16` length covering the kind and body, a `u16` kind and the body. A
/// truncated record ends the iteration with an error. A record whose body cannot be decoded is
/// an error too, unless the reader reports into [`Diagnostics`]: it is then recorded and
/// yielded as [`DebugSymbol::Unknown`].
pub struct SymbolStreamReader<'a> {
    parser: Parser<'a>,
    types: Arc<dyn TypeRecordSource>,
    diagnostics: Option<Arc<Diagnostics>>,
    failed: bool,
}

impl<'a> SymbolStreamReader<'a> {
    /// Creates a reader over `data`, resolving type indexes through `types`
    pub fn new(data: &'a [u8], types: Arc<dyn TypeRecordSource>) -> Self {
        SymbolStreamReader {
            parser: Parser::new(data),
            types,
            diagnostics: None,
            failed: false,
        }
    }

    /// Reports undecodable records to `diagnostics` instead of failing
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<Diagnostics>) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    fn read_record(&mut self) -> Result<DebugSymbol> {
        let offset = self.parser.pos();
        let length = usize::from(self.parser.read_le::<u16>()?);
        if length < 2 || length > self.parser.remaining().len() {
            return Err(malformed_error!(
                "Symbol record at offset {} has invalid length {}",
                offset,
                length
            ));
        }

        let kind = SymbolKind::from_u16(self.parser.read_le::<u16>()?);
        let body = &self.parser.remaining()[..length - 2];
        self.parser.advance_by(length - 2)?;

        if kind != SymbolKind::Constant {
            return Ok(DebugSymbol::Unknown {
                kind,
                data: body.to_vec(),
            });
        }

        match ConstantSymbol::from_record(body, self.types.clone()) {
            Ok(constant) => Ok(DebugSymbol::Constant(Arc::new(constant))),
            Err(error) => match &self.diagnostics {
                Some(diagnostics) => {
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticSeverity::Warning,
                            DiagnosticCategory::Symbol,
                            format!("Undecodable {kind} record: {error}"),
                        )
                        .with_offset(offset as u64),
                    );
                    Ok(DebugSymbol::Unknown {
                        kind,
                        data: body.to_vec(),
                    })
                }
                None => Err(error),
            },
        }
    }
}

impl Iterator for SymbolStreamReader<'_> {
    type Item = Result<DebugSymbol>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || !self.parser.has_more_data() {
            return None;
        }

        let record = self.read_record();
        self.failed = record.is_err();
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdb::codeview::TypeRecordTable;

    fn record(kind: u16, body: &[u8]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&((body.len() + 2) as u16).to_le_bytes());
        data.extend_from_slice(&kind.to_le_bytes());
        data.extend_from_slice(body);
        data
    }

    fn constant_body(type_index: u32, value: &[u8], name: &str) -> Vec<u8> {
        let mut body = type_index.to_le_bytes().to_vec();
        body.extend_from_slice(value);
        body.extend_from_slice(name.as_bytes());
        body.push(0);
        body
    }

    #[test]
    fn reads_constants_and_keeps_other_records() {
        let mut stream = record(0x1108, &[0x74, 0x00, 0x00, 0x00, b'T', 0x00]);
        stream.extend(record(
            SymbolKind::S_CONSTANT,
            &constant_body(0x75, &[0x05, 0x00], "Five"),
        ));

        let symbols = SymbolStreamReader::new(&stream, Arc::new(TypeRecordTable::new()))
            .collect::<Result<Vec<_>>>()
            .unwrap();

        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].kind(), SymbolKind::UserDefinedType);
        let DebugSymbol::Constant(constant) = &symbols[1] else {
            panic!("expected a constant");
        };
        assert_eq!(constant.value(), 5);
        assert_eq!(constant.name().unwrap(), "Five");
    }

    #[test]
    fn truncated_record_ends_the_stream() {
        let mut stream = record(SymbolKind::S_CONSTANT, &constant_body(0x74, &[0x01, 0x00], "A"));
        stream.extend_from_slice(&[0x40, 0x00, 0x07, 0x11]);

        let mut reader = SymbolStreamReader::new(&stream, Arc::new(TypeRecordTable::new()));
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn undecodable_constants_are_reported_when_diagnostics_are_attached() {
        // LF_QUADWORD values do not fit the 16 bit model
        let body = constant_body(0x76, &[0x09, 0x80, 1, 0, 0, 0, 0, 0, 0, 0], "Big");
        let stream = record(SymbolKind::S_CONSTANT, &body);
        let types: Arc<dyn TypeRecordSource> = Arc::new(TypeRecordTable::new());

        assert!(SymbolStreamReader::new(&stream, types.clone())
            .next()
            .unwrap()
            .is_err());

        let diagnostics = Arc::new(Diagnostics::new());
        let symbol = SymbolStreamReader::new(&stream, types)
            .with_diagnostics(diagnostics.clone())
            .next()
            .unwrap()
            .unwrap();
        assert!(matches!(symbol, DebugSymbol::Unknown { kind: SymbolKind::Constant, .. }));
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn kinds_round_trip_through_their_values() {
        for value in [0x1107, 0x1108, 0x110E, 0x1234] {
            assert_eq!(SymbolKind::from_u16(value).value(), value);
        }
        assert_eq!(SymbolKind::Unknown(0x1234).to_string(), "Unknown(0x1234)");
    }
}
