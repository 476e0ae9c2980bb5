//! ECMA-335 compressed integer encoding.
//!
//! Signatures and blob length prefixes store integers in a 1, 2 or 4 byte big-endian form
//! whose leading bits announce the width (II.23.2):
//!
//! | Range | Layout |
//! |-------|--------|
//! | `0x00..=0x7F` | `0bbbbbbb` |
//! | `0x80..=0x3FFF` | `10bbbbbb bbbbbbbb` |
//! | `0x4000..=0x1FFF_FFFF` | `110bbbbb bbbbbbbb bbbbbbbb bbbbbbbb` |
//!
//! The decoding direction lives in [`crate::file::parser::Parser::read_compressed_uint`].

use crate::{Error, Result};

/// Largest value that fits the 4-byte compressed form.
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Number of bytes (1, 2, or 4) the compressed form of `value` takes
fn compressed_uint_size(value: u32) -> usize {
    if value < 0x80 {
        1
    } else if value < 0x4000 {
        2
    } else {
        4
    }
}

/// Appends `value` to `buffer` in the ECMA-335 compressed unsigned form.
///
/// # Errors
/// Returns [`Error::EncodingInvalid`] if `value` exceeds [`MAX_COMPRESSED_UINT`]; nothing is
/// written in that case.
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    match compressed_uint_size(value) {
        1 => buffer.push(value as u8),
        2 => {
            buffer.push(((value >> 8) as u8) | 0x80);
            buffer.push(value as u8);
        }
        _ => {
            if value > MAX_COMPRESSED_UINT {
                return Err(Error::EncodingInvalid(format!(
                    "0x{:08X} is too large for a compressed integer",
                    value
                )));
            }
            buffer.push(((value >> 24) as u8) | 0xC0);
            buffer.push((value >> 16) as u8);
            buffer.push((value >> 8) as u8);
            buffer.push(value as u8);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::parser::Parser;

    #[test]
    fn test_compressed_uint_size() {
        assert_eq!(compressed_uint_size(0), 1);
        assert_eq!(compressed_uint_size(0x7F), 1);
        assert_eq!(compressed_uint_size(0x80), 2);
        assert_eq!(compressed_uint_size(0x3FFF), 2);
        assert_eq!(compressed_uint_size(0x4000), 4);
        assert_eq!(compressed_uint_size(0x1FFF_FFFF), 4);
    }

    #[test]
    fn test_write_compressed_uint_ecma_samples() {
        // Samples from ECMA-335 II.23.2
        let samples: &[(u32, &[u8])] = &[
            (0x03, &[0x03]),
            (0x7F, &[0x7F]),
            (0x80, &[0x80, 0x80]),
            (0x2E57, &[0xAE, 0x57]),
            (0x3FFF, &[0xBF, 0xFF]),
            (0x4000, &[0xC0, 0x00, 0x40, 0x00]),
            (0x1FFF_FFFF, &[0xDF, 0xFF, 0xFF, 0xFF]),
        ];

        for (value, expected) in samples {
            let mut buffer = Vec::new();
            write_compressed_uint(*value, &mut buffer).unwrap();
            assert_eq!(&buffer, expected, "value 0x{:X}", value);

            let mut parser = Parser::new(&buffer);
            assert_eq!(parser.read_compressed_uint().unwrap(), *value);
        }
    }

    #[test]
    fn test_write_compressed_uint_too_large() {
        let mut buffer = Vec::new();
        assert!(matches!(
            write_compressed_uint(0x2000_0000, &mut buffer),
            Err(Error::EncodingInvalid(_))
        ));
        assert!(buffer.is_empty());
    }
}
