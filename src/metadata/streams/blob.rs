use crate::{file::parser::Parser, utils::write_compressed_uint, Error::OutOfBounds, Result};

/// The `#Blob` heap: length-prefixed binary values addressed by byte offset.
///
/// Each entry starts with its length as an ECMA-335 compressed unsigned integer. Offset 0
/// always holds the empty blob.
///
/// # Examples
///
/// ```rust
/// use dotmodel::metadata::streams::Blob;
///
/// let mut blob = Blob::new();
/// let index = blob.push(&[0x08, 0x00, 0x08])?;
///
/// assert_eq!(blob.get(index as usize)?, &[0x08, 0x00, 0x08]);
/// assert!(blob.get(0)?.is_empty());
/// # Ok::<(), dotmodel::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Blob {
    data: Vec<u8>,
}

impl Blob {
    /// Creates a heap holding only the mandatory empty blob
    #[must_use]
    pub fn new() -> Self {
        Blob { data: vec![0] }
    }

    /// Creates a heap over existing `#Blob` bytes
    ///
    /// # Errors
    /// Returns an error if the data is empty or does not start with the empty blob.
    pub fn from(data: Vec<u8>) -> Result<Blob> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// Appends a value and returns its heap offset
    ///
    /// # Errors
    /// Returns an error if the value is too long for a compressed length prefix.
    pub fn push(&mut self, value: &[u8]) -> Result<u32> {
        let index = self.data.len() as u32;
        write_compressed_uint(value.len() as u32, &mut self.data)?;
        self.data.extend_from_slice(value);
        Ok(index)
    }

    /// Get a view into the blob contained at the provided location.
    ///
    /// # Errors
    /// Returns an error if the index is out of bounds or the length prefix points past the
    /// end of the heap.
    pub fn get(&self, index: usize) -> Result<&[u8]> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        let skip = parser.pos();

        let Some(data_start) = index.checked_add(skip) else {
            return Err(OutOfBounds);
        };

        let Some(data_end) = data_start.checked_add(len) else {
            return Err(OutOfBounds);
        };

        if data_end > self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(&self.data[data_start..data_end])
    }
}

impl Default for Blob {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data = {
            let mut data = vec![0xCC; 300];
            /* i - 0    - should always be 0    */ data[0]          = 0b_00000000_u8;

            /* i - 1    - len 10                */ data[1]          = 0b_00001010_u8;
            /* i - 1    - len 10                */ data[2..12]      .copy_from_slice(&[0x0A; 10]);

            /* i - 12   - len 5                 */ data[12]         = 0b_00000101_u8;
            /* i - 12   - len 5                 */ data[13..18]     .copy_from_slice(&[0xAB; 5]);

            /* i - 18   - len 0 - invalid       */ data[18]         = 0b_11111111_u8;

            /* i - 19   - len 257               */ data[19]         = 0b_10000001_u8;
            /* i - 19   - len 257               */ data[20]         = 0b_00000001_u8;
            /* i - 19   - len 257               */ data[21..278]    .copy_from_slice(&[0xBA; 257]);

            /* i - 278  - len 100 - overflow    */ data[278]        = 0b_01100100_u8;
            data
        };

        let blob = Blob::from(data).unwrap();

        assert_eq!(blob.get(1).unwrap(), &[0x0A; 10]);
        assert_eq!(blob.get(12).unwrap(), &[0xAB; 5]);
        assert!(blob.get(18).is_err());
        assert_eq!(blob.get(19).unwrap(), &[0xBA; 257]);
        assert!(matches!(blob.get(278), Err(OutOfBounds)));
        assert!(matches!(blob.get(300), Err(OutOfBounds)));
    }

    #[test]
    fn push_long_value() {
        let mut blob = Blob::new();
        let value = vec![0x11; 200];
        let index = blob.push(&value).unwrap();

        assert_eq!(index, 1);
        assert_eq!(blob.get(1).unwrap(), value.as_slice());
    }
}
