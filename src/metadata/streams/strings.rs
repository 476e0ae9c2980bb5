use std::ffi::CStr;

use crate::{Error::OutOfBounds, Result};

/// The `#Strings` heap: zero-terminated UTF-8 identifiers addressed by byte offset.
///
/// Offset 0 always holds the empty string. The heap owns its bytes so entities can keep
/// lazy sources over it without borrowing from a file mapping.
///
/// # Examples
///
/// ```rust
/// use dotmodel::metadata::streams::Strings;
///
/// let mut strings = Strings::new();
/// let index = strings.push("Value");
///
/// assert_eq!(strings.get(index as usize)?, "Value");
/// assert_eq!(strings.get(0)?, "");
/// # Ok::<(), dotmodel::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Strings {
    data: Vec<u8>,
}

impl Strings {
    /// Creates a heap holding only the mandatory empty string
    #[must_use]
    pub fn new() -> Self {
        Strings { data: vec![0] }
    }

    /// Creates a heap over existing `#Strings` bytes
    ///
    /// # Errors
    /// Returns an error if the data is empty or does not start with the empty string.
    pub fn from(data: Vec<u8>) -> Result<Strings> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #String heap is empty"));
        }

        Ok(Strings { data })
    }

    /// Appends a string and returns its heap offset
    pub fn push(&mut self, value: &str) -> u32 {
        let index = self.data.len() as u32;
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        index
    }

    /// Get a view into the string contained at the provided location.
    ///
    /// # Errors
    /// Returns an error if the index is out of bounds or the string is not terminated or not
    /// valid UTF-8.
    pub fn get(&self, index: usize) -> Result<&str> {
        if index >= self.data.len() {
            return Err(OutOfBounds);
        }

        match CStr::from_bytes_until_nul(&self.data[index..]) {
            Ok(result) => match result.to_str() {
                Ok(result) => Ok(result),
                Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
            },
            Err(_) => Err(malformed_error!("Invalid string at index - {}", index)),
        }
    }

    /// Raw heap bytes
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Default for Strings {
    fn default() -> Self {
        Self::new()
    }
}
