//! Low-level byte order and safe reading utilities.
//!
//! The [`CilIO`] trait abstracts over the primitive integer types so that [`read_le_at`] can
//! decode any of them from a byte slice while advancing an offset. Every read is bounds checked
//! and reports [`crate::Error::OutOfBounds`] instead of panicking on truncated input.

use crate::{Error::OutOfBounds, Result};

/// Trait for primitive types that can be decoded from a fixed-size byte array.
pub trait CilIO: Sized {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_cil_io {
    ($($ty:ty => $len:literal),* $(,)?) => {
        $(
            impl CilIO for $ty {
                type Bytes = [u8; $len];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_cil_io!(
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
);

/// Reads a value of type `T` in little-endian order at `offset`, advancing it past the value.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if fewer than `size_of::<T>()` bytes remain.
pub fn read_le_at<T: CilIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(OutOfBounds);
    };
    if end > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(OutOfBounds);
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_le_at_advances() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut offset = 0;

        assert_eq!(read_le_at::<u16>(&data, &mut offset).unwrap(), 0x0201);
        assert_eq!(offset, 2);
        assert_eq!(read_le_at::<u32>(&data, &mut offset).unwrap(), 0x0605_0403);
        assert_eq!(offset, 6);
        assert_eq!(read_le_at::<u8>(&data, &mut offset).unwrap(), 0x07);
    }

    #[test]
    fn read_le_at_out_of_bounds() {
        let data = [0x01, 0x02, 0x03];
        let mut offset = 1;

        assert!(matches!(
            read_le_at::<u32>(&data, &mut offset),
            Err(OutOfBounds)
        ));
        assert_eq!(offset, 1);
    }

    #[test]
    fn read_le_at_signed() {
        let data = [0xFE, 0xFF];
        let mut offset = 0;
        assert_eq!(read_le_at::<i16>(&data, &mut offset).unwrap(), -2);
    }
}
