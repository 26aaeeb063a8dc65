use thiserror::Error;

#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Frame was too short.")]
    UnexpectedEnd,

    #[error("Unexpected {name} byte. Found {value:x}, expected one of: {expected:x?}.")]
    UnexpectedByte {
        name: &'static str,
        value: u8,
        expected: &'static [u8],
    },

    #[error("Handshake reply did not match {expected:x?}. Found {found:x?}.")]
    InvalidHandshake { found: [u8; 4], expected: [u8; 4] },
}

/// A type that can be reconstructed (decoded) from a raw sequence of bytes.
///
/// The input slice is advanced by the number of bytes consumed during decoding.
pub trait Decode {
    /// Attempts to decode `Self` from the beginning of the provided byte slice.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the input is malformed or too short.
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError>
    where
        Self: Sized;
}

impl Decode for u8 {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        let (&byte, rest) = data.split_first().ok_or(DecodeError::UnexpectedEnd)?;
        *data = rest;
        Ok(byte)
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
        let bytes = data.get(..N).ok_or(DecodeError::UnexpectedEnd)?;
        let mut arr = [0u8; N];
        arr.copy_from_slice(bytes);
        *data = &data[N..];
        Ok(arr)
    }
}
