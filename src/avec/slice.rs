//! Slice-based decoder implementation.

use either::Either::{Left, Right};
use thiserror::Error;

use crate::{
    sans::{Decoder, scan::ScanError, trailer::Summary},
    sink::FieldSink,
};

/// Reasons a slice was not decoded.
///
/// Neither is a failure of the input: the buffer is simply not a BAOS
/// telegram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The slice is shorter than the minimum telegram length.
    #[error("Slice too short for a BAOS telegram ({0} bytes).")]
    TooShort(usize),
    /// No FT 1.2 frame carrying a BAOS payload found.
    #[error("Not a BAOS telegram.")]
    NotFound,
}

impl From<ScanError> for Error {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::TooShort(len) => Self::TooShort(len),
            ScanError::NotFound => Self::NotFound,
        }
    }
}

/// Decode a telegram from a slice, publishing to a receiver.
///
/// Once a frame is found, decoding always runs to completion: truncated
/// records are skipped and integrity problems are published as diagnostics.
///
/// This method is also re-exported as `baos::avec::decode_slice`.
pub fn decode(r: &[u8], o: &mut impl FieldSink) -> Result<Summary, Error> {
    let frame = Decoder::advance(r)?;

    let header = frame.advance(r, o);

    let payload = match header.advance() {
        Left(state) => state.advance(r, o),
        Right(state) => state,
    };

    Ok(payload.advance(r, o).advance())
}
