//! States locating a frame within a buffer.

use log::{debug, trace};
use thiserror::Error;

use super::frame::{
    ControlByte, FrameHeader, HEADER_LEN, MAIN_SERVICE, MIN_TELEGRAM_LEN, SCAN_WINDOW, START_BYTE,
};

/// A buffer not recognized as a BAOS telegram.
///
/// This is a negative match rather than a failure: hosts running several
/// heuristic decoders should offer the buffer to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The buffer is shorter than the minimum telegram length.
    #[error("Buffer too short for a BAOS telegram ({0} bytes).")]
    TooShort(usize),
    /// No FT 1.2 and BAOS pattern within the scanned window.
    #[error("No FT 1.2 frame carrying a BAOS payload found.")]
    NotFound,
}

/// Look for the FT 1.2 + BAOS pattern within the first [`SCAN_WINDOW`]
/// offsets of a buffer.
///
/// Returns the offset of the first start byte. Lower offsets are preferred.
pub fn locate(r: &[u8]) -> Option<u8> {
    (0..SCAN_WINDOW as u8).find(|&i| matches_at(r, i as usize))
}

fn matches_at(r: &[u8], i: usize) -> bool {
    let byte = |k: usize| r.get(i + k).copied();

    // The start byte is restated after the two length bytes.
    let is_ft12 = byte(0) == Some(START_BYTE)
        && byte(3) == Some(START_BYTE)
        && byte(4).and_then(ControlByte::from_code).is_some();

    trace!("frame candidate at offset {i}: ft12 = {is_ft12}");

    is_ft12 && byte(5) == Some(MAIN_SERVICE)
}

/// State token to scan a buffer for a frame.
#[derive(Debug)]
pub struct Scanning;

impl Scanning {
    /// Transition to another state by locating a frame in a buffer.
    ///
    /// Returns a successor state token, or the reason the buffer was not
    /// recognized.
    pub fn advance(r: &[u8]) -> Result<FoundFrame, ScanError> {
        if r.len() < MIN_TELEGRAM_LEN {
            Err(ScanError::TooShort(r.len()))?;
        }

        let start = locate(r).ok_or(ScanError::NotFound)? as usize;

        let header = r
            .get(start..start + HEADER_LEN)
            .and_then(|h| h.try_into().ok())
            .map(FrameHeader::new)
            .ok_or(ScanError::NotFound)?;

        debug!("found BAOS frame at offset {start}");

        Ok(FoundFrame { start, header })
    }
}

/// State token to decode the header of a located frame.
#[derive(Debug)]
pub struct FoundFrame {
    pub(super) start: usize,
    pub(super) header: FrameHeader,
}

impl FoundFrame {
    /// Offset of the first start byte within the buffer.
    pub fn start_offset(&self) -> usize {
        self.start
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }
}
