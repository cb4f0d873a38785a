//! States processing the FT 1.2 trailer.

use log::warn;

use crate::sink::{Diagnostic, Field, FieldSink, Tag, Value};

use super::{check::checksum, frame::END_BYTE, payload::PayloadDecoded};

/// Completeness of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameStatus {
    /// Whether the end byte is present at the offset implied by the length
    /// byte.
    pub complete: bool,
}

/// Check for the end byte following the checksum at `trailer`.
pub fn verify(r: &[u8], trailer: usize) -> FrameStatus {
    let end = trailer.checked_add(1).and_then(|i| r.get(i));

    FrameStatus {
        complete: end == Some(&END_BYTE),
    }
}

impl PayloadDecoded {
    /// Transition to another state by checking the frame for completeness
    /// and validating its checksum.
    ///
    /// Failed checks are published as diagnostics. Returns the successor
    /// state token.
    pub fn advance(self, r: &[u8], o: &mut impl FieldSink) -> TrailerChecked {
        let Self {
            start,
            trailer,
            sub_service,
        } = self;

        let status = verify(r, trailer);

        if !status.complete {
            let diagnostic = Diagnostic::FrameIncomplete {
                offset: trailer + 1,
            };
            warn!("{diagnostic}");
            o.add_diagnostic(diagnostic);
        }

        let checksum_valid = r.get(trailer).map(|&found| {
            o.add_field(Field {
                offset: trailer,
                length: 1,
                tag: Tag::Checksum,
                value: Value::U8(found),
            });

            // Covers the control byte through the last payload byte.
            let expected = checksum(r, start + 4, trailer);

            if found != expected {
                let diagnostic = Diagnostic::ChecksumMismatch { expected, found };
                warn!("{diagnostic}");
                o.add_diagnostic(diagnostic);
            }

            found == expected
        });

        if let Some(&end) = r.get(trailer + 1) {
            o.add_field(Field {
                offset: trailer + 1,
                length: 1,
                tag: Tag::EndByte,
                value: Value::U8(end),
            });
        }

        TrailerChecked {
            start,
            sub_service,
            status,
            checksum_valid,
        }
    }
}

/// State token to complete decoding.
#[derive(Debug)]
pub struct TrailerChecked {
    pub(super) start: usize,
    pub(super) sub_service: Option<u8>,
    pub(super) status: FrameStatus,
    pub(super) checksum_valid: Option<bool>,
}

impl TrailerChecked {
    /// Transition to the final state.
    ///
    /// Returns a summary of the decoded telegram.
    pub fn advance(self) -> Summary {
        Summary {
            start_offset: self.start,
            sub_service: self.sub_service,
            status: self.status,
            checksum_valid: self.checksum_valid,
        }
    }
}

/// Outcome of decoding one telegram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Offset of the frame's first start byte.
    pub start_offset: usize,
    /// Raw sub-service code, if the buffer holds one.
    pub sub_service: Option<u8>,
    /// Whether the end byte sits where the length byte implies.
    pub status: FrameStatus,
    /// Whether the checksum matched, if the buffer holds one.
    pub checksum_valid: Option<bool>,
}
