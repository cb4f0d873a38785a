//! States processing the frame header and the common BAOS header.

use either::Either::{self, Left, Right};
use log::{debug, warn};

use crate::sink::{Diagnostic, Field, FieldSink, Tag, Value};

use super::{
    payload::{Payload, PayloadDecoded, SubService},
    scan::FoundFrame,
};

impl FoundFrame {
    /// Transition to another state by decoding the FT 1.2 header and the BAOS
    /// main-service and sub-service bytes.
    ///
    /// Returns the successor state token.
    pub fn advance(self, r: &[u8], o: &mut impl FieldSink) -> HeaderDecoded {
        let Self { start, header } = self;

        let fields = [
            (Tag::StartByte, header.start),
            (Tag::LengthByte, header.length),
            (Tag::LengthByte, header.length_repeat),
            (Tag::StartByte, header.start_repeat),
            (Tag::ControlByte, header.control),
        ];

        for (i, (tag, value)) in fields.into_iter().enumerate() {
            o.add_field(Field {
                offset: start + i,
                length: 1,
                tag,
                value: Value::U8(value),
            });
        }

        let (first, second) = (header.length, header.length_repeat);
        if first != second {
            let diagnostic = Diagnostic::LengthMismatch { first, second };
            warn!("{diagnostic}");
            o.add_diagnostic(diagnostic);
        }

        // The length byte also counts the control byte.
        let base = start + 5;
        let trailer = base + header.payload_len();

        if let Some(&main_service) = r.get(base) {
            o.add_field(Field {
                offset: base,
                length: 1,
                tag: Tag::MainService,
                value: Value::U8(main_service),
            });
        }

        let sub_service = r.get(base + 1).copied();
        if let Some(sub_service) = sub_service {
            o.add_field(Field {
                offset: base + 1,
                length: 1,
                tag: Tag::SubService,
                value: Value::U8(sub_service),
            });
        }

        HeaderDecoded {
            start,
            base,
            trailer,
            sub_service,
        }
    }
}

/// State token to select a payload decoder from the sub-service code.
#[derive(Debug)]
pub struct HeaderDecoded {
    pub(super) start: usize,
    pub(super) base: usize,
    pub(super) trailer: usize,
    pub(super) sub_service: Option<u8>,
}

impl HeaderDecoded {
    /// The raw sub-service code, if the buffer holds one.
    pub fn sub_service(&self) -> Option<u8> {
        self.sub_service
    }

    /// Transition to another state by looking up the sub-service.
    ///
    /// Returns a payload state token for known sub-services. For unknown
    /// sub-services the payload is left undecoded, and the successor skips
    /// directly to the trailer.
    pub fn advance(self) -> Either<Payload, PayloadDecoded> {
        let Self {
            start,
            base,
            trailer,
            sub_service: code,
        } = self;

        match code.and_then(SubService::from_code) {
            Some(sub_service) => {
                debug!("dispatching {}", sub_service.label());
                Left(Payload {
                    start,
                    base,
                    trailer,
                    sub_service,
                })
            }
            None => {
                debug!("leaving payload of unknown sub-service {code:?} undecoded");
                Right(PayloadDecoded {
                    start,
                    trailer,
                    sub_service: code,
                })
            }
        }
    }
}
