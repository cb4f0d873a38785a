//! The sub-service table and the state decoding a BAOS payload.

use crate::sink::{FieldSink, Tag};

use super::stream;

wire_enum! {
    /// BAOS sub-service, selecting the operation a telegram represents.
    ///
    /// Responses carry the code of their request with the high bit set.
    pub enum SubService: u8 {
        GetServerItemReq = 0x01 => "GetServerItem.Req",
        SetServerItemReq = 0x02 => "SetServerItem.Req",
        GetDatapointDescriptionReq = 0x03 => "GetDatapointDescription.Req",
        GetDescriptionStringReq = 0x04 => "GetDescriptionString.Req",
        GetDatapointValueReq = 0x05 => "GetDatapointValue.Req",
        SetDatapointValueReq = 0x06 => "SetDatapointValue.Req",
        GetParameterByteReq = 0x07 => "GetParameterByte.Req",
        SetParameterByteReq = 0x08 => "SetParameterByte.Req",
        GetServerItemRes = 0x81 => "GetServerItem.Res",
        SetServerItemRes = 0x82 => "SetServerItem.Res",
        GetDatapointDescriptionRes = 0x83 => "GetDatapointDescription.Res",
        GetDescriptionStringRes = 0x84 => "GetDescriptionString.Res",
        GetDatapointValueRes = 0x85 => "GetDatapointValue.Res",
        SetDatapointValueRes = 0x86 => "SetDatapointValue.Res",
        GetParameterByteRes = 0x87 => "GetParameterByte.Res",
        SetParameterByteRes = 0x88 => "SetParameterByte.Res",
        DatapointValueInd = 0xC1 => "DatapointValue.Ind",
        ServerItemInd = 0xC2 => "ServerItem.Ind",
    }
}

impl SubService {
    /// Whether this is a request, sent by the host.
    pub const fn is_request(self) -> bool {
        self.code() & 0x80 == 0
    }

    /// Whether this is an indication, sent by the device unprompted.
    pub const fn is_indication(self) -> bool {
        self.code() & 0xC0 == 0xC0
    }

    /// The decoder for payloads of this sub-service.
    pub const fn kind(self) -> Kind {
        use Subject::*;

        match self {
            Self::GetServerItemReq => Kind::Range(ServerItem),
            Self::GetDatapointDescriptionReq => Kind::Range(Datapoint),
            Self::GetDescriptionStringReq => Kind::Range(DescriptionString),
            Self::GetParameterByteReq => Kind::Range(ParameterByte),
            Self::GetDatapointValueReq => Kind::FilteredRange,

            Self::SetServerItemRes => Kind::Acknowledgement(ServerItem),
            Self::SetDatapointValueRes => Kind::Acknowledgement(Datapoint),
            Self::SetParameterByteRes => Kind::Acknowledgement(ParameterByte),

            Self::SetServerItemReq => Kind::ServerItems { response: false },
            Self::GetServerItemRes | Self::ServerItemInd => Kind::ServerItems { response: true },

            Self::SetDatapointValueReq => Kind::DatapointValues { response: false },
            Self::GetDatapointValueRes | Self::DatapointValueInd => {
                Kind::DatapointValues { response: true }
            }

            Self::GetDatapointDescriptionRes => Kind::DatapointDescriptors,
            Self::GetDescriptionStringRes => Kind::DescriptionStrings,

            Self::SetParameterByteReq => Kind::ParameterBytes { response: false },
            Self::GetParameterByteRes => Kind::ParameterBytes { response: true },
        }
    }
}

/// What the start and count fields of a payload header refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    ServerItem,
    Datapoint,
    DescriptionString,
    ParameterByte,
}

impl Subject {
    /// Tags of the start and count header fields.
    pub const fn header_tags(self) -> (Tag, Tag) {
        match self {
            Self::ServerItem => (Tag::StartServerItemId, Tag::ServerItemCount),
            Self::Datapoint => (Tag::StartDatapointId, Tag::DatapointCount),
            Self::DescriptionString => (Tag::StartDescriptionString, Tag::DescriptionStringCount),
            Self::ParameterByte => (Tag::StartParameterByte, Tag::ParameterByteCount),
        }
    }
}

/// Shape of a BAOS payload, selecting its decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Start and count only.
    Range(Subject),
    /// Start, count and a datapoint filter.
    FilteredRange,
    /// Start, count and an object server response.
    Acknowledgement(Subject),
    /// A list of length-prefixed server items.
    ServerItems { response: bool },
    /// A list of datapoint values, with commands in requests and states in
    /// responses.
    DatapointValues { response: bool },
    /// A list of fixed-size datapoint descriptions.
    DatapointDescriptors,
    /// A list of length-prefixed description strings.
    DescriptionStrings,
    /// A run of parameter bytes.
    ParameterBytes { response: bool },
}

impl Kind {
    /// Decode a payload of this shape, starting at the main-service byte.
    pub fn decode(self, r: &[u8], base: usize, o: &mut impl FieldSink) {
        match self {
            Self::Range(subject) => {
                stream::list_header(r, base, subject, o);
            }
            Self::FilteredRange => stream::filtered_range(r, base, o),
            Self::Acknowledgement(subject) => stream::acknowledgement(r, base, subject, o),
            Self::ServerItems { response } => stream::server_items(r, base, response, o),
            Self::DatapointValues { response } => stream::datapoint_values(r, base, response, o),
            Self::DatapointDescriptors => stream::datapoint_descriptors(r, base, o),
            Self::DescriptionStrings => stream::description_strings(r, base, o),
            Self::ParameterBytes { response } => stream::parameter_bytes(r, base, response, o),
        }
    }
}

/// State token to decode a BAOS payload of a known sub-service.
#[derive(Debug)]
pub struct Payload {
    pub(super) start: usize,
    pub(super) base: usize,
    pub(super) trailer: usize,
    pub(super) sub_service: SubService,
}

impl Payload {
    pub fn sub_service(&self) -> SubService {
        self.sub_service
    }

    /// Transition to another state by decoding the payload body.
    ///
    /// Returns the successor state token.
    pub fn advance(self, r: &[u8], o: &mut impl FieldSink) -> PayloadDecoded {
        self.sub_service.kind().decode(r, self.base, o);

        PayloadDecoded {
            start: self.start,
            trailer: self.trailer,
            sub_service: Some(self.sub_service.code()),
        }
    }
}

/// State token to check the FT 1.2 trailer.
#[derive(Debug)]
pub struct PayloadDecoded {
    pub(super) start: usize,
    pub(super) trailer: usize,
    pub(super) sub_service: Option<u8>,
}

impl PayloadDecoded {
    /// Offset of the checksum byte implied by the length byte.
    pub fn trailer_offset(&self) -> usize {
        self.trailer
    }
}
