//! An owned, strongly-typed telegram tree.
//!
//! _Requires Cargo feature `std`._

extern crate std;

use std::vec::Vec;

use crate::{
    sans::{
        datapoint::{Command, ConfigFlags, DatapointState, Filter, ObjectServerResponse, ValueType},
        frame::ControlByte,
        item::{ServerItemValue, interpret},
        payload::{Kind, SubService},
        trailer::Summary,
    },
    sink::{Diagnostic, Field, FieldSink, FromValue, Tag},
};

use super::slice::{self, Error};

/// A decoded BAOS telegram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Telegram {
    /// Offset of the frame's first start byte.
    pub start_offset: usize,
    /// The first FT 1.2 length byte.
    pub length: u8,
    /// Raw FT 1.2 control byte.
    pub control: u8,
    /// Raw sub-service code, if the buffer holds one.
    pub sub_service: Option<u8>,
    /// Start, count and status fields preceding the records.
    pub header: PayloadHeader,
    /// Records decoded before the payload ran out.
    pub records: Vec<Record>,
    /// The checksum byte, if the buffer holds one.
    pub checksum: Option<u8>,
    /// The byte at the end byte position, if the buffer holds one.
    pub end_byte: Option<u8>,
    /// Diagnostics in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
    /// Outcome of the integrity checks.
    pub summary: Summary,
}

impl Telegram {
    pub fn control_byte(&self) -> Option<ControlByte> {
        ControlByte::from_code(self.control)
    }

    /// The sub-service, if the buffer holds a known one.
    pub fn sub_service_kind(&self) -> Option<SubService> {
        self.sub_service.and_then(SubService::from_code)
    }

    /// Whether the end byte is present where the length byte implies.
    pub fn is_complete(&self) -> bool {
        self.summary.status.complete
    }

    /// Whether the checksum is present and matches.
    pub fn checksum_valid(&self) -> bool {
        self.summary.checksum_valid == Some(true)
    }
}

/// Fields of the payload outside the record list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadHeader {
    /// First server item ID, datapoint ID, description string or parameter
    /// byte index.
    pub start: Option<u16>,
    pub count: Option<u16>,
    /// Raw datapoint filter of a value request.
    pub filter: Option<u8>,
    /// Raw object server response of an acknowledgement or empty response.
    pub response: Option<u8>,
}

impl PayloadHeader {
    pub fn filter(&self) -> Option<Filter> {
        self.filter.and_then(Filter::from_code)
    }

    pub fn object_server_response(&self) -> Option<ObjectServerResponse> {
        self.response.and_then(ObjectServerResponse::from_code)
    }
}

/// One element of the record list of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    ServerItem(ServerItem),
    Datapoint(Datapoint),
    DatapointDescriptor(DatapointDescriptor),
    DescriptionString(DescriptionString),
    ParameterByte(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerItem {
    pub id: u16,
    pub length: u8,
    /// The data, unless truncated.
    pub data: Option<Vec<u8>>,
}

impl ServerItem {
    /// The data interpreted according to the item ID.
    pub fn value(&self) -> Option<ServerItemValue<'_>> {
        self.data.as_deref().map(|data| interpret(self.id, data))
    }
}

/// The byte following a datapoint ID in a value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatapointByte {
    /// Command of a set request.
    Command(u8),
    /// State of a response or indication.
    State(u8),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datapoint {
    pub id: u16,
    pub byte: DatapointByte,
    pub length: u8,
    /// The value, unless truncated.
    pub value: Option<Vec<u8>>,
}

impl Datapoint {
    pub fn command(&self) -> Option<Command> {
        match self.byte {
            DatapointByte::Command(code) => Command::from_code(code),
            DatapointByte::State(_) => None,
        }
    }

    pub fn state(&self) -> Option<DatapointState> {
        match self.byte {
            DatapointByte::State(byte) => Some(DatapointState::of(byte)),
            DatapointByte::Command(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatapointDescriptor {
    pub id: u16,
    pub value_type: u8,
    pub config: u8,
    pub dpt: u8,
}

impl DatapointDescriptor {
    pub fn value_type(&self) -> Option<ValueType> {
        ValueType::from_code(self.value_type)
    }

    pub fn config(&self) -> ConfigFlags {
        ConfigFlags::of(self.config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionString {
    pub length: u16,
    /// The text, unless truncated.
    pub text: Option<Vec<u8>>,
}

impl DescriptionString {
    /// The text, if present and valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.text.as_deref()?).ok()
    }
}

/// Decode a telegram from a slice into an owned tree.
///
/// This method is also re-exported as `baos::avec::decode_tree`.
pub fn decode(r: &[u8]) -> Result<Telegram, Error> {
    let mut builder = Builder::new(r);
    let summary = slice::decode(r, &mut builder)?;

    let Builder {
        length,
        control,
        header,
        records,
        checksum,
        end_byte,
        diagnostics,
        ..
    } = builder;

    Ok(Telegram {
        start_offset: summary.start_offset,
        length: length.unwrap_or_default(),
        control: control.unwrap_or_default(),
        sub_service: summary.sub_service,
        header,
        records,
        checksum,
        end_byte,
        diagnostics,
        summary,
    })
}

/// Sink assembling records from the fields of one telegram.
struct Builder<'a> {
    r: &'a [u8],
    kind: Option<Kind>,
    length: Option<u8>,
    control: Option<u8>,
    header: PayloadHeader,
    records: Vec<Record>,
    /// Offset and length of the data of the current server item.
    item_data: Option<(usize, usize)>,
    checksum: Option<u8>,
    end_byte: Option<u8>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Builder<'a> {
    fn new(r: &'a [u8]) -> Self {
        Self {
            r,
            kind: None,
            length: None,
            control: None,
            header: PayloadHeader::default(),
            records: Vec::new(),
            item_data: None,
            checksum: None,
            end_byte: None,
            diagnostics: Vec::new(),
        }
    }

    /// Bytes in `at..at + length`.
    fn raw(&self, (at, length): (usize, usize)) -> Option<Vec<u8>> {
        let end = at.checked_add(length)?;
        self.r.get(at..end).map(<[u8]>::to_vec)
    }

    fn server_item(&mut self) -> Option<&mut ServerItem> {
        match self.records.last_mut() {
            Some(Record::ServerItem(item)) => Some(item),
            _ => None,
        }
    }

    fn datapoint(&mut self) -> Option<&mut Datapoint> {
        match self.records.last_mut() {
            Some(Record::Datapoint(datapoint)) => Some(datapoint),
            _ => None,
        }
    }

    fn descriptor(&mut self) -> Option<&mut DatapointDescriptor> {
        match self.records.last_mut() {
            Some(Record::DatapointDescriptor(descriptor)) => Some(descriptor),
            _ => None,
        }
    }

    fn description_string(&mut self) -> Option<&mut DescriptionString> {
        match self.records.last_mut() {
            Some(Record::DescriptionString(string)) => Some(string),
            _ => None,
        }
    }

    fn datapoint_id(&mut self, id: u16) {
        let record = match self.kind {
            Some(Kind::DatapointDescriptors) => Record::DatapointDescriptor(DatapointDescriptor {
                id,
                value_type: 0,
                config: 0,
                dpt: 0,
            }),
            Some(Kind::DatapointValues { response }) => Record::Datapoint(Datapoint {
                id,
                byte: if response {
                    DatapointByte::State(0)
                } else {
                    DatapointByte::Command(0)
                },
                length: 0,
                value: None,
            }),
            _ => return,
        };

        self.records.push(record);
    }
}

impl FieldSink for Builder<'_> {
    fn add_field(&mut self, field: Field<'_>) {
        let value = &field.value;

        // Interpreted fields may cover only part of the item data.
        if field.tag.is_server_item_data() {
            let data = self.item_data.take().and_then(|range| self.raw(range));
            if let (Some(data), Some(item)) = (data, self.server_item()) {
                item.data = Some(data);
            }
            return;
        }

        match field.tag {
            Tag::LengthByte if self.length.is_none() => self.length = u8::from_value(value),
            Tag::ControlByte => self.control = u8::from_value(value),
            Tag::SubService => {
                self.kind = u8::from_value(value)
                    .and_then(SubService::from_code)
                    .map(SubService::kind);
            }

            Tag::StartServerItemId
            | Tag::StartDatapointId
            | Tag::StartDescriptionString
            | Tag::StartParameterByte => self.header.start = u16::from_value(value),
            Tag::ServerItemCount
            | Tag::DatapointCount
            | Tag::DescriptionStringCount
            | Tag::ParameterByteCount => self.header.count = u16::from_value(value),
            Tag::DatapointFilter => self.header.filter = u8::from_value(value),
            Tag::ObjectServerResponse => self.header.response = u8::from_value(value),

            Tag::ServerItemId => {
                if let Some(id) = u16::from_value(value) {
                    self.item_data = None;
                    self.records.push(Record::ServerItem(ServerItem {
                        id,
                        length: 0,
                        data: None,
                    }));
                }
            }
            Tag::ServerItemLength => {
                if let (Some(length), Some(item)) = (u8::from_value(value), self.server_item()) {
                    item.length = length;
                    self.item_data = Some((field.offset + 1, length as usize));
                }
            }

            Tag::DatapointId => {
                if let Some(id) = u16::from_value(value) {
                    self.datapoint_id(id);
                }
            }
            Tag::DatapointCommand | Tag::DatapointState => {
                let byte = u8::from_value(value);
                if let (Some(byte), Some(datapoint)) = (byte, self.datapoint()) {
                    datapoint.byte = match datapoint.byte {
                        DatapointByte::Command(_) => DatapointByte::Command(byte),
                        DatapointByte::State(_) => DatapointByte::State(byte),
                    };
                }
            }
            Tag::DatapointLength => {
                if let (Some(length), Some(datapoint)) = (u8::from_value(value), self.datapoint())
                {
                    datapoint.length = length;
                }
            }
            Tag::DatapointValue => {
                let bytes = Vec::<u8>::from_value(value);
                if let Some(datapoint) = self.datapoint() {
                    datapoint.value = bytes;
                }
            }

            Tag::DatapointValueType | Tag::ConfigFlags | Tag::DatapointType => {
                let (tag, byte) = (field.tag, u8::from_value(value));
                if let (Some(byte), Some(descriptor)) = (byte, self.descriptor()) {
                    match tag {
                        Tag::DatapointValueType => descriptor.value_type = byte,
                        Tag::ConfigFlags => descriptor.config = byte,
                        _ => descriptor.dpt = byte,
                    }
                }
            }

            Tag::DescriptionStringLength => {
                if let Some(length) = u16::from_value(value) {
                    let string = DescriptionString { length, text: None };
                    self.records.push(Record::DescriptionString(string));
                }
            }
            Tag::DescriptionString => {
                let text = Vec::<u8>::from_value(value);
                if let Some(string) = self.description_string() {
                    string.text = text;
                }
            }

            Tag::ParameterByte => {
                if let Some(byte) = u8::from_value(value) {
                    self.records.push(Record::ParameterByte(byte));
                }
            }

            Tag::Checksum => self.checksum = u8::from_value(value),
            Tag::EndByte => self.end_byte = u8::from_value(value),

            _ => {}
        }
    }

    fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
