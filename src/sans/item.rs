//! Server items: device metadata slots and the interpretation of their data.

use tartan_bitfield::bitfield;

use crate::sink::{Field, FieldSink, FromValue, Tag, Value};

wire_enum! {
    /// Identifier of a server item.
    pub enum ServerItemId: u16 {
        HardwareType = 1 => "Hardware Type",
        HardwareVersion = 2 => "Hardware version",
        FirmwareVersion = 3 => "Firmware version",
        ManufacturerCodeDevice = 4 => "KNX manufacturer code DEV",
        ManufacturerCodeApplication = 5 => "KNX manufacturer code APP",
        ApplicationId = 6 => "Application ID (ETS)",
        ApplicationVersion = 7 => "Application version (ETS)",
        SerialNumber = 8 => "Serial number",
        TimeSinceReset = 9 => "Time since reset [ms]",
        BusConnectionState = 10 => "Bus connection state",
        MaxBufferSize = 11 => "Maximum buffer size",
        DescriptionStringLength = 12 => "Length of description string",
        Baudrate = 13 => "Baudrate",
        CurrentBufferSize = 14 => "Current buffer size",
        ProgrammingMode = 15 => "Programming mode",
        ProtocolVersionBinary = 16 => "Protocol Version (Binary)",
        IndicationSending = 17 => "Indication Sending",
        ProtocolVersionWebService = 18 => "Protocol Version (WebService)",
        ProtocolVersionRestService = 19 => "Protocol Version (RestService)",
        IndividualAddress = 20 => "Individual Address",
    }
}

/// How the data of a server item is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// A big-endian unsigned integer at most this many bytes wide.
    Integer(usize),
    /// A single version byte.
    Version,
    /// A boolean status.
    Status,
    /// An individual KNX address.
    Address,
    /// Uninterpreted bytes.
    Bytes,
}

impl ServerItemId {
    /// Tag and shape of the data of this server item.
    pub const fn layout(self) -> (Tag, Shape) {
        match self {
            Self::HardwareType => (Tag::HardwareType, Shape::Integer(6)),
            Self::HardwareVersion
            | Self::FirmwareVersion
            | Self::ApplicationVersion
            | Self::ProtocolVersionBinary
            | Self::ProtocolVersionWebService
            | Self::ProtocolVersionRestService => (Tag::Version, Shape::Version),
            Self::ManufacturerCodeDevice | Self::ManufacturerCodeApplication => {
                (Tag::KnxManufacturerCode, Shape::Integer(2))
            }
            Self::ApplicationId => (Tag::ApplicationId, Shape::Integer(2)),
            Self::SerialNumber => (Tag::SerialNumber, Shape::Bytes),
            Self::TimeSinceReset => (Tag::TimeSinceReset, Shape::Integer(4)),
            Self::BusConnectionState | Self::ProgrammingMode | Self::IndicationSending => {
                (Tag::ServerItemStatus, Shape::Status)
            }
            Self::MaxBufferSize | Self::CurrentBufferSize => (Tag::BufferSize, Shape::Integer(2)),
            Self::DescriptionStringLength => (Tag::DescriptionStringLimit, Shape::Integer(2)),
            Self::Baudrate => (Tag::Baudrate, Shape::Integer(1)),
            Self::IndividualAddress => (Tag::KnxAddress, Shape::Address),
        }
    }
}

bitfield! {
    /// A version number packed into one byte.
    pub struct Version(u8) {
        [4..8] pub major: u8,
        [0..4] pub minor: u8,
    }
}

impl Version {
    pub const fn of(byte: u8) -> Self {
        Self(byte)
    }
}

impl FromValue for Version {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        u8::from_value(value).map(Self::of)
    }
}

bitfield! {
    /// An individual KNX address: area, line and device.
    pub struct KnxAddress(u16) {
        [12..16] pub area: u8,
        [8..12] pub line: u8,
        [0..8] pub device: u8,
    }
}

impl KnxAddress {
    pub const fn of(raw: u16) -> Self {
        Self(raw)
    }
}

impl FromValue for KnxAddress {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        u16::from_value(value).map(Self::of)
    }
}

wire_enum! {
    /// Baudrate of the serial interface.
    pub enum Baudrate: u8 {
        Unknown = 0 => "Unknown",
        Baud19200 = 1 => "19200",
        Baud115200 = 2 => "115200",
    }
}

/// The interpreted data of a server item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerItemValue<'a> {
    Integer(u64),
    Version { raw: u8, major: u8, minor: u8 },
    Status(bool),
    Address { raw: u16, area: u8, line: u8, device: u8 },
    Bytes(&'a [u8]),
}

/// Interpret the data of a server item according to its identifier.
///
/// Data of unknown items, and data not fitting the expected shape, is left as
/// bytes.
pub fn interpret(id: u16, data: &[u8]) -> ServerItemValue<'_> {
    let shape = ServerItemId::from_code(id).map_or(Shape::Bytes, |id| id.layout().1);

    let interpreted = match shape {
        Shape::Integer(width) => integer(data, width).map(ServerItemValue::Integer),
        Shape::Status => integer(data, 4).map(|x| ServerItemValue::Status(x != 0)),
        Shape::Version => data.first().map(|&raw| {
            let version = Version::of(raw);
            ServerItemValue::Version {
                raw,
                major: version.major(),
                minor: version.minor(),
            }
        }),
        Shape::Address => data.first_chunk::<2>().map(|&a| {
            let raw = u16::from_be_bytes(a);
            let address = KnxAddress::of(raw);
            ServerItemValue::Address {
                raw,
                area: address.area(),
                line: address.line(),
                device: address.device(),
            }
        }),
        Shape::Bytes => None,
    };

    interpreted.unwrap_or(ServerItemValue::Bytes(data))
}

fn integer(data: &[u8], width: usize) -> Option<u64> {
    if data.is_empty() || data.len() > width {
        return None;
    }

    Some(data.iter().fold(0, |acc, b| (acc << 8) | u64::from(*b)))
}

/// Publish the data of a server item found at offset `at`.
pub(super) fn emit(id: u16, at: usize, data: &[u8], o: &mut impl FieldSink) {
    let tag = ServerItemId::from_code(id).map_or(Tag::ServerItemData, |id| id.layout().0);

    match interpret(id, data) {
        ServerItemValue::Integer(_) => add(o, at, data.len(), tag, Value::integer(data)),
        ServerItemValue::Status(x) => add(o, at, data.len(), tag, Value::Bool(x)),
        ServerItemValue::Version { raw, major, minor } => {
            add(o, at, 1, Tag::Version, Value::U8(raw));
            add(o, at, 1, Tag::VersionMajor, Value::U8(major));
            add(o, at, 1, Tag::VersionMinor, Value::U8(minor));
        }
        ServerItemValue::Address {
            raw,
            area,
            line,
            device,
        } => {
            add(o, at, 2, Tag::KnxAddress, Value::U16(raw));
            add(o, at, 1, Tag::KnxAreaAddress, Value::U8(area));
            add(o, at, 1, Tag::KnxLineAddress, Value::U8(line));
            add(o, at + 1, 1, Tag::KnxDeviceAddress, Value::U8(device));
        }
        ServerItemValue::Bytes(data) => add(o, at, data.len(), tag, Value::Bytes(data)),
    }
}

fn add(o: &mut impl FieldSink, offset: usize, length: usize, tag: Tag, value: Value<'_>) {
    o.add_field(Field {
        offset,
        length,
        tag,
        value,
    });
}
