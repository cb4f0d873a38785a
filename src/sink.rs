//! The receiving side of the decoder.
//!
//! Every decoded field is published to a [`FieldSink`] as a [`Field`]: its
//! position in the input buffer, a semantic [`Tag`], and an interpreted
//! [`Value`]. Integrity problems are published separately as [`Diagnostic`]s.
//!
//! The decoder never builds display strings itself. Hosts presenting fields
//! can look up a label and filter abbreviation through [`Tag::label`] and
//! [`Tag::abbrev`].

use core::fmt;

use thiserror::Error;

/// Derive [`FieldSink`] for a struct collecting decoded fields.
///
/// _Requires Cargo feature `derive`._
///
/// # Example
///
/// To receive a single value, add the `field(Tag)` attribute to an `Option<T>`
/// struct field, where `Tag` names a [`Tag`] variant and `T` implements
/// [`FromValue`]. Additional values for the same tag replace earlier ones. To
/// collect every occurrence, apply the attribute to a `Vec<T>` instead.
///
/// Diagnostics are collected by a `Vec<Diagnostic>` or `Option<Diagnostic>`
/// field carrying the `diagnostic` attribute.
///
/// ```
/// #[derive(Debug, Default, FieldSink)]
/// struct Values {
///     #[field(SubService)]
///     sub_service: Option<SubService>,
///     #[field(DatapointId)]
///     ids: Vec<u16>,
///     #[diagnostic]
///     diagnostics: Vec<Diagnostic>,
/// }
/// ```
///
/// To receive values into arbitrary containers, supply an accumulator closure.
/// Since the value type cannot be inferred, the second argument must be typed.
///
/// ```
/// #[derive(Debug, Default, FieldSink)]
/// struct Parameters {
///     #[field(ParameterByte, |v, b: u8| v.push(b))]
///     bytes: ArrayVec<[u8; 16]>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use baos_derive::FieldSink;

/// Semantic tag of a decoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tag {
    StartByte,
    LengthByte,
    ControlByte,
    MainService,
    SubService,
    Checksum,
    EndByte,

    ObjectServerResponse,

    StartServerItemId,
    ServerItemCount,
    ServerItemId,
    ServerItemLength,
    /// Data of a server item without a more specific interpretation.
    ServerItemData,
    HardwareType,
    Version,
    VersionMajor,
    VersionMinor,
    KnxManufacturerCode,
    ApplicationId,
    SerialNumber,
    TimeSinceReset,
    ServerItemStatus,
    BufferSize,
    /// Server item holding the maximum length of a description string.
    DescriptionStringLimit,
    Baudrate,
    KnxAddress,
    KnxAreaAddress,
    KnxLineAddress,
    KnxDeviceAddress,

    StartDatapointId,
    DatapointCount,
    DatapointId,
    DatapointCommand,
    DatapointState,
    StateValid,
    StateUpdate,
    StateReadRequest,
    StateTransmission,
    DatapointLength,
    DatapointValue,
    DatapointFilter,
    DatapointValueType,
    ConfigFlags,
    ConfigTransmitPriority,
    ConfigCommunication,
    ConfigReadFromBus,
    ConfigWriteFromBus,
    ConfigReadOnInit,
    ConfigTransmitToBus,
    ConfigUpdateOnResponse,
    DatapointType,

    StartParameterByte,
    ParameterByteCount,
    ParameterByte,

    StartDescriptionString,
    DescriptionStringCount,
    DescriptionStringLength,
    DescriptionString,
}

impl Tag {
    /// Display label and filter abbreviation of this tag.
    pub const fn metadata(self) -> (&'static str, &'static str) {
        match self {
            Self::StartByte => ("FT 1.2 start byte", "baos.ft12.startbyte"),
            Self::LengthByte => ("FT 1.2 length byte", "baos.ft12.lengthbyte"),
            Self::ControlByte => ("FT 1.2 control byte", "baos.ft12.controlbyte"),
            Self::MainService => ("BAOS main service", "baos.mainservice"),
            Self::SubService => ("BAOS subservice", "baos.subservice"),
            Self::Checksum => ("FT 1.2 checksum", "baos.ft12.checksum"),
            Self::EndByte => ("FT 1.2 end byte", "baos.ft12.endbyte"),

            Self::ObjectServerResponse => ("Object server response", "baos.error_code"),

            Self::StartServerItemId => ("Start server item ID", "baos.start_server_item_id"),
            Self::ServerItemCount => ("Number of server items", "baos.nr_of_server_items"),
            Self::ServerItemId => ("Server item ID", "baos.server_item_id"),
            Self::ServerItemLength => ("Server item length", "baos.server_item_length"),
            Self::ServerItemData => ("Server item data", "baos.server_item_data"),
            Self::HardwareType => ("Hardware type", "baos.server_item.hardware_type"),
            Self::Version => ("Version number", "baos.server_item.version"),
            Self::VersionMajor => ("Major version number", "baos.server_item.version_major"),
            Self::VersionMinor => ("Minor version number", "baos.server_item.version_minor"),
            Self::KnxManufacturerCode => ("KNX manufacturer code", "baos.server_item.knx_man_code"),
            Self::ApplicationId => ("Application ID", "baos.server_item.app_id"),
            Self::SerialNumber => ("Serial number", "baos.server_item.serial_number"),
            Self::TimeSinceReset => ("Time since reset [ms]", "baos.server_item.time_since_reset"),
            Self::ServerItemStatus => ("Status", "baos.server_item.server_item_status"),
            Self::BufferSize => ("Buffer size [bytes]", "baos.server_item.buffer_size"),
            Self::DescriptionStringLimit => {
                ("Length of description string", "baos.server_item.desc_str_len")
            }
            Self::Baudrate => ("Baudrate", "baos.server_item.baudrate"),
            Self::KnxAddress => ("Individual KNX address", "baos.server_item.knx_address"),
            Self::KnxAreaAddress => ("Area address", "baos.server_item.knx_area_address"),
            Self::KnxLineAddress => ("Line address", "baos.server_item.knx_line_address"),
            Self::KnxDeviceAddress => ("Device address", "baos.server_item.knx_device_address"),

            Self::StartDatapointId => ("Start datapoint ID", "baos.start_dp_id"),
            Self::DatapointCount => ("Number of datapoints", "baos.nr_of_dps"),
            Self::DatapointId => ("Datapoint ID", "baos.dp_id"),
            Self::DatapointCommand => ("Datapoint command", "baos.dp_command"),
            Self::DatapointState => ("Datapoint state", "baos.dp_state"),
            Self::StateValid => ("Valid flag", "baos.dp_state.valid"),
            Self::StateUpdate => ("Update flag", "baos.dp_state.update"),
            Self::StateReadRequest => ("Read request flag", "baos.dp_state.read_req"),
            Self::StateTransmission => ("Transmission flag", "baos.dp_state.trans"),
            Self::DatapointLength => ("Datapoint length", "baos.dp_length"),
            Self::DatapointValue => ("Datapoint value", "baos.dp_value"),
            Self::DatapointFilter => ("Datapoint filter", "baos.dp_filter"),
            Self::DatapointValueType => ("Datapoint value type", "baos.dp_value_type"),
            Self::ConfigFlags => ("Datapoint config flags", "baos.dp_config"),
            Self::ConfigTransmitPriority => ("Transmit priority", "baos.dp_config.trans_prio"),
            Self::ConfigCommunication => ("Datapoint communication", "baos.dp_config.dp_comm"),
            Self::ConfigReadFromBus => ("Read from bus", "baos.dp_config.read_from_bus"),
            Self::ConfigWriteFromBus => ("Write from bus", "baos.dp_config.write_from_bus"),
            Self::ConfigReadOnInit => ("Read on init", "baos.dp_config.read_on_init"),
            Self::ConfigTransmitToBus => ("Transmit to bus", "baos.dp_config.trans_to_bus"),
            Self::ConfigUpdateOnResponse => ("Update on response", "baos.dp_config.update_on_res"),
            Self::DatapointType => ("Datapoint DPT", "baos.dp_dpt"),

            Self::StartParameterByte => ("Start byte index", "baos.start_param_byte"),
            Self::ParameterByteCount => ("Number of bytes", "baos.nr_of_param_bytes"),
            Self::ParameterByte => ("Parameter byte", "baos.param_byte"),

            Self::StartDescriptionString => {
                ("ID of start description string", "baos.start_desc_string")
            }
            Self::DescriptionStringCount => {
                ("Number of description strings", "baos.nr_of_desc_strings")
            }
            Self::DescriptionStringLength => ("Description string length", "baos.desc_string_len"),
            Self::DescriptionString => ("Description string", "baos.desc_string"),
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        self.metadata().0
    }

    /// Dotted filter abbreviation, unique per tag.
    pub const fn abbrev(self) -> &'static str {
        self.metadata().1
    }

    /// Whether this tag carries the (interpreted) data of a server item.
    pub const fn is_server_item_data(self) -> bool {
        matches!(
            self,
            Self::ServerItemData
                | Self::HardwareType
                | Self::Version
                | Self::KnxManufacturerCode
                | Self::ApplicationId
                | Self::SerialNumber
                | Self::TimeSinceReset
                | Self::ServerItemStatus
                | Self::BufferSize
                | Self::DescriptionStringLimit
                | Self::Baudrate
                | Self::KnxAddress
        )
    }
}

/// An interpreted field value.
///
/// Integers are decoded big-endian. Byte strings borrow from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Bool(bool),
    Bytes(&'a [u8]),
    /// A byte string intended as text, not necessarily valid UTF-8.
    Text(&'a [u8]),
}

impl Value<'_> {
    /// Build the narrowest integer value holding big-endian `bytes`, or raw
    /// bytes if there are more than eight.
    pub(crate) fn integer(bytes: &[u8]) -> Value<'_> {
        if bytes.is_empty() || bytes.len() > 8 {
            return Value::Bytes(bytes);
        }

        let x = bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));

        match bytes.len() {
            1 => Value::U8(x as u8),
            2 => Value::U16(x as u16),
            3 | 4 => Value::U32(x as u32),
            _ => Value::U64(x),
        }
    }

    /// The value as an unsigned integer, if it is one.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U8(x) => Some(x.into()),
            Value::U16(x) => Some(x.into()),
            Value::U32(x) => Some(x.into()),
            Value::U64(x) => Some(x),
            Value::Bool(x) => Some(x.into()),
            Value::Bytes(_) | Value::Text(_) => None,
        }
    }

    /// The value as a byte string, if it is one.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match *self {
            Value::Bytes(x) | Value::Text(x) => Some(x),
            _ => None,
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Value::U8(x) => write!(f, "{x}"),
            Value::U16(x) => write!(f, "{x}"),
            Value::U32(x) => write!(f, "{x}"),
            Value::U64(x) => write!(f, "{x}"),
            Value::Bool(x) => write!(f, "{x}"),
            Value::Bytes(x) => {
                for (i, b) in x.iter().enumerate() {
                    if i != 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{b:02x}")?;
                }
                Ok(())
            }
            Value::Text(x) => {
                for chunk in x.utf8_chunks() {
                    f.write_str(chunk.valid())?;
                    for b in chunk.invalid() {
                        write!(f, "\\x{b:02x}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// A decoded field, located in the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    /// Offset of the first byte of the field.
    pub offset: usize,
    /// Number of bytes covered by the field.
    pub length: usize,
    pub tag: Tag,
    pub value: Value<'a>,
}

/// Severity of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    Warning,
    Error,
}

/// An integrity problem found while decoding.
///
/// Diagnostics never stop decoding; fields published before and after a
/// diagnostic remain valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Diagnostic {
    /// No end byte at the offset implied by the length byte.
    #[error("FT 1.2 likely incomplete (no end byte at offset {offset}).")]
    FrameIncomplete { offset: usize },
    /// Calculated and found checksums do not match.
    #[error("Expected checksum: 0x{expected:x} Found checksum: 0x{found:x}")]
    ChecksumMismatch { expected: u8, found: u8 },
    /// The two length bytes of the frame header differ.
    #[error("FT 1.2 length bytes differ ({first} and {second}).")]
    LengthMismatch { first: u8, second: u8 },
}

impl Diagnostic {
    pub const fn severity(&self) -> Severity {
        match self {
            Self::FrameIncomplete { .. } | Self::LengthMismatch { .. } => Severity::Warning,
            Self::ChecksumMismatch { .. } => Severity::Error,
        }
    }

    /// Stable identifier of this kind of diagnostic.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::FrameIncomplete { .. } => "baos.ft12_incomplete",
            Self::ChecksumMismatch { .. } => "baos.checksum_error",
            Self::LengthMismatch { .. } => "baos.length_mismatch",
        }
    }
}

/// Receive decoded fields and diagnostics.
///
/// The default implementation of each method ignores received values.
///
/// See the [`FieldSink`](macro@FieldSink) derive macro for an automatic
/// implementation of this trait.
#[allow(unused_variables)]
pub trait FieldSink {
    /// Add a decoded field.
    fn add_field(&mut self, field: Field<'_>) {}
    /// Add an integrity diagnostic.
    fn add_diagnostic(&mut self, diagnostic: Diagnostic) {}
}

impl FieldSink for () {}

impl<S: FieldSink + ?Sized> FieldSink for &mut S {
    fn add_field(&mut self, field: Field<'_>) {
        (**self).add_field(field)
    }

    fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        (**self).add_diagnostic(diagnostic)
    }
}

/// Convert a [`Value`] into a concrete type, if it is of a compatible shape.
///
/// Integers convert to any unsigned type wide enough to hold them.
pub trait FromValue: Sized {
    fn from_value(value: &Value<'_>) -> Option<Self>;
}

macro_rules! from_value_integer {
    ($($t:ident),*) => {
        $(
            impl FromValue for $t {
                fn from_value(value: &Value<'_>) -> Option<Self> {
                    $t::try_from(value.as_u64()?).ok()
                }
            }
        )*
    };
}

from_value_integer!(u8, u16, u32, u64, usize);

impl FromValue for bool {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        Some(value.as_u64()? != 0)
    }
}

#[cfg(feature = "std")]
impl FromValue for std::vec::Vec<u8> {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        value.as_bytes().map(<[u8]>::to_vec)
    }
}

#[cfg(feature = "std")]
extern crate std;
