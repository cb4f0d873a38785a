//! Datapoint vocabulary: state and configuration bitfields and the codes
//! appearing in datapoint telegrams.

use tartan_bitfield::bitfield;

use crate::sink::{Field, FieldSink, FromValue, Tag, Value};

bitfield! {
    /// State byte of a datapoint in responses and indications.
    pub struct DatapointState(u8) {
        [4] pub valid,
        [3] pub update,
        [2] pub read_request,
        [0..2] pub transmission: u8,
    }
}

impl DatapointState {
    pub const fn of(byte: u8) -> Self {
        Self(byte)
    }

    pub fn transmission_state(&self) -> Option<TransmissionState> {
        TransmissionState::from_code(self.transmission())
    }
}

impl FromValue for DatapointState {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        u8::from_value(value).map(Self::of)
    }
}

bitfield! {
    /// Configuration flags of a datapoint description.
    pub struct ConfigFlags(u8) {
        [0..2] pub transmit_priority: u8,
        [2] pub communication,
        [3] pub read_from_bus,
        [4] pub write_from_bus,
        [5] pub read_on_init,
        [6] pub transmit_to_bus,
        [7] pub update_on_response,
    }
}

impl ConfigFlags {
    pub const fn of(byte: u8) -> Self {
        Self(byte)
    }

    pub fn priority(&self) -> Option<Priority> {
        Priority::from_code(self.transmit_priority())
    }
}

impl FromValue for ConfigFlags {
    fn from_value(value: &Value<'_>) -> Option<Self> {
        u8::from_value(value).map(Self::of)
    }
}

wire_enum! {
    /// Transmission state of a datapoint.
    pub enum TransmissionState: u8 {
        IdleOk = 0 => "Idle/OK",
        IdleError = 1 => "Idle/error",
        InProgress = 2 => "Transmission in progress",
        Request = 3 => "Transmission request",
    }
}

wire_enum! {
    /// Bus priority used when transmitting a datapoint.
    pub enum Priority: u8 {
        System = 0 => "System priority",
        High = 1 => "High priority",
        Alarm = 2 => "Alarm priority",
        Low = 3 => "Low priority",
    }
}

wire_enum! {
    /// Command applied to a datapoint by a set request.
    pub enum Command: u8 {
        NoCommand = 0 => "No command",
        SetValue = 1 => "Set new value",
        SendValue = 2 => "Send value on bus",
        SetAndSendValue = 3 => "Set new value and send on bus",
        ReadValue = 4 => "Read new value via bus",
        ClearTransmissionState = 5 => "Clear datapoint transmission state",
    }
}

wire_enum! {
    /// Selection of datapoints returned by a value request.
    pub enum Filter: u8 {
        All = 0 => "Get all datapoint values",
        Valid = 1 => "Get only valid datapoint values",
        Updated = 2 => "Get only updated datapoint values",
    }
}

wire_enum! {
    /// Size class of a datapoint value.
    pub enum ValueType: u8 {
        Bits1 = 0 => "1 bit",
        Bits2 = 1 => "2 bits",
        Bits3 = 2 => "3 bits",
        Bits4 = 3 => "4 bits",
        Bits5 = 4 => "5 bits",
        Bits6 = 5 => "6 bits",
        Bits7 = 6 => "7 bits",
        Bytes1 = 7 => "1 byte",
        Bytes2 = 8 => "2 bytes",
        Bytes3 = 9 => "3 bytes",
        Bytes4 = 10 => "4 bytes",
        Bytes6 = 11 => "6 bytes",
        Bytes8 = 12 => "8 bytes",
        Bytes10 = 13 => "10 bytes",
        Bytes14 = 14 => "14 bytes",
    }
}

wire_enum! {
    /// Result code of the object server.
    pub enum ObjectServerResponse: u8 {
        NoError = 0 => "No error",
        InternalError = 1 => "Internal error",
        NoElementFound = 2 => "No element found",
        BufferTooSmall = 3 => "Buffer is too small",
        NotWriteable = 4 => "Item is not writeable",
        ServiceNotSupported = 5 => "Service is not supported",
        BadServiceParameter = 6 => "Bad service parameter",
        BadId = 7 => "Bad ID",
        BadCommand = 8 => "Bad command/value",
        BadLength = 9 => "Bad length",
        MessageInconsistent = 10 => "Message inconsistent",
        Busy = 11 => "Object server is busy",
    }
}

/// Publish a state byte and its flags.
pub(super) fn emit_state(at: usize, byte: u8, o: &mut impl FieldSink) {
    let state = DatapointState::of(byte);

    let fields = [
        (Tag::DatapointState, Value::U8(byte)),
        (Tag::StateValid, Value::Bool(state.valid())),
        (Tag::StateUpdate, Value::Bool(state.update())),
        (Tag::StateReadRequest, Value::Bool(state.read_request())),
        (Tag::StateTransmission, Value::U8(state.transmission())),
    ];

    emit_byte(at, fields, o);
}

/// Publish a configuration byte and its flags.
pub(super) fn emit_config(at: usize, byte: u8, o: &mut impl FieldSink) {
    let flags = ConfigFlags::of(byte);

    let fields = [
        (Tag::ConfigFlags, Value::U8(byte)),
        (Tag::ConfigTransmitPriority, Value::U8(flags.transmit_priority())),
        (Tag::ConfigCommunication, Value::Bool(flags.communication())),
        (Tag::ConfigReadFromBus, Value::Bool(flags.read_from_bus())),
        (Tag::ConfigWriteFromBus, Value::Bool(flags.write_from_bus())),
        (Tag::ConfigReadOnInit, Value::Bool(flags.read_on_init())),
        (Tag::ConfigTransmitToBus, Value::Bool(flags.transmit_to_bus())),
        (Tag::ConfigUpdateOnResponse, Value::Bool(flags.update_on_response())),
    ];

    emit_byte(at, fields, o);
}

fn emit_byte<const N: usize>(
    at: usize,
    fields: [(Tag, Value<'static>); N],
    o: &mut impl FieldSink,
) {
    for (tag, value) in fields {
        o.add_field(Field {
            offset: at,
            length: 1,
            tag,
            value,
        });
    }
}
