#![allow(dead_code, unused)]
#![cfg(all(feature = "derive", feature = "std"))]

use std::path::Path;

use baos::{
    sans::{
        datapoint::{ConfigFlags, DatapointState, ValueType},
        item::{KnxAddress, Version},
        payload::SubService,
    },
    sink::{Diagnostic, FieldSink, Severity},
};
use tinyvec::ArrayVec;

fn read_hex(path: impl AsRef<Path>) -> Vec<u8> {
    std::fs::read_to_string(path)
        .unwrap()
        .split_whitespace()
        .map(|b| u8::from_str_radix(b, 16).unwrap())
        .collect()
}

#[derive(Debug, Default, FieldSink)]
struct DatapointValues {
    #[field(SubService)]
    sub_service: Option<SubService>,
    #[field(DatapointCount)]
    count: Option<u16>,
    #[field(DatapointId)]
    ids: Vec<u16>,
    #[field(DatapointState, |s, b: u8| s.push(DatapointState::of(b).valid()))]
    valid: Vec<bool>,
    #[field(DatapointValue)]
    values: Vec<Vec<u8>>,
    #[diagnostic]
    diagnostics: Vec<Diagnostic>,
}

#[test]
fn decode_slice_datapoint_value_response() {
    let data = read_hex("fixtures/datapoint-value-res.hex");
    let mut values = DatapointValues::default();
    let summary = baos::avec::decode_slice(&data, &mut values).unwrap();

    assert_eq!(summary.checksum_valid, Some(true));
    assert_eq!(values.sub_service, Some(SubService::GetDatapointValueRes));
    assert_eq!(values.count, Some(1));
    assert_eq!(values.ids, [1]);
    assert_eq!(values.valid, [false]);
    assert_eq!(values.values, [vec![0x09]]);
    assert!(values.diagnostics.is_empty());
}

#[test]
fn decode_slice_datapoint_value_indication() {
    let data = read_hex("fixtures/datapoint-value-ind.hex");
    let mut values = DatapointValues::default();
    let summary = baos::avec::decode_slice(&data, &mut values).unwrap();

    assert_eq!(summary.checksum_valid, Some(false));
    assert_eq!(values.sub_service, Some(SubService::DatapointValueInd));
    assert_eq!(values.ids, [3]);
    assert_eq!(values.valid, [true]);
    assert_eq!(
        values.diagnostics,
        [Diagnostic::ChecksumMismatch {
            expected: 0xa0,
            found: 0xa1
        }]
    );
    assert_eq!(values.diagnostics[0].severity(), Severity::Error);
}

#[derive(Debug, Default, FieldSink)]
struct Parameters {
    #[field(StartParameterByte)]
    start: Option<u16>,
    #[field(ParameterByte, |v, b: u8| v.push(b))]
    bytes: ArrayVec<[u8; 16]>,
}

#[test]
fn decode_slice_parameter_byte_response() {
    let data = read_hex("fixtures/parameter-byte-res.hex");
    let mut parameters = Parameters::default();
    baos::avec::decode_slice(&data, &mut parameters).unwrap();

    assert_eq!(parameters.start, Some(1));
    assert_eq!(parameters.bytes.as_slice(), [0x0a, 0x0b, 0x0c, 0x0d]);
}

#[derive(Default, FieldSink)]
struct Device {
    #[field(HardwareType)]
    hardware_type: Option<u64>,
    #[field(Version)]
    firmware: Option<Version>,
    #[field(Baudrate)]
    baudrate: Option<baos::sans::item::Baudrate>,
    #[field(KnxAddress)]
    address: Option<KnxAddress>,
    #[field(ServerItemId)]
    ids: Vec<u16>,
}

#[test]
fn decode_slice_server_item_response() {
    let data = read_hex("fixtures/server-item-res.hex");
    let mut device = Device::default();
    let summary = baos::avec::decode_slice(&data, &mut device).unwrap();

    assert_eq!(summary.start_offset, 2);
    assert_eq!(device.hardware_type, Some(0x0000_c508_0003));
    assert_eq!(device.ids, [1, 3, 13, 20]);
    assert_eq!(device.baudrate, Some(baos::sans::item::Baudrate::Baud115200));

    let firmware = device.firmware.unwrap();
    assert_eq!((firmware.major(), firmware.minor()), (2, 1));

    let address = device.address.unwrap();
    assert_eq!((address.area(), address.line(), address.device()), (1, 1, 5));
}

#[derive(Default, FieldSink)]
struct Descriptors {
    #[field(DatapointValueType, |v, x: u8| v.extend(ValueType::from_code(x)))]
    value_types: Vec<ValueType>,
    #[field(ConfigFlags)]
    config: Vec<ConfigFlags>,
    #[field(DatapointType)]
    dpts: Vec<u8>,
}

#[test]
fn decode_slice_datapoint_description_response() {
    let data = read_hex("fixtures/datapoint-description-res.hex");
    let mut descriptors = Descriptors::default();
    baos::avec::decode_slice(&data, &mut descriptors).unwrap();

    assert_eq!(descriptors.value_types, [ValueType::Bits1, ValueType::Bytes1]);
    assert_eq!(descriptors.dpts, [1, 5]);
    assert!(descriptors.config.iter().all(|c| c.transmit_to_bus()));
    assert!(descriptors.config[0].communication());
    assert!(!descriptors.config[1].communication());
}

#[derive(Debug, Default, FieldSink)]
struct Text {
    #[field(DescriptionString)]
    text: Option<Vec<u8>>,
    #[diagnostic]
    last_diagnostic: Option<Diagnostic>,
}

#[test]
fn decode_slice_description_string_response() {
    let data = read_hex("fixtures/description-string-res.hex");
    let mut text = Text::default();
    baos::avec::decode_slice(&data, &mut text).unwrap();

    assert_eq!(text.text.as_deref(), Some(&b"Light"[..]));
    assert_eq!(text.last_diagnostic, None);
}

#[test]
fn decode_slice_truncated_description_string() {
    let data = read_hex("fixtures/description-string-res.hex");
    let mut text = Text::default();
    baos::avec::decode_slice(&data[..15], &mut text).unwrap();

    assert_eq!(text.text, None);
    assert_eq!(
        text.last_diagnostic,
        Some(Diagnostic::FrameIncomplete { offset: 19 })
    );
}
