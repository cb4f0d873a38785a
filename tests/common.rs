#![cfg(feature = "std")]

use std::path::Path;

use baos::sink::{Diagnostic, Field, FieldSink};
use csv::ReaderBuilder;

#[test]
fn decode_slice_datapoint_value_response() {
    validate("fixtures/datapoint-value-res.hex");
}

#[test]
fn decode_slice_datapoint_value_indication() {
    validate("fixtures/datapoint-value-ind.hex");
}

#[test]
fn decode_slice_datapoint_description_response() {
    validate("fixtures/datapoint-description-res.hex");
}

#[test]
fn decode_slice_server_item_response() {
    validate("fixtures/server-item-res.hex");
}

#[test]
fn decode_slice_description_string_response() {
    validate("fixtures/description-string-res.hex");
}

#[test]
fn decode_slice_parameter_byte_response() {
    validate("fixtures/parameter-byte-res.hex");
}

fn validate(path: &str) {
    let data = read_hex(path);
    let mut validator = Validator::new(path);
    baos::avec::decode_slice(&data, &mut validator).unwrap();
    validator.finish();
}

fn read_hex(path: impl AsRef<Path>) -> Vec<u8> {
    std::fs::read_to_string(path)
        .unwrap()
        .split_whitespace()
        .map(|b| u8::from_str_radix(b, 16).unwrap())
        .collect()
}

/// Compares every published field and diagnostic against the rows of a CSV
/// file next to the fixture.
struct Validator(Vec<Vec<String>>);

impl Validator {
    fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().with_extension("csv");

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .unwrap();

        let mut expected: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect();
        expected.reverse();

        Self(expected)
    }

    fn next_row(&mut self) -> Vec<String> {
        self.0.pop().expect("more values published than expected")
    }

    fn finish(self) {
        assert!(self.0.is_empty(), "values not published: {:?}", self.0);
    }
}

impl FieldSink for Validator {
    fn add_field(&mut self, field: Field<'_>) {
        let row = self.next_row();
        let actual = [
            field.offset.to_string(),
            field.length.to_string(),
            field.tag.abbrev().to_string(),
            field.value.to_string(),
        ];
        assert_eq!(row, actual);
    }

    fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        let row = self.next_row();
        assert_eq!(row, ["diagnostic", diagnostic.code()]);
    }
}
