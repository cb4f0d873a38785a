#![cfg(feature = "std")]

use std::path::Path;

use baos::{
    avec::{decode_slice, slice::Error},
    sans::{
        Decoder,
        check::checksum,
        datapoint::{ConfigFlags, Priority},
        payload::{Kind, Subject, SubService},
        scan::locate,
    },
    sink::{Diagnostic, Field, FieldSink, Tag},
};
use either::Either::{Left, Right};

fn read_hex(path: impl AsRef<Path>) -> Vec<u8> {
    std::fs::read_to_string(path)
        .unwrap()
        .split_whitespace()
        .map(|b| u8::from_str_radix(b, 16).unwrap())
        .collect()
}

fn fixtures() -> Vec<Vec<u8>> {
    let mut paths: Vec<_> = std::fs::read_dir("fixtures")
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|e| e == "hex"))
        .collect();
    paths.sort();

    assert!(!paths.is_empty());
    paths.iter().map(read_hex).collect()
}

/// Records every published field with its value rendered as text.
#[derive(Debug, Default)]
struct Collector {
    fields: Vec<(usize, usize, Tag, String)>,
    diagnostics: Vec<Diagnostic>,
}

impl FieldSink for Collector {
    fn add_field(&mut self, field: Field<'_>) {
        let value = field.value.to_string();
        self.fields.push((field.offset, field.length, field.tag, value));
    }

    fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}

#[test]
fn locate_short_buffers() {
    let full = [0x68, 0x0C, 0x0C, 0x68, 0xF3, 0xF0];

    for n in 0..full.len() {
        assert_eq!(locate(&full[..n]), None);
    }
    assert_eq!(locate(&full), Some(0));

    for n in 0..10 {
        let r = vec![0x68; n];
        assert_eq!(decode_slice(&r, &mut ()), Err(Error::TooShort(n)));
    }
}

#[test]
fn locate_first_match() {
    // Frame patterns at offsets 0 and 3 overlap in the repeated start byte.
    let r = [
        0x68, 0x0C, 0x0C, 0x68, 0xF3, 0xF0, 0x68, 0xF3, 0xF0, 0x00, 0x00, 0x00,
    ];
    assert_eq!(locate(&r), Some(0));

    let mut r = r;
    r[4] = 0x00;
    assert_eq!(locate(&r), Some(3));
}

#[test]
fn locate_window() {
    let frame = [0x68, 0x0C, 0x0C, 0x68, 0xD3, 0xF0, 0x85, 0x00, 0x00, 0x00];

    for junk in 0..8 {
        let mut r = vec![0x00; junk];
        r.extend(frame);

        let expected = (junk < 5).then_some(junk as u8);
        assert_eq!(locate(&r), expected, "junk {junk}");
    }
}

#[test]
fn locate_invalid_control_byte() {
    let r = [0x68, 0x0C, 0x0C, 0x68, 0x13, 0xF0, 0x85, 0x00, 0x00, 0x00];
    assert_eq!(locate(&r), None);
}

#[test]
fn checksum_round_trip() {
    let mut seed = 0x2545_F491_u32;
    let mut next = || {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        seed as u8
    };

    for len in 2..64 {
        let mut payload = vec![0xF0, 0x87, 0x00, 0x01];
        payload.extend((4..len).map(|_| next()));

        let length = payload.len() as u8 + 1;
        let mut r = vec![0x68, length, length, 0x68, 0x73];
        r.extend_from_slice(&payload);
        let sum = checksum(&r, 4, r.len());
        r.extend([sum, 0x16]);

        let mut collector = Collector::default();
        let summary = decode_slice(&r, &mut collector).unwrap();

        assert_eq!(summary.checksum_valid, Some(true));
        assert!(summary.status.complete);
        assert!(collector.diagnostics.is_empty(), "{:?}", collector.diagnostics);
    }
}

#[test]
fn checksum_clamps_range() {
    let r = [0x01, 0x02, 0xFF];
    assert_eq!(checksum(&r, 0, 3), 0x02);
    assert_eq!(checksum(&r, 1, 10), 0x01);
    assert_eq!(checksum(&r, 5, 10), 0x00);
}

#[test]
fn truncation_safety() {
    for data in fixtures() {
        let mut full = Collector::default();
        decode_slice(&data, &mut full).unwrap();

        for n in 0..data.len() {
            let mut collector = Collector::default();

            match decode_slice(&data[..n], &mut collector) {
                Ok(summary) => assert!(!summary.status.complete),
                Err(Error::TooShort(_) | Error::NotFound) => continue,
            }

            for field in &collector.fields {
                assert!(field.0 + field.1 <= n, "{field:?} beyond {n}");
                assert!(full.fields.contains(field), "{field:?} not in full decode");
            }

            assert!(
                collector
                    .diagnostics
                    .contains(&Diagnostic::FrameIncomplete {
                        offset: data.len() - 1
                    })
            );
        }
    }
}

#[test]
fn overlong_length_byte() {
    let r = [0x68, 0xFF, 0xFF, 0x68, 0xF3, 0xF0, 0x81, 0x00, 0x01, 0x00, 0x05, 0x00];

    let mut collector = Collector::default();
    let summary = decode_slice(&r, &mut collector).unwrap();

    assert!(!summary.status.complete);
    assert_eq!(summary.checksum_valid, None);
    assert_eq!(
        collector.diagnostics,
        [Diagnostic::FrameIncomplete { offset: 4 + 255 + 1 }]
    );
}

#[test]
fn sub_service_table() {
    use Kind::*;
    use Subject::*;

    let table = [
        (0x01, Range(ServerItem), ServerItem),
        (0x02, ServerItems { response: false }, ServerItem),
        (0x03, Range(Datapoint), Datapoint),
        (0x04, Range(DescriptionString), DescriptionString),
        (0x05, FilteredRange, Datapoint),
        (0x06, DatapointValues { response: false }, Datapoint),
        (0x07, Range(ParameterByte), ParameterByte),
        (0x08, ParameterBytes { response: false }, ParameterByte),
        (0x81, ServerItems { response: true }, ServerItem),
        (0x82, Acknowledgement(ServerItem), ServerItem),
        (0x83, DatapointDescriptors, Datapoint),
        (0x84, DescriptionStrings, DescriptionString),
        (0x85, DatapointValues { response: true }, Datapoint),
        (0x86, Acknowledgement(Datapoint), Datapoint),
        (0x87, ParameterBytes { response: true }, ParameterByte),
        (0x88, Acknowledgement(ParameterByte), ParameterByte),
        (0xC1, DatapointValues { response: true }, Datapoint),
        (0xC2, ServerItems { response: true }, ServerItem),
    ];

    for (code, kind, subject) in table {
        let sub_service = SubService::from_code(code).unwrap();
        assert_eq!(sub_service.code(), code);
        assert_eq!(sub_service.kind(), kind, "{code:#04x}");
        assert_eq!(sub_service.is_request(), code & 0x80 == 0);
        assert_eq!(sub_service.is_indication(), matches!(code, 0xC1 | 0xC2));

        let payload = [0xF0, code, 0x00, 0x01, 0x00, 0x00];
        let mut r = vec![0x68, 0x07, 0x07, 0x68, 0x73];
        r.extend(payload);
        let sum = checksum(&r, 4, r.len());
        r.extend([sum, 0x16]);

        let mut collector = Collector::default();
        decode_slice(&r, &mut collector).unwrap();

        let (start_tag, count_tag) = subject.header_tags();
        assert!(
            collector.fields.contains(&(7, 2, start_tag, "1".to_string())),
            "{code:#04x}: {:?}",
            collector.fields
        );
        assert!(
            collector.fields.contains(&(9, 2, count_tag, "0".to_string())),
            "{code:#04x}: {:?}",
            collector.fields
        );
    }

    assert_eq!(SubService::from_code(0x00), None);
    assert_eq!(SubService::from_code(0xC3), None);
}

#[test]
fn state_tokens() {
    let mut r = vec![0x00, 0x00];
    r.extend([
        0x68, 0x0C, 0x0C, 0x68, 0xF3, 0xF0, 0x85, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01, 0x08, 0x01,
        0x09, 0x7D, 0x16,
    ]);
    let mut collector = Collector::default();

    let found = Decoder::advance(&r).unwrap();
    assert_eq!(found.start_offset(), 2);
    let length = found.header().length;
    assert_eq!(length, 0x0C);
    assert_eq!(found.header().payload_len(), 11);

    let header = found.advance(&r, &mut collector);
    assert_eq!(header.sub_service(), Some(0x85));

    let Left(payload) = header.advance() else {
        panic!("expected a payload to decode");
    };
    assert_eq!(payload.sub_service(), SubService::GetDatapointValueRes);

    let decoded = payload.advance(&r, &mut collector);
    assert_eq!(decoded.trailer_offset(), 18);
    assert_eq!(r[decoded.trailer_offset()], 0x7D);

    let summary = decoded.advance(&r, &mut collector).advance();
    assert_eq!(summary.start_offset, 2);
    assert_eq!(summary.checksum_valid, Some(true));
    assert!(collector.diagnostics.is_empty(), "{:?}", collector.diagnostics);
}

#[test]
fn state_tokens_unknown_sub_service() {
    let r = [0x68, 0x04, 0x04, 0x68, 0xF3, 0xF0, 0x99, 0x00, 0x7C, 0x16];
    let mut collector = Collector::default();

    let header = Decoder::advance(&r).unwrap().advance(&r, &mut collector);
    let Right(decoded) = header.advance() else {
        panic!("expected no payload to decode");
    };
    assert_eq!(decoded.trailer_offset(), 8);
}

#[test]
fn config_flags_priority() {
    assert_eq!(ConfigFlags::of(0x57).priority(), Some(Priority::Low));
    assert_eq!(ConfigFlags::of(0x54).priority(), Some(Priority::System));
    assert_eq!(ConfigFlags::of(0x02).priority(), Some(Priority::Alarm));
}
