//! Record-stream decoders, one per payload shape.
//!
//! Every function takes the buffer and the offset of the BAOS main-service
//! byte (`base`). Offsets below are relative to `base`:
//!
//! ```text
//! +0  main service     (1)
//! +1  sub-service      (1)
//! +2  start id/index   (2)
//! +4  count            (2)
//! +6  records, filter, or object server response
//! ```
//!
//! Records are iterated while the declared count lasts and the buffer holds
//! the fixed-size prefix of the next record. A record whose variable-length
//! data does not fit publishes its prefix and ends the list.

use log::trace;
use zerocopy::{FromBytes, byteorder::big_endian::U16};

use crate::sink::{Field, FieldSink, Tag, Value};

use super::{datapoint, item, payload::Subject};

/// Publish the start and count fields of a payload header.
///
/// Returns the count, if the buffer holds it.
pub fn list_header(r: &[u8], base: usize, subject: Subject, o: &mut impl FieldSink) -> Option<u16> {
    let (start_tag, count_tag) = subject.header_tags();

    if let Some(start) = take::<2>(r, base + 2) {
        add(o, base + 2, 2, start_tag, Value::U16(u16::from_be_bytes(start)));
    }

    let count = take::<2>(r, base + 4).map(u16::from_be_bytes);

    if let Some(count) = count {
        add(o, base + 4, 2, count_tag, Value::U16(count));
    }

    count
}

/// Decode a datapoint value request: a datapoint range and a filter.
pub fn filtered_range(r: &[u8], base: usize, o: &mut impl FieldSink) {
    list_header(r, base, Subject::Datapoint, o);

    if let Some([filter]) = take::<1>(r, base + 6) {
        add(o, base + 6, 1, Tag::DatapointFilter, Value::U8(filter));
    }
}

/// Decode the response to a set request: the range and an object server
/// response.
pub fn acknowledgement(r: &[u8], base: usize, subject: Subject, o: &mut impl FieldSink) {
    list_header(r, base, subject, o);
    object_server_response(r, base + 6, o);
}

/// Decode a list of server items.
pub fn server_items(r: &[u8], base: usize, response: bool, o: &mut impl FieldSink) {
    #[repr(C, packed)]
    #[derive(FromBytes)]
    struct ServerItemPrefix {
        id: U16,
        length: u8,
    }

    list(r, base, Subject::ServerItem, response, o, |r, i, o| {
        let ServerItemPrefix { id, length } = zerocopy::transmute!(take::<3>(r, i)?);
        let id = id.get();

        add(o, i, 2, Tag::ServerItemId, Value::U16(id));
        add(o, i + 2, 1, Tag::ServerItemLength, Value::U8(length));

        let length = length as usize;
        let data = r.get(i + 3..i + 3 + length)?;
        item::emit(id, i + 3, data, o);

        Some(3 + length)
    });
}

/// Decode a list of datapoint values.
///
/// Requests carry a command byte per datapoint, responses and indications a
/// state byte.
pub fn datapoint_values(r: &[u8], base: usize, response: bool, o: &mut impl FieldSink) {
    #[repr(C, packed)]
    #[derive(FromBytes)]
    struct DatapointPrefix {
        id: U16,
        command_or_state: u8,
        length: u8,
    }

    list(r, base, Subject::Datapoint, response, o, |r, i, o| {
        let DatapointPrefix {
            id,
            command_or_state,
            length,
        } = zerocopy::transmute!(take::<4>(r, i)?);
        add(o, i, 2, Tag::DatapointId, Value::U16(id.get()));
        if response {
            datapoint::emit_state(i + 2, command_or_state, o);
        } else {
            add(o, i + 2, 1, Tag::DatapointCommand, Value::U8(command_or_state));
        }
        add(o, i + 3, 1, Tag::DatapointLength, Value::U8(length));

        let length = length as usize;
        let value = r.get(i + 4..i + 4 + length)?;
        add(o, i + 4, length, Tag::DatapointValue, Value::Bytes(value));

        Some(4 + length)
    });
}

/// Decode a list of datapoint descriptions.
pub fn datapoint_descriptors(r: &[u8], base: usize, o: &mut impl FieldSink) {
    #[repr(C, packed)]
    #[derive(FromBytes)]
    struct Descriptor {
        id: U16,
        value_type: u8,
        config_flags: u8,
        dpt: u8,
    }

    list(r, base, Subject::Datapoint, true, o, |r, i, o| {
        let Descriptor {
            id,
            value_type,
            config_flags,
            dpt,
        } = zerocopy::transmute!(take::<5>(r, i)?);

        add(o, i, 2, Tag::DatapointId, Value::U16(id.get()));
        add(o, i + 2, 1, Tag::DatapointValueType, Value::U8(value_type));
        datapoint::emit_config(i + 3, config_flags, o);
        add(o, i + 4, 1, Tag::DatapointType, Value::U8(dpt));

        Some(5)
    });
}

/// Decode a list of description strings.
pub fn description_strings(r: &[u8], base: usize, o: &mut impl FieldSink) {
    list(r, base, Subject::DescriptionString, true, o, |r, i, o| {
        let length = u16::from_be_bytes(take::<2>(r, i)?);
        add(o, i, 2, Tag::DescriptionStringLength, Value::U16(length));

        let length = length as usize;
        let text = r.get(i + 2..i + 2 + length)?;
        add(o, i + 2, length, Tag::DescriptionString, Value::Text(text));

        Some(2 + length)
    });
}

/// Decode a run of parameter bytes.
///
/// A set request with a count of zero flushes the parameters, and carries
/// nothing further.
pub fn parameter_bytes(r: &[u8], base: usize, response: bool, o: &mut impl FieldSink) {
    list(r, base, Subject::ParameterByte, response, o, |r, i, o| {
        let [byte] = take::<1>(r, i)?;
        add(o, i, 1, Tag::ParameterByte, Value::U8(byte));
        Some(1)
    });
}

/// Drive a record list after its header.
///
/// `record` decodes the record at an offset, returning its length, or `None`
/// if the buffer does not hold all of it. In responses a count of zero is
/// followed by an object server response instead of records.
fn list<O: FieldSink>(
    r: &[u8],
    base: usize,
    subject: Subject,
    response: bool,
    o: &mut O,
    mut record: impl FnMut(&[u8], usize, &mut O) -> Option<usize>,
) {
    let Some(count) = list_header(r, base, subject, o) else {
        return;
    };

    let mut i = base + 6;

    if count == 0 {
        if response {
            object_server_response(r, i, o);
        }
        return;
    }

    for n in 0..count {
        let Some(length) = record(r, i, o) else {
            trace!("record {n} of {count} at offset {i} truncated");
            break;
        };

        i += length;
    }
}

fn object_server_response(r: &[u8], at: usize, o: &mut impl FieldSink) {
    if let Some([code]) = take::<1>(r, at) {
        add(o, at, 1, Tag::ObjectServerResponse, Value::U8(code));
    }
}

/// Take an exact number of bytes from an offset in a slice.
fn take<const N: usize>(r: &[u8], i: usize) -> Option<[u8; N]> {
    r.get(i..i.checked_add(N)?)?.try_into().ok()
}

fn add(o: &mut impl FieldSink, offset: usize, length: usize, tag: Tag, value: Value<'_>) {
    o.add_field(Field {
        offset,
        length,
        tag,
        value,
    });
}
