//! Property tests for layout arithmetic, field round-trips, and record
//! framing.

use std::io::Cursor;

use proptest::prelude::*;
use rstruct_codec::{CODEC_TABLE, CodecError, Format, MAX_FORMAT_SIZE, Value};
use rstruct_schema::{FieldSpec, Schema};
use rstruct_view::{RecordConfig, SizedRecord, Structure};

fn marker() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["", "<", ">", "!", "@"])
}

/// A single-scalar field format, e.g. `">H"` or `"7s"`.
fn field_format() -> impl Strategy<Value = String> {
    let codes: Vec<char> = CODEC_TABLE.iter().map(|&(code, _)| code).collect();
    prop_oneof![
        (marker(), prop::sample::select(codes)).prop_map(|(m, c)| format!("{m}{c}")),
        (marker(), 0usize..24).prop_map(|(m, n)| format!("{m}{n}s")),
    ]
}

fn finite_f32() -> impl Strategy<Value = f32> {
    any::<f32>().prop_filter("NaN never compares equal", |v| !v.is_nan())
}

fn finite_f64() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("NaN never compares equal", |v| !v.is_nan())
}

/// A base format code paired with a value of that kind.
fn typed_value() -> impl Strategy<Value = (String, Value)> {
    prop_oneof![
        any::<i8>().prop_map(|v| ("b".to_string(), Value::I8(v))),
        any::<u8>().prop_map(|v| ("B".to_string(), Value::U8(v))),
        any::<i16>().prop_map(|v| ("h".to_string(), Value::I16(v))),
        any::<u16>().prop_map(|v| ("H".to_string(), Value::U16(v))),
        any::<i32>().prop_map(|v| ("i".to_string(), Value::I32(v))),
        any::<u32>().prop_map(|v| ("L".to_string(), Value::U32(v))),
        any::<i64>().prop_map(|v| ("q".to_string(), Value::I64(v))),
        any::<u64>().prop_map(|v| ("Q".to_string(), Value::U64(v))),
        finite_f32().prop_map(|v| ("f".to_string(), Value::F32(v))),
        finite_f64().prop_map(|v| ("d".to_string(), Value::F64(v))),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(|b| (format!("{}s", b.len()), Value::Bytes(b))),
    ]
}

fn size_format() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["<i", ">I", "<H", "!q", "<Q", "@i", ">l"])
}

proptest! {
    #[test]
    fn layout_is_contiguous(formats in prop::collection::vec(field_format(), 0..16)) {
        let fields: Vec<_> = formats
            .iter()
            .enumerate()
            .map(|(i, f)| FieldSpec::scalar(f.as_str(), format!("f{i}")))
            .collect();
        let schema = Schema::compile("Random", &fields).unwrap();

        let mut expected_offset = 0;
        for entry in schema.layout() {
            prop_assert_eq!(entry.offset, expected_offset);
            expected_offset += entry.size;
        }
        prop_assert_eq!(schema.total_size(), expected_offset);
    }

    #[test]
    fn set_then_get_returns_value(
        lead in 0usize..8,
        order in marker(),
        (code, value) in typed_value(),
    ) {
        let schema = Schema::compile(
            "RoundTrip",
            &[
                FieldSpec::scalar(format!("{lead}s"), "lead"),
                FieldSpec::scalar(format!("{order}{code}"), "value"),
                FieldSpec::scalar("B", "trail"),
            ],
        )
        .unwrap();

        let mut buf = vec![0xA5u8; schema.total_size()];
        let s = Structure::writable(&schema, &mut buf).unwrap();
        s.set("value", value.clone()).unwrap();
        prop_assert_eq!(s.get_value("value").unwrap(), value);
        prop_assert_eq!(s.get_value("trail").unwrap(), Value::U8(0xA5));
    }

    #[test]
    fn framing_round_trips(
        body in prop::collection::vec(any::<u8>(), 0..300),
        size_format in size_format(),
        includes in any::<bool>(),
    ) {
        let config = RecordConfig::new(size_format, includes);
        let record = SizedRecord::new(body);

        let mut framed = Vec::new();
        record.write_to(&mut framed, &config).unwrap();
        let back = SizedRecord::from_stream_with(&mut Cursor::new(framed), &config).unwrap();
        prop_assert_eq!(back, record);
    }

    #[test]
    fn repeat_sizes_are_checked(
        count in any::<usize>(),
        (code, kind) in prop::sample::select(CODEC_TABLE.to_vec()),
        tail in 0usize..16,
    ) {
        let src = format!("<{count}{code}{tail}x");
        let expected = count
            .checked_mul(kind.size())
            .and_then(|n| n.checked_add(tail))
            .filter(|&n| n <= MAX_FORMAT_SIZE);

        match (Format::parse(&src), expected) {
            (Ok(format), Some(size)) => {
                prop_assert_eq!(format.size(), size);
                prop_assert_eq!(format.value_count(), count);
                prop_assert_eq!(format.items().len(), 2);
            }
            (Err(CodecError::FormatTooLarge { .. }), None) => {}
            (result, expected) => prop_assert!(false, "{src}: {result:?} vs {expected:?}"),
        }
    }

    #[test]
    fn partial_strides_are_dropped(
        body in prop::collection::vec(any::<u8>(), 0..200),
        stride in 1usize..12,
    ) {
        let record = SizedRecord::new(body.clone());
        let tuples: Vec<_> = record
            .iter_tuples(&format!("{stride}s"))
            .unwrap()
            .map(Result::unwrap)
            .collect();

        prop_assert_eq!(tuples.len(), body.len() / stride);
        for (i, tuple) in tuples.iter().enumerate() {
            let chunk = &body[i * stride..(i + 1) * stride];
            prop_assert_eq!(tuple.as_slice(), &[Value::Bytes(chunk.to_vec())]);
        }
    }
}
