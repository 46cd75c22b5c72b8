use std::cell::OnceCell;

use rstruct_codec::{CodecError, Value};
use rstruct_schema::{Decode, LayoutEntry};

use crate::bytes::{ByteView, WritableView};
use crate::error::ViewError;
use crate::structure::Structure;

/// Fail with [`ViewError::BufferTooShort`] unless `entry` fits in `len` bytes.
fn check_bounds(len: usize, entry: &LayoutEntry) -> Result<(), ViewError> {
    if len < entry.end() {
        return Err(ViewError::BufferTooShort {
            needed: entry.end(),
            actual: len,
        });
    }
    Ok(())
}

fn describe(decode: &Decode) -> String {
    match decode {
        Decode::Scalar { kind, .. } => kind.to_string(),
        Decode::Tuple(format) => format!("tuple {format}"),
        Decode::Nested(schema) => format!("nested {}", schema.name()),
    }
}

/// Map an encoding failure onto the field it was meant for.
fn encode_error(entry: &LayoutEntry, e: CodecError) -> ViewError {
    match e {
        CodecError::TypeMismatch { expected, found } => ViewError::TypeMismatch {
            field: entry.name.clone(),
            expected: expected.to_string(),
            found: found.to_string(),
        },
        CodecError::BytesLength { expected, found } => ViewError::TypeMismatch {
            field: entry.name.clone(),
            expected: format!("bytes[{expected}]"),
            found: format!("bytes[{found}]"),
        },
        CodecError::ValueCount { expected, found } => ViewError::TypeMismatch {
            field: entry.name.clone(),
            expected: format!("{expected} values"),
            found: format!("{found} values"),
        },
        other => ViewError::Codec(other),
    }
}

/// Decode the scalar at `entry.offset`.
///
/// Reads exactly `entry.size` bytes and has no side effects.
///
/// # Errors
///
/// - [`ViewError::TypeMismatch`] if `entry` is not a single scalar.
/// - [`ViewError::BufferTooShort`] if `bytes` ends before the field does.
pub fn read_scalar<'a, B: ByteView<'a>>(bytes: B, entry: &LayoutEntry) -> Result<Value, ViewError> {
    let Decode::Scalar { kind, order } = entry.decode else {
        return Err(ViewError::TypeMismatch {
            field: entry.name.clone(),
            expected: "scalar".to_string(),
            found: describe(&entry.decode),
        });
    };
    check_bounds(bytes.len(), entry)?;

    tracing::trace!(field = %entry.name, offset = entry.offset, %kind, "read scalar");
    let value = bytes.with_bytes(entry.range(), |raw| kind.decode(order, raw))?;
    Ok(value)
}

/// Encode `value` in place at `entry.offset`.
///
/// The bytes are encoded into scratch space first, so a rejected value
/// leaves the buffer untouched.
///
/// # Errors
///
/// - [`ViewError::TypeMismatch`] if `entry` is not a single scalar or
///   `value` is not of the declared kind (including a byte array of the
///   wrong length).
/// - [`ViewError::BufferTooShort`] if `bytes` ends before the field does.
pub fn write_scalar<'a, B: WritableView<'a>>(
    bytes: B,
    entry: &LayoutEntry,
    value: &Value,
) -> Result<(), ViewError> {
    let Decode::Scalar { kind, order } = entry.decode else {
        return Err(ViewError::TypeMismatch {
            field: entry.name.clone(),
            expected: describe(&entry.decode),
            found: value.kind().to_string(),
        });
    };
    check_bounds(bytes.len(), entry)?;

    let mut scratch = vec![0u8; entry.size];
    kind.encode(order, value, &mut scratch).map_err(|e| encode_error(entry, e))?;

    tracing::trace!(field = %entry.name, offset = entry.offset, %kind, "write scalar");
    bytes.copy_from(entry.offset, &scratch);
    Ok(())
}

/// Decode every value of a tuple field, in format order.
///
/// # Errors
///
/// - [`ViewError::TypeMismatch`] if `entry` is not a tuple field.
/// - [`ViewError::BufferTooShort`] if `bytes` ends before the field does.
pub fn read_tuple<'a, B: ByteView<'a>>(
    bytes: B,
    entry: &LayoutEntry,
) -> Result<Vec<Value>, ViewError> {
    let Decode::Tuple(format) = &entry.decode else {
        return Err(ViewError::TypeMismatch {
            field: entry.name.clone(),
            expected: "tuple".to_string(),
            found: describe(&entry.decode),
        });
    };
    check_bounds(bytes.len(), entry)?;

    tracing::trace!(field = %entry.name, offset = entry.offset, %format, "read tuple");
    let values = bytes.with_bytes(entry.range(), |raw| format.unpack(raw))?;
    Ok(values)
}

/// Encode all of `values` into a tuple field in place, zeroing its pad
/// bytes. Like [`write_scalar`], nothing is written unless every value
/// encodes.
///
/// # Errors
///
/// - [`ViewError::TypeMismatch`] if `entry` is not a tuple field, the
///   number of values differs from the format, or a value has the wrong
///   kind.
/// - [`ViewError::BufferTooShort`] if `bytes` ends before the field does.
pub fn write_tuple<'a, B: WritableView<'a>>(
    bytes: B,
    entry: &LayoutEntry,
    values: &[Value],
) -> Result<(), ViewError> {
    let Decode::Tuple(format) = &entry.decode else {
        return Err(ViewError::TypeMismatch {
            field: entry.name.clone(),
            expected: describe(&entry.decode),
            found: format!("{} values", values.len()),
        });
    };
    check_bounds(bytes.len(), entry)?;

    let mut scratch = vec![0u8; entry.size];
    format
        .pack_into(values, &mut scratch)
        .map_err(|e| encode_error(entry, e))?;

    tracing::trace!(field = %entry.name, offset = entry.offset, %format, "write tuple");
    bytes.copy_from(entry.offset, &scratch);
    Ok(())
}

/// Return the child structure for a nested field, building it on first use.
///
/// The child is a view over `bytes[offset..offset + size]` that shares
/// the parent's storage. It is stored in `slot`, so every later call on
/// the same parent returns the same child. The child caches offsets
/// only, never decoded values, so writes to the shared bytes are always
/// visible through it.
///
/// # Errors
///
/// - [`ViewError::TypeMismatch`] if `entry` is a scalar field.
/// - [`ViewError::BufferTooShort`] if `bytes` ends before the field does.
pub fn read_nested<'s, 'a, B: ByteView<'a>>(
    bytes: B,
    entry: &'a LayoutEntry,
    slot: &'s OnceCell<Structure<'a, B>>,
) -> Result<&'s Structure<'a, B>, ViewError> {
    if let Some(child) = slot.get() {
        return Ok(child);
    }

    let Decode::Nested(schema) = &entry.decode else {
        return Err(ViewError::TypeMismatch {
            field: entry.name.clone(),
            expected: "nested structure".to_string(),
            found: describe(&entry.decode),
        });
    };
    check_bounds(bytes.len(), entry)?;

    tracing::trace!(field = %entry.name, schema = schema.name(), "materialize nested");
    let child = Structure::new(schema, bytes.slice(entry.range()))?;
    Ok(slot.get_or_init(|| child))
}

#[cfg(test)]
mod tests {
    use rstruct_codec::{ByteOrder, Format, ScalarKind};
    use rstruct_schema::{FieldSpec, Schema};

    use super::*;
    use crate::bytes::cells;

    fn entry(kind: ScalarKind, order: ByteOrder, offset: usize) -> LayoutEntry {
        LayoutEntry {
            name: "f".to_string(),
            offset,
            size: kind.size(),
            decode: Decode::Scalar { kind, order },
        }
    }

    #[test]
    fn read_at_offset() {
        let buf = [0xFF, 0x00, 0x01, 0x00, 0x00, 0x00];
        let e = entry(ScalarKind::I32, ByteOrder::Little, 2);
        assert_eq!(read_scalar(&buf[..], &e).unwrap(), Value::I32(1));
    }

    #[test]
    fn read_past_end() {
        let buf = [0u8; 5];
        let e = entry(ScalarKind::I32, ByteOrder::Little, 2);
        assert!(matches!(
            read_scalar(&buf[..], &e),
            Err(ViewError::BufferTooShort { needed: 6, actual: 5 })
        ));
    }

    #[test]
    fn write_then_read() {
        let mut buf = [0u8; 8];
        let view = cells(&mut buf);
        let e = entry(ScalarKind::F64, ByteOrder::Big, 0);
        write_scalar(view, &e, &Value::F64(-0.5)).unwrap();
        assert_eq!(read_scalar(view, &e).unwrap(), Value::F64(-0.5));
        assert_eq!(buf, (-0.5f64).to_be_bytes());
    }

    #[test]
    fn write_wrong_kind_leaves_bytes() {
        let mut buf = [7u8; 4];
        let view = cells(&mut buf);
        let e = entry(ScalarKind::U32, ByteOrder::Little, 0);
        let err = write_scalar(view, &e, &Value::I32(1)).unwrap_err();
        assert!(matches!(
            err,
            ViewError::TypeMismatch { ref expected, ref found, .. }
                if expected == "u32" && found == "i32"
        ));
        assert_eq!(buf, [7u8; 4]);
    }

    #[test]
    fn write_wrong_byte_length() {
        let mut buf = [0u8; 4];
        let e = entry(ScalarKind::Bytes(4), ByteOrder::Native, 0);
        let err = write_scalar(cells(&mut buf), &e, &Value::Bytes(vec![1; 5])).unwrap_err();
        assert!(matches!(err, ViewError::TypeMismatch { ref found, .. } if found == "bytes[5]"));
    }

    fn tuple_entry(format: &str, offset: usize) -> LayoutEntry {
        let format = Format::parse(format).unwrap();
        LayoutEntry {
            name: "t".to_string(),
            offset,
            size: format.size(),
            decode: Decode::Tuple(format),
        }
    }

    #[test]
    fn tuple_round_trip_zeroes_padding() {
        let mut buf = [0xEEu8; 9];
        let view = cells(&mut buf);
        let e = tuple_entry(">hxI", 1);
        write_tuple(view, &e, &[Value::I16(-2), Value::U32(7)]).unwrap();

        assert_eq!(read_tuple(view, &e).unwrap(), vec![Value::I16(-2), Value::U32(7)]);
        assert_eq!(buf, [0xEE, 0xFF, 0xFE, 0x00, 0, 0, 0, 7, 0xEE]);
    }

    #[test]
    fn tuple_value_count_is_checked() {
        let mut buf = [1u8; 8];
        let e = tuple_entry("<2i", 0);
        let err = write_tuple(cells(&mut buf), &e, &[Value::I32(5)]).unwrap_err();
        assert!(matches!(
            err,
            ViewError::TypeMismatch { ref expected, ref found, .. }
                if expected == "2 values" && found == "1 values"
        ));
        assert_eq!(buf, [1u8; 8]);
    }

    #[test]
    fn tuple_and_scalar_accessors_do_not_mix() {
        let buf = [0u8; 8];
        let tuple = tuple_entry("<2i", 0);
        let scalar = entry(ScalarKind::I32, ByteOrder::Little, 0);
        assert!(matches!(read_scalar(&buf[..], &tuple), Err(ViewError::TypeMismatch { .. })));
        assert!(matches!(read_tuple(&buf[..], &scalar), Err(ViewError::TypeMismatch { .. })));
    }

    #[test]
    fn nested_is_memoized() {
        let inner = Schema::compile("Inner", &[FieldSpec::scalar("<H", "v")]).unwrap();
        let outer = Schema::compile(
            "Outer",
            &[FieldSpec::scalar("<H", "a"), FieldSpec::nested(&inner, "b")],
        )
        .unwrap();
        let buf = [1u8, 0, 2, 0];
        let e = outer.entry("b").unwrap();
        let slot = OnceCell::new();

        let first = read_nested(&buf[..], e, &slot).unwrap();
        let second = read_nested(&buf[..], e, &slot).unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.get_value("v").unwrap(), Value::U16(2));
    }

    #[test]
    fn scalar_entry_is_not_nested() {
        let buf = [0u8; 4];
        let e = entry(ScalarKind::I32, ByteOrder::Little, 0);
        let slot = OnceCell::new();
        assert!(matches!(
            read_nested(&buf[..], &e, &slot),
            Err(ViewError::TypeMismatch { .. })
        ));
    }
}
