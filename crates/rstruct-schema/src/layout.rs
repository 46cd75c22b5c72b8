use std::sync::Arc;

use rstruct_codec::{ByteOrder, Format, MAX_FORMAT_SIZE, ScalarKind};

use crate::error::SchemaError;
use crate::field::{FieldSpec, FieldType};
use crate::schema::Schema;

/// How the bytes of one layout entry are interpreted.
#[derive(Clone, Debug)]
pub enum Decode {
    /// A scalar with its resolved (never implicit) byte order.
    Scalar { kind: ScalarKind, order: ByteOrder },
    /// Several values read and written together, e.g. `"2d"` or `"<hxH"`.
    /// The format carries the resolved byte order as its marker.
    Tuple(Format),
    /// An embedded structure described by another compiled schema.
    Nested(Arc<Schema>),
}

impl Decode {
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested(_))
    }
}

/// One row of a compiled layout.
///
/// Entries are contiguous: `offset` of entry `i + 1` equals
/// `offset + size` of entry `i`, and the first entry starts at 0. For a
/// compiled entry `offset + size` never exceeds [`MAX_FORMAT_SIZE`].
#[derive(Clone, Debug)]
pub struct LayoutEntry {
    pub name: String,
    pub offset: usize,
    pub size: usize,
    pub decode: Decode,
}

impl LayoutEntry {
    /// Byte range of this field within its structure.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.size
    }

    /// End offset (exclusive).
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// The layout compiler.
///
/// Walks `fields` in order with a running offset and a "current byte
/// order" that starts unset:
///
/// ```text
///   scalar  → parse format; an explicit marker replaces the current order
///             size = calcsize(format)
///             one value     → decode = Scalar { kind, current or native }
///             several       → decode = Tuple(format with that order)
///             none          → NoValues
///   nested  → size = nested.total_size; decode = Nested(nested)
///   both    → record { name, offset, size, decode }; offset += size
/// ```
///
/// The running offset is checked, and a layout that would pass
/// [`MAX_FORMAT_SIZE`] fails with [`SchemaError::LayoutTooLarge`].
///
/// Returns the entries together with the final offset, which is the
/// schema's total size.
pub(crate) fn compile_layout(
    schema: &str,
    fields: &[FieldSpec],
) -> Result<(Vec<LayoutEntry>, usize), SchemaError> {
    let mut entries: Vec<LayoutEntry> = Vec::with_capacity(fields.len());
    let mut offset: usize = 0;
    let mut current_order: Option<ByteOrder> = None;

    for field in fields {
        if entries.iter().any(|e| e.name == field.name) {
            return Err(SchemaError::DuplicateField {
                schema: schema.to_string(),
                field: field.name.clone(),
            });
        }

        let (size, decode) = match &field.ty {
            FieldType::Scalar(format) => {
                let parsed = Format::parse(format).map_err(|source| SchemaError::InvalidFormat {
                    schema: schema.to_string(),
                    field: field.name.clone(),
                    source,
                })?;

                // Sticky: the marker also applies to later unmarked fields.
                if let Some(order) = parsed.order() {
                    current_order = Some(order);
                }

                if parsed.value_count() == 0 {
                    return Err(SchemaError::NoValues {
                        schema: schema.to_string(),
                        field: field.name.clone(),
                        format: format.clone(),
                    });
                }

                let order = current_order.unwrap_or_default();
                let size = parsed.size();
                match parsed.single_scalar() {
                    Some(kind) => (size, Decode::Scalar { kind, order }),
                    None => (size, Decode::Tuple(parsed.with_order(order))),
                }
            }
            FieldType::Nested(nested) => (nested.total_size(), Decode::Nested(Arc::clone(nested))),
        };

        let end = offset
            .checked_add(size)
            .filter(|&end| end <= MAX_FORMAT_SIZE)
            .ok_or_else(|| SchemaError::LayoutTooLarge {
                schema: schema.to_string(),
                field: field.name.clone(),
                limit: MAX_FORMAT_SIZE,
            })?;

        tracing::trace!(schema, field = %field.name, offset, size, "layout entry");

        entries.push(LayoutEntry {
            name: field.name.clone(),
            offset,
            size,
            decode,
        });
        offset = end;
    }

    Ok((entries, offset))
}
