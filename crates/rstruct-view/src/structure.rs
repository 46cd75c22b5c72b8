use std::cell::{Cell, OnceCell};

use rstruct_codec::Value;
use rstruct_schema::{Decode, LayoutEntry, Schema};

use crate::accessor;
use crate::bytes::{ByteView, WritableView, cells};
use crate::error::ViewError;

/// A structure over shared-writable bytes.
pub type StructureMut<'a> = Structure<'a, &'a [Cell<u8>]>;

/// A named-field view over a byte buffer, laid out by a [`Schema`].
///
/// A `Structure` owns no bytes. It holds the schema, a window onto the
/// buffer owned by whoever created it, and a private cache of nested
/// children:
///
/// ```text
///   Structure<'a, B>
///   ├── schema: &'a Schema          ← shared, read-only layout
///   ├── bytes:  B                   ← window onto the owner's buffer
///   └── nested: [OnceCell<Self>]    ← one slot per layout entry,
///                                     filled on first get() of a nested field
/// ```
///
/// Field reads are independent of each other and may happen in any
/// order. Nested children share the parent's bytes, so a write through a
/// child is visible from the parent and vice versa.
///
/// # Example
///
/// ```rust
/// use rstruct_schema::{FieldSpec, Schema};
/// use rstruct_view::Structure;
///
/// let schema = Schema::compile("Pair", &[
///     FieldSpec::scalar("<h", "a"),
///     FieldSpec::scalar("h", "b"),
/// ]).unwrap();
///
/// let mut buf = [0u8; 4];
/// let pair = Structure::writable(&schema, &mut buf).unwrap();
/// pair.set("b", -2i16).unwrap();
/// assert_eq!(pair.get_value("b").unwrap().as_i64(), Some(-2));
/// assert_eq!(buf, [0, 0, 0xFE, 0xFF]);
/// ```
pub struct Structure<'a, B: ByteView<'a> = &'a [u8]> {
    schema: &'a Schema,
    bytes: B,
    nested: Box<[OnceCell<Structure<'a, B>>]>,
}

/// The result of reading one field.
pub enum Field<'s, 'a, B: ByteView<'a> = &'a [u8]> {
    Scalar(Value),
    /// Every value of a multi-value field such as `"2d"`, in format order.
    Tuple(Vec<Value>),
    /// A memoized child; the same reference is returned on every read.
    Nested(&'s Structure<'a, B>),
}

impl<'s, 'a, B: ByteView<'a>> Field<'s, 'a, B> {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::Tuple(_) | Self::Nested(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Self::Scalar(v) => Some(v),
            Self::Tuple(_) | Self::Nested(_) => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Self::Tuple(values) => Some(values),
            Self::Scalar(_) | Self::Nested(_) => None,
        }
    }

    pub fn as_nested(&self) -> Option<&'s Structure<'a, B>> {
        match *self {
            Self::Nested(s) => Some(s),
            Self::Scalar(_) | Self::Tuple(_) => None,
        }
    }
}

impl<'a, B: ByteView<'a>> Structure<'a, B> {
    /// Build a view of `schema` over `bytes`.
    ///
    /// `bytes` may be longer than the schema; the extra tail is kept in
    /// the view but no field reaches it.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::BufferTooShort`] if `bytes` is shorter than
    /// `schema.total_size()`.
    pub fn new(schema: &'a Schema, bytes: B) -> Result<Self, ViewError> {
        let needed = schema.total_size();
        if bytes.len() < needed {
            return Err(ViewError::BufferTooShort {
                needed,
                actual: bytes.len(),
            });
        }
        Ok(Self::over(schema, bytes))
    }

    /// Build a view without the length check. Callers guarantee
    /// `bytes.len() >= schema.total_size()`.
    pub(crate) fn over(schema: &'a Schema, bytes: B) -> Self {
        let slots = if schema.has_nested() { schema.len() } else { 0 };
        Self {
            schema,
            bytes,
            nested: (0..slots).map(|_| OnceCell::new()).collect(),
        }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// The window this structure reads from.
    pub fn bytes(&self) -> B {
        self.bytes
    }

    /// Length of the underlying window (at least `schema().total_size()`).
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Copy the bytes covered by the schema into a new vector.
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.with_bytes(0..self.schema.total_size(), <[u8]>::to_vec)
    }

    /// Read a field by name, dispatching on its layout entry.
    ///
    /// # Errors
    ///
    /// - [`ViewError::UnknownField`] if the schema has no such field.
    /// - [`ViewError::BufferTooShort`] if the buffer ends early.
    pub fn get(&self, name: &str) -> Result<Field<'_, 'a, B>, ViewError> {
        let index = self.index_of(name)?;
        self.get_at(index)
    }

    /// Read the field at `index` in the schema's layout.
    ///
    /// # Panics
    ///
    /// Panics if `index >= schema().len()`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::BufferTooShort`] if the buffer ends early.
    pub fn get_at(&self, index: usize) -> Result<Field<'_, 'a, B>, ViewError> {
        let schema: &'a Schema = self.schema;
        let entry = &schema.layout()[index];
        match entry.decode {
            Decode::Scalar { .. } => accessor::read_scalar(self.bytes, entry).map(Field::Scalar),
            Decode::Tuple(_) => accessor::read_tuple(self.bytes, entry).map(Field::Tuple),
            Decode::Nested(_) => {
                accessor::read_nested(self.bytes, entry, &self.nested[index]).map(Field::Nested)
            }
        }
    }

    /// Read a scalar field.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get), plus [`ViewError::TypeMismatch`] if the
    /// field is a tuple or nested.
    pub fn get_value(&self, name: &str) -> Result<Value, ViewError> {
        let index = self.index_of(name)?;
        accessor::read_scalar(self.bytes, &self.schema.layout()[index])
    }

    /// Read every value of a tuple field.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get), plus [`ViewError::TypeMismatch`] if the
    /// field is a single scalar or nested.
    pub fn get_tuple(&self, name: &str) -> Result<Vec<Value>, ViewError> {
        let index = self.index_of(name)?;
        accessor::read_tuple(self.bytes, &self.schema.layout()[index])
    }

    /// Read a nested field. Repeated calls return the same child.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get), plus [`ViewError::TypeMismatch`] if the
    /// field is a scalar.
    pub fn get_nested(&self, name: &str) -> Result<&Structure<'a, B>, ViewError> {
        let index = self.index_of(name)?;
        let schema: &'a Schema = self.schema;
        let entry = &schema.layout()[index];
        match self.nested.get(index) {
            Some(slot) => accessor::read_nested(self.bytes, entry, slot),
            // No slots at all means the schema has no nested fields.
            None => Err(ViewError::TypeMismatch {
                field: name.to_string(),
                expected: "nested structure".to_string(),
                found: "scalar".to_string(),
            }),
        }
    }

    /// Every field in layout order, each read independently.
    pub fn fields(
        &self,
    ) -> impl Iterator<Item = (&'a LayoutEntry, Result<Field<'_, 'a, B>, ViewError>)> + '_ {
        let schema: &'a Schema = self.schema;
        schema
            .layout()
            .iter()
            .enumerate()
            .map(move |(i, entry)| (entry, self.get_at(i)))
    }

    fn index_of(&self, name: &str) -> Result<usize, ViewError> {
        self.schema.index_of(name).ok_or_else(|| ViewError::UnknownField {
            schema: self.schema.name().to_string(),
            field: name.to_string(),
        })
    }
}

impl<'a> Structure<'a, &'a [Cell<u8>]> {
    /// Build a writable view over an exclusively borrowed buffer.
    ///
    /// The buffer stays borrowed for as long as the view, or any nested
    /// child of it, is alive.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::BufferTooShort`] if `buf` is shorter than the
    /// schema.
    pub fn writable(schema: &'a Schema, buf: &'a mut [u8]) -> Result<Self, ViewError> {
        Self::new(schema, cells(buf))
    }
}

impl<'a, B: WritableView<'a>> Structure<'a, B> {
    /// Encode `value` into a scalar field in place.
    ///
    /// Takes `&self`: the bytes are shared with nested children, which
    /// are handed out by shared reference.
    ///
    /// # Errors
    ///
    /// - [`ViewError::UnknownField`] if the schema has no such field.
    /// - [`ViewError::TypeMismatch`] if the field is nested or `value` is
    ///   of another kind.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), ViewError> {
        let index = self.index_of(name)?;
        accessor::write_scalar(self.bytes, &self.schema.layout()[index], &value.into())
    }

    /// Encode `values` into a tuple field in place.
    ///
    /// # Errors
    ///
    /// - [`ViewError::UnknownField`] if the schema has no such field.
    /// - [`ViewError::TypeMismatch`] if the field is not a tuple, or
    ///   `values` differs from its format in count or kinds.
    pub fn set_tuple(&self, name: &str, values: &[Value]) -> Result<(), ViewError> {
        let index = self.index_of(name)?;
        accessor::write_tuple(self.bytes, &self.schema.layout()[index], values)
    }
}

impl<'a, B: ByteView<'a>> std::fmt::Debug for Structure<'a, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct(self.schema.name());
        for (entry, field) in self.fields() {
            match field {
                Ok(Field::Scalar(v)) => s.field(&entry.name, &v),
                Ok(Field::Tuple(values)) => s.field(&entry.name, &values),
                Ok(Field::Nested(child)) => s.field(&entry.name, child),
                Err(e) => s.field(&entry.name, &format_args!("<{e}>")),
            };
        }
        s.finish()
    }
}

impl<'s, 'a, B: ByteView<'a>> std::fmt::Debug for Field<'s, 'a, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Self::Tuple(values) => f.debug_tuple("Tuple").field(values).finish(),
            Self::Nested(s) => f.debug_tuple("Nested").field(s).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rstruct_schema::FieldSpec;

    use super::*;

    fn point() -> Arc<Schema> {
        Schema::compile(
            "Point",
            &[FieldSpec::scalar("<d", "x"), FieldSpec::scalar("d", "y")],
        )
        .unwrap()
    }

    fn segment(point: &Arc<Schema>) -> Arc<Schema> {
        Schema::compile(
            "Segment",
            &[
                FieldSpec::scalar("<H", "id"),
                FieldSpec::nested(point, "from"),
                FieldSpec::nested(point, "to"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn boundary_lengths() {
        let point = point();
        let short = [0u8; 15];
        assert!(matches!(
            Structure::new(&point, &short[..]),
            Err(ViewError::BufferTooShort { needed: 16, actual: 15 })
        ));
        let exact = [0u8; 16];
        assert!(Structure::new(&point, &exact[..]).is_ok());
    }

    #[test]
    fn unknown_field() {
        let point = point();
        let buf = [0u8; 16];
        let s = Structure::new(&point, &buf[..]).unwrap();
        assert!(matches!(
            s.get("z"),
            Err(ViewError::UnknownField { ref field, .. }) if field == "z"
        ));
    }

    #[test]
    fn nested_children_are_identity_stable() {
        let point = point();
        let segment = segment(&point);
        let buf = [0u8; 34];
        let s = Structure::new(&segment, &buf[..]).unwrap();

        let a = s.get_nested("from").unwrap();
        let b = s.get("from").unwrap().as_nested().unwrap();
        assert!(std::ptr::eq(a, b));
        assert!(!std::ptr::eq(a, s.get_nested("to").unwrap()));
    }

    #[test]
    fn writes_through_child_reach_parent() {
        let point = point();
        let segment = segment(&point);
        let mut buf = [0u8; 34];
        {
            let s = Structure::writable(&segment, &mut buf).unwrap();
            let to = s.get_nested("to").unwrap();
            to.set("y", 9.25f64).unwrap();
            s.set("id", 7u16).unwrap();

            // The memoized child sees bytes written through the parent.
            let again = s.get_nested("to").unwrap();
            assert_eq!(again.get_value("y").unwrap(), Value::F64(9.25));
        }
        assert_eq!(&buf[0..2], &7u16.to_le_bytes());
        assert_eq!(&buf[26..34], &9.25f64.to_le_bytes());
    }

    #[test]
    fn kind_confusion_is_a_type_mismatch() {
        let point = point();
        let segment = segment(&point);
        let mut buf = [0u8; 34];
        let s = Structure::writable(&segment, &mut buf).unwrap();

        assert!(matches!(s.get_value("from"), Err(ViewError::TypeMismatch { .. })));
        assert!(matches!(s.get_nested("id"), Err(ViewError::TypeMismatch { .. })));
        assert!(matches!(s.set("from", 1.0f64), Err(ViewError::TypeMismatch { .. })));
        assert!(matches!(s.set("id", 1i32), Err(ViewError::TypeMismatch { .. })));
    }

    #[test]
    fn get_nested_on_flat_schema() {
        let point = point();
        let buf = [0u8; 16];
        let s = Structure::new(&point, &buf[..]).unwrap();
        assert!(matches!(s.get_nested("x"), Err(ViewError::TypeMismatch { .. })));
    }

    #[test]
    fn fields_in_layout_order() {
        let point = point();
        let mut buf = Vec::new();
        buf.extend_from_slice(&1.5f64.to_le_bytes());
        buf.extend_from_slice(&(-2.0f64).to_le_bytes());
        let s = Structure::new(&point, buf.as_slice()).unwrap();

        let read: Vec<_> = s
            .fields()
            .map(|(entry, field)| (entry.name.clone(), field.unwrap().into_value().unwrap()))
            .collect();
        assert_eq!(
            read,
            vec![("x".to_string(), Value::F64(1.5)), ("y".to_string(), Value::F64(-2.0))]
        );
    }

    #[test]
    fn tuple_fields_read_and_write_together() {
        let schema = Schema::compile(
            "Box",
            &[
                FieldSpec::scalar(">H", "id"),
                FieldSpec::scalar("2d", "origin"),
                FieldSpec::scalar("<3B", "rgb"),
            ],
        )
        .unwrap();
        assert_eq!(schema.total_size(), 21);

        let mut buf = [0u8; 21];
        {
            let s = Structure::writable(&schema, &mut buf).unwrap();
            s.set_tuple("origin", &[Value::F64(1.5), Value::F64(-3.0)]).unwrap();
            s.set_tuple("rgb", &[Value::U8(1), Value::U8(2), Value::U8(3)]).unwrap();

            assert_eq!(
                s.get_tuple("origin").unwrap(),
                vec![Value::F64(1.5), Value::F64(-3.0)]
            );
            let Field::Tuple(rgb) = s.get("rgb").unwrap() else {
                panic!("rgb should be a tuple");
            };
            assert_eq!(rgb, vec![Value::U8(1), Value::U8(2), Value::U8(3)]);

            assert!(matches!(s.get_value("origin"), Err(ViewError::TypeMismatch { .. })));
            assert!(matches!(s.get_tuple("id"), Err(ViewError::TypeMismatch { .. })));
            assert!(matches!(s.set("origin", 1.0f64), Err(ViewError::TypeMismatch { .. })));
        }
        // The big-endian marker on `id` carries over to `origin`.
        assert_eq!(&buf[2..10], &1.5f64.to_be_bytes());
        assert_eq!(&buf[18..21], &[1, 2, 3]);
    }

    #[test]
    fn debug_shows_field_values() {
        let point = point();
        let mut buf = Vec::new();
        buf.extend_from_slice(&1.0f64.to_le_bytes());
        buf.extend_from_slice(&2.0f64.to_le_bytes());
        let s = Structure::new(&point, buf.as_slice()).unwrap();
        assert_eq!(format!("{s:?}"), "Point { x: F64(1.0), y: F64(2.0) }");
    }
}
