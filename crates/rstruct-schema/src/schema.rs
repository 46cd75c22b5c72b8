use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SchemaError;
use crate::field::FieldSpec;
use crate::layout::{Decode, LayoutEntry, compile_layout};

/// A compiled, immutable record description.
///
/// A schema is compiled once and then shared, read-only, by every
/// structure view built over it (it plays the part a class descriptor
/// plays for its instances). Nested schemas are held by `Arc`, so a
/// schema embedded in several parents is stored once.
///
/// ```text
/// ┌──────────────────────────────────────────────────────┐
/// │ Schema "PolyHeader" (40 bytes)                       │
/// │   layout[0] file_code  @0   4  Scalar(i32, little)   │
/// │   layout[1] min        @4  16  Nested(Point)         │
/// │   layout[2] max        @20 16  Nested(Point)         │
/// │   layout[3] num_polys  @36  4  Scalar(i32, little)   │
/// │   index: name → layout position                      │
/// └──────────────────────────────────────────────────────┘
/// ```
#[derive(Debug)]
pub struct Schema {
    name: String,
    layout: Vec<LayoutEntry>,
    index: HashMap<String, usize>,
    total_size: usize,
}

impl Schema {
    /// Compile `fields` into a schema named `name`.
    ///
    /// Nested fields must reference schemas that are already compiled,
    /// which `Arc<Schema>` guarantees by construction.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::DuplicateField`] if two fields share a name.
    /// - [`SchemaError::InvalidFormat`] if a format string does not parse.
    /// - [`SchemaError::NoValues`] if a format is empty or padding only.
    /// - [`SchemaError::LayoutTooLarge`] if the fields add up past
    ///   [`MAX_FORMAT_SIZE`](rstruct_codec::MAX_FORMAT_SIZE).
    pub fn compile(name: impl Into<String>, fields: &[FieldSpec]) -> Result<Arc<Self>, SchemaError> {
        let name = name.into();
        let (layout, total_size) = compile_layout(&name, fields)?;

        let index = layout
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.name.clone(), i))
            .collect();

        tracing::debug!(
            schema = %name,
            fields = layout.len(),
            total_size,
            "compiled schema"
        );

        Ok(Arc::new(Self {
            name,
            layout,
            index,
            total_size,
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sum of all field sizes; the minimum buffer length for a view.
    pub fn total_size(&self) -> usize {
        self.total_size
    }

    /// Entries in declaration order.
    pub fn layout(&self) -> &[LayoutEntry] {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    /// Position of `name` in [`layout`](Self::layout).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn entry(&self, name: &str) -> Option<&LayoutEntry> {
        self.index_of(name).map(|i| &self.layout[i])
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.layout.iter().map(|e| e.name.as_str())
    }

    /// Whether any field embeds another schema.
    pub fn has_nested(&self) -> bool {
        self.layout.iter().any(|e| e.decode.is_nested())
    }
}

impl std::fmt::Display for Schema {
    /// Render the layout as an aligned offset/size table.
    ///
    /// ```text
    /// Point (16 bytes)
    ///   offset  size  field  type
    ///        0     8  x      f64 little
    ///        8     8  y      f64 little
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .layout
            .iter()
            .map(|e| e.name.len())
            .max()
            .unwrap_or(0)
            .max("field".len());

        writeln!(f, "{} ({} bytes)", self.name, self.total_size)?;
        write!(f, "  offset  size  {:<width$}  type", "field")?;
        for entry in &self.layout {
            let ty = match &entry.decode {
                Decode::Scalar { kind, order } => format!("{kind} {order}"),
                Decode::Tuple(format) => format!("tuple {format}"),
                Decode::Nested(nested) => nested.name().to_string(),
            };
            write!(
                f,
                "\n  {:>6}  {:>4}  {:<width$}  {ty}",
                entry.offset, entry.size, entry.name
            )?;
        }
        Ok(())
    }
}
