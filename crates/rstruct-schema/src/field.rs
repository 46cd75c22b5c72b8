use std::sync::Arc;

use crate::schema::Schema;

/// One declared field: a name paired with either a scalar format string
/// or an already-compiled schema to embed.
///
/// Declaration order is significant. The layout compiler assigns offsets
/// by walking the fields in the order given, and a byte-order marker on
/// one scalar carries over to the scalars after it.
///
/// ```rust
/// use rstruct_schema::{FieldSpec, Schema};
///
/// let point = Schema::compile("Point", &[
///     FieldSpec::scalar("<d", "x"),
///     FieldSpec::scalar("d", "y"),
/// ]).unwrap();
///
/// let header = Schema::compile("PolyHeader", &[
///     FieldSpec::scalar("<i", "file_code"),
///     FieldSpec::nested(&point, "min"),
///     FieldSpec::nested(&point, "max"),
///     FieldSpec::scalar("i", "num_polys"),
/// ]).unwrap();
///
/// assert_eq!(header.total_size(), 40);
/// ```
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
}

#[derive(Clone, Debug)]
pub enum FieldType {
    /// A format string, e.g. `"<i"`, `"16s"`, or `"2d"` for a tuple field.
    Scalar(String),
    /// An embedded sub-structure.
    Nested(Arc<Schema>),
}

impl FieldSpec {
    pub fn scalar(format: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: FieldType::Scalar(format.into()),
        }
    }

    pub fn nested(schema: &Arc<Schema>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: FieldType::Nested(Arc::clone(schema)),
        }
    }
}

/// A field declared against a [`SchemaRegistry`](crate::SchemaRegistry),
/// where nested schemas are referenced by name instead of by handle.
///
/// This is the shape schemas take when they come from a file: the
/// registry resolves each name against what it has already compiled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldDef {
    Scalar { name: String, format: String },
    Nested { name: String, schema: String },
}

impl FieldDef {
    pub fn scalar(format: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Scalar {
            name: name.into(),
            format: format.into(),
        }
    }

    pub fn nested(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Nested {
            name: name.into(),
            schema: schema.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Scalar { name, .. } | Self::Nested { name, .. } => name,
        }
    }
}
