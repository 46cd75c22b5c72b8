use rstruct_codec::CodecError;

/// Errors raised while compiling a schema into a layout.
///
/// Every variant is fatal for the schema being compiled: nothing is
/// registered and no partial layout escapes.
///
/// ```text
/// ┌──────────────────┬─────────────────────────────────────────────────┐
/// │ Variant          │ Cause                                           │
/// ├──────────────────┼─────────────────────────────────────────────────┤
/// │ DuplicateField   │ two fields in one schema share a name           │
/// │ InvalidFormat    │ a scalar format string failed to parse          │
/// │ NoValues         │ a field format is empty or padding only         │
/// │ LayoutTooLarge   │ the running offset would pass MAX_FORMAT_SIZE   │
/// │ UnresolvedNested │ embedded schema not compiled yet (or cyclic)    │
/// │ DuplicateSchema  │ a registry already holds a schema of that name  │
/// └──────────────────┴─────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema {schema}: duplicate field name {field:?}")]
    DuplicateField { schema: String, field: String },

    #[error("schema {schema}: field {field:?} has an invalid format: {source}")]
    InvalidFormat {
        schema: String,
        field: String,
        #[source]
        source: CodecError,
    },

    /// A field format must decode to at least one value.
    #[error("schema {schema}: field {field:?} format {format:?} holds no values")]
    NoValues {
        schema: String,
        field: String,
        format: String,
    },

    #[error("schema {schema}: field {field:?} pushes the layout past {limit} bytes")]
    LayoutTooLarge {
        schema: String,
        field: String,
        limit: usize,
    },

    /// A nested field refers to a schema that has not been compiled.
    ///
    /// Schemas compile bottom-up, so this is also how a cycle shows up:
    /// whichever schema in the cycle is registered first cannot see the
    /// other one yet.
    #[error("schema {schema}: field {field:?} embeds unknown schema {target:?}")]
    UnresolvedNested {
        schema: String,
        field: String,
        target: String,
    },

    #[error("schema {name:?} is already registered")]
    DuplicateSchema { name: String },
}
