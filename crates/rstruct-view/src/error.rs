use rstruct_codec::CodecError;
use rstruct_schema::SchemaError;

/// Errors raised while viewing buffers or framing records.
///
/// Nothing here is retried. Insufficient bytes are always reported, never
/// padded: a short buffer silently zero-filled would shift every later
/// field.
///
/// ```text
///   ViewError
///   ├── BufferTooShort     ← buffer smaller than the schema (construction / access)
///   ├── ShortRead          ← stream ended inside a structure or record body
///   ├── EndOfStream        ← stream ended inside a size header
///   ├── NegativeLength     ← size header smaller than the header itself
///   ├── RecordTooLarge     ← body above the configured limit
///   ├── InvalidSizeFormat  ← size format is not one integer scalar
///   ├── ZeroStride         ← iterating with a zero-sized element
///   ├── TypeMismatch       ← value kind differs from the field kind
///   ├── UnknownField       ← name not in the schema
///   ├── Codec(CodecError)  ← stride format failed to parse
///   ├── Schema(SchemaError) ← schema built on the fly was rejected
///   └── Io(std::io::Error) ← from the underlying reader / writer
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// The buffer is shorter than the layout requires.
    #[error("buffer too short: need {needed} bytes, have {actual}")]
    BufferTooShort { needed: usize, actual: usize },

    /// The stream ran dry while reading a structure or a record body.
    #[error("short read: expected {expected} bytes, stream provided {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// The stream ran dry while reading a record's size header.
    ///
    /// Truncation mid-record is unrecoverable for that record.
    #[error("end of stream inside size header: expected {expected} bytes, got {actual}")]
    EndOfStream { expected: usize, actual: usize },

    /// The decoded size is smaller than the header that carries it.
    #[error("negative record length: size field {total} minus header {header_size}")]
    NegativeLength { total: i128, header_size: usize },

    /// The body exceeds `RecordConfig::max_body_len`, or cannot be encoded
    /// in the configured size format.
    #[error("record body of {body_len} bytes exceeds limit {limit}")]
    RecordTooLarge { body_len: u64, limit: u64 },

    /// The size format must describe exactly one integer scalar.
    #[error("size format {format:?} must be a single integer scalar")]
    InvalidSizeFormat { format: String },

    /// A stride format or schema with size 0 would never advance.
    #[error("cannot iterate with a zero-sized element")]
    ZeroStride,

    /// A value (or nested structure) was used where the field declares a
    /// different kind.
    #[error("field {field:?}: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    #[error("schema {schema} has no field {field:?}")]
    UnknownField { schema: String, field: String },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
