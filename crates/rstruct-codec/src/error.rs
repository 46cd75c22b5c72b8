use crate::scalar::ScalarKind;

/// Errors raised by the scalar codec table and the format-string parser.
///
/// These are the lowest-level errors in the workspace. The schema crate
/// wraps them when a field declares a bad format, and the view crate
/// wraps them when a value written through a field has the wrong kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A format string contained a character that is not in the codec table.
    #[error("unknown format code {code:?} at position {position}")]
    UnknownCode { code: char, position: usize },

    /// A byte-order marker appeared anywhere but the first position.
    #[error("byte-order marker {marker:?} at position {position}, only allowed first")]
    MisplacedByteOrder { marker: char, position: usize },

    /// A repeat count was followed by nothing, e.g. `"<3"`.
    #[error("repeat count at position {position} is not followed by a format code")]
    DanglingCount { position: usize },

    /// A repeat count did not fit in `usize`.
    #[error("repeat count at position {position} overflows")]
    CountOverflow { position: usize },

    /// The item starting at `position` pushed the total size past `limit`.
    #[error("format size exceeds {limit} bytes at position {position}")]
    FormatTooLarge { position: usize, limit: usize },

    /// A value of one kind was written into a slot of another kind.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ScalarKind,
        found: ScalarKind,
    },

    /// A byte-array value did not match the declared array length.
    ///
    /// The codec never pads or truncates byte arrays, since that would
    /// silently change what gets written.
    #[error("byte array length mismatch: expected {expected} bytes, found {found}")]
    BytesLength { expected: usize, found: usize },

    /// `Format::pack` was given the wrong number of values.
    #[error("format takes {expected} values, got {found}")]
    ValueCount { expected: usize, found: usize },

    /// The input slice was shorter than the format requires.
    #[error("unexpected end of input: need {needed} bytes, have {available}")]
    UnexpectedEof { needed: usize, available: usize },
}
