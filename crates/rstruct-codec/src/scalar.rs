use crate::byte_order::ByteOrder;
use crate::error::CodecError;
use crate::value::Value;

/// One primitive binary encoding from the fixed codec table.
///
/// ```text
/// ┌──────┬──────────┬───────┬──────────────────────────────┐
/// │ Code │ Kind     │ Bytes │ Encoding                     │
/// ├──────┼──────────┼───────┼──────────────────────────────┤
/// │ b    │ I8       │ 1     │ two's complement             │
/// │ B    │ U8       │ 1     │ unsigned                     │
/// │ h    │ I16      │ 2     │ two's complement             │
/// │ H    │ U16      │ 2     │ unsigned                     │
/// │ i l  │ I32      │ 4     │ two's complement             │
/// │ I L  │ U32      │ 4     │ unsigned                     │
/// │ q    │ I64      │ 8     │ two's complement             │
/// │ Q    │ U64      │ 8     │ unsigned                     │
/// │ f    │ F32      │ 4     │ IEEE-754 binary32            │
/// │ d    │ F64      │ 8     │ IEEE-754 binary64            │
/// │ Ns c │ Bytes(N) │ N     │ raw bytes (c is 1s)          │
/// └──────┴──────────┴───────┴──────────────────────────────┘
/// ```
///
/// The table is closed: there is no way to register a new kind at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Bytes(usize),
}

/// Every fixed-size numeric entry of the codec table, keyed by its code.
///
/// Byte arrays (`s`, `c`) carry a length and are handled by the parser.
pub const CODEC_TABLE: &[(char, ScalarKind)] = &[
    ('b', ScalarKind::I8),
    ('B', ScalarKind::U8),
    ('h', ScalarKind::I16),
    ('H', ScalarKind::U16),
    ('i', ScalarKind::I32),
    ('I', ScalarKind::U32),
    ('l', ScalarKind::I32),
    ('L', ScalarKind::U32),
    ('q', ScalarKind::I64),
    ('Q', ScalarKind::U64),
    ('f', ScalarKind::F32),
    ('d', ScalarKind::F64),
];

impl ScalarKind {
    /// Look up a numeric code in [`CODEC_TABLE`].
    pub fn from_code(code: char) -> Option<Self> {
        CODEC_TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|&(_, kind)| kind)
    }

    /// Encoded size in bytes.
    pub fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 => 4,
            Self::I64 | Self::U64 | Self::F64 => 8,
            Self::Bytes(n) => n,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, Self::F32 | Self::F64 | Self::Bytes(_))
    }

    /// Decode one value of this kind from the front of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedEof`] if `buf` is shorter than
    /// [`size`](Self::size).
    pub fn decode(self, order: ByteOrder, buf: &[u8]) -> Result<Value, CodecError> {
        let size = self.size();
        let bytes = buf.get(..size).ok_or(CodecError::UnexpectedEof {
            needed: size,
            available: buf.len(),
        })?;

        // `bytes` is exactly `size` long, which is also `size_of::<$ty>()`.
        macro_rules! num {
            ($ty:ty, $variant:ident) => {{
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                let v = if order.is_little() {
                    <$ty>::from_le_bytes(raw)
                } else {
                    <$ty>::from_be_bytes(raw)
                };
                Value::$variant(v)
            }};
        }

        Ok(match self {
            Self::I8 => num!(i8, I8),
            Self::U8 => num!(u8, U8),
            Self::I16 => num!(i16, I16),
            Self::U16 => num!(u16, U16),
            Self::I32 => num!(i32, I32),
            Self::U32 => num!(u32, U32),
            Self::I64 => num!(i64, I64),
            Self::U64 => num!(u64, U64),
            Self::F32 => num!(f32, F32),
            Self::F64 => num!(f64, F64),
            Self::Bytes(_) => Value::Bytes(bytes.to_vec()),
        })
    }

    /// Encode `value` into the front of `out`.
    ///
    /// # Errors
    ///
    /// - [`CodecError::TypeMismatch`] if `value` is not of this kind.
    /// - [`CodecError::BytesLength`] if a byte array has the wrong length.
    /// - [`CodecError::UnexpectedEof`] if `out` is too short.
    pub fn encode(self, order: ByteOrder, value: &Value, out: &mut [u8]) -> Result<(), CodecError> {
        let size = self.size();
        let available = out.len();
        let out = out
            .get_mut(..size)
            .ok_or(CodecError::UnexpectedEof { needed: size, available })?;

        macro_rules! num {
            ($v:expr) => {{
                if order.is_little() {
                    out.copy_from_slice(&$v.to_le_bytes());
                } else {
                    out.copy_from_slice(&$v.to_be_bytes());
                }
            }};
        }

        match (self, value) {
            (Self::I8, Value::I8(v)) => num!(v),
            (Self::U8, Value::U8(v)) => num!(v),
            (Self::I16, Value::I16(v)) => num!(v),
            (Self::U16, Value::U16(v)) => num!(v),
            (Self::I32, Value::I32(v)) => num!(v),
            (Self::U32, Value::U32(v)) => num!(v),
            (Self::I64, Value::I64(v)) => num!(v),
            (Self::U64, Value::U64(v)) => num!(v),
            (Self::F32, Value::F32(v)) => num!(v),
            (Self::F64, Value::F64(v)) => num!(v),
            (Self::Bytes(n), Value::Bytes(data)) => {
                if data.len() != n {
                    return Err(CodecError::BytesLength {
                        expected: n,
                        found: data.len(),
                    });
                }
                out.copy_from_slice(data);
            }
            (expected, other) => {
                return Err(CodecError::TypeMismatch {
                    expected,
                    found: other.kind(),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::I8 => f.write_str("i8"),
            Self::U8 => f.write_str("u8"),
            Self::I16 => f.write_str("i16"),
            Self::U16 => f.write_str("u16"),
            Self::I32 => f.write_str("i32"),
            Self::U32 => f.write_str("u32"),
            Self::I64 => f.write_str("i64"),
            Self::U64 => f.write_str("u64"),
            Self::F32 => f.write_str("f32"),
            Self::F64 => f.write_str("f64"),
            Self::Bytes(n) => write!(f, "bytes[{n}]"),
        }
    }
}
