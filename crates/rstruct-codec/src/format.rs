use crate::byte_order::ByteOrder;
use crate::error::CodecError;
use crate::scalar::ScalarKind;
use crate::value::Value;

/// Largest encoded size a format or layout may describe.
///
/// No slice can be longer than `isize::MAX` bytes, so nothing bigger could
/// ever be decoded.
pub const MAX_FORMAT_SIZE: usize = isize::MAX.unsigned_abs();

/// One element of a parsed format string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatItem {
    /// `count` consecutive scalars of one kind. `i` is one `I32`, `3h` is
    /// three `I16`, `4c` is four `Bytes(1)`, and `16s` is one `Bytes(16)`.
    Scalar { kind: ScalarKind, count: usize },
    /// `n` pad bytes (`x`, `3x`): skipped on decode, zeroed on encode.
    Pad(usize),
}

impl FormatItem {
    /// Encoded size in bytes, saturating at `usize::MAX`.
    pub fn size(self) -> usize {
        self.checked_size().unwrap_or(usize::MAX)
    }

    fn checked_size(self) -> Option<usize> {
        match self {
            Self::Scalar { kind, count } => kind.size().checked_mul(count),
            Self::Pad(n) => Some(n),
        }
    }

    /// Number of values this item decodes to.
    pub fn value_count(self) -> usize {
        match self {
            Self::Scalar { count, .. } => count,
            Self::Pad(_) => 0,
        }
    }
}

/// A parsed format string such as `"<i"`, `"d"`, `">2hI"` or `"!16s"`.
///
/// Grammar:
///
/// ```text
///   format := [marker] item*
///   marker := '@' | '<' | '>' | '!'
///   item   := [count] code
///   code   := b B h H i I l L q Q f d   (count = repeat)
///           | s                         (count = byte length, default 1)
///           | c                         (one byte; count = repeat)
///           | x                         (count = pad bytes, default 1)
/// ```
///
/// Whitespace between items is ignored. The marker is optional: a format
/// without one reports `order() == None`, and the caller decides which
/// order applies (the layout compiler carries the last explicit marker
/// forward, everything else falls back to [`ByteOrder::Native`]).
///
/// A repeat count is kept as a count, never expanded, so `"4000000000B"`
/// is a single item. The total size is checked while parsing and never
/// exceeds [`MAX_FORMAT_SIZE`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Format {
    order: Option<ByteOrder>,
    items: Vec<FormatItem>,
    size: usize,
}

impl Format {
    /// Parse a format string.
    ///
    /// # Errors
    ///
    /// - [`CodecError::UnknownCode`] for a character outside the table.
    /// - [`CodecError::MisplacedByteOrder`] for a marker after position 0.
    /// - [`CodecError::DanglingCount`] for a count with no code after it.
    /// - [`CodecError::CountOverflow`] for a count that overflows `usize`.
    /// - [`CodecError::FormatTooLarge`] if the total size would exceed
    ///   [`MAX_FORMAT_SIZE`].
    pub fn parse(s: &str) -> Result<Self, CodecError> {
        let mut chars = s.char_indices().peekable();
        let mut order = None;

        if let Some(&(_, c)) = chars.peek()
            && let Some(marker) = ByteOrder::from_marker(c)
        {
            order = Some(marker);
            chars.next();
        }

        let mut items = Vec::new();
        let mut size: usize = 0;
        while let Some((position, c)) = chars.next() {
            if c.is_whitespace() {
                continue;
            }

            if ByteOrder::from_marker(c).is_some() {
                return Err(CodecError::MisplacedByteOrder {
                    marker: c,
                    position,
                });
            }

            // Optional repeat count
            let (count, code, code_pos) = if let Some(digit) = c.to_digit(10) {
                let mut count = digit as usize;
                loop {
                    match chars.next() {
                        Some((_, d)) if d.is_ascii_digit() => {
                            count = count
                                .checked_mul(10)
                                .and_then(|n| n.checked_add(d.to_digit(10).unwrap_or(0) as usize))
                                .ok_or(CodecError::CountOverflow { position })?;
                        }
                        Some((p, code)) => break (Some(count), code, p),
                        None => return Err(CodecError::DanglingCount { position }),
                    }
                }
            } else {
                (None, c, position)
            };

            let item = match code {
                's' => FormatItem::Scalar {
                    kind: ScalarKind::Bytes(count.unwrap_or(1)),
                    count: 1,
                },
                'x' => FormatItem::Pad(count.unwrap_or(1)),
                'c' => FormatItem::Scalar {
                    kind: ScalarKind::Bytes(1),
                    count: count.unwrap_or(1),
                },
                other => FormatItem::Scalar {
                    kind: ScalarKind::from_code(other).ok_or(CodecError::UnknownCode {
                        code: other,
                        position: code_pos,
                    })?,
                    count: count.unwrap_or(1),
                },
            };

            size = item
                .checked_size()
                .and_then(|n| size.checked_add(n))
                .filter(|&n| n <= MAX_FORMAT_SIZE)
                .ok_or(CodecError::FormatTooLarge {
                    position,
                    limit: MAX_FORMAT_SIZE,
                })?;
            items.push(item);
        }

        Ok(Self { order, items, size })
    }

    /// Build a single-scalar format directly from a kind.
    pub fn scalar(order: ByteOrder, kind: ScalarKind) -> Self {
        Self {
            order: Some(order),
            items: vec![FormatItem::Scalar { kind, count: 1 }],
            size: kind.size(),
        }
    }

    /// The explicit byte-order marker, if the string had one.
    pub fn order(&self) -> Option<ByteOrder> {
        self.order
    }

    /// The byte order actually used for encoding: the explicit marker, or
    /// native order.
    pub fn effective_order(&self) -> ByteOrder {
        self.order.unwrap_or_default()
    }

    /// Return the same items with the given byte order applied.
    #[must_use]
    pub fn with_order(mut self, order: ByteOrder) -> Self {
        self.order = Some(order);
        self
    }

    pub fn items(&self) -> &[FormatItem] {
        &self.items
    }

    /// Total encoded size in bytes (the `calcsize` of the format).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of value-carrying items (pad bytes excluded).
    pub fn value_count(&self) -> usize {
        // Bounded by size plus item count, so this cannot overflow.
        self.items.iter().map(|item| item.value_count()).sum()
    }

    /// The kind, if this format describes exactly one scalar and no padding.
    pub fn single_scalar(&self) -> Option<ScalarKind> {
        match self.items.as_slice() {
            [FormatItem::Scalar { kind, count: 1 }] => Some(*kind),
            _ => None,
        }
    }

    /// Decode one tuple of values from the front of `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnexpectedEof`] if `buf` is shorter than
    /// [`size`](Self::size).
    pub fn unpack(&self, buf: &[u8]) -> Result<Vec<Value>, CodecError> {
        if buf.len() < self.size {
            return Err(CodecError::UnexpectedEof {
                needed: self.size,
                available: buf.len(),
            });
        }

        let order = self.effective_order();
        let mut values = Vec::with_capacity(self.value_count());
        let mut cursor = 0;
        for &item in &self.items {
            match item {
                FormatItem::Scalar { kind, count } => {
                    for _ in 0..count {
                        values.push(kind.decode(order, &buf[cursor..])?);
                        cursor += kind.size();
                    }
                }
                FormatItem::Pad(n) => cursor += n,
            }
        }
        Ok(values)
    }

    /// Encode `values` into the front of `out`, zeroing pad bytes.
    ///
    /// # Errors
    ///
    /// - [`CodecError::ValueCount`] if `values.len()` differs from
    ///   [`value_count`](Self::value_count).
    /// - [`CodecError::UnexpectedEof`] if `out` is too short.
    /// - Any error from [`ScalarKind::encode`].
    pub fn pack_into(&self, values: &[Value], out: &mut [u8]) -> Result<(), CodecError> {
        let expected = self.value_count();
        if values.len() != expected {
            return Err(CodecError::ValueCount {
                expected,
                found: values.len(),
            });
        }
        if out.len() < self.size {
            return Err(CodecError::UnexpectedEof {
                needed: self.size,
                available: out.len(),
            });
        }

        let order = self.effective_order();
        let mut values = values.iter();
        let mut cursor = 0;
        for &item in &self.items {
            match item {
                FormatItem::Scalar { kind, count } => {
                    // Count was checked above.
                    for value in values.by_ref().take(count) {
                        kind.encode(order, value, &mut out[cursor..])?;
                        cursor += kind.size();
                    }
                }
                FormatItem::Pad(n) => {
                    out[cursor..cursor + n].fill(0);
                    cursor += n;
                }
            }
        }
        Ok(())
    }

    /// Encode `values` into a fresh buffer of exactly [`size`](Self::size) bytes.
    ///
    /// # Errors
    ///
    /// Same as [`pack_into`](Self::pack_into).
    pub fn pack(&self, values: &[Value]) -> Result<Vec<u8>, CodecError> {
        let mut out = vec![0u8; self.size];
        self.pack_into(values, &mut out)?;
        Ok(out)
    }
}

impl std::str::FromStr for Format {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for Format {
    /// Canonical spelling: marker (if any), then each item with its count.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write as _;

        if let Some(order) = self.order {
            f.write_char(order.marker())?;
        }
        for &item in &self.items {
            match item {
                FormatItem::Pad(n) => write!(f, "{n}x")?,
                FormatItem::Scalar {
                    kind: ScalarKind::Bytes(1),
                    count,
                } if count != 1 => write!(f, "{count}c")?,
                FormatItem::Scalar {
                    kind: ScalarKind::Bytes(n),
                    count,
                } => {
                    for _ in 0..count {
                        write!(f, "{n}s")?;
                    }
                }
                FormatItem::Scalar { kind, count } => {
                    let code = crate::scalar::CODEC_TABLE
                        .iter()
                        .find(|(_, k)| *k == kind)
                        .map_or('?', |&(c, _)| c);
                    if count != 1 {
                        write!(f, "{count}")?;
                    }
                    f.write_char(code)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_with_marker() {
        let fmt = Format::parse("<i").unwrap();
        assert_eq!(fmt.order(), Some(ByteOrder::Little));
        assert_eq!(fmt.single_scalar(), Some(ScalarKind::I32));
        assert_eq!(fmt.size(), 4);
    }

    #[test]
    fn parse_without_marker() {
        let fmt = Format::parse("d").unwrap();
        assert_eq!(fmt.order(), None);
        assert_eq!(fmt.effective_order(), ByteOrder::Native);
        assert_eq!(fmt.size(), 8);
    }

    #[test]
    fn parse_counts() {
        let fmt = Format::parse(">2hI").unwrap();
        assert_eq!(
            fmt.items(),
            &[
                FormatItem::Scalar {
                    kind: ScalarKind::I16,
                    count: 2
                },
                FormatItem::Scalar {
                    kind: ScalarKind::U32,
                    count: 1
                },
            ]
        );
        assert_eq!(fmt.size(), 8);
        assert_eq!(fmt.value_count(), 3);
        assert_eq!(fmt.single_scalar(), None);
    }

    #[test]
    fn parse_byte_array_and_pad() {
        let fmt = Format::parse("<16s 3x 2c").unwrap();
        assert_eq!(
            fmt.items(),
            &[
                FormatItem::Scalar {
                    kind: ScalarKind::Bytes(16),
                    count: 1
                },
                FormatItem::Pad(3),
                FormatItem::Scalar {
                    kind: ScalarKind::Bytes(1),
                    count: 2
                },
            ]
        );
        assert_eq!(fmt.size(), 21);
        assert_eq!(fmt.value_count(), 3);
        assert_eq!(fmt.single_scalar(), None);
    }

    #[test]
    fn large_repeat_stays_one_item() {
        let fmt = Format::parse("4000000000B").unwrap();
        assert_eq!(fmt.items().len(), 1);
        assert_eq!(fmt.size(), 4_000_000_000);
        assert!(matches!(
            fmt.unpack(&[0u8; 8]),
            Err(CodecError::UnexpectedEof { needed: 4_000_000_000, available: 8 })
        ));
    }

    #[test]
    fn reject_total_size_overflow() {
        assert_eq!(
            Format::parse("18446744073709551615s1s"),
            Err(CodecError::FormatTooLarge {
                position: 0,
                limit: MAX_FORMAT_SIZE
            })
        );
        assert!(matches!(
            Format::parse("9223372036854775807s1s"),
            Err(CodecError::FormatTooLarge { position: 20, .. })
        ));
        assert!(matches!(
            Format::parse("<4611686018427387904h"),
            Err(CodecError::FormatTooLarge { position: 1, .. })
        ));
        assert!(matches!(
            Format::parse("9223372036854775808x"),
            Err(CodecError::FormatTooLarge { position: 0, .. })
        ));
    }

    #[test]
    fn size_limit_is_inclusive() {
        let fmt = Format::parse("9223372036854775807s").unwrap();
        assert_eq!(fmt.size(), MAX_FORMAT_SIZE);
        assert!(matches!(
            Format::parse("9223372036854775807s x"),
            Err(CodecError::FormatTooLarge { position: 21, .. })
        ));
    }

    #[test]
    fn parse_empty_is_zero_sized() {
        let fmt = Format::parse("").unwrap();
        assert_eq!(fmt.size(), 0);
        assert!(fmt.items().is_empty());
    }

    #[test]
    fn reject_unknown_code() {
        assert_eq!(
            Format::parse("<iz"),
            Err(CodecError::UnknownCode {
                code: 'z',
                position: 2
            })
        );
    }

    #[test]
    fn reject_marker_after_start() {
        assert_eq!(
            Format::parse("i<i"),
            Err(CodecError::MisplacedByteOrder {
                marker: '<',
                position: 1
            })
        );
    }

    #[test]
    fn reject_dangling_count() {
        assert!(matches!(
            Format::parse("<12"),
            Err(CodecError::DanglingCount { position: 1 })
        ));
    }

    #[test]
    fn reject_count_overflow() {
        assert!(matches!(
            Format::parse("99999999999999999999999i"),
            Err(CodecError::CountOverflow { .. })
        ));
    }

    #[test]
    fn unpack_mixed() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(-5i16).to_be_bytes());
        buf.extend_from_slice(&[0xAA, 0xBB]);
        buf.extend_from_slice(&7u32.to_be_bytes());

        let fmt = Format::parse("!h2xI").unwrap();
        let values = fmt.unpack(&buf).unwrap();
        assert_eq!(values, vec![Value::I16(-5), Value::U32(7)]);
    }

    #[test]
    fn unpack_short_buffer() {
        let fmt = Format::parse("<q").unwrap();
        assert!(matches!(
            fmt.unpack(&[0u8; 4]),
            Err(CodecError::UnexpectedEof {
                needed: 8,
                available: 4
            })
        ));
    }

    #[test]
    fn pack_zeroes_padding() {
        let fmt = Format::parse("<B2xB").unwrap();
        let out = fmt.pack(&[Value::U8(1), Value::U8(2)]).unwrap();
        assert_eq!(out, vec![1, 0, 0, 2]);
    }

    #[test]
    fn pack_wrong_value_count() {
        let fmt = Format::parse("<ii").unwrap();
        assert_eq!(
            fmt.pack(&[Value::I32(1)]),
            Err(CodecError::ValueCount {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn display_is_canonical() {
        let fmt = Format::parse("< 2h 4s x 3c c").unwrap();
        assert_eq!(fmt.to_string(), "<2h4s1x3c1s");
        assert_eq!(Format::parse("d").unwrap().to_string(), "d");
        assert_eq!(Format::parse("0i0c").unwrap().to_string(), "0i0c");
    }

    #[test]
    fn unpack_and_pack_repeats() {
        let fmt = Format::parse("<3h").unwrap();
        let bytes = fmt.pack(&[Value::I16(1), Value::I16(-1), Value::I16(2)]).unwrap();
        assert_eq!(bytes, vec![1, 0, 0xFF, 0xFF, 2, 0]);
        assert_eq!(
            fmt.unpack(&bytes).unwrap(),
            vec![Value::I16(1), Value::I16(-1), Value::I16(2)]
        );
    }

    #[test]
    fn with_order_overrides_marker() {
        let fmt = Format::parse("i").unwrap().with_order(ByteOrder::Big);
        assert_eq!(fmt.order(), Some(ByteOrder::Big));
        assert_eq!(fmt.to_string(), ">i");
    }
}
