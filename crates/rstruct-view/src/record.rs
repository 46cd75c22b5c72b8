use std::io::{Read, Write};
use std::slice::ChunksExact;

use rstruct_codec::{ByteOrder, Format, ScalarKind, Value};
use rstruct_schema::Schema;

use crate::config::RecordConfig;
use crate::error::ViewError;
use crate::io::read_up_to;
use crate::structure::Structure;

/// A length-prefixed record read from a stream.
///
/// ```text
///   ┌──────────────┬──────────────────────────────┐
///   │ size header  │ body                         │
///   │ size_format  │ total - header_size bytes    │
///   └──────────────┴──────────────────────────────┘
///         ▲                      ▲
///         │                      └── owned by SizedRecord, immutable
///         └── consumed while framing, not kept
/// ```
///
/// The record owns its body and is the arena for every view handed out
/// by [`iter_structures`](Self::iter_structures). Iteration never
/// consumes the body: each call to `iter_*` starts again at offset 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SizedRecord {
    body: Vec<u8>,
}

impl SizedRecord {
    /// Wrap an existing body, e.g. to frame it with [`write_to`](Self::write_to).
    pub fn new(body: Vec<u8>) -> Self {
        Self { body }
    }

    /// Read one record from `reader`.
    ///
    /// 1. Read `sizeof(size_format)` header bytes.
    /// 2. Decode the size value `total`.
    /// 3. Body length is `total`, minus the header size when
    ///    `includes_size_in_total` is set.
    /// 4. Read exactly that many body bytes.
    ///
    /// # Errors
    ///
    /// - [`ViewError::InvalidSizeFormat`] if `size_format` is not one
    ///   integer scalar.
    /// - [`ViewError::EndOfStream`] if the stream ends inside the header.
    /// - [`ViewError::NegativeLength`] if the body length would be negative.
    /// - [`ViewError::ShortRead`] if the stream ends inside the body.
    /// - [`ViewError::Io`] if the reader fails.
    pub fn from_stream<R: Read + ?Sized>(
        reader: &mut R,
        size_format: &str,
        includes_size_in_total: bool,
    ) -> Result<Self, ViewError> {
        let header = SizeHeader::parse(size_format)?;
        Self::read_framed(reader, &header, includes_size_in_total, None)
    }

    /// Like [`from_stream`](Self::from_stream), with every setting taken
    /// from `config`.
    ///
    /// # Errors
    ///
    /// As [`from_stream`](Self::from_stream), plus
    /// [`ViewError::RecordTooLarge`] if the body exceeds
    /// `config.max_body_len`. The limit is checked before any body bytes
    /// are read.
    pub fn from_stream_with<R: Read + ?Sized>(
        reader: &mut R,
        config: &RecordConfig,
    ) -> Result<Self, ViewError> {
        let header = SizeHeader::parse(&config.size_format)?;
        Self::read_framed(reader, &header, config.includes_size_in_total, config.max_body_len)
    }

    fn read_framed<R: Read + ?Sized>(
        reader: &mut R,
        header: &SizeHeader,
        includes_size_in_total: bool,
        max_body_len: Option<usize>,
    ) -> Result<Self, ViewError> {
        let raw = read_up_to(reader, header.size)?;
        Self::read_body(reader, header, &raw, includes_size_in_total, max_body_len)
    }

    /// Finish a record whose header bytes were already read.
    pub(crate) fn read_body<R: Read + ?Sized>(
        reader: &mut R,
        header: &SizeHeader,
        raw_header: &[u8],
        includes_size_in_total: bool,
        max_body_len: Option<usize>,
    ) -> Result<Self, ViewError> {
        if raw_header.len() < header.size {
            return Err(ViewError::EndOfStream {
                expected: header.size,
                actual: raw_header.len(),
            });
        }

        let body_len = header.body_len(raw_header, includes_size_in_total)?;
        if let Some(limit) = max_body_len
            && body_len > limit
        {
            return Err(too_large(body_len, limit));
        }

        let body = read_up_to(reader, body_len)?;
        if body.len() < body_len {
            return Err(ViewError::ShortRead {
                expected: body_len,
                actual: body.len(),
            });
        }

        tracing::debug!(header = header.size, body = body_len, "framed sized record");
        Ok(Self { body })
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Body length in bytes (the header is not counted).
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Decode the body as consecutive tuples of `format`.
    ///
    /// A trailing span shorter than one stride is dropped. Each item is a
    /// `Result` so a decode failure is reported, never read as the end.
    ///
    /// # Errors
    ///
    /// - [`ViewError::Codec`] if `format` does not parse.
    /// - [`ViewError::ZeroStride`] if `format` has size 0.
    pub fn iter_tuples(&self, format: &str) -> Result<Tuples<'_>, ViewError> {
        let format = Format::parse(format)?;
        let stride = format.size();
        if stride == 0 {
            return Err(ViewError::ZeroStride);
        }
        Ok(Tuples {
            format,
            chunks: self.body.chunks_exact(stride),
        })
    }

    /// View the body as consecutive structures of `schema`.
    ///
    /// Each item borrows its span of the body without copying. A trailing
    /// span shorter than `schema.total_size()` is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::ZeroStride`] if the schema is empty.
    pub fn iter_structures<'a>(&'a self, schema: &'a Schema) -> Result<Structures<'a>, ViewError> {
        let stride = schema.total_size();
        if stride == 0 {
            return Err(ViewError::ZeroStride);
        }
        Ok(Structures {
            schema,
            chunks: self.body.chunks_exact(stride),
        })
    }

    /// Write the record with a size header built from `config`.
    ///
    /// # Errors
    ///
    /// - [`ViewError::InvalidSizeFormat`] if the size format is unusable.
    /// - [`ViewError::RecordTooLarge`] if the body exceeds
    ///   `config.max_body_len` or the size format cannot express its length.
    /// - [`ViewError::Io`] if the writer fails.
    pub fn write_to<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        config: &RecordConfig,
    ) -> Result<(), ViewError> {
        let header = SizeHeader::parse(&config.size_format)?;
        if let Some(limit) = config.max_body_len
            && self.body.len() > limit
        {
            return Err(too_large(self.body.len(), limit));
        }

        let raw = header.encode(self.body.len(), config.includes_size_in_total)?;
        writer.write_all(&raw)?;
        writer.write_all(&self.body)?;
        Ok(())
    }
}

fn too_large(body_len: usize, limit: usize) -> ViewError {
    ViewError::RecordTooLarge {
        body_len: u64::try_from(body_len).unwrap_or(u64::MAX),
        limit: u64::try_from(limit).unwrap_or(u64::MAX),
    }
}

// ── Size header ─────────────────────────────────────────────────────────

/// A parsed size format: one integer scalar with its byte order.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SizeHeader {
    pub(crate) kind: ScalarKind,
    pub(crate) order: ByteOrder,
    pub(crate) size: usize,
}

impl SizeHeader {
    pub(crate) fn parse(format: &str) -> Result<Self, ViewError> {
        let invalid = || ViewError::InvalidSizeFormat {
            format: format.to_string(),
        };
        let parsed = Format::parse(format).map_err(|_| invalid())?;
        match parsed.single_scalar() {
            Some(kind) if kind.is_integer() => Ok(Self {
                kind,
                order: parsed.effective_order(),
                size: kind.size(),
            }),
            _ => Err(invalid()),
        }
    }

    fn header_share(&self, includes_size_in_total: bool) -> i128 {
        if includes_size_in_total { self.size as i128 } else { 0 }
    }

    fn body_len(&self, raw: &[u8], includes_size_in_total: bool) -> Result<usize, ViewError> {
        let value = self.kind.decode(self.order, raw)?;
        let Some(total) = value.as_i128() else {
            return Err(ViewError::InvalidSizeFormat {
                format: self.kind.to_string(),
            });
        };

        let body = total - self.header_share(includes_size_in_total);
        if body < 0 {
            return Err(ViewError::NegativeLength {
                total,
                header_size: self.size,
            });
        }
        usize::try_from(body).map_err(|_| ViewError::RecordTooLarge {
            body_len: u64::try_from(body).unwrap_or(u64::MAX),
            limit: u64::try_from(usize::MAX).unwrap_or(u64::MAX),
        })
    }

    fn encode(&self, body_len: usize, includes_size_in_total: bool) -> Result<Vec<u8>, ViewError> {
        let share = self.header_share(includes_size_in_total);
        let max = integer_max(self.kind);
        let total = i128::try_from(body_len).unwrap_or(i128::MAX).saturating_add(share);
        let Some(value) = integer_value(self.kind, total) else {
            return Err(too_large(body_len, usize::try_from(max - share).unwrap_or(usize::MAX)));
        };

        let mut raw = vec![0u8; self.size];
        self.kind.encode(self.order, &value, &mut raw)?;
        Ok(raw)
    }
}

fn integer_max(kind: ScalarKind) -> i128 {
    match kind {
        ScalarKind::I8 => i8::MAX.into(),
        ScalarKind::U8 => u8::MAX.into(),
        ScalarKind::I16 => i16::MAX.into(),
        ScalarKind::U16 => u16::MAX.into(),
        ScalarKind::I32 => i32::MAX.into(),
        ScalarKind::U32 => u32::MAX.into(),
        ScalarKind::I64 => i64::MAX.into(),
        ScalarKind::U64 => u64::MAX.into(),
        ScalarKind::F32 | ScalarKind::F64 | ScalarKind::Bytes(_) => 0,
    }
}

/// `v` as a value of integer kind `kind`, if it fits.
fn integer_value(kind: ScalarKind, v: i128) -> Option<Value> {
    match kind {
        ScalarKind::I8 => i8::try_from(v).ok().map(Value::I8),
        ScalarKind::U8 => u8::try_from(v).ok().map(Value::U8),
        ScalarKind::I16 => i16::try_from(v).ok().map(Value::I16),
        ScalarKind::U16 => u16::try_from(v).ok().map(Value::U16),
        ScalarKind::I32 => i32::try_from(v).ok().map(Value::I32),
        ScalarKind::U32 => u32::try_from(v).ok().map(Value::U32),
        ScalarKind::I64 => i64::try_from(v).ok().map(Value::I64),
        ScalarKind::U64 => u64::try_from(v).ok().map(Value::U64),
        ScalarKind::F32 | ScalarKind::F64 | ScalarKind::Bytes(_) => None,
    }
}

// ── Iterators ───────────────────────────────────────────────────────────

/// Fixed-stride tuples over a record body. See [`SizedRecord::iter_tuples`].
#[derive(Clone, Debug)]
pub struct Tuples<'a> {
    format: Format,
    chunks: ChunksExact<'a, u8>,
}

impl Tuples<'_> {
    /// Bytes past the last whole stride.
    pub fn remainder(&self) -> &[u8] {
        self.chunks.remainder()
    }
}

impl Iterator for Tuples<'_> {
    type Item = Result<Vec<Value>, ViewError>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.chunks.next()?;
        Some(self.format.unpack(chunk).map_err(ViewError::from))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Tuples<'_> {}

/// Structures over successive spans of a record body. See
/// [`SizedRecord::iter_structures`].
#[derive(Clone, Debug)]
pub struct Structures<'a> {
    schema: &'a Schema,
    chunks: ChunksExact<'a, u8>,
}

impl<'a> Iterator for Structures<'a> {
    type Item = Structure<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk = self.chunks.next()?;
        Some(Structure::over(self.schema, chunk))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Structures<'_> {}
