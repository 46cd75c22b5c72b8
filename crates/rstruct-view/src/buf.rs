use std::io::{Read, Write};
use std::sync::Arc;

use rstruct_schema::Schema;

use crate::bytes::cells;
use crate::error::ViewError;
use crate::io::read_up_to;
use crate::structure::{Structure, StructureMut};

/// An owned buffer sized for one schema.
///
/// `StructureBuf` is the arena for a top-level structure read from a
/// stream or built from scratch. It hands out [`Structure`] views that
/// borrow it, the way `PathBuf` hands out `&Path`.
#[derive(Clone, Debug)]
pub struct StructureBuf {
    schema: Arc<Schema>,
    bytes: Vec<u8>,
}

impl StructureBuf {
    /// Take ownership of `bytes` as a buffer for `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::BufferTooShort`] if `bytes` is shorter than the
    /// schema.
    pub fn from_bytes(schema: Arc<Schema>, bytes: Vec<u8>) -> Result<Self, ViewError> {
        if bytes.len() < schema.total_size() {
            return Err(ViewError::BufferTooShort {
                needed: schema.total_size(),
                actual: bytes.len(),
            });
        }
        Ok(Self { schema, bytes })
    }

    /// A zero-filled buffer of exactly `schema.total_size()` bytes.
    pub fn zeroed(schema: Arc<Schema>) -> Self {
        let bytes = vec![0; schema.total_size()];
        Self { schema, bytes }
    }

    /// Read exactly `schema.total_size()` bytes from `reader`.
    ///
    /// # Errors
    ///
    /// - [`ViewError::ShortRead`] if the stream ends first.
    /// - [`ViewError::Io`] if the reader fails.
    pub fn from_stream<R: Read + ?Sized>(
        schema: Arc<Schema>,
        reader: &mut R,
    ) -> Result<Self, ViewError> {
        let expected = schema.total_size();
        let bytes = read_up_to(reader, expected)?;
        if bytes.len() < expected {
            return Err(ViewError::ShortRead {
                expected,
                actual: bytes.len(),
            });
        }
        tracing::debug!(schema = schema.name(), bytes = expected, "read structure from stream");
        Ok(Self { schema, bytes })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// A read-only view. Each call builds a fresh view with its own
    /// nested cache.
    pub fn view(&self) -> Structure<'_> {
        Structure::over(&self.schema, self.bytes.as_slice())
    }

    /// A writable view over the owned bytes.
    pub fn view_mut(&mut self) -> StructureMut<'_> {
        Structure::over(&self.schema, cells(&mut self.bytes))
    }

    /// Write the buffer to `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Io`] if the writer fails.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> Result<(), ViewError> {
        writer.write_all(&self.bytes)?;
        Ok(())
    }
}
