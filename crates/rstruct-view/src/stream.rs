use std::io::Read;

use crate::config::RecordConfig;
use crate::error::ViewError;
use crate::io::read_up_to;
use crate::record::{SizeHeader, SizedRecord};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    ReadHeader,
    Done,
}

/// Reads successive sized records from one stream.
///
/// ```text
///   ReadHeader ──(0 bytes at a boundary)──▶ Done   iteration ends cleanly
///       │  ▲
///       │  └──(record read)
///       └──(any error)──────────────────▶ Done   error yielded once
/// ```
///
/// A record boundary with no more bytes is the normal end of the
/// stream. A header cut short is [`ViewError::EndOfStream`]. After the
/// first error the iterator is fused.
pub struct RecordStream<R> {
    reader: R,
    header: SizeHeader,
    config: RecordConfig,
    state: State,
    count: usize,
}

impl<R: Read> RecordStream<R> {
    /// # Errors
    ///
    /// Returns [`ViewError::InvalidSizeFormat`] if the configured size
    /// format is not one integer scalar.
    pub fn new(reader: R, config: RecordConfig) -> Result<Self, ViewError> {
        let header = SizeHeader::parse(&config.size_format)?;
        Ok(Self {
            reader,
            header,
            config,
            state: State::ReadHeader,
            count: 0,
        })
    }

    /// Records yielded so far.
    pub fn count_read(&self) -> usize {
        self.count
    }

    pub fn config(&self) -> &RecordConfig {
        &self.config
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_next(&mut self) -> Result<Option<SizedRecord>, ViewError> {
        let raw = read_up_to(&mut self.reader, self.header.size)?;
        if raw.is_empty() {
            return Ok(None);
        }
        SizedRecord::read_body(
            &mut self.reader,
            &self.header,
            &raw,
            self.config.includes_size_in_total,
            self.config.max_body_len,
        )
        .map(Some)
    }
}

impl<R: Read> Iterator for RecordStream<R> {
    type Item = Result<SizedRecord, ViewError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }

        match self.read_next() {
            Ok(Some(record)) => {
                self.count += 1;
                Some(Ok(record))
            }
            Ok(None) => {
                tracing::debug!(records = self.count, "record stream exhausted");
                self.state = State::Done;
                None
            }
            Err(e) => {
                tracing::debug!(records = self.count, error = %e, "record stream failed");
                self.state = State::Done;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for RecordStream<R> {}
