#![warn(clippy::pedantic)]

pub mod byte_order;
pub mod error;
pub mod format;
pub mod scalar;
pub mod value;

pub use byte_order::ByteOrder;
pub use error::CodecError;
pub use format::{Format, FormatItem, MAX_FORMAT_SIZE};
pub use scalar::{CODEC_TABLE, ScalarKind};
pub use value::Value;
