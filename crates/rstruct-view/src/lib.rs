#![warn(clippy::pedantic)]

pub mod accessor;
pub mod buf;
pub mod bytes;
pub mod config;
pub mod error;
pub mod record;
pub mod stream;
pub mod structure;

mod io;

pub use buf::StructureBuf;
pub use bytes::{ByteView, WritableView};
pub use config::RecordConfig;
pub use error::ViewError;
pub use record::{SizedRecord, Structures, Tuples};
pub use stream::RecordStream;
pub use structure::{Field, Structure, StructureMut};
