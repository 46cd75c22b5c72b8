#![warn(clippy::pedantic)]

pub mod error;
pub mod field;
pub mod layout;
pub mod registry;
pub mod schema;

pub use error::SchemaError;
pub use field::{FieldDef, FieldSpec, FieldType};
pub use layout::{Decode, LayoutEntry};
pub use registry::SchemaRegistry;
pub use schema::Schema;
