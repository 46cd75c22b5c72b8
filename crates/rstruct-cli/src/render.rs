/// Text rendering shared by `inspect` and `records`.
///
/// # Structure output
///
/// ```text
/// file_code  = 4096
/// extent     = (640, 480)
/// min        = Point
///   x  = 1.5
///   y  = 2.2
/// ```
use std::fmt::Write as _;

use anyhow::Result;
use rstruct_view::{Field, Structure};

/// Render every field of `structure`, nested fields indented beneath
/// their name.
///
/// # Errors
///
/// Returns an error if a field cannot be read.
pub fn structure(out: &mut String, s: &Structure<'_>, indent: usize) -> Result<()> {
    let width = s.schema().field_names().map(str::len).max().unwrap_or(0);
    let pad = " ".repeat(indent);

    for (entry, field) in s.fields() {
        match field? {
            Field::Scalar(value) => {
                let _ = writeln!(out, "{pad}{:<width$}  = {value}", entry.name);
            }
            Field::Tuple(values) => {
                let values: Vec<String> = values.iter().map(ToString::to_string).collect();
                let _ = writeln!(out, "{pad}{:<width$}  = ({})", entry.name, values.join(", "));
            }
            Field::Nested(child) => {
                let _ = writeln!(out, "{pad}{:<width$}  = {}", entry.name, child.schema().name());
                structure(out, child, indent + 2)?;
            }
        }
    }
    Ok(())
}

/// A 16-byte-per-line hex dump with an ASCII column, each line prefixed
/// by `indent` spaces.
pub fn hex_dump(out: &mut String, bytes: &[u8], indent: usize) {
    let pad = " ".repeat(indent);
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let offset = i * 16;
        let hex = chunk
            .iter()
            .fold(String::with_capacity(chunk.len() * 3), |mut s, b| {
                if !s.is_empty() {
                    s.push(' ');
                }
                let _ = write!(s, "{b:02x}");
                s
            });
        let ascii: String = chunk
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
            .collect();
        let _ = writeln!(out, "{pad}{offset:04x}  {hex:<48}  {ascii}");
    }
}
