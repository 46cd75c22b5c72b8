/// Implementation of `rstruct layout`.
///
/// # Output format
///
/// ```text
/// Point (16 bytes)
///   offset  size  field  type
///        0     8  x      f64 little
///        8     8  y      f64 little
///
/// PolyHeader (40 bytes)
///   offset  size  field      type
///        0     4  file_code  i32 little
///        4    16  min        Point
///       20    16  max        Point
///       36     4  num_polys  i32 little
/// ```
use anyhow::Result;

use crate::LayoutArgs;
use crate::manifest;

/// Run the `rstruct layout` command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be loaded or `--schema` names
/// an unknown schema.
pub fn run(args: &LayoutArgs) -> Result<()> {
    let registry = manifest::load(&args.manifest)?;

    if let Some(name) = &args.schema {
        println!("{}", manifest::lookup(&registry, name)?);
        return Ok(());
    }

    let tables: Vec<String> = registry.iter().map(ToString::to_string).collect();
    println!("{}", tables.join("\n\n"));
    Ok(())
}
