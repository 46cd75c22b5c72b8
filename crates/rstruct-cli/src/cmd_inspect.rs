/// Implementation of `rstruct inspect`.
///
/// Decodes structures of one schema laid end to end in a file, starting
/// at `--offset`. Bytes past the last decoded structure (a short tail, or
/// everything beyond `--count`) are counted but not decoded.
///
/// # Output format
///
/// ```text
/// PolyHeader #0 @ 0x0000 (40 bytes)
///   file_code  = 4096
///   min        = Point
///     x  = 0.5
///     y  = 2.2
///   ...
/// ---
/// 1 structure, 0 bytes not decoded
/// ```
use std::fs;

use anyhow::{Context, Result, bail};
use rstruct_view::Structure;

use crate::InspectArgs;
use crate::{manifest, render};

/// Run the `rstruct inspect` command.
///
/// # Errors
///
/// Returns an error if the manifest or file cannot be read, the schema is
/// unknown, or `--offset` lies past the end of the file.
pub fn run(args: &InspectArgs) -> Result<()> {
    let registry = manifest::load(&args.manifest)?;
    let schema = manifest::lookup(&registry, &args.schema)?;
    if schema.total_size() == 0 {
        bail!("schema {} has no fields to decode", schema.name());
    }

    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let Some(data) = bytes.get(args.offset..) else {
        bail!(
            "offset {} is past the end of {} ({} bytes)",
            args.offset,
            args.file.display(),
            bytes.len()
        );
    };

    let size = schema.total_size();
    let limit = args.count.unwrap_or(usize::MAX);
    let mut out = String::new();
    let mut decoded = 0;

    for (idx, chunk) in data.chunks_exact(size).take(limit).enumerate() {
        let view = Structure::new(schema, chunk)?;
        out.push_str(&format!(
            "{} #{idx} @ 0x{:04x} ({size} bytes)\n",
            schema.name(),
            args.offset + idx * size
        ));
        render::structure(&mut out, &view, 2)
            .with_context(|| format!("structure {idx}: failed to decode"))?;
        decoded += 1;
    }

    let remaining = data.len() - decoded * size;
    out.push_str("---\n");
    out.push_str(&format!(
        "{decoded} structure{}, {remaining} bytes not decoded",
        if decoded == 1 { "" } else { "s" }
    ));
    println!("{out}");
    Ok(())
}
