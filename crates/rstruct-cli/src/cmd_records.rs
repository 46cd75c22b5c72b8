/// Implementation of `rstruct records`.
///
/// Reads sized records from a file until a clean end at a record
/// boundary. Each body is listed with its length and, depending on the
/// flags, decoded as tuples (`--as`), as structures (`--manifest` with
/// `--schema`), or hex dumped (`--show-hex`).
///
/// # Output format
///
/// ```text
/// Record 0 @ 0x0000: 8 bytes
///   [0] 1
///   [1] 2
/// Record 1 @ 0x000c: 0 bytes
/// ---
/// 2 records, 12 bytes
/// ```
///
/// A framing error (truncated header, short body, oversized body) stops
/// the walk; records already printed stay on stdout and the error is
/// reported on stderr.
use std::fs::File;
use std::io::{self, BufReader, Write as _};

use anyhow::{Context, Result};
use rstruct_schema::SchemaRegistry;
use rstruct_view::{RecordConfig, RecordStream, SizedRecord};

use crate::RecordsArgs;
use crate::{manifest, render};

/// How to decode each record body.
enum BodyDecoder<'r> {
    Raw,
    Tuples(&'r str),
    Structures(&'r rstruct_schema::Schema),
}

impl RecordsArgs {
    fn record_config(&self) -> RecordConfig {
        RecordConfig {
            size_format: self.size_format.clone(),
            includes_size_in_total: !self.exclusive_size,
            max_body_len: self.max_body,
        }
    }
}

/// Run the `rstruct records` command.
///
/// # Errors
///
/// Returns an error if the file or manifest cannot be read, the size
/// format is invalid, or a record fails to frame or decode.
pub fn run(args: &RecordsArgs) -> Result<()> {
    let registry = match &args.manifest {
        Some(path) => Some(manifest::load(path)?),
        None => None,
    };
    let decoder = body_decoder(args, registry.as_ref())?;

    let file = File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;
    let config = args.record_config();
    let header_size = rstruct_codec::Format::parse(&config.size_format)
        .map(|f| f.size())
        .unwrap_or(0);
    let records = RecordStream::new(BufReader::new(file), config)
        .with_context(|| format!("bad --size-format {:?}", args.size_format))?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let mut offset = 0;
    let mut count = 0;

    for (idx, record) in records.enumerate() {
        let record =
            record.with_context(|| format!("record {idx} at offset 0x{offset:04x}: framing failed"))?;

        let mut out = format!("Record {idx} @ 0x{offset:04x}: {} bytes\n", record.len());
        describe(&mut out, &record, &decoder).with_context(|| format!("record {idx}: failed to decode"))?;
        if args.show_hex {
            render::hex_dump(&mut out, record.body(), 2);
        }
        stdout.write_all(out.as_bytes())?;

        offset += header_size + record.len();
        count += 1;
    }

    writeln!(
        stdout,
        "---\n{count} record{}, {offset} bytes",
        if count == 1 { "" } else { "s" }
    )?;
    Ok(())
}

fn body_decoder<'r>(args: &'r RecordsArgs, registry: Option<&'r SchemaRegistry>) -> Result<BodyDecoder<'r>> {
    if let Some(format) = &args.as_format {
        return Ok(BodyDecoder::Tuples(format));
    }
    match (registry, &args.schema) {
        (Some(registry), Some(name)) => Ok(BodyDecoder::Structures(manifest::lookup(registry, name)?)),
        _ => Ok(BodyDecoder::Raw),
    }
}

fn describe(out: &mut String, record: &SizedRecord, decoder: &BodyDecoder<'_>) -> Result<()> {
    use std::fmt::Write as _;

    match decoder {
        BodyDecoder::Raw => {}
        BodyDecoder::Tuples(format) => {
            for (i, tuple) in record.iter_tuples(format)?.enumerate() {
                let values: Vec<String> = tuple?.iter().map(ToString::to_string).collect();
                let _ = writeln!(out, "  [{i}] {}", values.join(", "));
            }
        }
        BodyDecoder::Structures(schema) => {
            for (i, s) in record.iter_structures(schema)?.enumerate() {
                let _ = writeln!(out, "  {} #{i}", schema.name());
                render::structure(out, &s, 4)?;
            }
        }
    }
    Ok(())
}
