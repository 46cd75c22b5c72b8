/// rstruct command-line tool: print schema layouts, decode fixed-layout
/// structures from binary files, and walk streams of sized records.
///
/// # Command overview
///
/// ```text
/// rstruct <COMMAND> [OPTIONS]
///
/// Commands:
///   layout     Print the offset/size table of schemas in a manifest
///   inspect    Decode structures from a binary file with a manifest schema
///   records    Walk a stream of length-prefixed records
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log framing and schema compilation to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                     |
/// |------|---------------------------------------------|
/// | 0    | Success                                     |
/// | 1    | Error (I/O failure, bad manifest, bad data) |
///
/// Errors and log output go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd_inspect;
mod cmd_layout;
mod cmd_records;
mod manifest;
mod render;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Structured binary record decoder.
#[derive(Parser)]
#[command(name = "rstruct", version, about = "Structured binary record decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log schema compilation and record framing (`debug` level).
    ///
    /// `RUST_LOG` takes precedence when set.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled layout of schemas in a manifest.
    Layout(LayoutArgs),
    /// Decode consecutive structures from a binary file.
    Inspect(InspectArgs),
    /// Walk a stream of length-prefixed records.
    Records(RecordsArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `rstruct layout`.
///
/// Compiles every schema in the manifest, in file order, and prints its
/// offset/size table. With `--schema`, prints only that one.
#[derive(clap::Args)]
pub struct LayoutArgs {
    /// Path to the JSON schema manifest.
    pub manifest: PathBuf,

    /// Print only the schema with this name.
    #[arg(long)]
    pub schema: Option<String>,
}

/// Arguments for `rstruct inspect`.
///
/// Decodes structures of one schema laid end to end in a file.
///
/// ```text
/// ┌────────────┬───────────────────────────────────────────────────┐
/// │ Flag       │ Effect                                            │
/// ├────────────┼───────────────────────────────────────────────────┤
/// │ --schema   │ schema to decode with (required)                  │
/// │ --offset N │ skip N bytes before the first structure           │
/// │ --count N  │ decode at most N structures (default: all whole)  │
/// └────────────┴───────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the JSON schema manifest.
    pub manifest: PathBuf,

    /// Path to the binary file to decode.
    pub file: PathBuf,

    /// Name of the schema to decode with.
    #[arg(long)]
    pub schema: String,

    /// Byte offset of the first structure.
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Decode at most this many structures.
    #[arg(long)]
    pub count: Option<usize>,
}

/// Arguments for `rstruct records`.
///
/// Reads sized records until the stream ends and prints each body,
/// optionally decoded as fixed-stride tuples or as schema structures.
///
/// ```text
/// ┌──────────────────────┬──────────────────────────────────────────────┐
/// │ Flag                 │ Effect                                       │
/// ├──────────────────────┼──────────────────────────────────────────────┤
/// │ --size-format FMT    │ size header format (default "<i")            │
/// │ --exclusive-size     │ size value excludes the header itself        │
/// │ --max-body N         │ reject bodies larger than N bytes            │
/// │ --as FMT             │ decode bodies as tuples of FMT               │
/// │ --manifest, --schema │ decode bodies as structures of a schema      │
/// │ --show-hex           │ 16-byte-per-line hex dump of each body       │
/// └──────────────────────┴──────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct RecordsArgs {
    /// Path to the record stream.
    pub file: PathBuf,

    /// Format of each record's size header.
    #[arg(long, default_value = "<i")]
    pub size_format: String,

    /// The size value counts body bytes only.
    #[arg(long)]
    pub exclusive_size: bool,

    /// Largest body accepted, in bytes.
    #[arg(long)]
    pub max_body: Option<usize>,

    /// Decode each body as consecutive tuples of this format.
    #[arg(long = "as", value_name = "FMT", conflicts_with = "manifest")]
    pub as_format: Option<String>,

    /// JSON schema manifest for `--schema`.
    #[arg(long, requires = "schema")]
    pub manifest: Option<PathBuf>,

    /// Decode each body as consecutive structures of this schema.
    #[arg(long, requires = "manifest")]
    pub schema: Option<String>,

    /// Show a raw hex dump of each body.
    #[arg(long)]
    pub show_hex: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Layout(args) => cmd_layout::run(&args),
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Records(args) => cmd_records::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}
