//! Sparse CLI tool
//!
//! Reads a sparse definition file and prints the events the parser produces.
//!
//! Examples:
//!   sparse shader.sparse               - indented text, one event per line
//!   sparse - --format json             - read stdin, print JSON lines
//!   sparse legacy.def --bytes          - read with the 8-bit fallback source

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::process;

use clap::{Parser as _, ValueEnum};
use eyre::{Result, WrapErr};
use serde_json::json;
use sparse_parse::{ByteSource, CharSource, CodePointSource, Event, ParseOptions, Parser};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_SYNTAX_ERROR: i32 = 1;
const EXIT_IO_ERROR: i32 = 3;

// ============================================================================
// CLI argument structures
// ============================================================================

#[derive(clap::Parser, Debug)]
#[command(
    name = "sparse",
    version,
    about = "Print the events of a sparse definition file"
)]
struct Cli {
    /// Input file path ("-" or omitted for stdin)
    input: Option<String>,

    /// Emit comment events
    #[arg(long)]
    comments: bool,

    /// Keep runs of whitespace inside keys and values
    #[arg(long)]
    no_compress: bool,

    /// Keep trailing whitespace at the end of values
    #[arg(long)]
    no_trim: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Read one byte per code point instead of decoding UTF-8
    #[arg(long)]
    bytes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Rendered events, indented by block depth
    Text,
    /// Debug representation of each event
    Debug,
    /// One JSON object per event
    Json,
}

impl Cli {
    fn options(&self) -> ParseOptions {
        ParseOptions::new()
            .read_comments(self.comments)
            .compress_whitespace(!self.no_compress)
            .trim_trailing_whitespace(!self.no_trim)
    }

    fn path(&self) -> Option<&str> {
        self.input.as_deref().filter(|path| *path != "-")
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(()) => process::exit(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(exit_code(&err));
        }
    }
}

/// Log to stderr, filtered by `SPARSE_LOG` or else `RUST_LOG`.
fn init_logging() {
    let filter = std::env::var("SPARSE_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(EnvFilter::from_default_env);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn exit_code(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<sparse_parse::Error>() {
        Some(err) if err.is_syntax() => EXIT_SYNTAX_ERROR,
        _ => EXIT_IO_ERROR,
    }
}

fn run(cli: &Cli) -> Result<()> {
    let options = cli.options();
    let path = cli.path();
    tracing::debug!(
        input = path.unwrap_or("<stdin>"),
        ?options,
        bytes = cli.bytes,
        "parsing"
    );

    let mut parser = Parser::new(options);
    let mut printer = Printer::new(BufWriter::new(io::stdout().lock()), cli.format);

    let result = if cli.bytes {
        let reader: Box<dyn Read> = match path {
            Some(path) => Box::new(BufReader::new(
                File::open(path).wrap_err_with(|| format!("failed to open {path}"))?,
            )),
            None => Box::new(io::stdin().lock()),
        };
        dump(&mut parser, ByteSource::new(reader), &mut printer)
    } else {
        let text = read_input(path)?;
        dump(&mut parser, CharSource::from(text.as_str()), &mut printer)
    };

    // Events printed before a failure are still written out.
    printer.flush()?;
    result
}

fn dump<S, W>(parser: &mut Parser, source: S, printer: &mut Printer<W>) -> Result<()>
where
    S: CodePointSource,
    W: Write,
{
    let mut count = 0usize;
    for event in parser.events(source) {
        let event = event.wrap_err("failed to parse input")?;
        printer.print(&event)?;
        count += 1;
    }
    tracing::debug!(events = count, "done");
    Ok(())
}

// ============================================================================
// Output
// ============================================================================

struct Printer<W> {
    out: W,
    format: Format,
    /// Open blocks, for indenting text output.
    depth: usize,
}

impl<W: Write> Printer<W> {
    fn new(out: W, format: Format) -> Self {
        Self {
            out,
            format,
            depth: 0,
        }
    }

    fn print(&mut self, event: &Event) -> Result<()> {
        match self.format {
            Format::Text => {
                if let Event::NodeLeave(depth) = event {
                    self.depth = depth.saturating_sub(1);
                }
                writeln!(self.out, "{:indent$}{event}", "", indent = self.depth * 2)?;
                if let Event::NodeEnter(_) = event {
                    self.depth += 1;
                }
            }
            Format::Debug => writeln!(self.out, "{event:?}")?,
            Format::Json => {
                serde_json::to_writer(&mut self.out, &to_json(event))?;
                writeln!(self.out)?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

fn to_json(event: &Event) -> serde_json::Value {
    let kind = event.kind().to_string();
    match event {
        Event::Field { key, value } => json!({ "kind": kind, "key": key, "value": value }),
        Event::Comment(text) => json!({ "kind": kind, "text": text }),
        Event::NodeEnter(label) => json!({ "kind": kind, "label": label }),
        Event::NodeLeave(depth) => json!({ "kind": kind, "depth": depth }),
    }
}

// ============================================================================
// I/O helpers
// ============================================================================

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .wrap_err("failed to read stdin")?;
            Ok(buf)
        }
        Some(path) => {
            std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {path}"))
        }
    }
}
