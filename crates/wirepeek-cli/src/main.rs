//! wirepeek - Decode Protocol Buffer messages without a schema
//!
//! This tool takes a base64 or hex encoded protobuf message (or a file of
//! captured messages), guesses the meaning of every field and prints the
//! decoded tree.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn, Level};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;
use wirepeek_core::decode::DEFAULT_MAX_DEPTH;
use wirepeek_core::input::{self, unwrap_grpc_web};
use wirepeek_core::render::walk;
use wirepeek_core::wire::writer::encode_message;
use wirepeek_core::{
    Decoder, DecoderConfig, InputEncoding, Message, RenderConfig, StatsVisitor, TextRenderer,
};

/// Decode Protocol Buffer messages without a schema
#[derive(Parser, Debug)]
#[command(name = "wirepeek")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// How input text is turned into bytes
    #[arg(short, long, value_enum, default_value = "auto")]
    encoding: EncodingArg,

    /// Do not unwrap gRPC-Web frames
    #[arg(long)]
    no_grpc_web: bool,

    /// Print scalar values as plain unsigned integers instead of every reading
    #[arg(long)]
    raw_scalars: bool,

    /// Maximum depth of nested message detection
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Spaces per indentation level
    #[arg(long, default_value = "2")]
    indent: usize,

    /// Print a summary of the decoded tree
    #[arg(long)]
    stats: bool,

    /// Print the hex of the decoded message re-encoded with minimal encodings
    #[arg(long)]
    reencode: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Base64 or hex encoded message ("-" reads standard input)
    message: Option<String>,

    /// Path to a file holding one message (encoded text or raw binary)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a directory of message files to decode one by one
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

/// Input encoding
#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    /// Base64, falling back to hex (files: falling back to raw bytes)
    Auto,
    /// Standard base64
    Base64,
    /// Hexadecimal
    Hex,
    /// Raw binary, no decoding
    Raw,
}

impl From<EncodingArg> for InputEncoding {
    fn from(arg: EncodingArg) -> Self {
        match arg {
            EncodingArg::Auto => InputEncoding::Auto,
            EncodingArg::Base64 => InputEncoding::Base64,
            EncodingArg::Hex => InputEncoding::Hex,
            EncodingArg::Raw => InputEncoding::Raw,
        }
    }
}

/// Decoder and renderer built from the command line
struct Session {
    decoder: Decoder,
    renderer: TextRenderer,
    grpc_web: bool,
    stats: bool,
    reencode: bool,
}

impl Session {
    fn from_cli(cli: &Cli) -> Self {
        let decoder = Decoder::with_config(
            DecoderConfig::new()
                .max_depth(cli.max_depth)
                .interpret_scalars(!cli.raw_scalars),
        );
        let renderer =
            TextRenderer::new().with_config(RenderConfig::new().indent_str(" ".repeat(cli.indent)));

        Self {
            decoder,
            renderer,
            grpc_web: !cli.no_grpc_web,
            stats: cli.stats,
            reencode: cli.reencode,
        }
    }

    /// Decode one message and write the report
    fn process(&self, data: &[u8], out: &mut impl Write) -> Result<()> {
        let framed = if self.grpc_web {
            unwrap_grpc_web(data)
        } else {
            None
        };

        let data = match framed {
            Some(message) => {
                writeln!(out, "The input will be parsed as gRPC-Web message")?;
                message
            }
            None => data,
        };

        trace!("Decoding {} bytes", data.len());
        let message = self
            .decoder
            .decode(data)
            .context("Failed to decode protobuf message")?;

        self.report(&message, out)
    }

    fn report(&self, message: &Message, out: &mut impl Write) -> Result<()> {
        writeln!(out, "Decoded Protobuf Message:")?;
        write!(out, "{}", self.renderer.render(message))?;

        if self.stats {
            let mut stats = StatsVisitor::default();
            walk(message, &mut stats).context("Failed to collect statistics")?;
            writeln!(
                out,
                "Fields: {} ({} scalar, {} string, {} bytes), nested messages: {}, max depth: {}",
                stats.field_count,
                stats.scalar_count,
                stats.text_count,
                stats.blob_count,
                stats.message_count,
                stats.max_depth
            )?;
        }

        if self.reencode {
            writeln!(out, "Re-encoded: {}", hex::encode(encode_message(message)))?;
        }

        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let session = Session::from_cli(&cli);
    let encoding = InputEncoding::from(cli.encoding);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    // Dispatch based on input mode
    if let Some(ref message) = cli.input.message {
        let data = read_message_arg(message, encoding)?;
        session.process(&data, &mut out)
    } else if let Some(ref file) = cli.input.file {
        process_single_file(&session, file, encoding, &mut out)
    } else if let Some(ref directory) = cli.input.directory {
        process_directory(&session, directory, encoding, &mut out)
    } else {
        bail!("One of <MESSAGE>, --file or --directory must be specified")
    }
}

/// Decode the positional message argument, reading stdin for "-"
fn read_message_arg(arg: &str, encoding: InputEncoding) -> Result<Vec<u8>> {
    if arg == "-" {
        let mut contents = Vec::new();
        io::stdin()
            .read_to_end(&mut contents)
            .context("Failed to read standard input")?;
        return input::decode_file_contents(&contents, encoding)
            .context("Failed to decode standard input");
    }

    input::decode_text(arg, encoding).context("Failed to decode input")
}

/// Process a single message file
fn process_single_file(
    session: &Session,
    file: &Path,
    encoding: InputEncoding,
    out: &mut impl Write,
) -> Result<()> {
    if !file.exists() {
        bail!("Input file does not exist: {}", file.display());
    }
    if !file.is_file() {
        bail!("Input path is not a file: {}", file.display());
    }

    let data = input::read_input_file(file, encoding)
        .with_context(|| format!("Failed to read input file: {}", file.display()))?;
    session.process(&data, out)
}

/// Process every message file in a directory recursively
fn process_directory(
    session: &Session,
    directory: &Path,
    encoding: InputEncoding,
    out: &mut impl Write,
) -> Result<()> {
    if !directory.exists() {
        bail!("Directory does not exist: {}", directory.display());
    }
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    let mut decoded = 0;
    let mut failed = 0;

    for entry in WalkDir::new(directory)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() || is_hidden(path) {
            continue;
        }

        debug!("Processing message file: {}", path.display());
        writeln!(out, "==> {} <==", path.display())?;

        let result = fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|contents| {
                input::decode_file_contents(&contents, encoding).map_err(anyhow::Error::from)
            })
            .and_then(|data| session.process(&data, out));

        match result {
            Ok(()) => decoded += 1,
            Err(e) => {
                // Log error but continue with other files
                warn!("Error processing {}: {:#}", path.display(), e);
                writeln!(out, "(not decodable)")?;
                failed += 1;
            }
        }
        writeln!(out)?;
    }

    info!("Decoded {} file(s), {} failed", decoded, failed);
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session(args: &[&str]) -> Session {
        let mut argv = vec!["wirepeek"];
        argv.extend_from_slice(args);
        Session::from_cli(&Cli::try_parse_from(argv).unwrap())
    }

    fn run(session: &Session, data: &[u8]) -> Result<String> {
        let mut out = Vec::new();
        session.process(data, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_input_modes_are_exclusive() {
        assert!(Cli::try_parse_from(["wirepeek"]).is_err());
        assert!(Cli::try_parse_from(["wirepeek", "CJYB", "--file", "x.bin"]).is_err());
        assert!(Cli::try_parse_from(["wirepeek", "--directory", "captures"]).is_ok());
    }

    #[test]
    fn test_process_prints_tree() {
        let output = run(&session(&["CJYB"]), &[0x08, 0x96, 0x01]).unwrap();
        assert!(output.starts_with("Decoded Protobuf Message:\n"));
        assert!(output.contains("Tag 1 (Varint): {"));
        assert!(output.contains("[sint64]: 75"));
    }

    #[test]
    fn test_process_grpc_web() {
        let frame = [0x00, 0x00, 0x00, 0x00, 0x02, 0x08, 0x01];

        let output = run(&session(&["x"]), &frame).unwrap();
        assert!(output.starts_with("The input will be parsed as gRPC-Web message\n"));
        assert!(output.contains("[bool]: true"));

        // Without unwrapping, the leading zero byte is an invalid tag
        let err = run(&session(&["x", "--no-grpc-web"]), &frame).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid tag at offset 0"));
    }

    #[test]
    fn test_process_failure_prints_nothing() {
        let mut out = Vec::new();
        let result = session(&["x"]).process(&[0x08, 0x01, 0x12, 0x0A, 0x01], &mut out);
        assert!(result.is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_raw_scalars_stats_and_reencode() {
        let args = ["x", "--raw-scalars", "--stats", "--reencode", "--indent", "4"];
        let output = run(&session(&args), &[0x0A, 0x02, 0x08, 0x2A]).unwrap();

        assert!(output.contains("Tag 1 (Bytes): Message {\n    Tag 1 (Varint): uint64: 42 (0x2a)\n}"));
        assert!(output.contains("Fields: 2 (1 scalar, 0 string, 0 bytes), nested messages: 1, max depth: 1"));
        assert!(output.contains("Re-encoded: 0a02082a"));
    }

    #[test]
    fn test_process_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.bin"), [0x08, 0x01]).unwrap();
        fs::write(temp_dir.path().join("b.txt"), "EgN4eXo=\n").unwrap();
        fs::write(temp_dir.path().join("c.bin"), [0x0F]).unwrap();
        fs::write(temp_dir.path().join(".hidden"), [0x08, 0x02]).unwrap();

        let mut out = Vec::new();
        process_directory(&session(&["x"]), temp_dir.path(), InputEncoding::Auto, &mut out)
            .unwrap();
        let output = String::from_utf8(out).unwrap();

        assert!(output.contains("a.bin <=="));
        assert!(output.contains("Tag 2 (Bytes): string: \"xyz\""));
        assert!(output.contains("(not decodable)"));
        assert!(!output.contains(".hidden"));
    }

    #[test]
    fn test_missing_inputs() {
        let mut out = Vec::new();
        let session = session(&["x"]);
        assert!(process_single_file(
            &session,
            Path::new("/nonexistent/msg.bin"),
            InputEncoding::Auto,
            &mut out
        )
        .is_err());
        assert!(process_directory(
            &session,
            Path::new("/nonexistent/dir"),
            InputEncoding::Auto,
            &mut out
        )
        .is_err());
    }
}
