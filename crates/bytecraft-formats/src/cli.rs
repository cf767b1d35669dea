//! Command-line arguments and record output.

use std::io::{self, Write};
use std::path::PathBuf;

use bytecraft::{record::Record, value::Value};
use clap::{Parser, ValueEnum};

/// Longest byte span printed in full by the tree output.
const MAX_INLINE_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON object
    Json,
    /// Indented field tree with hex bytes
    Debug,
}

/// Parse binary files with declarative schemas.
#[derive(Parser, Debug)]
#[command(name = "bytecraft")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// File to parse
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Treat the file as having this extension (case-insensitive)
    #[arg(long = "ext", value_name = "EXT")]
    pub extension: Option<String>,

    /// Parse with a JSON schema definition instead of the registered handlers
    #[arg(long = "schema", value_name = "SCHEMA_JSON")]
    pub schema: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long = "format", value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Print the static size of the --schema definition and exit
    #[arg(long = "static-size", requires = "schema")]
    pub static_size: bool,

    /// List registered file extensions
    #[arg(long = "list-formats")]
    pub list_formats: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

pub fn write_record<W: Write>(record: &Record, format: OutputFormat, out: &mut W) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, record)?;
            writeln!(out)
        }
        OutputFormat::Debug => {
            writeln!(out, "{}", record.schema().name())?;
            write_fields(record, 1, out)
        }
    }
}

fn write_fields<W: Write>(record: &Record, depth: usize, out: &mut W) -> io::Result<()> {
    for (name, value) in record.iter() {
        write_value(name, value, depth, out)?;
    }
    Ok(())
}

fn write_value<W: Write>(label: &str, value: &Value, depth: usize, out: &mut W) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    match value {
        Value::Record(record) => {
            writeln!(out, "{indent}{label}: {}", record.schema().name())?;
            write_fields(record, depth + 1, out)
        }
        Value::Array(items) => {
            writeln!(out, "{indent}{label}: [{}]", items.len())?;
            for (i, item) in items.iter().enumerate() {
                write_value(&format!("[{i}]"), item, depth + 1, out)?;
            }
            Ok(())
        }
        Value::Bytes(bytes) => writeln!(out, "{indent}{label}: {}", hex(bytes)),
        other => match other.as_i64() {
            Some(n) => writeln!(out, "{indent}{label}: {n}"),
            None => writeln!(out, "{indent}{label}: {}", other.as_u64().unwrap_or_default()),
        },
    }
}

fn hex(bytes: &[u8]) -> String {
    let shown = bytes.len().min(MAX_INLINE_BYTES);
    let mut text = bytes[..shown]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ");
    if bytes.len() > shown {
        text.push_str(&format!(" .. ({} bytes)", bytes.len()));
    }
    text
}
