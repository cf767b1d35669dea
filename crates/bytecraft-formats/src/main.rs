//! bytecraft CLI entry point.

use std::fs;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytecraft::{def::SchemaDef, schema::Schema, stream::Reader};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bytecraft_formats::Registry;
use bytecraft_formats::cli::{Args, write_record};

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = args.log_filter();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let registry = Registry::with_builtin();
    if args.list_formats {
        for extension in registry.extensions() {
            println!("{extension}");
        }
        return Ok(());
    }

    let schema = args
        .schema
        .as_ref()
        .map(|path| {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read schema file: {}", path.display()))?;
            let def: SchemaDef = serde_json::from_str(&text)
                .with_context(|| format!("Invalid schema definition: {}", path.display()))?;
            Ok::<_, anyhow::Error>(Arc::<Schema>::try_from(def)?)
        })
        .transpose()?;

    if args.static_size {
        if let Some(schema) = &schema {
            println!("{}", schema.static_size());
        }
        return Ok(());
    }

    let file = args.file.context("FILE required. Use --help for usage.")?;
    let record = match &schema {
        Some(schema) => {
            let handle = fs::File::open(&file)
                .with_context(|| format!("Failed to open file: {}", file.display()))?;
            schema.parse(&mut Reader::new(io::BufReader::new(handle)))?
        }
        None => registry.parse_file(&file, args.extension.as_deref())?,
    };

    write_record(&record, args.format, &mut io::stdout().lock())?;
    Ok(())
}
