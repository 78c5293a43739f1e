use anyhow::{Context, Result};
use clap::Parser;
use riffscan::cli::Cli;
use riffscan::config::Options;
use riffscan::io::get_file_size;
use riffscan::logging;
use riffscan::riff::{walk, ChunkEntry, ChunkReader, ReadError};
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let options = cli.merge_into_options(Options::default())?;
    logging::init(options.log_level);

    let mut reader = ChunkReader::with_options(options.reader_options());
    reader
        .open(&cli.file)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;

    let form_type = reader.form_type().unwrap_or_default();
    let declared_size = reader.declared_size().unwrap_or_default();
    println!(
        "{}: '{}' container, form '{}', declared size {}",
        cli.file.display(),
        options.magic,
        form_type,
        declared_size
    );

    match get_file_size(&cli.file) {
        Ok(actual) if actual != u64::from(declared_size) + 8 => {
            log::warn!(
                "declared size {} does not match file size {}",
                declared_size,
                actual
            );
        }
        Ok(_) => {}
        Err(err) => log::debug!("could not read file size: {}", err),
    }

    if let Some(id) = options.find {
        return match reader.find_chunk(id) {
            Ok(header) => {
                let offset = reader.position()? - 8;
                println!(
                    "found '{}' at offset {}, length {}",
                    header.id, offset, header.length
                );
                Ok(ExitCode::SUCCESS)
            }
            Err(ReadError::End) => {
                println!("chunk '{}' not found", id);
                Ok(ExitCode::from(1))
            }
            Err(err) => Err(err).context("Chunk search failed"),
        };
    }

    let entries = walk(&mut reader, &options.walk_options()).context("Failed to read chunks")?;
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    log::info!("{} chunks listed", entries.len());

    reader.close();
    Ok(ExitCode::SUCCESS)
}

fn format_entry(entry: &ChunkEntry) -> String {
    let indent = "  ".repeat(entry.depth);
    match entry.list_type {
        Some(list_type) => format!(
            "{:>10}  {}{} '{}' ({} bytes)",
            entry.offset, indent, entry.header.id, list_type, entry.header.length
        ),
        None => format!(
            "{:>10}  {}{} ({} bytes)",
            entry.offset, indent, entry.header.id, entry.header.length
        ),
    }
}
