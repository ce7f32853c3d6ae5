//! CLI front-end driving the sort engine against local files, standing in
//! for the broker producer/consumer adapters that are out of scope for the
//! engine itself.
//!
//! Configuration is layered the way the rest of this stack is layered:
//! compiled-in defaults, overridable by environment variables, overridable
//! again by CLI flags.

use anyhow::{Context, Result};
use clap::Parser;
use keysort_engine::{orchestrator::Sinks, EngineConfig};
use log::info;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

const DEFAULT_MEM_LIMIT_RECORDS: usize = 100_000;
const DEFAULT_INPUT_CHANNEL_CAPACITY: usize = 10_000;
const DEFAULT_MERGE_READER_BUFFER_BYTES: usize = 1 << 20;
const DEFAULT_RUN_WRITER_BUFFER_BYTES: usize = 1 << 20;

/// Sorts a CSV-shaped input by id, name, and continent, each to its own
/// output file.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file; reads stdin if omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory used for intermediate run files
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,

    /// Max records buffered per key before a run is spilled to disk.
    /// Falls back to MEM_LIMIT_RECORDS, then a compiled-in default.
    #[arg(long)]
    mem_limit: Option<usize>,

    /// Bounded channel capacity between the input reader and the run
    /// generator. Falls back to INPUT_CHANNEL_CAPACITY, then a compiled-in default.
    #[arg(long)]
    channel_cap: Option<usize>,

    /// Per-source read buffer size during merge. Falls back to
    /// MERGE_READER_BUFFER_BYTES, then a compiled-in default.
    #[arg(long)]
    merge_buf_bytes: Option<usize>,

    /// Write buffer size during run spill. Falls back to
    /// RUN_WRITER_BUFFER_BYTES, then a compiled-in default.
    #[arg(long)]
    run_writer_buf_bytes: Option<usize>,

    /// Output file for the id-sorted stream
    #[arg(long, default_value = "sorted_by_id.csv")]
    out_id: PathBuf,

    /// Output file for the name-sorted stream
    #[arg(long, default_value = "sorted_by_name.csv")]
    out_name: PathBuf,

    /// Output file for the continent-sorted stream
    #[arg(long, default_value = "sorted_by_continent.csv")]
    out_continent: PathBuf,
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn main() -> Result<()> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mem_limit = cli
        .mem_limit
        .unwrap_or_else(|| env_usize("MEM_LIMIT_RECORDS", DEFAULT_MEM_LIMIT_RECORDS));
    let channel_cap = cli
        .channel_cap
        .unwrap_or_else(|| env_usize("INPUT_CHANNEL_CAPACITY", DEFAULT_INPUT_CHANNEL_CAPACITY));
    let merge_buf_bytes = cli.merge_buf_bytes.unwrap_or_else(|| {
        env_usize(
            "MERGE_READER_BUFFER_BYTES",
            DEFAULT_MERGE_READER_BUFFER_BYTES,
        )
    });
    let run_writer_buf_bytes = cli.run_writer_buf_bytes.unwrap_or_else(|| {
        env_usize("RUN_WRITER_BUFFER_BYTES", DEFAULT_RUN_WRITER_BUFFER_BYTES)
    });

    let config = EngineConfig::new(cli.run_dir, mem_limit)
        .and_then(|c| c.with_input_channel_capacity(channel_cap))
        .and_then(|c| c.with_merge_reader_buffer_bytes(merge_buf_bytes))
        .and_then(|c| c.with_run_writer_buffer_bytes(run_writer_buf_bytes))
        .context("invalid configuration")?;

    let source: Box<dyn BufRead + Send> = match &cli.input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut id_writer =
        BufWriter::new(File::create(&cli.out_id).with_context(|| format!("creating {:?}", cli.out_id))?);
    let mut name_writer = BufWriter::new(
        File::create(&cli.out_name).with_context(|| format!("creating {:?}", cli.out_name))?,
    );
    let mut continent_writer = BufWriter::new(
        File::create(&cli.out_continent)
            .with_context(|| format!("creating {:?}", cli.out_continent))?,
    );

    let start = Instant::now();
    let sinks = Sinks {
        id: Box::new(move |line: &str| {
            id_writer.write_all(line.as_bytes())?;
            Ok(())
        }),
        name: Box::new(move |line: &str| {
            name_writer.write_all(line.as_bytes())?;
            Ok(())
        }),
        continent: Box::new(move |line: &str| {
            continent_writer.write_all(line.as_bytes())?;
            Ok(())
        }),
    };

    keysort_engine::run(&config, source, sinks).context("sort failed")?;

    info!("keysort: finished in {:.2?}", start.elapsed());
    Ok(())
}
