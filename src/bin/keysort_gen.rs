//! Generates synthetic `id,name,address,continent` input for exercising the
//! sort engine at scale. Stands in for the out-of-scope synthetic data
//! generator; produces a different schema than the broker-facing original.

use anyhow::{Context, Result};
use humansize::{format_size, DECIMAL};
use rand::Rng;
use rayon::prelude::*;
use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

const CONTINENTS: &[&str] = &[
    "Africa",
    "Asia",
    "Europe",
    "NorthAmerica",
    "SouthAmerica",
    "Oceania",
    "Antarctica",
];

const FIRST_NAMES: &[&str] = &[
    "alice", "bob", "carol", "dave", "erin", "frank", "grace", "heidi",
];

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <output_path> <row_count>", args[0]);
        std::process::exit(1);
    }
    let rows: usize = args[2]
        .parse()
        .context("row_count must be a non-negative integer")?;

    let start = Instant::now();
    let written = generate_csv(&args[1], rows)?;

    let metadata = std::fs::metadata(&args[1])?;
    println!(
        "wrote {} rows ({}) to {} in {:.2?}",
        written,
        format_size(metadata.len(), DECIMAL),
        args[1],
        start.elapsed()
    );
    Ok(())
}

/// Writes `rows` synthetic `id,name,address,continent` lines to `output_path`
/// and returns the number of rows written.
fn generate_csv(output_path: &str, rows: usize) -> Result<usize> {
    let file = File::create(output_path).with_context(|| format!("creating {}", output_path))?;
    let mut writer = BufWriter::with_capacity(16 * 1024 * 1024, file);

    let batch_size = 200_000;
    let mut written = 0usize;
    let mut next_id: i64 = 1;

    while written < rows {
        let take = batch_size.min(rows - written);
        let batch_start = next_id;
        let lines: Vec<String> = (0..take)
            .into_par_iter()
            .map(|i| {
                let id = batch_start + i as i64;
                let mut rng = rand::thread_rng();
                let name = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
                let address = format!("addr{}", rng.gen_range(1000..9999));
                let continent = CONTINENTS[rng.gen_range(0..CONTINENTS.len())];
                format!("{},{},{},{}", id, name, address, continent)
            })
            .collect();

        let batch = lines.join("\n");
        writer.write_all(batch.as_bytes())?;
        writer.write_all(b"\n")?;
        written += take;
        next_id += take as i64;
    }
    writer.flush()?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn writes_requested_row_count() -> Result<()> {
        let path = std::env::temp_dir().join("keysort_gen_test_small.csv");
        let path_str = path.to_str().unwrap();
        let written = generate_csv(path_str, 137)?;
        assert_eq!(written, 137);
        let content = fs::read_to_string(&path)?;
        assert_eq!(content.lines().count(), 137);
        fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn zero_rows_produces_empty_file() -> Result<()> {
        let path = std::env::temp_dir().join("keysort_gen_test_empty.csv");
        let path_str = path.to_str().unwrap();
        let written = generate_csv(path_str, 0)?;
        assert_eq!(written, 0);
        let metadata = fs::metadata(&path)?;
        assert_eq!(metadata.len(), 0);
        fs::remove_file(&path)?;
        Ok(())
    }
}
