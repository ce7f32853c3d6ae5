//! Run generator: buffers incoming lines under three keys and spills sorted
//! runs to disk once a buffer fills (spec §4.2).

use crate::buffer::SortBuffer;
use crate::config::EngineConfig;
use crate::error::SortError;
use crate::key::KeyKind;
use crate::run_file::{run_file_name, RunWriter};
use log::{debug, info};
use num_format::{Locale, ToFormattedString};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// The run files produced for each key, in the order they were written.
#[derive(Debug, Default, Clone)]
pub struct RunSet {
    pub id_runs: Vec<PathBuf>,
    pub name_runs: Vec<PathBuf>,
    pub continent_runs: Vec<PathBuf>,
}

pub struct RunGenerator<'a> {
    config: &'a EngineConfig,
    seq: AtomicU64,
}

impl<'a> RunGenerator<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        RunGenerator {
            config,
            seq: AtomicU64::new(0),
        }
    }

    /// Consumes an iterator of lines (with or without trailing `\n`),
    /// appending `\n` where missing, and produces three disjoint sets of
    /// sorted run files.
    pub fn generate<I>(&self, lines: I) -> Result<RunSet, SortError>
    where
        I: IntoIterator<Item = String>,
    {
        let start = Instant::now();
        let mut id_buf = SortBuffer::new(self.config.mem_limit_records);
        let mut name_buf = SortBuffer::new(self.config.mem_limit_records);
        let mut cont_buf = SortBuffer::new(self.config.mem_limit_records);
        let mut run_set = RunSet::default();
        let mut total_records: u64 = 0;

        for raw in lines {
            let line: Arc<[u8]> = normalize_line(raw).into_boxed_slice().into();
            id_buf.push(Arc::clone(&line));
            name_buf.push(Arc::clone(&line));
            cont_buf.push(line);
            total_records += 1;

            if id_buf.is_full() {
                self.flush(&mut id_buf, KeyKind::Id, &mut run_set.id_runs)?;
            }
            if name_buf.is_full() {
                self.flush(&mut name_buf, KeyKind::Name, &mut run_set.name_runs)?;
            }
            if cont_buf.is_full() {
                self.flush(&mut cont_buf, KeyKind::Continent, &mut run_set.continent_runs)?;
            }
        }

        if !id_buf.is_empty() {
            self.flush(&mut id_buf, KeyKind::Id, &mut run_set.id_runs)?;
        }
        if !name_buf.is_empty() {
            self.flush(&mut name_buf, KeyKind::Name, &mut run_set.name_runs)?;
        }
        if !cont_buf.is_empty() {
            self.flush(&mut cont_buf, KeyKind::Continent, &mut run_set.continent_runs)?;
        }

        info!(
            "run-generation: {} records -> {} id runs, {} name runs, {} continent runs in {:.2?}",
            total_records.to_formatted_string(&Locale::en),
            run_set.id_runs.len(),
            run_set.name_runs.len(),
            run_set.continent_runs.len(),
            start.elapsed()
        );
        Ok(run_set)
    }

    fn flush(
        &self,
        buffer: &mut SortBuffer,
        kind: KeyKind,
        runs: &mut Vec<PathBuf>,
    ) -> Result<(), SortError> {
        buffer.sort_by_key(kind);
        let lines = buffer.take();
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let path = self.config.run_dir.join(run_file_name(kind, seq));

        let mut writer = RunWriter::create(&path, self.config.run_writer_buffer_bytes)?;
        for line in &lines {
            writer.write_line(line)?;
        }
        writer.finish()?;

        debug!(
            "run-generation: flushed {} records to {:?}",
            lines.len().to_formatted_string(&Locale::en),
            path
        );
        runs.push(path);
        Ok(())
    }
}

fn normalize_line(mut line: String) -> Vec<u8> {
    if !line.ends_with('\n') {
        line.push('\n');
    }
    line.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{compare, KeyKind};
    use std::fs;
    use tempfile::tempdir;

    fn run_contents(path: &PathBuf) -> Vec<String> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn empty_input_produces_no_runs() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::new(dir.path(), 2).unwrap();
        let gen = RunGenerator::new(&config);
        let run_set = gen.generate(Vec::<String>::new()).unwrap();
        assert!(run_set.id_runs.is_empty());
        assert!(run_set.name_runs.is_empty());
        assert!(run_set.continent_runs.is_empty());
    }

    #[test]
    fn exact_multiple_of_mem_limit_leaves_no_residual_flush() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::new(dir.path(), 2).unwrap();
        let gen = RunGenerator::new(&config);
        let lines = vec![
            "1,a,x,Asia".to_string(),
            "2,b,x,Asia".to_string(),
        ];
        let run_set = gen.generate(lines).unwrap();
        assert_eq!(run_set.id_runs.len(), 1);
        assert_eq!(run_set.name_runs.len(), 1);
        assert_eq!(run_set.continent_runs.len(), 1);
    }

    #[test]
    fn one_more_than_mem_limit_produces_two_runs() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::new(dir.path(), 2).unwrap();
        let gen = RunGenerator::new(&config);
        let lines = vec![
            "3,c,x,Asia".to_string(),
            "1,a,x,Asia".to_string(),
            "2,b,x,Asia".to_string(),
        ];
        let run_set = gen.generate(lines).unwrap();
        assert_eq!(run_set.id_runs.len(), 2);
    }

    #[test]
    fn missing_newline_is_normalized() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::new(dir.path(), 1).unwrap();
        let gen = RunGenerator::new(&config);
        let run_set = gen.generate(vec!["1,a,b,C".to_string()]).unwrap();
        let contents = fs::read(&run_set.id_runs[0]).unwrap();
        assert_eq!(contents, b"1,a,b,C\n");
    }

    #[test]
    fn flushed_run_is_sorted_under_its_key() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::new(dir.path(), 3).unwrap();
        let gen = RunGenerator::new(&config);
        let lines = vec![
            "3,bob,a,Asia".to_string(),
            "1,carol,a,Europe".to_string(),
            "2,alice,a,Africa".to_string(),
        ];
        let run_set = gen.generate(lines).unwrap();

        let id_lines = run_contents(&run_set.id_runs[0]);
        for w in id_lines.windows(2) {
            assert_ne!(
                compare(KeyKind::Id, w[0].as_bytes(), w[1].as_bytes()),
                std::cmp::Ordering::Greater
            );
        }

        let cont_lines = run_contents(&run_set.continent_runs[0]);
        assert_eq!(cont_lines[0], "2,alice,a,Africa");
        assert_eq!(cont_lines[1], "3,bob,a,Asia");
        assert_eq!(cont_lines[2], "1,carol,a,Europe");
    }

    #[test]
    fn sequence_numbers_are_monotonic_and_shared_across_keys() {
        let dir = tempdir().unwrap();
        let config = EngineConfig::new(dir.path(), 1).unwrap();
        let gen = RunGenerator::new(&config);
        let run_set = gen.generate(vec!["1,a,b,c".to_string()]).unwrap();
        // one flush call per key -> three distinct sequence numbers
        let mut seqs: Vec<u64> = vec![
            seq_of(&run_set.id_runs[0]),
            seq_of(&run_set.name_runs[0]),
            seq_of(&run_set.continent_runs[0]),
        ];
        seqs.sort_unstable();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    fn seq_of(path: &PathBuf) -> u64 {
        let name = path.file_name().unwrap().to_str().unwrap();
        name.split('.').nth(2).unwrap().parse().unwrap()
    }
}
