//! K-way merge of sorted run files via a min-heap (spec §4.3).

use crate::error::SortError;
use crate::key::{compare, KeyKind};
use crate::run_file::RunReader;
use log::{debug, info, warn};
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::{Path, PathBuf};
use std::time::Instant;

struct HeapEntry {
    line: String,
    source_index: usize,
    kind: KeyKind,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        compare(self.kind, self.line.as_bytes(), other.line.as_bytes()) == Ordering::Equal
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the smallest key pops first.
        compare(self.kind, other.line.as_bytes(), self.line.as_bytes())
    }
}

/// Merges `run_files`, all sorted under `kind`, invoking `line_handler` once
/// per emitted line in order. Aborts and propagates if the handler errors.
pub fn merge<F>(
    run_files: &[PathBuf],
    kind: KeyKind,
    buffer_bytes: usize,
    mut line_handler: F,
) -> Result<(), SortError>
where
    F: FnMut(&str) -> anyhow::Result<()>,
{
    let start = Instant::now();
    let mut readers: Vec<RunReader> = Vec::with_capacity(run_files.len());
    for path in run_files {
        match RunReader::open(path, buffer_bytes) {
            Ok(r) => readers.push(r),
            Err(e) => {
                // readers already opened are dropped here, closing their handles.
                return Err(e);
            }
        }
    }

    let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::with_capacity(readers.len());
    for (idx, reader) in readers.iter_mut().enumerate() {
        push_next(reader, idx, kind, &mut heap);
    }

    let mut emitted: u64 = 0;
    while let Some(entry) = heap.pop() {
        line_handler(&entry.line).map_err(|source| SortError::Handler {
            key: kind.as_str(),
            source,
        })?;
        emitted += 1;
        push_next(&mut readers[entry.source_index], entry.source_index, kind, &mut heap);
    }

    info!(
        "merge[{}]: {} files, {} lines emitted in {:.2?}",
        kind.as_str(),
        run_files.len(),
        emitted.to_formatted_string(&Locale::en),
        start.elapsed()
    );
    Ok(())
}

fn push_next(
    reader: &mut RunReader,
    source_index: usize,
    kind: KeyKind,
    heap: &mut BinaryHeap<HeapEntry>,
) {
    let mut buf = String::new();
    match reader.read_line_into(&mut buf) {
        Ok(true) => heap.push(HeapEntry {
            line: buf,
            source_index,
            kind,
        }),
        Ok(false) => debug!("merge[{}]: exhausted {:?}", kind.as_str(), reader.path),
        Err(e) => warn!(
            "merge[{}]: read error on {:?}, treating source as exhausted: {}",
            kind.as_str(),
            reader.path,
            e
        ),
    }
}

/// Deletes run files after a successful merge. Best-effort: a failure to
/// remove one file is logged and does not abort cleanup of the rest.
pub fn cleanup_run_files(run_files: &[PathBuf]) {
    for path in run_files {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("cleanup: failed to remove {:?}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run_file::RunWriter;
    use tempfile::tempdir;

    fn write_run(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut w = RunWriter::create(&path, 4096).unwrap();
        for line in lines {
            w.write_line(format!("{}\n", line).as_bytes()).unwrap();
        }
        w.finish().unwrap();
        path
    }

    #[test]
    fn merges_two_sorted_runs_by_id() {
        let dir = tempdir().unwrap();
        let r1 = write_run(dir.path(), "id.run.1.tmp", &["1,a,x,Asia", "3,c,x,Asia"]);
        let r2 = write_run(dir.path(), "id.run.2.tmp", &["2,b,x,Asia"]);

        let mut out = Vec::new();
        merge(&[r1, r2], KeyKind::Id, 4096, |line| {
            out.push(line.to_string());
            Ok(())
        })
        .unwrap();

        assert_eq!(out, vec!["1,a,x,Asia\n", "2,b,x,Asia\n", "3,c,x,Asia\n"]);
    }

    #[test]
    fn merges_preserve_conservation() {
        let dir = tempdir().unwrap();
        let r1 = write_run(dir.path(), "name.run.1.tmp", &["1,zoe,x,Asia"]);
        let r2 = write_run(dir.path(), "name.run.2.tmp", &["2,amy,x,Asia"]);

        let mut out = Vec::new();
        merge(&[r1, r2], KeyKind::Name, 4096, |line| {
            out.push(line.to_string());
            Ok(())
        })
        .unwrap();

        assert_eq!(out.len(), 2);
        assert!(out.iter().any(|l| l.contains("zoe")));
        assert!(out.iter().any(|l| l.contains("amy")));
    }

    #[test]
    fn empty_run_list_emits_nothing() {
        let mut out: Vec<String> = Vec::new();
        merge(&[], KeyKind::Id, 4096, |line| {
            out.push(line.to_string());
            Ok(())
        })
        .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn handler_error_aborts_merge() {
        let dir = tempdir().unwrap();
        let r1 = write_run(
            dir.path(),
            "id.run.1.tmp",
            &["1,a,x,Asia", "2,b,x,Asia", "3,c,x,Asia"],
        );

        let mut count = 0;
        let result = merge(&[r1], KeyKind::Id, 4096, |_line| {
            count += 1;
            if count == 3 {
                anyhow::bail!("sink rejected line");
            }
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(count, 3);
    }
}
