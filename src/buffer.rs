//! In-memory sort buffer shared across the three keys.
//!
//! Each incoming line is stored once, behind an `Arc<[u8]>`, and a clone of
//! that `Arc` is pushed onto each of the three per-key buffers. This replaces
//! the naive approach of copying every line three times: the underlying bytes
//! are freed once the last buffer holding a reference to them is flushed.

use crate::key::{compare, KeyKind};
use rayon::slice::ParallelSliceMut;
use std::sync::Arc;

pub struct SortBuffer {
    lines: Vec<Arc<[u8]>>,
    capacity: usize,
}

impl SortBuffer {
    pub fn new(capacity: usize) -> Self {
        SortBuffer {
            lines: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, line: Arc<[u8]>) {
        self.lines.push(line);
    }

    pub fn is_full(&self) -> bool {
        self.lines.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Sorts the buffer in place under `kind`'s comparator, using a
    /// data-parallel sort since this is the only parallelism internal to one
    /// flush and does not change the sequential structure of ingest or merge.
    pub fn sort_by_key(&mut self, kind: KeyKind) {
        self.lines
            .par_sort_unstable_by(|a, b| compare(kind, a, b));
    }

    /// Drains the buffer, leaving it empty and ready to accept new lines.
    pub fn take(&mut self) -> Vec<Arc<[u8]>> {
        std::mem::take(&mut self.lines)
    }
}
