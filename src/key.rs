//! Byte-level key extraction and comparison for the three sort keys.
//!
//! Every function here works directly on the bytes of an encoded line
//! (`id,name,address,continent\n`) and never allocates. Comparators read
//! straight out of the stored line bytes, which matters once buffers hold
//! hundreds of thousands of lines.

use std::cmp::Ordering;

/// Which of the three sort keys a buffer, run file, or merge is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Id,
    Name,
    Continent,
}

impl KeyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::Id => "id",
            KeyKind::Name => "name",
            KeyKind::Continent => "continent",
        }
    }
}

/// Parses the signed integer id from the prefix of `line`, up to the first `,`.
///
/// If no `,` is present the entire slice is parsed. Bytes other than an
/// optional leading `-` and ASCII digits before the first `,` are not valid
/// input; the engine trusts upstream CSV validity and does not guard against it.
pub fn extract_id(line: &[u8]) -> i64 {
    let end = line.iter().position(|&b| b == b',').unwrap_or(line.len());
    let field = &line[..end];
    let (neg, digits) = match field.first() {
        Some(b'-') => (true, &field[1..]),
        _ => (false, field),
    };
    let mut value: i64 = 0;
    for &b in digits {
        if b.is_ascii_digit() {
            value = value * 10 + i64::from(b - b'0');
        }
    }
    if neg {
        -value
    } else {
        value
    }
}

/// Returns the `[start, end)` byte bounds of the name field: the slice
/// between the 1st and 2nd comma. Returns `(0, 0)` if either comma is missing.
pub fn extract_name_bounds(line: &[u8]) -> (usize, usize) {
    let Some(first_comma) = line.iter().position(|&b| b == b',') else {
        return (0, 0);
    };
    let start = first_comma + 1;
    let Some(rel_second) = line[start..].iter().position(|&b| b == b',') else {
        return (0, 0);
    };
    (start, start + rel_second)
}

/// Returns the `[start, end)` byte bounds of the continent field: the slice
/// between the last comma and the terminating `\n` (or end of slice). Returns
/// `(0, 0)` if no comma is present.
pub fn extract_continent_bounds(line: &[u8]) -> (usize, usize) {
    let content_len = if line.last() == Some(&b'\n') {
        line.len() - 1
    } else {
        line.len()
    };
    let Some(last_comma) = line[..content_len].iter().rposition(|&b| b == b',') else {
        return (0, 0);
    };
    (last_comma + 1, content_len)
}

/// Compares two encoded lines under the given key. Never allocates.
pub fn compare(kind: KeyKind, a: &[u8], b: &[u8]) -> Ordering {
    match kind {
        KeyKind::Id => extract_id(a).cmp(&extract_id(b)),
        KeyKind::Name => {
            let (as_, ae) = extract_name_bounds(a);
            let (bs, be) = extract_name_bounds(b);
            a[as_..ae].cmp(&b[bs..be])
        }
        KeyKind::Continent => {
            let (as_, ae) = extract_continent_bounds(a);
            let (bs, be) = extract_continent_bounds(b);
            a[as_..ae].cmp(&b[bs..be])
        }
    }
}
