use std::fmt::Display;
use std::fmt::Formatter;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;

use log::warn;

use crate::error::IoResultExt;
use crate::Entry;
use crate::Error;
use crate::Field;
use crate::Result;
use crate::Walker;

/// A header field that differs between two entries.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Change {
    /// The field.
    pub field: Field,
    /// Value in the first archive.
    pub from: u32,
    /// Value in the second archive.
    pub to: u32,
}

impl Display for Change {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.field {
            Field::Mode => write!(f, "{}: 0{:o} -> 0{:o}", self.field, self.from, self.to),
            _ => write!(f, "{}: {} -> {}", self.field, self.from, self.to),
        }
    }
}

/// Differences of one pair of entries.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EntryReport {
    /// Entry name (taken from the first archive).
    pub name: String,
    /// Differing fields in on-disk order.
    pub changes: Vec<Change>,
}

/// The result of comparing two archives entry by entry.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Report {
    /// Entries present in both archives that have at least one differing field.
    pub entries: Vec<EntryReport>,
    /// Entries of the first archive that have no counterpart in the second one.
    pub missing_in_second: Vec<String>,
    /// Entries of the second archive that have no counterpart in the first one.
    pub missing_in_first: Vec<String>,
}

impl Report {
    /// No differences and no missing entries?
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
            && self.missing_in_second.is_empty()
            && self.missing_in_first.is_empty()
    }

    /// Total number of differing fields.
    pub fn num_changes(&self) -> usize {
        self.entries.iter().map(|entry| entry.changes.len()).sum()
    }
}

/// Read all entries that precede the trailer.
pub fn read_headers<R: Read + Seek>(reader: R) -> Result<Vec<Entry>> {
    let mut walker = Walker::new(reader);
    let mut entries = Vec::new();
    while let Some(entry) = walker.next_entry()? {
        if !entry.name.is_trailer() {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Compare headers of two entries with the same name.
///
/// `index` is the entry's position in the archive and is used in the error message only.
pub fn compare_headers(index: usize, a: &Entry, b: &Entry) -> Result<Vec<Change>> {
    if a.name.as_bytes() != b.name.as_bytes() {
        return Err(Error::NameMismatch {
            index,
            left: a.name.to_string_lossy(),
            right: b.name.to_string_lossy(),
        });
    }
    let changes = Field::NUMERIC
        .into_iter()
        .filter_map(|field| {
            let from = a.header.get(field);
            let to = b.header.get(field);
            (from != to).then_some(Change { field, from, to })
        })
        .collect();
    Ok(changes)
}

/// Compare two archives entry by entry.
///
/// Entries are matched by position. Differently named entries at the same
/// position abort the comparison; surplus entries in either archive are
/// reported and logged, but do not stop it.
pub fn compare<R1, R2>(a: R1, b: R2) -> Result<Report>
where
    R1: Read + Seek,
    R2: Read + Seek,
{
    let a = read_headers(a)?;
    let b = read_headers(b)?;
    let mut report = Report::default();
    for (index, entry_a) in a.iter().enumerate() {
        let Some(entry_b) = b.get(index) else {
            let name = entry_a.name.to_string_lossy();
            warn!("{}: no such entry in the second archive", name);
            report.missing_in_second.push(name);
            continue;
        };
        let changes = compare_headers(index, entry_a, entry_b)?;
        if !changes.is_empty() {
            report.entries.push(EntryReport {
                name: entry_a.name.to_string_lossy(),
                changes,
            });
        }
    }
    for entry_b in b.iter().skip(a.len()) {
        let name = entry_b.name.to_string_lossy();
        warn!("{}: no such entry in the first archive", name);
        report.missing_in_first.push(name);
    }
    Ok(report)
}

/// Compare archives stored in files.
pub fn compare_files(a: &Path, b: &Path) -> Result<Report> {
    let file_a = File::open(a).op("open the first archive")?;
    let file_b = File::open(b).op("open the second archive")?;
    compare(BufReader::new(file_a), BufReader::new(file_b))
}
