//! Plain-text dictionary backing the diagnostics tool.
//!
//! One entry per line: `reading<TAB>surface<TAB>cost[<TAB>left_id<TAB>right_id]`.
//! Empty lines and lines starting with `#` are skipped.


use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use henkan_core::segments::Candidate;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum DictSourceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: invalid number {value:?}")]
    InvalidNumber { line: usize, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub reading: String,
    pub surface: String,
    pub cost: i32,
    pub left_id: u16,
    pub right_id: u16,
}

impl DictEntry {
    pub fn to_candidate(&self) -> Candidate {
        let mut c = Candidate::new(self.reading.as_str(), self.surface.as_str());
        c.cost = self.cost;
        c.word_cost = self.cost;
        c.left_id = self.left_id;
        c.right_id = self.right_id;
        c
    }
}

/// Reading and surface indexes over the loaded entries. Entries under one
/// reading are kept in ascending cost order.
#[derive(Debug, Default)]
pub struct TsvDictionary {
    by_reading: HashMap<String, Vec<DictEntry>>,
    by_surface: HashMap<String, Vec<String>>,
    max_reading_len: usize,
    max_surface_len: usize,
}

fn parse_number<T: std::str::FromStr>(field: &str, line: usize) -> Result<T, DictSourceError> {
    field
        .trim()
        .parse()
        .map_err(|_| DictSourceError::InvalidNumber {
            line,
            value: field.to_string(),
        })
}

fn parse_line(fields: &[&str], line: usize) -> Result<DictEntry, DictSourceError> {
    let (left_id, right_id) = match fields.len() {
        3 => (0, 0),
        5 => (parse_number(fields[3], line)?, parse_number(fields[4], line)?),
        n => {
            return Err(DictSourceError::Parse {
                line,
                message: format!("expected 3 or 5 tab-separated fields, found {n}"),
            })
        }
    };
    if fields[0].is_empty() || fields[1].is_empty() {
        return Err(DictSourceError::Parse {
            line,
            message: "empty reading or surface".to_string(),
        });
    }
    Ok(DictEntry {
        reading: fields[0].to_string(),
        surface: fields[1].to_string(),
        cost: parse_number(fields[2], line)?,
        left_id,
        right_id,
    })
}

/// Longest prefix of `text` that is a key of `map`, looking at most
/// `max_len` characters ahead.
fn longest_prefix<'a, V>(map: &HashMap<String, V>, max_len: usize, text: &'a str) -> Option<&'a str> {
    let ends: Vec<usize> = text
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take(max_len)
        .collect();
    ends.iter()
        .rev()
        .map(|&end| &text[..end])
        .find(|prefix| map.contains_key(*prefix))
}

impl TsvDictionary {
    pub fn open(path: &Path) -> Result<Self, DictSourceError> {
        let content = fs::read_to_string(path)?;
        let dict = Self::parse(&content)?;
        info!(path = %path.display(), entries = dict.len(), "dictionary loaded");
        Ok(dict)
    }

    pub fn parse(content: &str) -> Result<Self, DictSourceError> {
        let mut entries = Vec::new();
        let mut skipped = 0usize;
        for (i, line) in content.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                skipped += 1;
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            entries.push(parse_line(&fields, i + 1)?);
        }
        let dict = Self::from_entries(entries);
        debug!(readings = dict.by_reading.len(), skipped, "parsed dictionary");
        Ok(dict)
    }

    /// Index `entries`; each reading's list is ordered by cost.
    pub fn from_entries(entries: impl IntoIterator<Item = DictEntry>) -> Self {
        let mut dict = Self::default();
        for entry in entries {
            dict.insert(entry);
        }
        for list in dict.by_reading.values_mut() {
            list.sort_by_key(|e| e.cost);
        }
        dict
    }

    fn insert(&mut self, entry: DictEntry) {
        self.max_reading_len = self.max_reading_len.max(entry.reading.chars().count());
        self.max_surface_len = self.max_surface_len.max(entry.surface.chars().count());
        let readings = self.by_surface.entry(entry.surface.clone()).or_default();
        if !readings.contains(&entry.reading) {
            readings.push(entry.reading.clone());
        }
        self.by_reading
            .entry(entry.reading.clone())
            .or_default()
            .push(entry);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.by_reading.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_reading.is_empty()
    }

    /// Exact lookup by reading.
    pub fn lookup(&self, reading: &str) -> &[DictEntry] {
        self.by_reading.get(reading).map(Vec::as_slice).unwrap_or_default()
    }

    /// Entries whose reading starts with `prefix`, cheapest first. Ties are
    /// broken by reading so the order is stable.
    pub fn predictive(&self, prefix: &str) -> Vec<&DictEntry> {
        let mut found: Vec<&DictEntry> = self
            .by_reading
            .iter()
            .filter(|(reading, _)| reading.starts_with(prefix))
            .flat_map(|(_, entries)| entries.iter())
            .collect();
        found.sort_by(|a, b| a.cost.cmp(&b.cost).then_with(|| a.reading.cmp(&b.reading)));
        found
    }

    /// Readings registered for `surface`, in load order.
    pub fn readings_of(&self, surface: &str) -> &[String] {
        self.by_surface.get(surface).map(Vec::as_slice).unwrap_or_default()
    }

    /// Longest registered reading that prefixes `text`.
    pub fn longest_reading<'a>(&self, text: &'a str) -> Option<&'a str> {
        longest_prefix(&self.by_reading, self.max_reading_len, text)
    }

    /// Longest registered surface that prefixes `text`.
    pub fn longest_surface<'a>(&self, text: &'a str) -> Option<&'a str> {
        longest_prefix(&self.by_surface, self.max_surface_len, text)
    }
}
