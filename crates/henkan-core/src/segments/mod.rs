//! Segment list shared between the session layer and the converter.
//!
//! A `Segments` value is an ordered list split into a history prefix (the
//! leading run of `History`/`Submitted` segments) and a conversion suffix.
//! The split is derived from segment types on every call, so
//! `history_segments_len() + conversion_segments_len() == len()` holds by
//! construction.

mod candidate;
mod segment;


use std::collections::VecDeque;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::Serialize;
use tracing::debug;

use crate::settings::settings;

pub use candidate::{Attribute, Attributes, Candidate};
pub use segment::{Segment, SegmentType, TransliterationType, NUM_TRANSLITERATION_TYPES};

/// What a learning collaborator did when it recorded a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RevertKind {
    Create,
    Update,
}

/// Undo information left by a collaborator at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevertEntry {
    pub kind: RevertKind,
    /// Collaborator-defined owner id.
    pub id: u16,
    pub timestamp: u32,
    pub key: String,
}

#[derive(Debug, Clone)]
pub struct Segments {
    segments: Vec<Segment>,
    max_history_segments_size: usize,
    resized: bool,
    revert_entries: VecDeque<RevertEntry>,
}

impl Default for Segments {
    fn default() -> Self {
        Self::new()
    }
}

impl Segments {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            max_history_segments_size: settings().segments.max_history_segments_size,
            resized: false,
            revert_entries: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Segment> {
        self.segments.iter_mut()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, i: usize) -> Option<&Segment> {
        self.segments.get(i)
    }

    pub fn segment_mut(&mut self, i: usize) -> Option<&mut Segment> {
        self.segments.get_mut(i)
    }

    pub fn history_segments_len(&self) -> usize {
        self.segments
            .iter()
            .take_while(|s| s.segment_type.is_history())
            .count()
    }

    pub fn conversion_segments_len(&self) -> usize {
        self.segments.len() - self.history_segments_len()
    }

    pub fn history_segments(&self) -> &[Segment] {
        &self.segments[..self.history_segments_len()]
    }

    pub fn conversion_segments(&self) -> &[Segment] {
        &self.segments[self.history_segments_len()..]
    }

    pub fn conversion_segments_mut(&mut self) -> &mut [Segment] {
        let h = self.history_segments_len();
        &mut self.segments[h..]
    }

    pub fn history_segment(&self, i: usize) -> Option<&Segment> {
        self.history_segments().get(i)
    }

    pub fn conversion_segment(&self, i: usize) -> Option<&Segment> {
        self.conversion_segments().get(i)
    }

    pub fn conversion_segment_mut(&mut self, i: usize) -> Option<&mut Segment> {
        self.conversion_segments_mut().get_mut(i)
    }

    pub fn push_segment(&mut self, segment: Segment) -> &mut Segment {
        self.segments.push(segment);
        let last = self.segments.len() - 1;
        &mut self.segments[last]
    }

    /// Insert at `i`, clamped to the end of the list.
    pub fn insert_segment(&mut self, i: usize, segment: Segment) -> &mut Segment {
        let i = i.min(self.segments.len());
        self.segments.insert(i, segment);
        &mut self.segments[i]
    }

    pub fn erase_segment(&mut self, i: usize) -> Option<Segment> {
        (i < self.segments.len()).then(|| self.segments.remove(i))
    }

    /// Remove up to `len` segments starting at `start`.
    pub fn erase_segments(&mut self, start: usize, len: usize) {
        let start = start.min(self.segments.len());
        let end = start.saturating_add(len).min(self.segments.len());
        self.segments.drain(start..end);
    }

    pub fn pop_front_segment(&mut self) -> Option<Segment> {
        (!self.segments.is_empty()).then(|| self.segments.remove(0))
    }

    /// Drop every segment, revert entry and the resized flag.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.revert_entries.clear();
        self.resized = false;
    }

    pub fn clear_conversion_segments(&mut self) {
        let h = self.history_segments_len();
        self.segments.truncate(h);
        self.resized = false;
    }

    /// Replace the conversion segments with one `Free` segment holding
    /// `key`, and restore the default history depth.
    pub fn set_conversion_key(&mut self, key: &str) {
        self.max_history_segments_size = settings().segments.max_history_segments_size;
        self.clear_conversion_segments();
        self.push_segment(Segment::new(key, SegmentType::Free));
    }

    pub fn max_history_segments_size(&self) -> usize {
        self.max_history_segments_size
    }

    pub fn set_max_history_segments_size(&mut self, size: usize) {
        self.max_history_segments_size = size;
    }

    pub fn resized(&self) -> bool {
        self.resized
    }

    pub fn set_resized(&mut self, resized: bool) {
        self.resized = resized;
    }

    /// Record undo information. The oldest entry is evicted once the queue
    /// holds `segments.max_revert_entries` entries.
    pub fn push_revert_entry(&mut self, entry: RevertEntry) {
        let max = settings().segments.max_revert_entries;
        while self.revert_entries.len() >= max {
            if let Some(evicted) = self.revert_entries.pop_front() {
                debug!(key = %evicted.key, "evicting revert entry");
            }
        }
        self.revert_entries.push_back(entry);
    }

    pub fn revert_entries(&self) -> impl Iterator<Item = &RevertEntry> {
        self.revert_entries.iter()
    }

    pub fn revert_entries_len(&self) -> usize {
        self.revert_entries.len()
    }

    pub fn clear_revert_entries(&mut self) {
        self.revert_entries.clear();
    }
}

impl<'a> IntoIterator for &'a Segments {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl Serialize for Segments {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Segments", 4)?;
        s.serialize_field("history_segments_size", &self.history_segments_len())?;
        s.serialize_field("max_history_segments_size", &self.max_history_segments_size)?;
        s.serialize_field("resized", &self.resized)?;
        s.serialize_field("segments", &self.segments)?;
        s.end()
    }
}

impl fmt::Display for Segments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.history_segments_len();
        for (i, seg) in self.segments.iter().enumerate() {
            let marker = if i < h { 'h' } else { 'c' };
            writeln!(f, "{marker}{i} {seg}")?;
        }
        Ok(())
    }
}
