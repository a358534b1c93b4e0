use std::fmt;

use serde::Serialize;

use crate::unicode::chars_len;

use super::candidate::Candidate;

/// Number of fixed transliteration forms a segment can carry as
/// meta-candidates.
pub const NUM_TRANSLITERATION_TYPES: usize = 11;

/// Fixed transliteration forms. The discriminant is the slot in
/// `Segment::meta_candidates`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransliterationType {
    Hiragana,
    FullKatakana,
    HalfAscii,
    HalfAsciiUpper,
    HalfAsciiLower,
    HalfAsciiCapitalized,
    FullAscii,
    FullAsciiUpper,
    FullAsciiLower,
    FullAsciiCapitalized,
    HalfKatakana,
}

impl TransliterationType {
    /// Slot in the meta-candidate list.
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// Negative candidate index addressing this form.
    pub const fn candidate_index(self) -> i32 {
        -(self as i32) - 1
    }
}

/// Lifecycle state of a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum SegmentType {
    /// Boundary and value may both change.
    #[default]
    Free,
    /// Boundary chosen by the user; value may change.
    FixedBoundary,
    /// Value chosen by the user.
    FixedValue,
    /// Committed through a partial suggestion, awaiting finish.
    Submitted,
    /// Finished text kept as context for the next conversion.
    History,
}

impl SegmentType {
    /// Types that belong to the history prefix of a segment list.
    pub fn is_history(self) -> bool {
        matches!(self, SegmentType::History | SegmentType::Submitted)
    }

    /// Types whose candidate list carries a user choice that re-conversion
    /// must not replace.
    pub fn keeps_value(self) -> bool {
        matches!(self, SegmentType::FixedValue | SegmentType::Submitted)
    }
}

/// One phonetic unit and the values proposed for it.
///
/// Candidate indices are signed: `i >= 0` addresses `candidates[i]` and
/// `i < 0` addresses `meta_candidates[-i - 1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub key: String,
    pub segment_type: SegmentType,
    pub candidates: Vec<Candidate>,
    pub meta_candidates: Vec<Candidate>,
}

impl Segment {
    pub fn new(key: impl Into<String>, segment_type: SegmentType) -> Self {
        Self {
            key: key.into(),
            segment_type,
            ..Self::default()
        }
    }

    /// Key length in characters.
    pub fn key_len(&self) -> usize {
        chars_len(&self.key)
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn is_valid_index(&self, i: i32) -> bool {
        if i < 0 {
            meta_slot(i) < self.meta_candidates.len()
        } else {
            (i as usize) < self.candidates.len()
        }
    }

    pub fn candidate(&self, i: i32) -> Option<&Candidate> {
        if i < 0 {
            self.meta_candidates.get(meta_slot(i))
        } else {
            self.candidates.get(i as usize)
        }
    }

    pub fn candidate_mut(&mut self, i: i32) -> Option<&mut Candidate> {
        if i < 0 {
            self.meta_candidates.get_mut(meta_slot(i))
        } else {
            self.candidates.get_mut(i as usize)
        }
    }

    pub fn push_candidate(&mut self, candidate: Candidate) -> &mut Candidate {
        self.candidates.push(candidate);
        let last = self.candidates.len() - 1;
        &mut self.candidates[last]
    }

    /// Insert at `i`, clamped to the end of the list.
    pub fn insert_candidate(&mut self, i: usize, candidate: Candidate) -> &mut Candidate {
        let i = i.min(self.candidates.len());
        self.candidates.insert(i, candidate);
        &mut self.candidates[i]
    }

    /// Store `candidate` in the slot for `t`, growing the meta list with empty
    /// entries when needed.
    pub fn set_meta_candidate(&mut self, t: TransliterationType, candidate: Candidate) {
        let slot = t.slot();
        if self.meta_candidates.len() <= slot {
            self.meta_candidates.resize_with(slot + 1, Candidate::default);
        }
        self.meta_candidates[slot] = candidate;
    }

    /// Move candidate `from` to position `to` of the regular list.
    ///
    /// Regular candidates are removed and reinserted so the rest keep their
    /// relative order. A meta-candidate is copied in and its slot is left
    /// intact. Returns `false` without mutating on an invalid index.
    pub fn move_candidate(&mut self, from: i32, to: usize) -> bool {
        if !self.is_valid_index(from) {
            return false;
        }
        if from < 0 {
            let meta = self.meta_candidates[meta_slot(from)].clone();
            self.insert_candidate(to, meta);
            return true;
        }
        let from = from as usize;
        if from == to {
            return true;
        }
        let c = self.candidates.remove(from);
        self.insert_candidate(to, c);
        true
    }

    pub fn clear_candidates(&mut self) {
        self.candidates.clear();
        self.meta_candidates.clear();
    }
}

fn meta_slot(i: i32) -> usize {
    (-(i as i64) - 1) as usize
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}:", self.segment_type, self.key)?;
        for (i, c) in self.candidates.iter().enumerate() {
            let sep = if i == 0 { " " } else { " | " };
            write!(f, "{sep}{}", c.value)?;
        }
        if !self.meta_candidates.is_empty() {
            let metas: Vec<&str> = self
                .meta_candidates
                .iter()
                .map(|c| c.value.as_str())
                .collect();
            write!(f, " (meta: {})", metas.join(" "))?;
        }
        Ok(())
    }
}
