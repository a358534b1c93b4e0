//! Rebuild history segments from text the user typed before the composition.

use henkan_core::segments::{Attribute, Candidate, Segment, SegmentType, Segments};
use henkan_core::settings::settings;
use henkan_core::unicode::{fullwidth_ascii_to_halfwidth, script_type, ScriptType};
use tracing::debug;

pub trait HistoryReconstructor: Send + Sync {
    /// Append history segments derived from `preceding_text`.
    fn reconstruct_history(&self, preceding_text: &str, segments: &mut Segments) -> bool;
}

/// Turns a trailing number or Latin word into one `History` segment.
///
/// Only the last same-script run of `preceding_text` is used. A single
/// trailing space is skipped; two or more mean the context is broken.
pub struct ScriptHistoryReconstructor;

impl ScriptHistoryReconstructor {
    /// Trailing token with its grammar id, or `None` if it cannot serve as
    /// history.
    fn last_connective_part(preceding_text: &str) -> Option<(String, u16)> {
        let text = preceding_text.strip_suffix(' ').unwrap_or(preceding_text);
        let last = text.chars().next_back()?;
        if last == ' ' {
            return None;
        }

        let script = script_type(last);
        let pos = settings().pos;
        let id = match script {
            ScriptType::Number => pos.number_id,
            ScriptType::Alphabet => pos.unique_noun_id,
            _ => return None,
        };

        let mut token: Vec<char> = text
            .chars()
            .rev()
            .take_while(|&c| script_type(c) == script)
            .collect();
        token.reverse();
        Some((token.into_iter().collect(), id))
    }
}

impl HistoryReconstructor for ScriptHistoryReconstructor {
    fn reconstruct_history(&self, preceding_text: &str, segments: &mut Segments) -> bool {
        let Some((value, id)) = Self::last_connective_part(preceding_text) else {
            debug!(preceding_text, "no connective history");
            return false;
        };
        let key = fullwidth_ascii_to_halfwidth(&value);

        let seg = segments.push_segment(Segment::new(key.clone(), SegmentType::History));
        let c = seg.push_candidate(Candidate::new(key, value));
        c.left_id = id;
        c.right_id = id;
        c.attributes.insert(Attribute::NoLearning);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(text: &str) -> Option<Segments> {
        let mut segs = Segments::new();
        ScriptHistoryReconstructor
            .reconstruct_history(text, &mut segs)
            .then_some(segs)
    }

    #[test]
    fn test_trailing_number() {
        let segs = reconstruct("価格は１２３").unwrap();
        assert_eq!(segs.history_segments_len(), 1);
        let seg = segs.segment(0).unwrap();
        assert_eq!(seg.key, "123");
        let c = seg.candidate(0).unwrap();
        assert_eq!(c.value, "１２３");
        assert_eq!(c.content_value, "１２３");
        assert_eq!(c.content_key, "123");
        assert_eq!(c.left_id, settings().pos.number_id);
        assert_eq!(c.right_id, settings().pos.number_id);
        assert!(c.attributes.contains(Attribute::NoLearning));
    }

    #[test]
    fn test_trailing_alphabet_with_one_space() {
        let segs = reconstruct("hello Rust ").unwrap();
        let c = segs.segment(0).unwrap().candidate(0).unwrap();
        assert_eq!(c.value, "Rust");
        assert_eq!(c.left_id, settings().pos.unique_noun_id);
    }

    #[test]
    fn test_rejects_two_spaces() {
        assert!(reconstruct("abc  ").is_none());
    }

    #[test]
    fn test_rejects_other_scripts() {
        assert!(reconstruct("").is_none());
        assert!(reconstruct("きょう").is_none());
        assert!(reconstruct("東京").is_none());
        assert!(reconstruct("abc!").is_none());
    }
}
