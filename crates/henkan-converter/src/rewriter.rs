use henkan_core::request::ConversionRequest;
use henkan_core::segments::{Candidate, Segments, TransliterationType};
use henkan_core::unicode::hiragana_to_katakana;

/// Boundary change asked for by a rewriter. `segment_index` is relative to
/// the first conversion segment; sizes are in characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSegmentsRequest {
    pub segment_index: usize,
    pub segment_sizes: Vec<u8>,
}

/// A rewriter that can add, reorder or annotate candidates after the lattice
/// search, and learn from what the user commits.
///
/// Segment indices passed to `focus` and `clear_history_entry` are absolute.
pub trait Rewriter: Send + Sync {
    /// Returns `true` if any segment changed.
    fn rewrite(&self, request: &ConversionRequest, segments: &mut Segments) -> bool;

    fn check_resize_segments_request(
        &self,
        _request: &ConversionRequest,
        _segments: &Segments,
    ) -> Option<ResizeSegmentsRequest> {
        None
    }

    fn focus(&self, _segments: &mut Segments, _segment_index: usize, _candidate_index: i32) -> bool {
        true
    }

    fn finish(&self, _request: &ConversionRequest, _segments: &mut Segments) {}

    fn revert(&self, _segments: &mut Segments) {}

    fn clear_history_entry(
        &self,
        _segments: &Segments,
        _segment_index: usize,
        _candidate_index: i32,
    ) -> bool {
        false
    }

    fn reload(&self) -> bool {
        true
    }

    fn sync(&self) -> bool {
        true
    }
}

/// Runs rewriters in order and merges their answers.
#[derive(Default)]
pub struct RewriterPipeline {
    rewriters: Vec<Box<dyn Rewriter>>,
}

impl RewriterPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, rewriter: impl Rewriter + 'static) -> Self {
        self.rewriters.push(Box::new(rewriter));
        self
    }

    pub fn len(&self) -> usize {
        self.rewriters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewriters.is_empty()
    }
}

impl Rewriter for RewriterPipeline {
    fn rewrite(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        let mut modified = false;
        for rw in &self.rewriters {
            modified |= rw.rewrite(request, segments);
        }
        modified
    }

    /// The first rewriter asking for a resize wins.
    fn check_resize_segments_request(
        &self,
        request: &ConversionRequest,
        segments: &Segments,
    ) -> Option<ResizeSegmentsRequest> {
        self.rewriters
            .iter()
            .find_map(|rw| rw.check_resize_segments_request(request, segments))
    }

    fn focus(&self, segments: &mut Segments, segment_index: usize, candidate_index: i32) -> bool {
        let mut ok = true;
        for rw in &self.rewriters {
            ok &= rw.focus(segments, segment_index, candidate_index);
        }
        ok
    }

    fn finish(&self, request: &ConversionRequest, segments: &mut Segments) {
        for rw in &self.rewriters {
            rw.finish(request, segments);
        }
    }

    fn revert(&self, segments: &mut Segments) {
        for rw in &self.rewriters {
            rw.revert(segments);
        }
    }

    fn clear_history_entry(
        &self,
        segments: &Segments,
        segment_index: usize,
        candidate_index: i32,
    ) -> bool {
        let mut removed = false;
        for rw in &self.rewriters {
            removed |= rw.clear_history_entry(segments, segment_index, candidate_index);
        }
        removed
    }

    fn reload(&self) -> bool {
        let mut ok = true;
        for rw in &self.rewriters {
            ok &= rw.reload();
        }
        ok
    }

    fn sync(&self) -> bool {
        let mut ok = true;
        for rw in &self.rewriters {
            ok &= rw.sync();
        }
        ok
    }
}

/// Worst (highest) cost among candidates, or 0 if empty.
fn worst_cost(candidates: &[Candidate]) -> i32 {
    candidates.iter().map(|c| c.cost).max().unwrap_or(0)
}

/// Adds a katakana candidate to every conversion segment and fills the
/// hiragana and full-width katakana meta-candidate slots.
///
/// The katakana candidate is appended with a cost higher than the worst
/// existing candidate, so it appears as a low-priority fallback.
pub struct KatakanaRewriter;

impl Rewriter for KatakanaRewriter {
    fn rewrite(&self, _request: &ConversionRequest, segments: &mut Segments) -> bool {
        let mut modified = false;
        for seg in segments.conversion_segments_mut() {
            if seg.key.is_empty() {
                continue;
            }
            let katakana = hiragana_to_katakana(&seg.key);

            seg.set_meta_candidate(
                TransliterationType::Hiragana,
                Candidate::new(seg.key.clone(), seg.key.clone()),
            );
            seg.set_meta_candidate(
                TransliterationType::FullKatakana,
                Candidate::new(seg.key.clone(), katakana.clone()),
            );
            modified = true;

            // Already offered by the lattice.
            if seg.candidates.iter().any(|c| c.value == katakana) {
                continue;
            }
            let mut c = Candidate::new(seg.key.clone(), katakana);
            c.cost = worst_cost(&seg.candidates).saturating_add(10000);
            c.word_cost = c.cost;
            seg.push_candidate(c);
        }
        modified
    }
}
