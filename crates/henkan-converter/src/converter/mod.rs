//! Conversion orchestrator.
//!
//! `Converter` owns handles to its collaborators and no per-call state, so a
//! single instance can serve many sessions. Each session owns its
//! `Segments` and serializes calls against it.
//!
//! Indices taken by the public operations are relative to the first
//! conversion segment unless stated otherwise. Failures are reported as
//! `false` and leave the segment list as it was.

mod pos;
mod resegment;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use henkan_core::request::{ConversionRequest, RequestType};
use henkan_core::segments::{
    Attribute, Segment, SegmentType, Segments, NUM_TRANSLITERATION_TYPES,
};
use henkan_core::unicode::chars_len;
use tracing::{debug, debug_span, error};

use crate::history_reconstructor::{HistoryReconstructor, ScriptHistoryReconstructor};
use crate::lattice::LatticeConverter;
use crate::predictor::Predictor;
use crate::reverse_converter::{LatticeReverseConverter, ReverseConverter};
use crate::rewriter::Rewriter;
use crate::stats::{self, NullStatsSink, StatsSink};
use crate::suppression::{SuppressionDictionary, SuppressionFilter};
use crate::user_dictionary::UserDictionary;

/// Every segment has a candidate. On zero-query mixed conversion layouts a
/// meta-candidate is enough.
fn is_valid_segments(request: &ConversionRequest, segments: &Segments) -> bool {
    let meta_counts = request.is_zero_query_mixed_conversion();
    segments
        .iter()
        .all(|seg| seg.has_candidates() || (meta_counts && !seg.meta_candidates.is_empty()))
}

/// Reseed for prediction only when the key changed, so expanding a
/// suggestion keeps what was already computed.
fn should_set_key_for_prediction(key: &str, segments: &Segments) -> bool {
    segments
        .conversion_segment(0)
        .map_or(true, |seg| seg.key != key)
}

fn is_valid_request_for_prediction(request: &ConversionRequest) -> bool {
    match request.request_type() {
        RequestType::Conversion | RequestType::ReverseConversion => false,
        RequestType::Prediction | RequestType::Suggestion => true,
        RequestType::PartialPrediction | RequestType::PartialSuggestion => request
            .composer()
            .is_some_and(|composer| composer.is_cursor_inside()),
    }
}

/// Mark every candidate and meta-candidate of `segment` as consuming
/// `consumed_key_size` characters, keeping sizes set earlier.
pub fn maybe_set_consumed_key_size_to_segment(consumed_key_size: usize, segment: &mut Segment) {
    for c in segment
        .candidates
        .iter_mut()
        .chain(segment.meta_candidates.iter_mut())
    {
        c.maybe_set_consumed_key_size(consumed_key_size);
    }
}

pub struct ConverterBuilder {
    lattice: Arc<dyn LatticeConverter>,
    predictor: Box<dyn Predictor>,
    rewriter: Box<dyn Rewriter>,
    suppression: Option<Arc<dyn SuppressionFilter>>,
    stats: Option<Arc<dyn StatsSink>>,
    user_dictionary: Option<Arc<dyn UserDictionary>>,
    history_reconstructor: Option<Box<dyn HistoryReconstructor>>,
    reverse_converter: Option<Box<dyn ReverseConverter>>,
}

impl ConverterBuilder {
    pub fn new(
        lattice: Arc<dyn LatticeConverter>,
        predictor: impl Predictor + 'static,
        rewriter: impl Rewriter + 'static,
    ) -> Self {
        Self {
            lattice,
            predictor: Box::new(predictor),
            rewriter: Box::new(rewriter),
            suppression: None,
            stats: None,
            user_dictionary: None,
            history_reconstructor: None,
            reverse_converter: None,
        }
    }

    pub fn suppression(mut self, suppression: Arc<dyn SuppressionFilter>) -> Self {
        self.suppression = Some(suppression);
        self
    }

    pub fn stats(mut self, stats: Arc<dyn StatsSink>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn user_dictionary(mut self, user_dictionary: Arc<dyn UserDictionary>) -> Self {
        self.user_dictionary = Some(user_dictionary);
        self
    }

    pub fn history_reconstructor(mut self, h: impl HistoryReconstructor + 'static) -> Self {
        self.history_reconstructor = Some(Box::new(h));
        self
    }

    pub fn reverse_converter(mut self, r: impl ReverseConverter + 'static) -> Self {
        self.reverse_converter = Some(Box::new(r));
        self
    }

    pub fn build(self) -> Converter {
        let reverse_converter = self
            .reverse_converter
            .unwrap_or_else(|| Box::new(LatticeReverseConverter::new(Arc::clone(&self.lattice))));
        Converter {
            lattice: self.lattice,
            predictor: self.predictor,
            rewriter: self.rewriter,
            suppression: self
                .suppression
                .unwrap_or_else(|| Arc::new(SuppressionDictionary::new())),
            stats: self.stats.unwrap_or_else(|| Arc::new(NullStatsSink)),
            user_dictionary: self.user_dictionary,
            history_reconstructor: self
                .history_reconstructor
                .unwrap_or_else(|| Box::new(ScriptHistoryReconstructor)),
            reverse_converter,
        }
    }
}

pub struct Converter {
    lattice: Arc<dyn LatticeConverter>,
    predictor: Box<dyn Predictor>,
    rewriter: Box<dyn Rewriter>,
    suppression: Arc<dyn SuppressionFilter>,
    stats: Arc<dyn StatsSink>,
    user_dictionary: Option<Arc<dyn UserDictionary>>,
    history_reconstructor: Box<dyn HistoryReconstructor>,
    reverse_converter: Box<dyn ReverseConverter>,
}

impl Converter {
    /// Convert `request.key()` from scratch. Returns whether every segment
    /// ended up with a candidate.
    pub fn start_conversion(&self, segments: &mut Segments, request: &ConversionRequest) -> bool {
        debug_assert_eq!(request.request_type(), RequestType::Conversion);
        let key = request.key();
        let _span = debug_span!("start_conversion", key).entered();
        if key.is_empty() {
            return false;
        }

        segments.set_conversion_key(key);
        self.apply_conversion(request, segments);
        let valid = is_valid_segments(request, segments);
        debug!(valid, segments = segments.len());
        valid
    }

    /// Convert surface text back to its reading.
    pub fn start_reverse_conversion(&self, segments: &mut Segments, key: &str) -> bool {
        let _span = debug_span!("start_reverse_conversion", key).entered();
        segments.clear();
        if key.is_empty() {
            return false;
        }
        segments.set_conversion_key(key);
        self.reverse_converter.reverse_convert(key, segments)
    }

    /// Fill the single conversion segment with predictions or suggestions.
    ///
    /// Existing candidates are kept when the key did not change. Partial
    /// kinds mark every candidate as consuming the whole key unless the
    /// predictor already recorded a size.
    pub fn start_prediction(&self, segments: &mut Segments, request: &ConversionRequest) -> bool {
        debug_assert!(is_valid_request_for_prediction(request));
        let key = request.key();
        let _span = debug_span!("start_prediction", key, request_type = ?request.request_type())
            .entered();

        if should_set_key_for_prediction(key, segments) {
            segments.set_conversion_key(key);
        }
        debug_assert_eq!(segments.conversion_segments_len(), 1);
        debug_assert_eq!(
            segments.conversion_segment(0).map(|s| s.key.as_str()),
            Some(key)
        );

        if !self.predictor.predict_for_request(request, segments) {
            debug!("predictor returned nothing");
        }
        self.rewrite_and_suppress_candidates(request, segments);
        self.trim_candidates(request, segments);

        if request.request_type().is_partial() {
            if let Some(seg) = segments.conversion_segment_mut(0) {
                maybe_set_consumed_key_size_to_segment(chars_len(key), seg);
            }
        }
        let valid = is_valid_segments(request, segments);
        debug!(valid);
        valid
    }

    /// Commit everything shown and keep the tail as history.
    pub fn finish_conversion(&self, segments: &mut Segments, request: &ConversionRequest) {
        let _span = debug_span!("finish_conversion", segments = segments.len()).entered();
        self.commit_usage_stats(
            segments,
            segments.history_segments_len(),
            segments.conversion_segments_len(),
        );

        for seg in segments.iter_mut() {
            if seg.segment_type == SegmentType::Submitted {
                seg.segment_type = SegmentType::FixedValue;
            }
            if let Some(c) = seg.candidate_mut(0) {
                pos::complete_pos_ids(self.lattice.as_ref(), c);
            }
        }

        segments.clear_revert_entries();
        self.rewriter.finish(request, segments);
        self.predictor.finish(request, segments);

        let excess = segments
            .len()
            .saturating_sub(segments.max_history_segments_size());
        for _ in 0..excess {
            segments.pop_front_segment();
        }
        for seg in segments.iter_mut() {
            seg.segment_type = SegmentType::History;
        }
        debug!(history = segments.len());
    }

    /// Drop the conversion segments and keep history.
    pub fn cancel_conversion(&self, segments: &mut Segments) {
        segments.clear_conversion_segments();
    }

    pub fn reset_conversion(&self, segments: &mut Segments) {
        segments.clear();
    }

    /// Undo the learning done by the last finish, if it left revert entries.
    pub fn revert_conversion(&self, segments: &mut Segments) {
        if segments.revert_entries_len() == 0 {
            return;
        }
        self.rewriter.revert(segments);
        self.predictor.revert(segments);
        segments.clear_revert_entries();
    }

    /// Forget a learned candidate. `segment_index` is absolute. Returns
    /// `true` if either the rewriters or the predictor removed something.
    pub fn delete_candidate_from_history(
        &self,
        segments: &Segments,
        segment_index: usize,
        candidate_index: i32,
    ) -> bool {
        let Some(c) = segments
            .segment(segment_index)
            .and_then(|seg| seg.candidate(candidate_index))
        else {
            return false;
        };
        let mut removed = false;
        removed |= self
            .rewriter
            .clear_history_entry(segments, segment_index, candidate_index);
        removed |= self.predictor.clear_history_entry(&c.key, &c.value);
        removed
    }

    /// Replace the segments with history rebuilt from `preceding_text`.
    pub fn reconstruct_history(&self, segments: &mut Segments, preceding_text: &str) -> bool {
        segments.clear();
        self.history_reconstructor
            .reconstruct_history(preceding_text, segments)
    }

    pub fn commit_segment_value(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: i32,
    ) -> bool {
        self.commit_segment_value_internal(
            segments,
            segment_index,
            candidate_index,
            SegmentType::FixedValue,
        )
    }

    /// Submit a partial suggestion and split its segment: the submitted
    /// segment keeps `current_segment_key` and a `Free` segment holding
    /// `new_segment_key` follows it.
    pub fn commit_partial_suggestion_segment_value(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: i32,
        current_segment_key: &str,
        new_segment_key: &str,
    ) -> bool {
        debug_assert!(segments.conversion_segments_len() > 0);
        let raw_index = segments.history_segments_len() + segment_index;
        if !self.commit_segment_value_internal(
            segments,
            segment_index,
            candidate_index,
            SegmentType::Submitted,
        ) {
            return false;
        }
        self.commit_usage_stats(segments, raw_index, 1);

        let Some(seg) = segments.segment_mut(raw_index) else {
            return false;
        };
        let auto_partial = seg
            .candidate(0)
            .is_some_and(|c| chars_len(&c.key) != seg.key_len());
        seg.key = current_segment_key.to_string();
        segments.insert_segment(raw_index + 1, Segment::new(new_segment_key, SegmentType::Free));

        self.stats.increment_count(if auto_partial {
            stats::COMMIT_AUTO_PARTIAL_SUGGESTION
        } else {
            stats::COMMIT_PARTIAL_SUGGESTION
        });
        true
    }

    /// Let the rewriters react to the user highlighting a candidate.
    pub fn focus_segment_value(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: i32,
    ) -> bool {
        let index = segments.history_segments_len() + segment_index;
        if index >= segments.len() {
            return false;
        }
        self.rewriter.focus(segments, index, candidate_index)
    }

    /// Submit the leading conversion segments one by one. Each submitted
    /// segment joins the history prefix, so every entry of
    /// `candidate_indices` applies to conversion segment 0 at its turn.
    /// Stops at the first failure, keeping earlier commits.
    pub fn commit_segments(&self, segments: &mut Segments, candidate_indices: &[i32]) -> bool {
        let begin = segments.history_segments_len();
        for &candidate_index in candidate_indices {
            if !self.commit_segment_value_internal(
                segments,
                0,
                candidate_index,
                SegmentType::Submitted,
            ) {
                return false;
            }
        }
        self.commit_usage_stats(segments, begin, candidate_indices.len());
        true
    }

    /// Grow or shrink one segment by `offset_length` characters.
    pub fn resize_segment(
        &self,
        segments: &mut Segments,
        request: &ConversionRequest,
        segment_index: usize,
        offset_length: i32,
    ) -> bool {
        if request.request_type() != RequestType::Conversion || offset_length == 0 {
            return false;
        }
        let Some(seg) = segments.conversion_segment(segment_index) else {
            return false;
        };
        if seg.key.is_empty() {
            return false;
        }
        let new_size = seg.key_len() as i64 + offset_length as i64;
        let Ok(new_size) = u8::try_from(new_size) else {
            return false;
        };
        if new_size == 0 {
            return false;
        }
        self.resize_segments(segments, request, segment_index, &[new_size])
    }

    /// Cut the segments from `start_segment_index` into segments of
    /// `new_sizes` characters and convert again.
    pub fn resize_segments(
        &self,
        segments: &mut Segments,
        request: &ConversionRequest,
        start_segment_index: usize,
        new_sizes: &[u8],
    ) -> bool {
        let _span = debug_span!("resize_segments", start_segment_index, ?new_sizes).entered();
        if !resegment::resegment(request, segments, start_segment_index, new_sizes) {
            return false;
        }
        self.apply_conversion(request, segments);
        true
    }

    /// Reload the user dictionary and every learning collaborator.
    pub fn reload(&self) -> bool {
        if let Some(dict) = &self.user_dictionary {
            dict.reload();
        }
        self.rewriter.reload() && self.predictor.reload()
    }

    pub fn sync(&self) -> bool {
        if let Some(dict) = &self.user_dictionary {
            dict.sync();
        }
        self.rewriter.sync() && self.predictor.sync()
    }

    /// Block until background reloads finish.
    pub fn wait(&self) -> bool {
        if let Some(dict) = &self.user_dictionary {
            dict.wait_for_reloader();
        }
        self.predictor.wait()
    }

    fn commit_segment_value_internal(
        &self,
        segments: &mut Segments,
        segment_index: usize,
        candidate_index: i32,
        segment_type: SegmentType,
    ) -> bool {
        let index = segments.history_segments_len() + segment_index;
        let Some(seg) = segments.segment_mut(index) else {
            return false;
        };
        let lowest = -(NUM_TRANSLITERATION_TYPES as i32);
        if candidate_index < lowest || !seg.is_valid_index(candidate_index) {
            return false;
        }

        seg.segment_type = segment_type;
        seg.move_candidate(candidate_index, 0);
        if candidate_index != 0 {
            if let Some(c) = seg.candidates.first_mut() {
                c.attributes.insert(Attribute::Reranked);
            }
        }
        true
    }

    fn convert_with_lattice(&self, request: &ConversionRequest, segments: &mut Segments) {
        if !self.lattice.convert_for_request(request, segments) {
            debug!(key = request.key(), "lattice returned nothing");
        }
    }

    fn apply_conversion(&self, request: &ConversionRequest, segments: &mut Segments) {
        let _span = debug_span!("apply_conversion").entered();
        self.convert_with_lattice(request, segments);
        self.rewrite_and_suppress_candidates(request, segments);
        self.trim_candidates(request, segments);
    }

    /// Honor at most one resize request, then rewrite and suppress.
    ///
    /// After a resize the lattice runs again on the new boundaries before the
    /// rewrite step. A rewriter asking for another resize on that pass is
    /// ignored.
    fn rewrite_and_suppress_candidates(
        &self,
        request: &ConversionRequest,
        segments: &mut Segments,
    ) {
        let mut reentered = false;
        while let Some(resize) = self.rewriter.check_resize_segments_request(request, segments) {
            if reentered {
                error!(?resize, "rewriter requested a second resize, ignoring");
                break;
            }
            if !resegment::resegment(
                request,
                segments,
                resize.segment_index,
                &resize.segment_sizes,
            ) {
                break;
            }
            reentered = true;
            self.convert_with_lattice(request, segments);
        }

        if !self.rewriter.rewrite(request, segments) {
            return;
        }
        if self.suppression.is_empty() {
            return;
        }
        for seg in segments.conversion_segments_mut() {
            seg.candidates
                .retain(|c| !self.suppression.suppress_entry(&c.key, &c.value));
        }
    }

    fn trim_candidates(&self, request: &ConversionRequest, segments: &mut Segments) {
        let Some(limit) = request.candidates_size_limit() else {
            return;
        };
        for seg in segments.conversion_segments_mut() {
            let keep = limit.saturating_sub(seg.meta_candidates.len()).max(1);
            seg.candidates.truncate(keep);
        }
    }

    /// Report what was submitted in `len` segments starting at absolute
    /// index `begin`.
    fn commit_usage_stats(&self, segments: &Segments, begin: usize, len: usize) {
        if len == 0 {
            return;
        }
        if begin + len > segments.len() {
            error!(
                segments = segments.len(),
                required = begin + len,
                "usage stats range out of bounds"
            );
            return;
        }

        let mut total: u64 = 0;
        for seg in &segments.segments()[begin..begin + len] {
            let submitted = seg.candidate(0).map_or(0, |c| chars_len(&c.value)) as u64;
            self.stats
                .update_timing(stats::SUBMITTED_SEGMENT_LENGTH_X1000, submitted * 1000);
            total += submitted;
        }
        self.stats
            .update_timing(stats::SUBMITTED_LENGTH_X1000, total * 1000);
        self.stats
            .update_timing(stats::SUBMITTED_SEGMENT_NUMBER_X1000, len as u64 * 1000);
        self.stats
            .increment_count_by(stats::SUBMITTED_TOTAL_LENGTH, total);
    }
}
