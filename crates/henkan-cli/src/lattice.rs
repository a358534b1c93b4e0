//! Dictionary-driven collaborators for the converter.
//!
//! `LongestMatchConverter` stands in for a full lattice: it cuts `Free`
//! segments greedily at the longest known reading and fills every conversion
//! segment from the dictionary.

use std::sync::Arc;

use henkan_converter::lattice::LatticeConverter;
use henkan_converter::predictor::Predictor;
use henkan_core::request::{ConversionRequest, RequestType};
use henkan_core::segments::{Candidate, Segment, SegmentType, Segments};
use henkan_core::unicode::chars_len;
use tracing::{debug, debug_span};

use crate::dict_source::TsvDictionary;

/// Cost given to readings with no dictionary entry.
pub const UNKNOWN_COST: i32 = 10000;

/// Split `key` into dictionary readings, longest first. Runs of characters
/// that start no reading are kept together.
fn split_longest<'a>(key: &'a str, longest: impl Fn(&'a str) -> Option<&'a str>) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut unknown_start: Option<usize> = None;
    let mut pos = 0;
    while pos < key.len() {
        let rest = &key[pos..];
        if let Some(found) = longest(rest) {
            if let Some(start) = unknown_start.take() {
                parts.push(&key[start..pos]);
            }
            parts.push(found);
            pos += found.len();
            continue;
        }
        unknown_start.get_or_insert(pos);
        pos += rest.chars().next().map_or(1, char::len_utf8);
    }
    if let Some(start) = unknown_start {
        parts.push(&key[start..]);
    }
    parts
}

/// Replace each `Free` conversion segment by the parts `split` returns.
fn resplit_free_segments(segments: &mut Segments, split: impl Fn(&str) -> Vec<String>) {
    let mut i = segments.history_segments_len();
    while i < segments.len() {
        let Some(seg) = segments.segment(i) else {
            break;
        };
        if seg.segment_type != SegmentType::Free {
            i += 1;
            continue;
        }
        let parts = split(&seg.key);
        if parts.len() <= 1 {
            i += 1;
            continue;
        }
        segments.erase_segment(i);
        for part in parts {
            segments.insert_segment(i, Segment::new(part, SegmentType::Free));
            i += 1;
        }
    }
}

pub struct LongestMatchConverter {
    dict: Arc<TsvDictionary>,
}

impl LongestMatchConverter {
    pub fn new(dict: Arc<TsvDictionary>) -> Self {
        Self { dict }
    }

    fn convert(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        resplit_free_segments(segments, |key| {
            split_longest(key, |rest| self.dict.longest_reading(rest))
                .into_iter()
                .map(str::to_string)
                .collect()
        });

        let cap = request.max_conversion_candidates_size();
        let mut converted = false;
        for seg in segments.conversion_segments_mut() {
            if seg.segment_type.keeps_value() && seg.has_candidates() {
                converted = true;
                continue;
            }
            seg.clear_candidates();
            for entry in self.dict.lookup(&seg.key).iter().take(cap) {
                seg.push_candidate(entry.to_candidate());
            }
            if seg.has_candidates() {
                converted = true;
            } else {
                let mut c = Candidate::new(seg.key.as_str(), seg.key.as_str());
                c.cost = UNKNOWN_COST * chars_len(&seg.key) as i32;
                c.word_cost = c.cost;
                seg.push_candidate(c);
            }
        }
        converted
    }

    fn predict(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        let cap = request.max_conversion_candidates_size();
        let Some(seg) = segments.conversion_segment_mut(0) else {
            return false;
        };
        seg.clear_candidates();
        for entry in self.dict.predictive(&seg.key).into_iter().take(cap) {
            seg.push_candidate(entry.to_candidate());
        }
        seg.has_candidates()
    }

    fn reverse(&self, segments: &mut Segments) -> bool {
        resplit_free_segments(segments, |text| {
            split_longest(text, |rest| self.dict.longest_surface(rest))
                .into_iter()
                .map(str::to_string)
                .collect()
        });

        let mut all_found = true;
        for seg in segments.conversion_segments_mut() {
            seg.clear_candidates();
            match self.dict.readings_of(&seg.key).first() {
                Some(reading) => {
                    seg.push_candidate(Candidate::new(seg.key.as_str(), reading.as_str()));
                }
                None => all_found = false,
            }
        }
        all_found
    }
}

impl LatticeConverter for LongestMatchConverter {
    fn convert_for_request(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        let request_type = request.request_type();
        let _span = debug_span!("longest_match", ?request_type).entered();
        let found = match request_type {
            RequestType::Conversion => self.convert(request, segments),
            RequestType::ReverseConversion => self.reverse(segments),
            _ => self.predict(request, segments),
        };
        debug!(found, segments = segments.conversion_segments_len());
        found
    }
}

/// Completes the key to longer dictionary readings.
pub struct PrefixPredictor {
    dict: Arc<TsvDictionary>,
}

impl PrefixPredictor {
    pub fn new(dict: Arc<TsvDictionary>) -> Self {
        Self { dict }
    }
}

impl Predictor for PrefixPredictor {
    fn predict_for_request(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        let limit = match request.request_type() {
            RequestType::Suggestion | RequestType::PartialSuggestion => {
                request.options().max_dictionary_prediction_candidates_size
            }
            _ => request.max_conversion_candidates_size(),
        };
        let Some(seg) = segments.conversion_segment_mut(0) else {
            return false;
        };
        let before = seg.candidates.len();
        for entry in self.dict.predictive(&seg.key).into_iter().take(limit) {
            if seg.candidates.iter().any(|c| c.value == entry.surface) {
                continue;
            }
            seg.push_candidate(entry.to_candidate());
        }
        debug!(added = seg.candidates.len() - before, limit, "prefix prediction");
        seg.has_candidates()
    }
}
