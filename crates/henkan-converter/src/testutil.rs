//! Collaborator doubles shared by the converter tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use henkan_core::request::{ConversionRequest, RequestType};
use henkan_core::segments::{Candidate, Segment, SegmentType, Segments};

use crate::lattice::LatticeConverter;
use crate::predictor::Predictor;
use crate::rewriter::{ResizeSegmentsRequest, Rewriter};
use crate::user_dictionary::UserDictionary;

/// Ordered record of collaborator calls, shared between doubles.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: &str) {
        self.0.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| *c == call).count()
    }
}

pub fn add_candidates(seg: &mut Segment, entries: &[(&str, &str, i32)]) {
    for &(key, value, cost) in entries {
        let c = seg.push_candidate(Candidate::new(key, value));
        c.cost = cost;
    }
}

fn entry(key: &str, value: &str, cost: i32, id: u16) -> Candidate {
    let mut c = Candidate::new(key, value);
    c.cost = cost;
    c.word_cost = cost;
    c.structure_cost = cost / 10;
    c.left_id = id;
    c.right_id = id;
    c
}

/// Dictionary-backed lattice double.
///
/// `Free` segments whose key has a split rule are replaced by one segment per
/// part. Every conversion segment then gets the entries for its key, capped
/// at `max_conversion_candidates_size`.
#[derive(Default)]
pub struct MockLattice {
    entries: HashMap<String, Vec<Candidate>>,
    splits: HashMap<String, Vec<String>>,
    requests: Mutex<Vec<(RequestType, usize)>>,
}

impl MockLattice {
    pub fn new() -> Self {
        Self::default()
            .with_entry("きょう", "今日", 3000, 10)
            .with_entry("きょう", "京", 5000, 11)
            .with_entry("は", "は", 2000, 20)
            .with_entry("は", "葉", 6000, 21)
            .with_entry("いい", "良い", 3500, 30)
            .with_entry("てんき", "天気", 4000, 40)
            .with_entry("とう", "塔", 4000, 50)
            .with_entry("きょうは", "今日は", 4500, 60)
            .with_entry("とうきょう", "東京", 3000, 70)
            .with_entry("ばか", "馬鹿", 4000, 80)
            .with_entry("ばか", "バカ", 4500, 81)
            .with_split("きょうはいいてんき", &["きょう", "は", "いい", "てんき"])
            .with_split("きょうはいい", &["きょう", "は", "いい"])
            .with_split("はいいてんき", &["は", "いい", "てんき"])
    }

    pub fn with_entry(mut self, key: &str, value: &str, cost: i32, id: u16) -> Self {
        self.entries
            .entry(key.to_string())
            .or_default()
            .push(entry(key, value, cost, id));
        self
    }

    pub fn with_split(mut self, key: &str, parts: &[&str]) -> Self {
        self.splits.insert(
            key.to_string(),
            parts.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    /// Request kinds and candidate caps seen so far.
    pub fn requests(&self) -> Vec<(RequestType, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

impl LatticeConverter for MockLattice {
    fn convert_for_request(&self, request: &ConversionRequest, segments: &mut Segments) -> bool {
        self.requests
            .lock()
            .unwrap()
            .push((request.request_type(), request.max_conversion_candidates_size()));

        let mut i = segments.history_segments_len();
        while i < segments.len() {
            let seg = segments.segment(i).unwrap();
            if seg.segment_type == SegmentType::Free {
                if let Some(parts) = self.splits.get(&seg.key) {
                    let parts = parts.clone();
                    segments.erase_segment(i);
                    for (j, p) in parts.iter().enumerate() {
                        segments.insert_segment(i + j, Segment::new(p.as_str(), SegmentType::Free));
                    }
                    i += parts.len();
                    continue;
                }
            }
            i += 1;
        }

        let cap = request.max_conversion_candidates_size();
        let mut found = false;
        for seg in segments.conversion_segments_mut() {
            if seg.segment_type.keeps_value() && seg.has_candidates() {
                found = true;
                continue;
            }
            seg.candidates.clear();
            if let Some(list) = self.entries.get(&seg.key) {
                seg.candidates.extend(list.iter().take(cap).cloned());
                found = true;
            }
        }
        found
    }
}

/// Predictor double backed by a key to candidates map. Logs its hooks.
pub struct MockPredictor {
    pub log: CallLog,
    pub predictions: HashMap<String, Vec<Candidate>>,
    pub clear_result: bool,
    pub reload_result: bool,
    pub wait_result: bool,
}

impl MockPredictor {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            predictions: HashMap::new(),
            clear_result: false,
            reload_result: true,
            wait_result: true,
        }
    }

    pub fn with_prediction(mut self, key: &str, value: &str, cost: i32) -> Self {
        self.predictions
            .entry(key.to_string())
            .or_default()
            .push(entry(key, value, cost, 0));
        self
    }
}

impl Predictor for MockPredictor {
    fn predict_for_request(&self, _request: &ConversionRequest, segments: &mut Segments) -> bool {
        self.log.push("predictor.predict");
        let Some(seg) = segments.conversion_segment_mut(0) else {
            return false;
        };
        let Some(list) = self.predictions.get(&seg.key) else {
            return false;
        };
        for c in list {
            if !seg.candidates.iter().any(|e| e.value == c.value) {
                seg.candidates.push(c.clone());
            }
        }
        true
    }

    fn finish(&self, _request: &ConversionRequest, _segments: &mut Segments) {
        self.log.push("predictor.finish");
    }

    fn revert(&self, _segments: &mut Segments) {
        self.log.push("predictor.revert");
    }

    fn clear_history_entry(&self, key: &str, value: &str) -> bool {
        self.log.push(&format!("predictor.clear {key} {value}"));
        self.clear_result
    }

    fn reload(&self) -> bool {
        self.log.push("predictor.reload");
        self.reload_result
    }

    fn sync(&self) -> bool {
        self.log.push("predictor.sync");
        self.reload_result
    }

    fn wait(&self) -> bool {
        self.log.push("predictor.wait");
        self.wait_result
    }
}

/// Rewriter double with scripted answers.
pub struct RecordingRewriter {
    pub log: CallLog,
    pub rewrite_result: bool,
    pub focus_result: bool,
    pub clear_result: bool,
    pub reload_result: bool,
    pub resize: Option<ResizeSegmentsRequest>,
}

impl Default for RecordingRewriter {
    fn default() -> Self {
        Self {
            log: CallLog::default(),
            rewrite_result: false,
            focus_result: true,
            clear_result: false,
            reload_result: true,
            resize: None,
        }
    }
}

impl Rewriter for RecordingRewriter {
    fn rewrite(&self, _request: &ConversionRequest, _segments: &mut Segments) -> bool {
        self.log.push("rewriter.rewrite");
        self.rewrite_result
    }

    fn check_resize_segments_request(
        &self,
        _request: &ConversionRequest,
        _segments: &Segments,
    ) -> Option<ResizeSegmentsRequest> {
        self.log.push("rewriter.check_resize");
        self.resize.clone()
    }

    fn focus(&self, _segments: &mut Segments, segment_index: usize, candidate_index: i32) -> bool {
        self.log
            .push(&format!("rewriter.focus {segment_index} {candidate_index}"));
        self.focus_result
    }

    fn finish(&self, _request: &ConversionRequest, _segments: &mut Segments) {
        self.log.push("rewriter.finish");
    }

    fn revert(&self, _segments: &mut Segments) {
        self.log.push("rewriter.revert");
    }

    fn clear_history_entry(
        &self,
        _segments: &Segments,
        segment_index: usize,
        candidate_index: i32,
    ) -> bool {
        self.log
            .push(&format!("rewriter.clear {segment_index} {candidate_index}"));
        self.clear_result
    }

    fn reload(&self) -> bool {
        self.log.push("rewriter.reload");
        self.reload_result
    }

    fn sync(&self) -> bool {
        self.log.push("rewriter.sync");
        self.reload_result
    }
}

/// Asks for one resize and stays quiet once the segments were resized.
pub struct ResizeSegmentsRewriter {
    pub request: ResizeSegmentsRequest,
}

impl Rewriter for ResizeSegmentsRewriter {
    fn rewrite(&self, _request: &ConversionRequest, _segments: &mut Segments) -> bool {
        false
    }

    fn check_resize_segments_request(
        &self,
        _request: &ConversionRequest,
        segments: &Segments,
    ) -> Option<ResizeSegmentsRequest> {
        (!segments.resized()).then(|| self.request.clone())
    }
}

pub struct MockUserDictionary {
    pub log: CallLog,
}

impl UserDictionary for MockUserDictionary {
    fn reload(&self) -> bool {
        self.log.push("user_dictionary.reload");
        true
    }

    fn sync(&self) -> bool {
        self.log.push("user_dictionary.sync");
        true
    }

    fn wait_for_reloader(&self) -> bool {
        self.log.push("user_dictionary.wait");
        true
    }
}
