use std::sync::Arc;

use henkan_core::request::{ClientRequest, ComposerData, ConversionRequest, ConversionRequestBuilder};
use henkan_core::segments::{
    Candidate, RevertEntry, RevertKind, Segment, SegmentType, Segments, TransliterationType,
};

use super::*;
use crate::rewriter::{KatakanaRewriter, RewriterPipeline};
use crate::suppression::SuppressionFilter;
use crate::testutil::{add_candidates, MockUserDictionary};

/// Leaves candidates alone and offers only a hiragana meta-candidate.
struct MetaOnlyRewriter;

impl Rewriter for MetaOnlyRewriter {
    fn rewrite(&self, _request: &ConversionRequest, segments: &mut Segments) -> bool {
        for seg in segments.conversion_segments_mut() {
            let key = seg.key.clone();
            seg.set_meta_candidate(TransliterationType::Hiragana, Candidate::new(key.clone(), key));
        }
        true
    }
}

fn revert_entry() -> RevertEntry {
    RevertEntry {
        kind: RevertKind::Create,
        id: 1,
        timestamp: 0,
        key: "きょう".to_string(),
    }
}

#[test]
fn test_start_conversion_populates_segments() {
    let f = fixture();
    let mut segs = Segments::new();
    assert!(f
        .converter
        .start_conversion(&mut segs, &conversion_request("きょうはいいてんき")));

    assert_eq!(keys(&segs), vec!["きょう", "は", "いい", "てんき"]);
    assert_eq!(top_values(&segs), vec!["今日", "は", "良い", "天気"]);
    assert!(segs.iter().all(|s| s.segment_type == SegmentType::Free));
    assert_eq!(segs.history_segments_len(), 0);
    assert!(!segs.resized());
    assert_eq!(
        f.log.calls(),
        vec!["rewriter.check_resize", "rewriter.rewrite"]
    );
}

#[test]
fn test_start_conversion_empty_key() {
    let f = fixture();
    let mut segs = Segments::new();
    assert!(!f.converter.start_conversion(&mut segs, &conversion_request("")));
    assert!(segs.is_empty());
    assert!(f.lattice.requests().is_empty());
}

#[test]
fn test_start_conversion_keeps_history() {
    let f = fixture();
    let mut segs = Segments::new();
    add_candidates(
        segs.push_segment(Segment::new("まえ", SegmentType::History)),
        &[("まえ", "前", 0)],
    );
    assert!(f.converter.start_conversion(&mut segs, &conversion_request("きょう")));
    assert_eq!(keys(&segs), vec!["まえ", "きょう"]);
    assert_eq!(segs.history_segments_len(), 1);
    assert_partition(&segs);
}

#[test]
fn test_start_conversion_invalid_without_candidates() {
    let f = fixture();
    let mut segs = Segments::new();
    assert!(!f.converter.start_conversion(&mut segs, &conversion_request("ぬ")));
    assert_eq!(keys(&segs), vec!["ぬ"]);
    assert!(!segs.segment(0).unwrap().has_candidates());
}

#[test]
fn test_meta_candidates_count_on_mixed_conversion() {
    let f = fixture_with(CallLog::default(), MetaOnlyRewriter);
    let mut segs = Segments::new();

    assert!(!f.converter.start_conversion(&mut segs, &conversion_request("ぬ")));

    let mobile = ConversionRequestBuilder::new()
        .set_composer_data(ComposerData::from_text("ぬ"))
        .set_client_request(ClientRequest {
            mixed_conversion: true,
            zero_query_suggestion: true,
            ..ClientRequest::default()
        })
        .build();
    assert!(f.converter.start_conversion(&mut segs, &mobile));
}

#[test]
fn test_suppression_removes_only_matching_conversion_candidates() {
    let f = fixture();
    assert!(f.suppression.add_entry("ばか", "馬鹿"));
    let mut segs = Segments::new();
    add_candidates(
        segs.push_segment(Segment::new("ばか", SegmentType::History)),
        &[("ばか", "馬鹿", 0)],
    );

    assert!(f.converter.start_conversion(&mut segs, &conversion_request("ばか")));

    let values: Vec<&str> = segs
        .conversion_segment(0)
        .unwrap()
        .candidates
        .iter()
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(values, vec!["バカ"]);
    assert_eq!(segs.history_segment(0).unwrap().candidates[0].value, "馬鹿");
}

#[test]
fn test_suppression_skipped_when_rewrite_is_noop() {
    let f = fixture_with(CallLog::default(), RecordingRewriter::default());
    f.suppression.add_entry("ばか", "馬鹿");
    let mut segs = Segments::new();
    f.converter
        .start_conversion(&mut segs, &conversion_request("ばか"));
    assert_eq!(segs.conversion_segment(0).unwrap().candidates.len(), 2);
    assert!(!f.suppression.is_empty());
}

#[test]
fn test_trim_candidates_counts_meta_candidates() {
    let pipeline = RewriterPipeline::new().push(KatakanaRewriter);
    let f = fixture_with(CallLog::default(), pipeline);

    // 今日, 京, キョウ with two meta-candidates.
    let mut segs = Segments::new();
    f.converter
        .start_conversion(&mut segs, &limited_request("きょう", 4));
    assert_eq!(segs.conversion_segment(0).unwrap().candidates.len(), 2);

    f.converter
        .start_conversion(&mut segs, &limited_request("きょう", 2));
    assert_eq!(segs.conversion_segment(0).unwrap().candidates.len(), 1);

    f.converter
        .start_conversion(&mut segs, &conversion_request("きょう"));
    assert_eq!(segs.conversion_segment(0).unwrap().candidates.len(), 3);
}

#[test]
fn test_cancel_reset() {
    let f = fixture();
    let mut segs = Segments::new();
    segs.push_segment(Segment::new("まえ", SegmentType::History));
    f.converter
        .start_conversion(&mut segs, &conversion_request("きょうはいい"));
    assert_eq!(segs.len(), 4);

    f.converter.cancel_conversion(&mut segs);
    assert_eq!(keys(&segs), vec!["まえ"]);

    f.converter.reset_conversion(&mut segs);
    assert!(segs.is_empty());
}

#[test]
fn test_revert_requires_entries() {
    let f = fixture();
    let mut segs = Segments::new();
    f.converter.revert_conversion(&mut segs);
    assert!(f.log.calls().is_empty());

    segs.push_revert_entry(revert_entry());
    f.converter.revert_conversion(&mut segs);
    assert_eq!(f.log.calls(), vec!["rewriter.revert", "predictor.revert"]);
    assert_eq!(segs.revert_entries_len(), 0);
}

#[test]
fn test_delete_candidate_from_history_is_or() {
    let log = CallLog::default();
    let rewriter = RecordingRewriter {
        log: log.clone(),
        clear_result: true,
        ..RecordingRewriter::default()
    };
    let f = fixture_with(log, rewriter);
    let mut segs = Segments::new();
    f.converter
        .start_conversion(&mut segs, &conversion_request("きょう"));

    assert!(f.converter.delete_candidate_from_history(&segs, 0, 1));
    let calls = f.log.calls();
    assert!(calls.contains(&"rewriter.clear 0 1".to_string()));
    assert!(calls.contains(&"predictor.clear きょう 京".to_string()));
}

#[test]
fn test_delete_candidate_from_history_none_removed() {
    let f = fixture();
    let mut segs = Segments::new();
    f.converter
        .start_conversion(&mut segs, &conversion_request("きょう"));
    assert!(!f.converter.delete_candidate_from_history(&segs, 0, 0));
}

#[test]
fn test_delete_candidate_from_history_invalid_pair() {
    let f = fixture();
    let mut segs = Segments::new();
    f.converter
        .start_conversion(&mut segs, &conversion_request("きょう"));
    let before = f.log.calls().len();
    assert!(!f.converter.delete_candidate_from_history(&segs, 3, 0));
    assert!(!f.converter.delete_candidate_from_history(&segs, 0, 9));
    assert_eq!(f.log.calls().len(), before);
}

#[test]
fn test_reconstruct_history_replaces_segments() {
    let f = fixture();
    let mut segs = Segments::new();
    f.converter
        .start_conversion(&mut segs, &conversion_request("きょう"));

    assert!(f.converter.reconstruct_history(&mut segs, "第12"));
    assert_eq!(keys(&segs), vec!["12"]);
    assert_eq!(segs.history_segments_len(), 1);

    assert!(!f.converter.reconstruct_history(&mut segs, "きょう"));
    assert!(segs.is_empty());
}

#[test]
fn test_start_reverse_conversion() {
    let lattice = Arc::new(MockLattice::default().with_entry("今日", "きょう", 0, 0));
    let converter = ConverterBuilder::new(
        lattice,
        MockPredictor::new(CallLog::default()),
        RecordingRewriter::default(),
    )
    .build();
    let mut segs = Segments::new();

    assert!(converter.start_reverse_conversion(&mut segs, "今日"));
    assert_eq!(top_values(&segs), vec!["きょう"]);

    assert!(converter.start_reverse_conversion(&mut segs, "１＋１"));
    assert_eq!(keys(&segs), vec!["１＋１"]);
    assert_eq!(top_values(&segs), vec!["1+1"]);

    assert!(!converter.start_reverse_conversion(&mut segs, "犬"));
    assert!(segs.is_empty());

    assert!(!converter.start_reverse_conversion(&mut segs, ""));
    assert!(segs.is_empty());
}

#[test]
fn test_reload_sync_wait() {
    let log = CallLog::default();
    let lattice = Arc::new(MockLattice::new());
    let converter = ConverterBuilder::new(
        lattice,
        MockPredictor::new(log.clone()),
        RecordingRewriter {
            log: log.clone(),
            ..RecordingRewriter::default()
        },
    )
    .user_dictionary(Arc::new(MockUserDictionary { log: log.clone() }))
    .build();

    assert!(converter.reload());
    assert!(converter.sync());
    assert!(converter.wait());
    assert_eq!(
        log.calls(),
        vec![
            "user_dictionary.reload",
            "rewriter.reload",
            "predictor.reload",
            "user_dictionary.sync",
            "rewriter.sync",
            "predictor.sync",
            "user_dictionary.wait",
            "predictor.wait",
        ]
    );
}

#[test]
fn test_reload_short_circuits_on_rewriter_failure() {
    let log = CallLog::default();
    let rewriter = RecordingRewriter {
        log: log.clone(),
        reload_result: false,
        ..RecordingRewriter::default()
    };
    let f = fixture_with(log, rewriter);
    assert!(!f.converter.reload());
    assert_eq!(f.log.count("predictor.reload"), 0);
}

#[test]
fn test_converter_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Converter>();
}
