mod basic;

use std::sync::Arc;

use henkan_core::request::{
    ClientRequest, ComposerData, ConversionRequest, ConversionRequestBuilder, RequestType,
};
use henkan_core::segments::Segments;

use super::{Converter, ConverterBuilder};
use crate::rewriter::Rewriter;
use crate::stats::MemoryStatsSink;
use crate::suppression::SuppressionDictionary;
use crate::testutil::{CallLog, MockLattice, MockPredictor, RecordingRewriter};

pub(super) struct Fixture {
    pub converter: Converter,
    pub lattice: Arc<MockLattice>,
    pub log: CallLog,
    pub stats: Arc<MemoryStatsSink>,
    pub suppression: Arc<SuppressionDictionary>,
}

/// Converter over the mock lattice with a rewriter that reports changes.
pub(super) fn fixture() -> Fixture {
    let log = CallLog::default();
    let rewriter = RecordingRewriter {
        log: log.clone(),
        rewrite_result: true,
        ..RecordingRewriter::default()
    };
    fixture_with(log, rewriter)
}

pub(super) fn fixture_with(log: CallLog, rewriter: impl Rewriter + 'static) -> Fixture {
    let lattice = Arc::new(MockLattice::new());
    let predictor = MockPredictor::new(log.clone())
        .with_prediction("きょう", "今日は", 3500)
        .with_prediction("きょう", "今日も", 3600)
        .with_prediction("わたし", "私", 2000);
    let stats = Arc::new(MemoryStatsSink::new());
    let suppression = Arc::new(SuppressionDictionary::new());
    let converter = ConverterBuilder::new(lattice.clone(), predictor, rewriter)
        .stats(stats.clone())
        .suppression(suppression.clone())
        .build();
    Fixture {
        converter,
        lattice,
        log,
        stats,
        suppression,
    }
}

pub(super) fn conversion_request(key: &str) -> ConversionRequest {
    ConversionRequestBuilder::new()
        .set_composer_data(ComposerData::from_text(key))
        .build()
}

pub(super) fn prediction_request(key: &str, request_type: RequestType) -> ConversionRequest {
    ConversionRequestBuilder::new()
        .set_composer_data(ComposerData::from_text(key))
        .set_request_type(request_type)
        .build()
}

pub(super) fn limited_request(key: &str, limit: usize) -> ConversionRequest {
    ConversionRequestBuilder::new()
        .set_composer_data(ComposerData::from_text(key))
        .set_client_request(ClientRequest {
            candidates_size_limit: Some(limit),
            ..ClientRequest::default()
        })
        .build()
}

pub(super) fn keys(segments: &Segments) -> Vec<&str> {
    segments.iter().map(|s| s.key.as_str()).collect()
}

pub(super) fn top_values(segments: &Segments) -> Vec<&str> {
    segments
        .iter()
        .map(|s| s.candidate(0).map_or("", |c| c.value.as_str()))
        .collect()
}

pub(super) fn assert_partition(segments: &Segments) {
    assert_eq!(
        segments.history_segments_len() + segments.conversion_segments_len(),
        segments.len()
    );
}
