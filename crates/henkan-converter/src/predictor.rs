use henkan_core::request::ConversionRequest;
use henkan_core::segments::Segments;

/// Prediction and suggestion back-end with learning hooks.
///
/// Only `predict_for_request` is mandatory. The learning and maintenance
/// hooks default to no-ops that report success.
pub trait Predictor: Send + Sync {
    /// Fill the single conversion segment with predictions for its key.
    fn predict_for_request(&self, request: &ConversionRequest, segments: &mut Segments) -> bool;

    /// Learn from the segments the user just finished.
    fn finish(&self, _request: &ConversionRequest, _segments: &mut Segments) {}

    /// Undo the last `finish`.
    fn revert(&self, _segments: &mut Segments) {}

    /// Forget a learned key/value pair. Returns `true` if anything was removed.
    fn clear_history_entry(&self, _key: &str, _value: &str) -> bool {
        false
    }

    fn reload(&self) -> bool {
        true
    }

    fn sync(&self) -> bool {
        true
    }

    /// Block until background work started by `reload`/`sync` completes.
    fn wait(&self) -> bool {
        true
    }
}
