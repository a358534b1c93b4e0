use henkan_core::request::ConversionRequest;
use henkan_core::segments::Segments;

/// Search back-end that scores word sequences for the conversion segments.
pub trait LatticeConverter: Send + Sync {
    /// Fill the candidates of every conversion segment from its key.
    ///
    /// `Free` segments may be split or merged; `FixedBoundary` segments keep
    /// their key. `FixedValue` and `Submitted` segments keep both key and
    /// candidates, so a committed value survives a resize elsewhere.
    /// Returns `false` when nothing could be produced, which the caller
    /// treats as an empty result rather than an error.
    fn convert_for_request(&self, request: &ConversionRequest, segments: &mut Segments) -> bool;
}
