//! Re-segmentation: rewrite segment boundaries to user- or rewriter-chosen
//! character lengths.
//!
//! The keys of the segments from `start` onward are concatenated until they
//! cover the requested total, then cut into `FixedBoundary` segments of the
//! requested sizes. Characters left over after the last cut are merged with
//! the following segment into one `Free` segment, so the lattice can pick
//! new boundaries for the tail.

use henkan_core::request::{ConversionRequest, RequestType};
use henkan_core::segments::{Segment, SegmentType, Segments};
use henkan_core::unicode::char_substring;
use tracing::debug;

/// Rewrite boundaries starting at conversion segment `start_segment_index`.
///
/// Returns `false` without touching `segments` when the request is not a
/// conversion, the index is out of range, the sizes sum to zero or the
/// segments from `start_segment_index` hold fewer characters than requested.
/// Candidates of replaced segments are dropped; callers re-run conversion.
pub(super) fn resegment(
    request: &ConversionRequest,
    segments: &mut Segments,
    start_segment_index: usize,
    new_sizes: &[u8],
) -> bool {
    if request.request_type() != RequestType::Conversion {
        return false;
    }

    let start = segments.history_segments_len() + start_segment_index;
    if start >= segments.len() {
        return false;
    }

    let total: usize = new_sizes.iter().map(|&s| s as usize).sum();
    if total == 0 {
        return false;
    }

    let mut key = String::new();
    let mut key_len = 0;
    let mut consumed_segments = 0;
    for seg in &segments.segments()[start..] {
        key.push_str(&seg.key);
        key_len += seg.key_len();
        consumed_segments += 1;
        if key_len >= total {
            break;
        }
    }
    if key_len == 0 || key_len < total {
        debug!(key_len, total, "not enough characters to resize");
        return false;
    }

    let mut consumed = 0;
    let mut new_keys: Vec<&str> = Vec::with_capacity(new_sizes.len());
    for &size in new_sizes {
        if size != 0 && consumed < key_len {
            new_keys.push(char_substring(&key, consumed, size as usize));
            consumed += size as usize;
        }
    }

    segments.erase_segments(start, consumed_segments);
    for (i, k) in new_keys.iter().enumerate() {
        segments.insert_segment(start + i, Segment::new(*k, SegmentType::FixedBoundary));
    }

    if consumed < key_len {
        let mut rest = char_substring(&key, consumed, key_len - consumed).to_string();
        let next = start + new_keys.len();
        if let Some(following) = segments.erase_segment(next) {
            rest.push_str(&following.key);
        }
        segments.insert_segment(next, Segment::new(rest, SegmentType::Free));
    }

    segments.set_resized(true);
    debug!(start, new_segments = new_keys.len(), "resegmented");
    true
}
