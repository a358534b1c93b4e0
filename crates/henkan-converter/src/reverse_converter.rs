//! Surface text back to its reading.

use std::sync::Arc;

use henkan_core::request::{ConversionRequestBuilder, RequestType};
use henkan_core::segments::{Candidate, Segments};
use tracing::debug;

use crate::lattice::LatticeConverter;

pub trait ReverseConverter: Send + Sync {
    /// Fill `segments`, already seeded with `key` as its only conversion
    /// segment, with readings of `key`.
    fn reverse_convert(&self, key: &str, segments: &mut Segments) -> bool;
}

/// Half-width form of an arithmetic expression, or `None` if `text` contains
/// anything but digits and operators.
fn normalize_math_expression(text: &str) -> Option<String> {
    text.chars()
        .map(|c| match c {
            '0'..='9' => Some(c),
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
            '+' | '＋' => Some('+'),
            '-' | 'ー' => Some('-'),
            '*' | '＊' | '×' => Some('*'),
            '/' | '／' | '・' | '÷' => Some('/'),
            '(' | '（' => Some('('),
            ')' | '）' => Some(')'),
            '=' | '＝' => Some('='),
            _ => None,
        })
        .collect()
}

/// Reverse conversion through the forward lattice with a
/// `ReverseConversion` request. Arithmetic expressions short-cut to their
/// half-width form.
pub struct LatticeReverseConverter {
    lattice: Arc<dyn LatticeConverter>,
}

impl LatticeReverseConverter {
    pub fn new(lattice: Arc<dyn LatticeConverter>) -> Self {
        Self { lattice }
    }
}

impl ReverseConverter for LatticeReverseConverter {
    fn reverse_convert(&self, key: &str, segments: &mut Segments) -> bool {
        if let Some(expr) = normalize_math_expression(key) {
            let Some(seg) = segments.conversion_segment_mut(0) else {
                return false;
            };
            seg.push_candidate(Candidate::new(key, expr));
            return true;
        }

        let request = ConversionRequestBuilder::new()
            .set_request_type(RequestType::ReverseConversion)
            .set_key(key)
            .build();
        if !self.lattice.convert_for_request(&request, segments) {
            debug!(key, "reverse conversion produced nothing");
            segments.clear();
            return false;
        }
        let complete = !segments.is_empty()
            && segments.iter().all(|seg| {
                seg.candidate(0)
                    .is_some_and(|c| !c.value.is_empty())
            });
        if !complete {
            debug!(key, "reverse conversion left a segment without reading");
            segments.clear();
            return false;
        }
        true
    }
}
