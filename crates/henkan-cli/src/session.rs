//! One converter plus the request settings shared by every subcommand.

use std::sync::Arc;

use henkan_converter::rewriter::{KatakanaRewriter, RewriterPipeline};
use henkan_converter::suppression::SuppressionDictionary;
use henkan_converter::{Converter, ConverterBuilder};
use henkan_core::request::{
    ClientRequest, ComposerData, ConversionRequest, ConversionRequestBuilder, RequestType,
};
use henkan_core::segments::Segments;
use serde::Serialize;
use tracing::warn;

use crate::dict_source::TsvDictionary;
use crate::lattice::{LongestMatchConverter, PrefixPredictor};

/// Parse a `key:value` suppression entry. Either side may be empty to act as
/// a wildcard, but not both.
pub fn parse_suppress_entry(s: &str) -> Result<(String, String), String> {
    let Some((key, value)) = s.split_once(':') else {
        return Err(format!("expected key:value, got {s:?}"));
    };
    if key.is_empty() && value.is_empty() {
        return Err("key and value cannot both be empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}

#[derive(Debug, Default, Clone)]
pub struct SessionOptions {
    pub candidates_size_limit: Option<usize>,
    pub suppress: Vec<(String, String)>,
}

/// Result of one subcommand: whether the converter reported success and the
/// segments it left behind.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub ok: bool,
    pub segments: Segments,
}

pub struct Session {
    converter: Converter,
    options: SessionOptions,
}

impl Session {
    pub fn new(dict: Arc<TsvDictionary>, options: SessionOptions) -> Self {
        let suppression = Arc::new(SuppressionDictionary::new());
        for (key, value) in &options.suppress {
            if !suppression.add_entry(key, value) {
                warn!(key = %key, value = %value, "ignored suppression entry");
            }
        }
        let converter = ConverterBuilder::new(
            Arc::new(LongestMatchConverter::new(Arc::clone(&dict))),
            PrefixPredictor::new(dict),
            RewriterPipeline::new().push(KatakanaRewriter),
        )
        .suppression(suppression)
        .build();
        Self { converter, options }
    }

    fn request(&self, key: &str, request_type: RequestType) -> ConversionRequest {
        ConversionRequestBuilder::new()
            .set_composer_data(ComposerData::from_text(key))
            .set_client_request(ClientRequest {
                candidates_size_limit: self.options.candidates_size_limit,
                ..ClientRequest::default()
            })
            .set_request_type(request_type)
            .build()
    }

    pub fn convert(&self, key: &str) -> Outcome {
        let mut segments = Segments::new();
        let ok = self
            .converter
            .start_conversion(&mut segments, &self.request(key, RequestType::Conversion));
        Outcome { ok, segments }
    }

    pub fn predict(&self, key: &str, suggest: bool) -> Outcome {
        let request_type = if suggest {
            RequestType::Suggestion
        } else {
            RequestType::Prediction
        };
        let mut segments = Segments::new();
        let ok = self
            .converter
            .start_prediction(&mut segments, &self.request(key, request_type));
        Outcome { ok, segments }
    }

    /// Convert `key`, then cut the conversion segments into `sizes`.
    pub fn resize(&self, key: &str, sizes: &[u8]) -> Outcome {
        let request = self.request(key, RequestType::Conversion);
        let mut segments = Segments::new();
        let ok = self.converter.start_conversion(&mut segments, &request)
            && self
                .converter
                .resize_segments(&mut segments, &request, 0, sizes);
        Outcome { ok, segments }
    }

    pub fn reverse(&self, text: &str) -> Outcome {
        let mut segments = Segments::new();
        let ok = self.converter.start_reverse_conversion(&mut segments, text);
        Outcome { ok, segments }
    }

    pub fn history(&self, preceding_text: &str) -> Outcome {
        let mut segments = Segments::new();
        let ok = self
            .converter
            .reconstruct_history(&mut segments, preceding_text);
        Outcome { ok, segments }
    }
}
