//! Per-operation conversion request and its stage-ordered builder.
//!
//! A `ConversionRequest` is an immutable snapshot: the composer state, the
//! client/context/config data, behavior options and the phonetic key to
//! convert. Requests are assembled with `ConversionRequestBuilder`, whose
//! setters must be called in stage order:
//!
//! 1. `set_conversion_request` (copy a base request)
//! 2. `set_composer_data`, `set_client_request`, `set_context`, `set_config`,
//!    `set_options`
//! 3. `set_request_type`, `set_key`
//!
//! Going back to an earlier stage is a programming error caught by
//! `debug_assert!`.

use serde::Serialize;

use crate::settings::settings;
use crate::unicode::char_substring;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum RequestType {
    #[default]
    Conversion,
    ReverseConversion,
    Prediction,
    Suggestion,
    /// Prediction scoped to the text before the cursor.
    PartialPrediction,
    /// Suggestion scoped to the text before the cursor.
    PartialSuggestion,
}

impl RequestType {
    pub fn is_partial(self) -> bool {
        matches!(
            self,
            RequestType::PartialPrediction | RequestType::PartialSuggestion
        )
    }

    /// Kinds served by the predictor.
    pub fn is_prediction(self) -> bool {
        matches!(
            self,
            RequestType::Prediction
                | RequestType::Suggestion
                | RequestType::PartialPrediction
                | RequestType::PartialSuggestion
        )
    }
}

/// Which composer query a `Conversion` request converts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ComposerKeySelection {
    #[default]
    ConversionKey,
    PredictionKey,
}

/// Snapshot of the composition buffer. Cursor and length are in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComposerData {
    pub conversion_query: String,
    pub prediction_query: String,
    pub cursor: usize,
    pub length: usize,
}

impl ComposerData {
    /// Composer holding `text` with the cursor at the end.
    pub fn from_text(text: &str) -> Self {
        let length = crate::unicode::chars_len(text);
        Self {
            conversion_query: text.to_string(),
            prediction_query: text.to_string(),
            cursor: length,
            length,
        }
    }

    pub fn with_cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    /// The cursor sits strictly between the first and last character.
    pub fn is_cursor_inside(&self) -> bool {
        self.cursor > 0 && self.cursor < self.length
    }
}

/// Capabilities announced by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientRequest {
    pub mixed_conversion: bool,
    pub zero_query_suggestion: bool,
    /// Cap on the candidate count of each conversion segment.
    pub candidates_size_limit: Option<usize>,
    pub kana_modifier_insensitive_conversion: bool,
}

/// Text surrounding the composition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Context {
    pub preceding_text: String,
}

/// User configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    pub use_kana_modifier_insensitive_conversion: bool,
}

/// Behavior flags and limits. Numeric defaults come from the `[request]`
/// settings section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestOptions {
    pub request_type: RequestType,
    pub max_conversion_candidates_size: usize,
    pub max_user_history_prediction_candidates_size: usize,
    pub max_user_history_prediction_candidates_size_for_zero_query: usize,
    pub max_dictionary_prediction_candidates_size: usize,
    /// Run the full lattice search for realtime conversion candidates.
    pub use_actual_converter_for_realtime_conversion: bool,
    pub skip_slow_rewriters: bool,
    pub create_partial_candidates: bool,
    pub enable_user_history_for_conversion: bool,
    pub kana_modifier_insensitive_conversion: bool,
    pub use_already_typing_corrected_key: bool,
    pub composer_key_selection: ComposerKeySelection,
}

impl Default for RequestOptions {
    fn default() -> Self {
        let s = &settings().request;
        Self {
            request_type: RequestType::Conversion,
            max_conversion_candidates_size: s.max_conversion_candidates_size,
            max_user_history_prediction_candidates_size: s
                .max_user_history_prediction_candidates_size,
            max_user_history_prediction_candidates_size_for_zero_query: s
                .max_user_history_prediction_candidates_size_for_zero_query,
            max_dictionary_prediction_candidates_size: s.max_dictionary_prediction_candidates_size,
            use_actual_converter_for_realtime_conversion: false,
            skip_slow_rewriters: false,
            create_partial_candidates: false,
            enable_user_history_for_conversion: true,
            kana_modifier_insensitive_conversion: true,
            use_already_typing_corrected_key: false,
            composer_key_selection: ComposerKeySelection::ConversionKey,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionRequest {
    composer: Option<ComposerData>,
    client_request: ClientRequest,
    context: Context,
    config: Config,
    options: RequestOptions,
    key: String,
}

impl ConversionRequest {
    pub fn request_type(&self) -> RequestType {
        self.options.request_type
    }

    /// Phonetic key to convert.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn composer(&self) -> Option<&ComposerData> {
        self.composer.as_ref()
    }

    pub fn client_request(&self) -> &ClientRequest {
        &self.client_request
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    pub fn max_conversion_candidates_size(&self) -> usize {
        self.options.max_conversion_candidates_size
    }

    pub fn candidates_size_limit(&self) -> Option<usize> {
        self.client_request.candidates_size_limit
    }

    /// Mobile layout where meta-candidates may stand in for candidates.
    pub fn is_zero_query_mixed_conversion(&self) -> bool {
        self.client_request.zero_query_suggestion && self.client_request.mixed_conversion
    }

    /// Effective only when the client, the user config and the options all
    /// enable it.
    pub fn is_kana_modifier_insensitive_conversion(&self) -> bool {
        self.client_request.kana_modifier_insensitive_conversion
            && self.config.use_kana_modifier_insensitive_conversion
            && self.options.kana_modifier_insensitive_conversion
    }

    pub fn enable_user_history_for_conversion(&self) -> bool {
        self.options.enable_user_history_for_conversion
    }

    pub fn skip_slow_rewriters(&self) -> bool {
        self.options.skip_slow_rewriters
    }
}

/// Key the composer yields for `options`.
fn composer_key(composer: &ComposerData, options: &RequestOptions) -> String {
    match options.request_type {
        RequestType::Conversion => match options.composer_key_selection {
            ComposerKeySelection::ConversionKey => composer.conversion_query.clone(),
            ComposerKeySelection::PredictionKey => composer.prediction_query.clone(),
        },
        RequestType::Prediction | RequestType::Suggestion => composer.prediction_query.clone(),
        RequestType::PartialPrediction | RequestType::PartialSuggestion => {
            char_substring(&composer.conversion_query, 0, composer.cursor).to_string()
        }
        RequestType::ReverseConversion => String::new(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    #[default]
    Empty,
    Base,
    Inputs,
    Overrides,
}

#[derive(Debug, Default)]
pub struct ConversionRequestBuilder {
    request: ConversionRequest,
    stage: Stage,
    explicit_key: Option<String>,
}

impl ConversionRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn advance(&mut self, stage: Stage) {
        debug_assert!(
            self.stage <= stage,
            "builder stage {stage:?} set after {:?}",
            self.stage
        );
        self.stage = self.stage.max(stage);
    }

    /// Start from a copy of `base`, including its key.
    pub fn set_conversion_request(mut self, base: &ConversionRequest) -> Self {
        self.advance(Stage::Base);
        self.request = base.clone();
        self
    }

    pub fn set_composer_data(mut self, composer: ComposerData) -> Self {
        self.advance(Stage::Inputs);
        self.request.composer = Some(composer);
        self
    }

    pub fn set_client_request(mut self, client_request: ClientRequest) -> Self {
        self.advance(Stage::Inputs);
        self.request.client_request = client_request;
        self
    }

    pub fn set_context(mut self, context: Context) -> Self {
        self.advance(Stage::Inputs);
        self.request.context = context;
        self
    }

    pub fn set_config(mut self, config: Config) -> Self {
        self.advance(Stage::Inputs);
        self.request.config = config;
        self
    }

    pub fn set_options(mut self, options: RequestOptions) -> Self {
        self.advance(Stage::Inputs);
        self.request.options = options;
        self
    }

    pub fn set_request_type(mut self, request_type: RequestType) -> Self {
        self.advance(Stage::Overrides);
        self.request.options.request_type = request_type;
        self
    }

    /// Override the key derived from the composer.
    pub fn set_key(mut self, key: impl Into<String>) -> Self {
        self.advance(Stage::Overrides);
        self.explicit_key = Some(key.into());
        self
    }

    /// Finish the request. Without `set_key`, the key is derived from the
    /// composer when one is present and kept from the base request
    /// otherwise.
    pub fn build(self) -> ConversionRequest {
        let mut request = self.request;
        if let Some(key) = self.explicit_key {
            request.key = key;
        } else if let Some(composer) = &request.composer {
            request.key = composer_key(composer, &request.options);
        }
        request
    }
}
