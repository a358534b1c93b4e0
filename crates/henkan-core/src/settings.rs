//! Converter tunables: history depth, revert queue bound, request
//! candidate caps, grammar ids and the POS backfill widths.
//!
//! The embedded `default_settings.toml` is used unless a caller installs its
//! own TOML with [`init_custom`] before anything reads [`settings`].

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();
static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Install `toml_content` in place of the embedded defaults. Fails if it
/// does not validate or a custom TOML was already installed.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Settings in effect, parsed on first access.
pub fn settings() -> &'static Settings {
    SETTINGS.get_or_init(|| {
        let source = CUSTOM_TOML.get().map_or(DEFAULT_SETTINGS_TOML, String::as_str);
        // Custom TOML was validated by init_custom, the default by build.rs.
        parse_settings_toml(source).expect("settings TOML must be valid")
    })
}

/// The TOML `settings-export` prints.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("malformed settings TOML: {0}")]
    Parse(String),
    #[error("{field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("custom settings were already installed")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub segments: SegmentSettings,
    pub request: RequestSettings,
    pub pos: PosSettings,
    pub completion: CompletionSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentSettings {
    pub max_history_segments_size: usize,
    pub max_revert_entries: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestSettings {
    pub max_conversion_candidates_size: usize,
    pub max_user_history_prediction_candidates_size: usize,
    pub max_user_history_prediction_candidates_size_for_zero_query: usize,
    pub max_dictionary_prediction_candidates_size: usize,
}

/// Grammar-class ids the converter assigns on its own.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PosSettings {
    pub general_noun_id: u16,
    pub unique_noun_id: u16,
    pub number_id: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionSettings {
    pub expand_size_start: usize,
    pub expand_size_step: usize,
    pub expand_size_max: usize,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_positive!(segments.max_history_segments_size);
    check_positive!(segments.max_revert_entries);

    check_positive!(request.max_conversion_candidates_size);

    // 0 is the "unresolved" POS id and cannot be assigned.
    check_positive!(pos.general_noun_id);
    check_positive!(pos.unique_noun_id);
    check_positive!(pos.number_id);

    check_positive!(completion.expand_size_start);
    check_positive!(completion.expand_size_step);
    if s.completion.expand_size_start >= s.completion.expand_size_max {
        return Err(SettingsError::InvalidValue {
            field: "completion.expand_size_start".to_string(),
            reason: "must be less than completion.expand_size_max".to_string(),
        });
    }

    Ok(())
}
