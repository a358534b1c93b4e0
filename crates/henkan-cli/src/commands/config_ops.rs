use std::fs;
use std::process;

use henkan_core::settings;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Install a custom settings file. Must run before anything reads settings.
pub fn load_settings(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    die!(settings::init_custom(content), "Error loading {file}: {}");
}

pub fn settings_export() {
    print!("{}", settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(settings::parse_settings_toml(&content), "Error: {}");
    println!(
        "OK: segments.max_history_segments_size={}, request.max_conversion_candidates_size={}, completion=[{}, +{}, <{}]",
        s.segments.max_history_segments_size,
        s.request.max_conversion_candidates_size,
        s.completion.expand_size_start,
        s.completion.expand_size_step,
        s.completion.expand_size_max,
    );
}
