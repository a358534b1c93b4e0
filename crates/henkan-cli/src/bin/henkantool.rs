use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use henkan_cli::commands::{config_ops, convert_ops};
use henkan_cli::dict_source::TsvDictionary;
use henkan_cli::session::{parse_suppress_entry, Session, SessionOptions};
use henkan_cli::trace_init;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

#[derive(Parser)]
#[command(name = "henkantool", about = "Henkan conversion diagnostics")]
struct Cli {
    /// Custom settings TOML (see settings-export)
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Suppress a candidate, as key:value (either side may be empty)
    #[arg(long, global = true, value_parser = parse_suppress_entry)]
    suppress: Vec<(String, String)>,
    /// Candidates size limit per segment, meta-candidates included
    #[arg(long, global = true)]
    limit: Option<usize>,
    /// Log as JSON lines on stderr
    #[arg(long, global = true)]
    trace_json: bool,
    /// Write JSON trace lines to henkantool-trace.jsonl in this directory
    #[arg(long, global = true)]
    trace_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct DictArgs {
    /// Dictionary TSV: reading, surface, cost[, left_id, right_id]
    #[arg(long)]
    dict: String,
    /// Output as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a reading into segments and candidates
    Convert {
        #[command(flatten)]
        dict: DictArgs,
        /// Reading (hiragana)
        key: String,
    },
    /// Predict completions for a reading
    Predict {
        #[command(flatten)]
        dict: DictArgs,
        /// Reading (hiragana)
        key: String,
        /// Ask for suggestions instead of full prediction
        #[arg(long)]
        suggest: bool,
    },
    /// Convert, then cut the conversion into segments of the given sizes
    Resize {
        #[command(flatten)]
        dict: DictArgs,
        /// Reading (hiragana)
        key: String,
        /// Segment sizes in characters, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        sizes: Vec<u8>,
    },
    /// Convert surface text back to its reading
    Reverse {
        #[command(flatten)]
        dict: DictArgs,
        /// Surface text
        text: String,
    },
    /// Rebuild a history segment from preceding text
    History {
        #[command(flatten)]
        dict: DictArgs,
        /// Text before the cursor
        text: String,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn open_session(dict_file: &str, options: SessionOptions) -> Session {
    let dict = die!(
        TsvDictionary::open(Path::new(dict_file)),
        "Error opening dictionary: {}"
    );
    Session::new(Arc::new(dict), options)
}

fn main() {
    let cli = Cli::parse();
    let _guard = trace_init::init_tracing(cli.trace_json, cli.trace_dir.as_deref());

    if let Some(file) = &cli.settings {
        config_ops::load_settings(file);
    }
    let options = SessionOptions {
        candidates_size_limit: cli.limit,
        suppress: cli.suppress,
    };

    match cli.command {
        Command::Convert { dict, key } => {
            let session = open_session(&dict.dict, options);
            convert_ops::convert_cmd(&session, &key, dict.json);
        }
        Command::Predict { dict, key, suggest } => {
            let session = open_session(&dict.dict, options);
            convert_ops::predict_cmd(&session, &key, suggest, dict.json);
        }
        Command::Resize { dict, key, sizes } => {
            let session = open_session(&dict.dict, options);
            convert_ops::resize_cmd(&session, &key, &sizes, dict.json);
        }
        Command::Reverse { dict, text } => {
            let session = open_session(&dict.dict, options);
            convert_ops::reverse_cmd(&session, &text, dict.json);
        }
        Command::History { dict, text } => {
            let session = open_session(&dict.dict, options);
            convert_ops::history_cmd(&session, &text, dict.json);
        }
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
