use std::process;

use tracing::info;

use super::{render_json, render_text};
use crate::session::{Outcome, Session};

/// Print `outcome` as text or JSON. A failed operation still prints what it
/// left behind, then exits with status 1.
fn report(command: &str, outcome: &Outcome, json: bool) {
    if json {
        match render_json(outcome) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Error encoding JSON: {e}");
                process::exit(1);
            }
        }
    } else {
        print!("{}", render_text(&outcome.segments));
    }
    info!(command, ok = outcome.ok, segments = outcome.segments.len());
    if !outcome.ok {
        eprintln!("{command}: converter reported failure");
        process::exit(1);
    }
}

pub fn convert_cmd(session: &Session, key: &str, json: bool) {
    report("convert", &session.convert(key), json);
}

pub fn predict_cmd(session: &Session, key: &str, suggest: bool, json: bool) {
    report("predict", &session.predict(key, suggest), json);
}

pub fn resize_cmd(session: &Session, key: &str, sizes: &[u8], json: bool) {
    report("resize", &session.resize(key, sizes), json);
}

pub fn reverse_cmd(session: &Session, text: &str, json: bool) {
    report("reverse", &session.reverse(text), json);
}

pub fn history_cmd(session: &Session, text: &str, json: bool) {
    report("history", &session.history(text), json);
}
