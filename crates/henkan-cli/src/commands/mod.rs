pub mod config_ops;
pub mod convert_ops;

use henkan_core::segments::{Candidate, Segment, Segments};
use unicode_width::UnicodeWidthStr;

use crate::session::Outcome;

fn pad(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{s}{}", " ".repeat(width.saturating_sub(w)))
}

fn candidate_line(label: &str, c: &Candidate, value_width: usize) -> String {
    format!(
        "  {label:>4}  {}  cost={:<6} ids=({},{})  key={}",
        pad(&c.value, value_width),
        c.cost,
        c.left_id,
        c.right_id,
        c.key
    )
}

fn render_segment(out: &mut String, label: &str, seg: &Segment) {
    out.push_str(&format!("{label} {} [{:?}]\n", seg.key, seg.segment_type));
    let value_width = seg
        .candidates
        .iter()
        .chain(seg.meta_candidates.iter())
        .map(|c| UnicodeWidthStr::width(c.value.as_str()))
        .max()
        .unwrap_or(0);
    for (i, c) in seg.candidates.iter().enumerate() {
        out.push_str(&candidate_line(&format!("#{i}"), c, value_width));
        out.push('\n');
    }
    for (i, c) in seg.meta_candidates.iter().enumerate() {
        let index = -(i as i32) - 1;
        out.push_str(&candidate_line(&index.to_string(), c, value_width));
        out.push('\n');
    }
}

/// Human-readable dump: one header per segment followed by its candidates,
/// values aligned by display width.
pub fn render_text(segments: &Segments) -> String {
    let history = segments.history_segments_len();
    let mut out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        let label = if i < history {
            format!("h{i}")
        } else {
            format!("c{}", i - history)
        };
        render_segment(&mut out, &label, seg);
    }
    out
}

pub fn render_json(outcome: &Outcome) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(outcome)
}
