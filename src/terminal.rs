//! Terminal rendering adapter: [`ResultsPanel`] → text.
//!
//! Each row prints as a one-line header; expanded rows add their detail
//! lines underneath:
//!
//! ```text
//! ▸  1. ✅ Glucose                    95
//! ▾  2. ❌ LDL                        190
//!        Value: 190 (Ref: 0-129 mg/dL)
//!        Status: high
//!        Note: Higher than expected range.
//! ```

use crate::panel::ResultsPanel;
use crate::view::{RowView, StatusColor};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

/// How to draw a panel.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Emit ANSI colour codes.
    pub color: bool,
    /// Flatten HTML in the summary to plain text.
    pub flatten_summary: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            color: true,
            flatten_summary: true,
        }
    }
}

// ── ANSI helpers ─────────────────────────────────────────────────────────────

pub const BOLD: &str = "1";
pub const DIM: &str = "2";
pub const RED: &str = "31";

/// Wrap `s` in the SGR `code` when `on`; otherwise return it unchanged.
pub fn paint(s: &str, code: &str, on: bool) -> String {
    if on {
        format!("\x1b[{code}m{s}\x1b[0m")
    } else {
        s.to_string()
    }
}

fn status_code(c: StatusColor) -> &'static str {
    match c {
        StatusColor::Red => RED,
        StatusColor::Orange => "38;5;208",
        StatusColor::Green => "32",
    }
}

// ── Rendering ────────────────────────────────────────────────────────────────

/// Draw all three regions.
pub fn render_panel(panel: &ResultsPanel, opts: &RenderOptions) -> String {
    let mut out = String::new();

    section(&mut out, "Extracted text", opts);
    out.push_str(panel.raw_text.trim_end());
    out.push_str("\n\n");

    section(&mut out, "Values", opts);
    if panel.row_count() == 0 {
        out.push_str(&paint("(none)", DIM, opts.color));
        out.push('\n');
    }
    for (row, expanded) in panel.iter_rows() {
        out.push_str(&render_row(row, expanded, opts));
    }
    out.push('\n');

    section(&mut out, "Summary", opts);
    if opts.flatten_summary {
        out.push_str(&summary_to_text(&panel.summary));
    } else {
        out.push_str(panel.summary.trim_end());
    }
    out.push('\n');
    out
}

fn section(out: &mut String, title: &str, opts: &RenderOptions) {
    let _ = writeln!(out, "{}", paint(&format!("── {title} ──"), BOLD, opts.color));
}

/// Header line, plus the detail lines when `expanded`.
pub fn render_row(row: &RowView, expanded: bool, opts: &RenderOptions) -> String {
    let caret = if expanded { "▾" } else { "▸" };
    let mut out = format!(
        "{caret} {:>2}. {} {:<28} {}\n",
        row.index + 1,
        row.badge.emoji(),
        row.label,
        paint(&row.preview, BOLD, opts.color),
    );

    if expanded {
        let _ = writeln!(out, "       {}", row.detail_text);
        let _ = writeln!(
            out,
            "       Status: {}",
            paint(&row.status_label, status_code(row.status_color()), opts.color)
        );
        if let Some(note) = &row.note {
            let _ = writeln!(out, "       Note: {note}");
        }
    }
    out
}

// ── Summary flattening ───────────────────────────────────────────────────────
//
// The service's template summary is an HTML fragment (<h3>, <ul>, <li>).
// Only display is affected; the panel keeps the text as received.

static RE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());
static RE_LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<li\b[^>]*>").unwrap());
static RE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(?:p|div|h[1-6]|ul|ol|li|table|tr)\b[^>]*>").unwrap());
static RE_ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Convert an HTML summary to plain lines. Text without tags is returned trimmed.
pub fn summary_to_text(summary: &str) -> String {
    if !summary.contains('<') {
        return summary.trim().to_string();
    }
    let s = RE_BREAK.replace_all(summary, "\n");
    let s = RE_LIST_ITEM.replace_all(&s, "\n• ");
    let s = RE_BLOCK.replace_all(&s, "\n");
    let s = RE_ANY_TAG.replace_all(&s, "");
    let s = html_escape::decode_html_entities(&s);

    s.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InterpretedMap, Range, TestResult, UploadResult};

    const PLAIN: RenderOptions = RenderOptions {
        color: false,
        flatten_summary: true,
    };

    fn panel() -> ResultsPanel {
        let interpreted: InterpretedMap = [
            (
                "Glucose",
                TestResult {
                    value: Some("95".into()),
                    status: Some("normal".into()),
                    range: Some(Range {
                        low: Some("70".into()),
                        high: Some("99".into()),
                        units: Some("mg/dL".into()),
                    }),
                    note: None,
                },
            ),
            (
                "LDL",
                TestResult {
                    value: Some("190".into()),
                    status: Some("high".into()),
                    range: None,
                    note: Some("Higher than expected range.".into()),
                },
            ),
        ]
        .into_iter()
        .collect();
        let mut p = ResultsPanel::new();
        p.show_result(&UploadResult {
            raw_text: Some("ABC".into()),
            interpreted,
            summary: Some("All normal".into()),
        });
        p
    }

    #[test]
    fn collapsed_rows_show_headers_only() {
        let out = render_panel(&panel(), &PLAIN);
        assert!(out.contains("ABC"));
        assert!(out.contains("▸  1. ✅ Glucose"));
        assert!(out.contains("▸  2. ❌ LDL"));
        assert!(!out.contains("Value:"));
        assert!(out.contains("All normal"));
    }

    #[test]
    fn expanded_row_shows_details() {
        let mut p = panel();
        p.toggle(1);
        let out = render_panel(&p, &PLAIN);
        assert!(out.contains("▾  2. ❌ LDL"));
        assert!(out.contains("Value: 190 (Ref: N/A)"));
        assert!(out.contains("Status: high"));
        assert!(out.contains("Note: Higher than expected range."));
        assert!(!out.contains("Value: 95"));
    }

    #[test]
    fn colour_codes_follow_status() {
        let mut p = panel();
        p.expand_all();
        let out = render_panel(&p, &RenderOptions::default());
        assert!(out.contains("\x1b[31mhigh\x1b[0m"));
        assert!(out.contains("\x1b[32mnormal\x1b[0m"));
    }

    #[test]
    fn paint_is_a_no_op_without_colour() {
        assert_eq!(paint("x", RED, false), "x");
        assert_eq!(paint("x", BOLD, true), "\x1b[1mx\x1b[0m");
    }

    #[test]
    fn empty_values_region_says_none() {
        let out = render_panel(&ResultsPanel::new(), &PLAIN);
        assert!(out.contains("(none)"));
    }

    #[test]
    fn flattens_template_summary() {
        let html = "<h3>Summary of your report:</h3><ul>\
                    <li>Glucose: 95 → Normal.</li>\
                    <li>LDL: 190 → High. Above the normal range.</li></ul>";
        assert_eq!(
            summary_to_text(html),
            "Summary of your report:\n• Glucose: 95 → Normal.\n• LDL: 190 → High. Above the normal range."
        );
    }

    #[test]
    fn plain_summary_is_untouched() {
        assert_eq!(summary_to_text("  All normal \n"), "All normal");
    }

    #[test]
    fn entities_are_decoded_after_tags() {
        assert_eq!(summary_to_text("<p>a &lt;b&gt; &amp; c</p>"), "a <b> & c");
    }

    #[test]
    fn numeric_entities_are_decoded() {
        assert_eq!(
            summary_to_text("<li>Glucose: 95 &#8594; Normal (70&#x2013;99 mg/dL)</li>"),
            "• Glucose: 95 → Normal (70–99 mg/dL)"
        );
    }

    #[test]
    fn raw_summary_option_keeps_html() {
        let mut p = ResultsPanel::new();
        p.summary = "<ul><li>x</li></ul>".into();
        let opts = RenderOptions {
            color: false,
            flatten_summary: false,
        };
        assert!(render_panel(&p, &opts).contains("<ul><li>x</li></ul>"));
    }
}
