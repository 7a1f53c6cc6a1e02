//! Declarative view-model: interpreted values → ordered row records.
//!
//! This is the only place that knows how a status maps to a badge and a
//! colour, and how a reference range is spelled. Rendering adapters
//! (see [`crate::terminal`]) consume [`RowView`]s and never look at the raw
//! [`TestResult`].

use crate::model::{InterpretedMap, Range, TestResult};
use serde::Serialize;

/// Shown wherever a value is missing.
pub const VALUE_PLACEHOLDER: &str = "—";

/// Shown when an entry has no reference range.
pub const NO_RANGE: &str = "N/A";

/// Status label used when the service sent no status.
pub const DEFAULT_STATUS: &str = "normal";

/// Badge shown in a row header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
    High,
    Low,
    /// Covers `"normal"`, any unrecognised status, and a missing one.
    Normal,
}

/// Colour of the status line in the detail panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Red,
    Orange,
    Green,
}

impl BadgeKind {
    /// Classify a status. Only the exact literals `"high"` and `"low"` count.
    pub fn from_status(status: Option<&str>) -> Self {
        match status {
            Some("high") => BadgeKind::High,
            Some("low") => BadgeKind::Low,
            _ => BadgeKind::Normal,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            BadgeKind::High => "❌",
            BadgeKind::Low => "⚠️",
            BadgeKind::Normal => "✅",
        }
    }

    pub fn color(self) -> StatusColor {
        match self {
            BadgeKind::High => StatusColor::Red,
            BadgeKind::Low => StatusColor::Orange,
            BadgeKind::Normal => StatusColor::Green,
        }
    }
}

impl StatusColor {
    /// CSS-style colour name.
    pub fn name(self) -> &'static str {
        match self {
            StatusColor::Red => "red",
            StatusColor::Orange => "orange",
            StatusColor::Green => "green",
        }
    }
}

/// Everything needed to draw one collapsible row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    /// Position in the interpreted mapping; also the row's toggle key.
    pub index: usize,
    /// Test name.
    pub label: String,
    /// Compact value shown in the header.
    pub preview: String,
    pub badge: BadgeKind,
    /// Status as sent by the service, or [`DEFAULT_STATUS`].
    pub status_label: String,
    /// Formatted reference range, or [`NO_RANGE`].
    pub reference: String,
    pub note: Option<String>,
    /// `"Value: {value} (Ref: {reference})"`.
    pub detail_text: String,
}

impl RowView {
    pub fn status_color(&self) -> StatusColor {
        self.badge.color()
    }
}

/// Build one row per entry, in iteration order. Duplicate names each get a row.
pub fn build_rows(interpreted: &InterpretedMap) -> Vec<RowView> {
    interpreted
        .iter()
        .enumerate()
        .map(|(index, (name, result))| build_row(index, name, result))
        .collect()
}

/// Build the view record for a single entry.
pub fn build_row(index: usize, name: &str, result: &TestResult) -> RowView {
    let badge = BadgeKind::from_status(result.status.as_deref());
    let value = value_text(result.value.as_deref());
    let reference = reference_range(result.range.as_ref());
    RowView {
        index,
        label: name.to_string(),
        preview: value.to_string(),
        badge,
        status_label: result
            .status
            .clone()
            .unwrap_or_else(|| DEFAULT_STATUS.to_string()),
        detail_text: format!("Value: {value} (Ref: {reference})"),
        reference,
        note: result.note.clone(),
    }
}

/// The value, or [`VALUE_PLACEHOLDER`] when absent.
pub fn value_text(value: Option<&str>) -> &str {
    value.unwrap_or(VALUE_PLACEHOLDER)
}

/// `"{low}-{high} {units}"` with missing parts left empty and the result
/// trimmed; [`NO_RANGE`] when there is no range at all.
pub fn reference_range(range: Option<&Range>) -> String {
    let Some(r) = range else {
        return NO_RANGE.to_string();
    };
    format!(
        "{}-{} {}",
        r.low.as_deref().unwrap_or(""),
        r.high.as_deref().unwrap_or(""),
        r.units.as_deref().unwrap_or("")
    )
    .trim()
    .to_string()
}
