//! The three output regions and the per-row expand/collapse state.
//!
//! [`ResultsPanel`] is toolkit-agnostic: it holds text and [`RowView`]s, and a
//! rendering adapter draws it. The uploader writes into it through a
//! [`SharedPanel`], taking the lock only for the instant of each write.

use crate::error::UploadError;
use crate::model::{InterpretedMap, UploadResult};
use crate::view::{build_rows, RowView};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

/// Placeholder written to the raw-text region while a request is in flight.
pub const PROCESSING_PLACEHOLDER: &str = "Processing...";

/// A panel shared between the UI loop and in-flight uploads.
pub type SharedPanel = Arc<Mutex<ResultsPanel>>;

/// Raw-text region, values list, summary region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultsPanel {
    pub raw_text: String,
    rows: Vec<RowView>,
    /// One flag per row, same indices as `rows`. Not persisted across renders.
    expanded: Vec<bool>,
    pub summary: String,
}

impl ResultsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh panel for sharing with [`crate::upload::Uploader::submit`].
    pub fn shared() -> SharedPanel {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Empty all three regions.
    pub fn clear(&mut self) {
        self.raw_text.clear();
        self.summary.clear();
        self.clear_rows();
    }

    /// Clear everything and show [`PROCESSING_PLACEHOLDER`].
    pub fn begin_processing(&mut self) {
        self.clear();
        self.raw_text.push_str(PROCESSING_PLACEHOLDER);
    }

    /// Replace the values list with one row per entry.
    ///
    /// Previous rows and their expanded state are discarded first, so calling
    /// this twice with the same input yields the same state.
    pub fn render(&mut self, interpreted: &InterpretedMap) {
        self.clear_rows();
        self.rows = build_rows(interpreted);
        self.expanded = vec![false; self.rows.len()];
    }

    /// Populate all three regions from a successful response.
    pub fn show_result(&mut self, result: &UploadResult) {
        self.raw_text = result.raw_text_or_fallback().to_string();
        self.render(&result.interpreted);
        self.summary = result.summary_or_fallback().to_string();
    }

    /// Write `"Error: <message>"` into the raw-text region.
    ///
    /// The values and summary regions are not touched; after
    /// [`begin_processing`](Self::begin_processing) they are already empty.
    pub fn show_error(&mut self, error: &UploadError) {
        self.raw_text = error.inline_message();
    }

    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the row at `index` is expanded. Out-of-range rows read as collapsed.
    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded.get(index).copied().unwrap_or(false)
    }

    /// Flip one row's detail panel. Returns the new state, or `None` if there
    /// is no such row.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let flag = self.expanded.get_mut(index)?;
        *flag = !*flag;
        Some(*flag)
    }

    pub fn expand_all(&mut self) {
        self.expanded.iter_mut().for_each(|f| *f = true);
    }

    pub fn collapse_all(&mut self) {
        self.expanded.iter_mut().for_each(|f| *f = false);
    }

    /// Rows paired with their expanded flag, in display order.
    pub fn iter_rows(&self) -> impl Iterator<Item = (&RowView, bool)> {
        self.rows.iter().zip(self.expanded.iter().copied())
    }

    fn clear_rows(&mut self) {
        self.rows.clear();
        self.expanded.clear();
    }
}

/// Lock a shared panel, recovering the data if a previous holder panicked.
///
/// Every write leaves the panel in a displayable state, so a poisoned lock
/// carries nothing worth refusing.
pub fn lock_panel(panel: &SharedPanel) -> MutexGuard<'_, ResultsPanel> {
    panel.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Range, TestResult};

    fn sample() -> InterpretedMap {
        [
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
                    ..Default::default()
                },
            ),
            ("Iron", TestResult::default()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn render_then_empty_render_leaves_no_rows() {
        let mut p = ResultsPanel::new();
        p.render(&sample());
        assert_eq!(p.row_count(), 3);
        p.render(&InterpretedMap::new());
        assert_eq!(p.row_count(), 0);
        assert!(p.toggle(0).is_none());
    }

    #[test]
    fn render_is_idempotent() {
        let mut p = ResultsPanel::new();
        p.render(&sample());
        let once = p.clone();
        p.render(&sample());
        assert_eq!(p, once);
    }

    #[test]
    fn rows_start_collapsed() {
        let mut p = ResultsPanel::new();
        p.render(&sample());
        assert!((0..3).all(|i| !p.is_expanded(i)));
    }

    #[test]
    fn toggle_affects_only_that_row() {
        let mut p = ResultsPanel::new();
        p.render(&sample());
        assert_eq!(p.toggle(1), Some(true));
        assert!(!p.is_expanded(0));
        assert!(p.is_expanded(1));
        assert!(!p.is_expanded(2));
        assert_eq!(p.toggle(1), Some(false));
        assert!(!p.is_expanded(1));
        assert_eq!(p.toggle(7), None);
    }

    #[test]
    fn rerender_resets_expanded_state() {
        let mut p = ResultsPanel::new();
        p.render(&sample());
        p.toggle(0);
        p.render(&sample());
        assert!(!p.is_expanded(0));
    }

    #[test]
    fn expand_and_collapse_all() {
        let mut p = ResultsPanel::new();
        p.render(&sample());
        p.expand_all();
        assert!(p.iter_rows().all(|(_, open)| open));
        p.collapse_all();
        assert!(p.iter_rows().all(|(_, open)| !open));
    }

    #[test]
    fn begin_processing_clears_and_sets_placeholder() {
        let mut p = ResultsPanel::new();
        p.show_result(&UploadResult {
            raw_text: Some("old".into()),
            interpreted: sample(),
            summary: Some("old summary".into()),
        });
        p.begin_processing();
        assert_eq!(p.raw_text, "Processing...");
        assert_eq!(p.row_count(), 0);
        assert!(p.summary.is_empty());
    }

    #[test]
    fn show_result_applies_fallbacks() {
        let mut p = ResultsPanel::new();
        p.show_result(&UploadResult::default());
        assert_eq!(p.raw_text, "No text extracted.");
        assert_eq!(p.summary, "No summary available.");
        assert_eq!(p.row_count(), 0);
    }

    #[test]
    fn show_error_only_touches_raw_text() {
        let mut p = ResultsPanel::new();
        p.begin_processing();
        p.show_error(&UploadError::Server { status: 500 });
        assert_eq!(p.raw_text, "Error: Server error");
        assert_eq!(p.row_count(), 0);
        assert!(p.summary.is_empty());
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let panel = ResultsPanel::shared();
        let clone = Arc::clone(&panel);
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock().unwrap();
            panic!("poison");
        })
        .join();
        lock_panel(&panel).begin_processing();
        assert_eq!(lock_panel(&panel).raw_text, "Processing...");
    }
}
