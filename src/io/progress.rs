//! Batch progress tracking with automatic switch to a single bar for large sets

use crate::io::configuration::{MAX_INDIVIDUAL_PROGRESS_BARS, PROGRESS_BAR_WIDTH};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

/// Coordinates progress display for batch operations
///
/// Small batches get one line per item; larger batches get a single counting
/// bar. Every method takes `&self` so workers can report concurrently.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    batch_bar: Option<ProgressBar>,
    item_bars: Vec<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

static ITEM_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_spinner()
        .template("{spinner} {prefix} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
});

static BATCH_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Levels: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

impl ProgressManager {
    /// Create a new progress manager
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            batch_bar: None,
            item_bars: Vec::new(),
        }
    }

    /// Create the bars for a batch of `total` items
    pub fn initialize(&mut self, total: usize) {
        if total > MAX_INDIVIDUAL_PROGRESS_BARS {
            let batch_bar = ProgressBar::new(total as u64);
            batch_bar.set_style(BATCH_STYLE.clone());
            self.batch_bar = Some(self.multi_progress.add(batch_bar));
            return;
        }
        for _ in 0..total {
            let bar = ProgressBar::new_spinner();
            bar.set_style(ITEM_STYLE.clone());
            self.item_bars.push(self.multi_progress.add(bar));
        }
    }

    /// Label an item as in progress
    pub fn start_item(&self, index: usize, label: &str) {
        if let Some(bar) = self.item_bars.get(index) {
            bar.set_prefix(label.to_string());
            bar.set_message("working");
            bar.tick();
        }
    }

    /// Mark an item as done
    pub fn complete_item(&self, index: usize, ok: bool) {
        if let Some(batch_bar) = &self.batch_bar {
            batch_bar.inc(1);
        }
        if let Some(bar) = self.item_bars.get(index) {
            bar.finish_with_message(if ok { "✓" } else { "✗" });
        }
    }

    /// Number of items completed so far
    pub fn completed(&self) -> u64 {
        self.batch_bar.as_ref().map_or_else(
            || {
                self.item_bars
                    .iter()
                    .filter(|bar| bar.is_finished())
                    .count() as u64
            },
            ProgressBar::position,
        )
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(batch_bar) = &self.batch_bar {
            batch_bar.finish_with_message("All levels processed");
        }
        let _ = self.multi_progress.clear();
    }
}
