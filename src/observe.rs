//! Progress observation.
//!
//! Operations report every row they process to a [`RowObserver`]. Observers
//! never influence control flow; pass `&mut ()` to ignore progress.

use crate::record::Row;
use log::info;

pub trait RowObserver {
    /// Called once per row handled by `stage` (e.g. `"cut"`, `"split pass 2"`).
    fn on_row(&mut self, stage: &str, row: &Row);

    /// Called when `stage` finished after `count` rows.
    fn on_finish(&mut self, _stage: &str, _count: usize) {}
}

impl RowObserver for () {
    #[inline]
    fn on_row(&mut self, _stage: &str, _row: &Row) {}
}

impl<F: FnMut(&str, &Row)> RowObserver for F {
    fn on_row(&mut self, stage: &str, row: &Row) {
        self(stage, row)
    }
}

/// Logs a running count every `gap` rows and a final count per stage.
#[derive(Debug)]
pub struct CountProgress {
    gap: usize,
    count: usize,
}

impl CountProgress {
    pub fn new(gap: usize) -> Self {
        Self {
            gap: gap.max(1),
            count: 0,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Default for CountProgress {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl RowObserver for CountProgress {
    fn on_row(&mut self, stage: &str, _row: &Row) {
        self.count += 1;
        if self.count % self.gap == 0 {
            info!("{stage} [{} processed] ...", self.count);
        }
    }

    fn on_finish(&mut self, stage: &str, count: usize) {
        info!("{stage} [{count} processed]");
        self.count = 0;
    }
}
