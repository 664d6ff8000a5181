//! Chapter reconciliation between the legacy single `chapter_count` column
//! and the `available_chapters` / `total_chapters` pair.
//!
//! Rows written before the pair existed only carry `chapter_count`. Both
//! directions below make those rows read the same as rows written with the
//! full field set, without rewriting them in place.

/// The stored chapter fields of a fan work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChapterProgress {
    pub legacy_count: Option<u32>,
    pub available: Option<u32>,
    pub total: Option<u32>,
    pub complete: Option<bool>,
}

impl ChapterProgress {
    fn is_complete(&self) -> bool {
        self.complete == Some(true)
    }

    /// Fills `available` / `total` from the legacy count when only it exists.
    /// A complete work's count is both; otherwise the final length is unknown.
    fn expand_legacy(&mut self) {
        if let (None, None, Some(legacy)) = (self.available, self.total, self.legacy_count) {
            self.available = Some(legacy);
            self.total = self.is_complete().then_some(legacy);
        }
    }

    /// Reconciliation applied when reading a row.
    pub fn reconcile_for_read(mut self) -> Self {
        match (self.available, self.total) {
            (None, None) => self.expand_legacy(),
            (None, Some(total)) => {
                if self.is_complete() {
                    self.available = Some(total);
                } else if self.legacy_count == Some(total) {
                    // A legacy count copied into `total` is really the
                    // released count of an ongoing work.
                    self.available = self.legacy_count;
                    self.total = None;
                }
            }
            _ => {}
        }
        self
    }

    /// Reconciliation applied when writing a row. Returns the progress to
    /// store along with the value for the legacy column, which prefers the
    /// most finished quantity known.
    ///
    /// A work that is not complete and has a `total` but no `available` never
    /// gets a legacy value equal to `total`: the read rule would take that
    /// pair for a copied legacy count and drop the total.
    pub fn reconcile_for_write(mut self) -> (Self, Option<u32>) {
        self.expand_legacy();
        match (self.available, self.total) {
            (Some(available), None) if self.is_complete() => self.total = Some(available),
            (None, Some(total)) if self.is_complete() => self.available = Some(total),
            (None, Some(total)) => {
                let legacy = self.legacy_count.filter(|l| *l != total);
                return (self, legacy);
            }
            _ => {}
        }
        let legacy = self.total.or(self.legacy_count).or(self.available);
        (self, legacy)
    }

    /// `total` without `available` after reconciliation: a shape the read
    /// rule leaves as stored.
    pub fn is_unresolved(&self) -> bool {
        self.available.is_none() && self.total.is_some()
    }
}
