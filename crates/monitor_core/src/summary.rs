/// Counts reported once a run has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Products in the state file when the run started.
    pub previous: usize,
    /// Unique products found on the page.
    pub found: usize,
    /// Products not seen in any earlier run.
    pub added: usize,
    pub sent: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Added products left without a notification because the cap was reached.
    pub unnotified: usize,
}

impl RunSummary {
    /// Products handed to the notifier, whatever the outcome.
    pub fn attempted(&self) -> usize {
        self.sent + self.skipped + self.failed
    }
}
