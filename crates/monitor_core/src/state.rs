use std::collections::VecDeque;

use crate::{Product, RunSummary};

/// Progress of a single run. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStage {
    #[default]
    Start,
    ConfigValidated,
    StateLoaded,
    Fetched,
    Deduplicated,
    Diffed,
    /// Number of notifications attempted so far.
    Notified(usize),
    StateSaved,
    Done,
}

/// Result of handing one product to the notifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    /// Transport not configured.
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Awaiting {
    #[default]
    Nothing,
    Delivery,
    Save,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunState {
    stage: RunStage,
    max_notifications: usize,
    previous: Vec<Product>,
    current: Vec<Product>,
    pending: VecDeque<Product>,
    awaiting: Awaiting,
    summary: RunSummary,
}

impl RunState {
    pub fn new(max_notifications: usize) -> Self {
        Self {
            max_notifications,
            ..Self::default()
        }
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    pub fn max_notifications(&self) -> usize {
        self.max_notifications
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Deduplicated products from this run's fetch; what gets saved.
    pub fn current(&self) -> &[Product] {
        &self.current
    }

    /// Products still queued for notification.
    pub fn pending(&self) -> impl Iterator<Item = &Product> {
        self.pending.iter()
    }

    pub(crate) fn set_stage(&mut self, stage: RunStage) {
        self.stage = stage;
    }

    pub(crate) fn awaiting(&self) -> Awaiting {
        self.awaiting
    }

    pub(crate) fn set_awaiting(&mut self, awaiting: Awaiting) {
        self.awaiting = awaiting;
    }

    pub(crate) fn record_previous(&mut self, previous: Vec<Product>) {
        self.summary.previous = previous.len();
        self.previous = previous;
    }

    pub(crate) fn take_previous(&mut self) -> Vec<Product> {
        std::mem::take(&mut self.previous)
    }

    pub(crate) fn record_current(&mut self, current: Vec<Product>) {
        self.summary.found = current.len();
        self.current = current;
    }

    /// Queues at most `max_notifications` of `added`; the rest stay unnotified.
    pub(crate) fn plan_notifications(&mut self, added: Vec<Product>) {
        self.summary.added = added.len();
        self.summary.unnotified = added.len().saturating_sub(self.max_notifications);
        self.pending = added.into_iter().take(self.max_notifications).collect();
    }

    pub(crate) fn next_pending(&mut self) -> Option<Product> {
        self.pending.pop_front()
    }

    pub(crate) fn record_delivery(&mut self, outcome: DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Sent => self.summary.sent += 1,
            DeliveryOutcome::Skipped => self.summary.skipped += 1,
            DeliveryOutcome::Failed => self.summary.failed += 1,
        }
    }
}
