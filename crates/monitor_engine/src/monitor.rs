use std::collections::VecDeque;

use monitor_core::{
    update, DeliveryOutcome, Effect, Msg, Product, RunStage, RunState, RunSummary,
};
use monitor_logging::{monitor_debug, monitor_error, monitor_info, monitor_warn};
use thiserror::Error;

use crate::{
    decode_html, Delivery, FetchError, Fetcher, Notifier, ProductExtractor, StateError,
    StateStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorSettings {
    /// Page to scrape.
    pub url: String,
    pub max_notifications: usize,
}

/// Errors that abort a run. Notification failures are not among them.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },
    #[error(transparent)]
    State(#[from] StateError),
    #[error("run stopped before finishing (stage {0:?})")]
    Stalled(RunStage),
}

/// Executes the effects of the core state machine for one run.
pub struct Monitor {
    settings: MonitorSettings,
    fetcher: Box<dyn Fetcher>,
    extractor: ProductExtractor,
    notifier: Box<dyn Notifier>,
    store: StateStore,
}

impl Monitor {
    pub fn new(
        settings: MonitorSettings,
        fetcher: Box<dyn Fetcher>,
        extractor: ProductExtractor,
        notifier: Box<dyn Notifier>,
        store: StateStore,
    ) -> Self {
        Self {
            settings,
            fetcher,
            extractor,
            notifier,
            store,
        }
    }

    /// Runs once: load, fetch, diff, notify, save.
    ///
    /// Any error returned here happened before the state file was replaced.
    pub async fn run(&self) -> Result<RunSummary, MonitorError> {
        let mut state = RunState::new(self.settings.max_notifications);
        let mut inbox = VecDeque::from([Msg::ConfigValidated]);
        let mut finished = None;

        while let Some(msg) = inbox.pop_front() {
            let after_fetch = matches!(msg, Msg::ProductsFetched(_));
            let (next, effects) = update(state, msg);
            state = next;
            monitor_debug!("Run stage {:?}", state.stage());
            if after_fetch {
                report_diff(&state);
            }

            for effect in effects {
                if let Effect::Finish(summary) = &effect {
                    finished = Some(*summary);
                }
                inbox.push_back(self.execute(effect).await?);
            }
        }

        finished.ok_or(MonitorError::Stalled(state.stage()))
    }

    async fn execute(&self, effect: Effect) -> Result<Msg, MonitorError> {
        match effect {
            Effect::LoadState => {
                let previous = self.store.load()?;
                monitor_info!("Loaded {} old products", previous.len());
                Ok(Msg::StateLoaded(previous))
            }
            Effect::FetchProducts => Ok(Msg::ProductsFetched(self.fetch_products().await?)),
            Effect::Notify {
                product,
                subject,
                body,
            } => Ok(Msg::NotificationFinished(
                self.notify(&product, &subject, &body).await,
            )),
            Effect::SaveState(products) => {
                let path = self.store.save(&products)?;
                monitor_info!("Saved {} products to {:?}", products.len(), path);
                Ok(Msg::StateSaved)
            }
            Effect::Finish(summary) => {
                monitor_info!(
                    "Run complete: {} found, {} new, {} sent, {} skipped, {} failed, {} over cap",
                    summary.found,
                    summary.added,
                    summary.sent,
                    summary.skipped,
                    summary.failed,
                    summary.unnotified
                );
                Ok(Msg::Finished)
            }
        }
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, MonitorError> {
        let url = &self.settings.url;
        let output = self
            .fetcher
            .fetch(url)
            .await
            .map_err(|source| MonitorError::Fetch {
                url: url.clone(),
                source,
            })?;

        let decoded = decode_html(&output.bytes, output.metadata.content_type.as_deref());
        if decoded.had_errors {
            monitor_warn!(
                "Page {} contained bytes invalid for {}; replaced them",
                output.metadata.final_url,
                decoded.encoding_label
            );
        }

        let products = self.extractor.extract(&decoded.html);
        monitor_debug!("Extracted {} candidate products", products.len());
        Ok(products)
    }

    async fn notify(&self, product: &Product, subject: &str, body: &str) -> DeliveryOutcome {
        match self.notifier.notify(subject, body).await {
            Ok(Delivery::Sent) => {
                monitor_info!("Notified: {}", product.title);
                DeliveryOutcome::Sent
            }
            Ok(Delivery::Skipped) => {
                monitor_info!("Skipped notification: {}", product.title);
                DeliveryOutcome::Skipped
            }
            Err(err) => {
                monitor_error!("Failed to notify {:?}: {}", product.title, err);
                DeliveryOutcome::Failed
            }
        }
    }
}

fn report_diff(state: &RunState) {
    let summary = state.summary();
    monitor_info!("Found {} products on the page", summary.found);
    if summary.added == 0 {
        monitor_info!("No new products.");
        return;
    }
    monitor_info!("Found {} new product(s).", summary.added);
    if summary.unnotified > 0 {
        monitor_info!(
            "Reached max notifications for this run ({}); {} product(s) not notified.",
            state.max_notifications(),
            summary.unnotified
        );
    }
}
