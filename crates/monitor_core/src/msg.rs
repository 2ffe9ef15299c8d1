use crate::{DeliveryOutcome, Product};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Required configuration is present.
    ConfigValidated,
    /// Products saved by the previous run (empty when there was no state file).
    StateLoaded(Vec<Product>),
    /// Products extracted from the page, not yet deduplicated.
    ProductsFetched(Vec<Product>),
    /// The notifier finished with the product from the last `Notify` effect.
    NotificationFinished(DeliveryOutcome),
    /// The state file has been replaced.
    StateSaved,
    /// The final summary has been reported.
    Finished,
}
