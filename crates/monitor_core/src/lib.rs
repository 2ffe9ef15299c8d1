//! Monitor core: product identity, dedup/diff and the pure run state machine.
mod dedupe;
mod diff;
mod effect;
mod message;
mod msg;
mod product;
mod state;
mod summary;
mod update;

pub use dedupe::dedupe;
pub use diff::added_products;
pub use effect::Effect;
pub use message::{
    compose_message, truncate_message, MAX_MESSAGE_CHARS, NOTIFICATION_SUBJECT, TRUNCATION_MARKER,
};
pub use msg::Msg;
pub use product::{Product, ProductKey};
pub use state::{DeliveryOutcome, RunStage, RunState};
pub use summary::RunSummary;
pub use update::update;
