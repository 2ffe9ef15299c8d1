//! Monitor engine: page fetch, product extraction, state file and notifications.
mod decode;
mod extract;
mod fetch;
mod monitor;
mod notify;
mod persist;
mod types;

pub use decode::{decode_html, DecodedHtml};
pub use extract::{classify, Candidate, ProductExtractor, SelectorError, DEFAULT_SELECTOR};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, USER_AGENT};
pub use monitor::{Monitor, MonitorError, MonitorSettings};
pub use notify::{
    build_email, Delivery, Notifier, NotifyError, SmtpNotifier, SmtpSettings, DEFAULT_SMTP_HOST,
    DEFAULT_SMTP_PORT,
};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError, StateError, StateStore};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
