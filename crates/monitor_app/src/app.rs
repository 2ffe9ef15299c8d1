use anyhow::Context;
use monitor_core::RunSummary;
use monitor_engine::{
    FetchSettings, Monitor, MonitorSettings, ProductExtractor, ReqwestFetcher, SmtpNotifier,
    StateStore,
};
use monitor_logging::{monitor_info, monitor_warn};

use crate::config::Config;

/// Wires the engine from `config` and performs one run to completion.
pub fn run(config: Config) -> anyhow::Result<RunSummary> {
    let extractor = ProductExtractor::new(&config.css_selector, &config.monitor_url)
        .context("CSS_SELECTOR is not a valid selector")?;
    let notifier = SmtpNotifier::new(config.smtp);
    if !notifier.is_configured() {
        monitor_warn!("Notifications are disabled: SMTP_USER, SMTP_PASS or SMS_TARGET not set");
    }

    monitor_info!(
        "Monitoring {} (selector {}, at most {} notifications)",
        config.monitor_url,
        config.css_selector,
        config.max_notifications
    );

    let monitor = Monitor::new(
        MonitorSettings {
            url: config.monitor_url,
            max_notifications: config.max_notifications,
        },
        Box::new(ReqwestFetcher::new(FetchSettings::default())),
        extractor,
        Box::new(notifier),
        StateStore::new(config.state_file),
    );

    // Every step awaits the previous one; a single thread is enough.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let summary = runtime.block_on(monitor.run())?;
    Ok(summary)
}
