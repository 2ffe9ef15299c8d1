use std::fs;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use monitor_core::Product;
use monitor_engine::{
    Delivery, FailureKind, FetchError, FetchMetadata, FetchOutput, FetchSettings, Fetcher,
    Monitor, MonitorError, MonitorSettings, Notifier, NotifyError, ProductExtractor,
    ReqwestFetcher, SmtpNotifier, SmtpSettings, StateStore, DEFAULT_SELECTOR,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_URL: &str = "https://shop.example/new";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(monitor_logging::initialize_for_tests);
}

fn p(title: &str, url: &str) -> Product {
    Product::new(title, url)
}

/// Serves a fixed page, or a fixed failure.
struct StaticFetcher {
    result: Result<String, FailureKind>,
}

impl StaticFetcher {
    fn page(products: &[(&str, &str)]) -> Box<Self> {
        let links: String = products
            .iter()
            .map(|(title, href)| format!(r#"<a href="{href}">{title}</a>"#))
            .collect();
        Box::new(Self {
            result: Ok(format!("<html><body>{links}</body></html>")),
        })
    }

    fn failing(kind: FailureKind) -> Box<Self> {
        Box::new(Self { result: Err(kind) })
    }
}

#[async_trait::async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        match &self.result {
            Ok(html) => Ok(FetchOutput {
                bytes: html.clone().into_bytes(),
                metadata: FetchMetadata {
                    final_url: url.to_string(),
                    redirect_count: 0,
                    content_type: Some("text/html; charset=utf-8".to_string()),
                    byte_len: html.len() as u64,
                },
            }),
            Err(kind) => Err(FetchError {
                kind: kind.clone(),
                message: "stub failure".to_string(),
            }),
        }
    }
}

/// Records every body; fails for bodies containing `fail_on`.
#[derive(Clone, Default)]
struct RecordingNotifier {
    bodies: Arc<Mutex<Vec<String>>>,
    fail_on: Option<&'static str>,
}

impl RecordingNotifier {
    fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, _subject: &str, body: &str) -> Result<Delivery, NotifyError> {
        self.bodies.lock().unwrap().push(body.to_string());
        match self.fail_on {
            Some(marker) if body.contains(marker) => Err(NotifyError::Timeout(
                std::time::Duration::from_secs(30),
            )),
            _ => Ok(Delivery::Sent),
        }
    }
}

fn monitor(
    fetcher: Box<dyn Fetcher>,
    notifier: Box<dyn Notifier>,
    store: StateStore,
    cap: usize,
) -> Monitor {
    Monitor::new(
        MonitorSettings {
            url: PAGE_URL.to_string(),
            max_notifications: cap,
        },
        fetcher,
        ProductExtractor::new(DEFAULT_SELECTOR, PAGE_URL).unwrap(),
        notifier,
        store,
    )
}

fn store_with(temp: &TempDir, products: &[Product]) -> StateStore {
    let store = StateStore::new(temp.path().join("products.json"));
    if !products.is_empty() {
        store.save(products).unwrap();
    }
    store
}

#[tokio::test]
async fn first_run_notifies_everything_and_saves_it() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = store_with(&temp, &[]);
    let notifier = RecordingNotifier::default();
    let fetcher = StaticFetcher::page(&[("A", "/products/1"), ("B", "/products/2")]);

    let summary = monitor(fetcher, Box::new(notifier.clone()), store.clone(), 5)
        .run()
        .await
        .unwrap();

    assert_eq!(
        notifier.bodies(),
        vec![
            "A\nhttps://shop.example/products/1".to_string(),
            "B\nhttps://shop.example/products/2".to_string(),
        ]
    );
    assert_eq!(
        store.load().unwrap(),
        vec![
            p("A", "https://shop.example/products/1"),
            p("B", "https://shop.example/products/2"),
        ]
    );
    assert_eq!(summary.sent, 2);
    assert_eq!(summary.added, 2);
}

#[tokio::test]
async fn known_products_are_not_notified_again() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = store_with(&temp, &[p("A", "https://shop.example/products/1")]);
    let notifier = RecordingNotifier::default();
    let fetcher = StaticFetcher::page(&[("A", "/products/1"), ("B", "/products/2")]);

    let summary = monitor(fetcher, Box::new(notifier.clone()), store.clone(), 5)
        .run()
        .await
        .unwrap();

    assert_eq!(
        notifier.bodies(),
        vec!["B\nhttps://shop.example/products/2".to_string()]
    );
    assert_eq!(store.load().unwrap().len(), 2);
    assert_eq!(summary.previous, 1);
}

#[tokio::test]
async fn cap_stops_notifications_but_saves_all_products() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = store_with(&temp, &[]);
    let notifier = RecordingNotifier::default();
    let fetcher = StaticFetcher::page(&[
        ("A", "/products/1"),
        ("B", "/products/2"),
        ("C", "/products/3"),
    ]);

    let summary = monitor(fetcher, Box::new(notifier.clone()), store.clone(), 1)
        .run()
        .await
        .unwrap();

    assert_eq!(notifier.bodies().len(), 1);
    assert_eq!(store.load().unwrap().len(), 3);
    assert_eq!(summary.unnotified, 2);

    // The next run sees nothing new.
    let again = RecordingNotifier::default();
    let fetcher = StaticFetcher::page(&[
        ("A", "/products/1"),
        ("B", "/products/2"),
        ("C", "/products/3"),
    ]);
    let summary = monitor(fetcher, Box::new(again.clone()), store, 1)
        .run()
        .await
        .unwrap();
    assert!(again.bodies().is_empty());
    assert_eq!(summary.added, 0);
}

#[tokio::test]
async fn missing_sms_target_skips_sending_but_saves_state() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = store_with(&temp, &[]);
    let notifier = SmtpNotifier::new(SmtpSettings {
        username: Some("monitor@example.com".to_string()),
        password: Some("secret".to_string()),
        target: None,
        ..SmtpSettings::default()
    });
    let fetcher = StaticFetcher::page(&[("A", "/products/1"), ("B", "/products/2")]);

    let summary = monitor(fetcher, Box::new(notifier), store.clone(), 5)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.sent, 0);
    assert_eq!(store.load().unwrap().len(), 2);
}

#[tokio::test]
async fn fetch_failure_leaves_state_untouched() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = store_with(&temp, &[p("Old", "https://shop.example/products/old")]);
    let before = fs::read_to_string(store.path()).unwrap();
    let notifier = RecordingNotifier::default();

    let err = monitor(
        StaticFetcher::failing(FailureKind::HttpStatus(500)),
        Box::new(notifier.clone()),
        store.clone(),
        5,
    )
    .run()
    .await
    .unwrap_err();

    match err {
        MonitorError::Fetch { url, source } => {
            assert_eq!(url, PAGE_URL);
            assert_eq!(source.kind, FailureKind::HttpStatus(500));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(notifier.bodies().is_empty());
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[tokio::test]
async fn malformed_state_aborts_before_fetching() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("products.json");
    fs::write(&path, "not json").unwrap();
    let notifier = RecordingNotifier::default();
    let fetcher = StaticFetcher::page(&[("A", "/products/1")]);

    let err = monitor(fetcher, Box::new(notifier.clone()), StateStore::new(&path), 5)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, MonitorError::State(_)), "unexpected error: {err:?}");
    assert!(notifier.bodies().is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
}

#[tokio::test]
async fn failed_notification_does_not_stop_the_run() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = store_with(&temp, &[]);
    let notifier = RecordingNotifier {
        fail_on: Some("First"),
        ..RecordingNotifier::default()
    };
    let fetcher = StaticFetcher::page(&[("First", "/products/1"), ("Second", "/products/2")]);

    let summary = monitor(fetcher, Box::new(notifier.clone()), store.clone(), 5)
        .run()
        .await
        .unwrap();

    assert_eq!(notifier.bodies().len(), 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.sent, 1);
    assert_eq!(store.load().unwrap().len(), 2);
}

#[tokio::test]
async fn refused_smtp_connection_counts_as_failed_and_saves_state() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = store_with(&temp, &[]);
    let notifier = SmtpNotifier::new(SmtpSettings {
        host: "127.0.0.1".to_string(),
        port: 1,
        username: Some("monitor@example.com".to_string()),
        password: Some("secret".to_string()),
        target: Some("5551234567@sms.example.net".to_string()),
        timeout: Duration::from_secs(2),
    });
    let fetcher = StaticFetcher::page(&[("A", "/products/1"), ("B", "/products/2")]);

    let summary = monitor(fetcher, Box::new(notifier), store.clone(), 5)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.failed, 2);
    assert_eq!(summary.sent, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(
        store.load().unwrap(),
        vec![
            p("A", "https://shop.example/products/1"),
            p("B", "https://shop.example/products/2"),
        ]
    );
}

#[tokio::test]
async fn empty_page_overwrites_previous_state() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let store = store_with(&temp, &[p("Old", "https://shop.example/products/old")]);
    let notifier = RecordingNotifier::default();

    let summary = monitor(StaticFetcher::page(&[]), Box::new(notifier.clone()), store.clone(), 5)
        .run()
        .await
        .unwrap();

    assert_eq!(summary.found, 0);
    assert!(notifier.bodies().is_empty());
    assert!(store.load().unwrap().is_empty());
}

#[tokio::test]
async fn full_run_against_http_server() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/collections/all"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<ul>
                <li><a href="/products/boots">Boots</a></li>
                <li><a href="/products/boots">Boots</a></li>
                <li><a href="/pages/about">About</a></li>
                <li><a href="/products/scarf"> Scarf </a></li>
            </ul>"#,
            "text/html; charset=utf-8",
        ))
        .mount(&server)
        .await;

    let temp = TempDir::new().unwrap();
    let store = store_with(&temp, &[]);
    let notifier = RecordingNotifier::default();
    let url = format!("{}/collections/all", server.uri());

    let summary = Monitor::new(
        MonitorSettings {
            url: url.clone(),
            max_notifications: 5,
        },
        Box::new(ReqwestFetcher::new(FetchSettings::default())),
        ProductExtractor::new(DEFAULT_SELECTOR, &url).unwrap(),
        Box::new(notifier.clone()),
        store.clone(),
    )
    .run()
    .await
    .unwrap();

    let boots = format!("{}/products/boots", server.uri());
    let scarf = format!("{}/products/scarf", server.uri());
    assert_eq!(summary.found, 2);
    assert_eq!(
        store.load().unwrap(),
        vec![p("Boots", &boots), p("Scarf", &scarf)]
    );
    assert_eq!(
        notifier.bodies(),
        vec![format!("Boots\n{boots}"), format!("Scarf\n{scarf}")]
    );
}
