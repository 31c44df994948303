//! Integration tests for the crawler
//!
//! Most tests drive a full crawl against an in-memory link graph; the last
//! ones use wiremock to run the HTTP fetcher and the extraction pool
//! end-to-end.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiki_trawler::config::{
    CheckpointConfig, Config, CrawlerConfig, ExtractionConfig, UserAgentConfig,
};
use wiki_trawler::crawler::{CrawlDriver, Fetch, HtmlDocumentParser, HttpFetcher, NextPage};
use wiki_trawler::extraction::{ExtractionPool, ExtractionQueue, SentenceFilter};
use wiki_trawler::output::CrawlStats;
use wiki_trawler::storage::{Checkpoint, CheckpointStore};
use wiki_trawler::{DequeueOrder, Result, TrawlError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BASE: &str = "https://wiki.test";

/// Creates a test configuration for the collection at `base_url`
fn create_test_config(base_url: &str, output: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            language: "en".to_string(),
            base_url: Some(base_url.to_string()),
            initial_url: Some(format!("{}/wiki/A", base_url)),
            link_prefix: "/wiki/".to_string(),
            fetch_workers: 4,
            completed_buffer: 10,
            poll_interval: 10, // Short for testing
            dequeue_order: DequeueOrder::Lifo,
        },
        checkpoint: CheckpointConfig::default(),
        extraction: ExtractionConfig {
            workers: 1,
            output_directory: output.to_path_buf(),
            queue_capacity: None,
            dequeue_order: DequeueOrder::Lifo,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
    }
}

/// Renders a MediaWiki-shaped article
fn article(title: &str, links: &[&str], text: &str) -> String {
    let anchors: String = links
        .iter()
        .map(|link| format!(r#"<a href="{}">{}</a> "#, link, link))
        .collect();
    format!(
        r#"<html><head><title>{title} - Wikipedia</title></head><body>
        <h1 id="firstHeading">{title}</h1>
        <div id="bodyContent"><div id="mw-content-text">
        <p>{text}</p><p>{anchors}</p>
        </div></div>
        </body></html>"#,
        title = title,
        text = text,
        anchors = anchors
    )
}

/// In-memory link graph that counts how often each URL is fetched
#[derive(Clone, Default)]
struct GraphFetcher {
    pages: Arc<HashMap<String, String>>,
    fetches: Arc<Mutex<HashMap<String, usize>>>,
    delay: Duration,
}

impl GraphFetcher {
    /// Builds a graph from `(title, outgoing titles)` pairs under [`BASE`]
    fn new(graph: &[(&str, &[&str])]) -> Self {
        let pages = graph
            .iter()
            .map(|(title, targets)| {
                let links: Vec<String> = targets.iter().map(|t| format!("/wiki/{}", t)).collect();
                let links: Vec<&str> = links.iter().map(String::as_str).collect();
                (
                    format!("{}/wiki/{}", BASE, title),
                    article(title, &links, "Nothing to see here."),
                )
            })
            .collect();

        Self {
            pages: Arc::new(pages),
            fetches: Arc::default(),
            delay: Duration::ZERO,
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn fetch_counts(&self) -> HashMap<String, usize> {
        self.fetches.lock().unwrap().clone()
    }
}

impl Fetch for GraphFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        *self
            .fetches
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;

        self.pages
            .get(url)
            .map(|html| html.as_bytes().to_vec())
            .ok_or_else(|| TrawlError::HttpStatus {
                url: url.to_string(),
                status: 404,
            })
    }
}

fn url(title: &str) -> String {
    format!("{}/wiki/{}", BASE, title)
}

/// Polls the driver until it finishes, returning the titles it yielded
async fn drain<F: Fetch>(driver: &mut CrawlDriver<F>) -> Vec<String> {
    let mut titles = Vec::new();
    for _ in 0..5000 {
        match driver.next() {
            NextPage::Ready(page) => titles.push(page.title),
            NextPage::NotReady => driver.wait_ready(Duration::from_millis(10)).await,
            NextPage::Finished => return titles,
        }
    }
    panic!("crawl did not finish in time");
}

fn sorted(titles: Vec<String>) -> Vec<String> {
    let mut titles = titles;
    titles.sort();
    titles
}

#[tokio::test]
async fn test_crawl_three_page_graph() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(BASE, dir.path());
    let fetcher = GraphFetcher::new(&[("A", &["B", "C"]), ("B", &["A"]), ("C", &["B", "A"])]);

    let mut driver = CrawlDriver::new(&config, fetcher.clone()).unwrap();
    driver.start().await;
    let titles = drain(&mut driver).await;

    assert_eq!(sorted(titles), vec!["A", "B", "C"]);

    let counts = driver.frontier().counts();
    assert_eq!(counts.visited, 3);
    assert_eq!(counts.pending, 0);
    assert_eq!(counts.in_flight, 0);
    assert_eq!(counts.completed, 0);
    assert!(driver.frontier().is_drained());

    let fetches = fetcher.fetch_counts();
    for title in ["A", "B", "C"] {
        assert_eq!(fetches.get(&url(title)), Some(&1), "{} fetched once", title);
    }
}

#[tokio::test]
async fn test_dense_graph_fetches_each_url_once() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(BASE, dir.path());
    config.crawler.fetch_workers = 8;
    config.crawler.dequeue_order = DequeueOrder::Fifo;

    // Every page links to every page, itself included, and twice over
    let titles: Vec<String> = (0..25).map(|i| format!("P{}", i)).collect();
    let mut all: Vec<&str> = titles.iter().map(String::as_str).collect();
    all.extend(titles.iter().map(String::as_str));
    let mut graph: Vec<(&str, &[&str])> = titles.iter().map(|t| (t.as_str(), &all[..])).collect();
    graph.push(("A", &all[..]));

    let fetcher = GraphFetcher::new(&graph);
    let mut driver = CrawlDriver::new(&config, fetcher.clone()).unwrap();
    driver.start().await;
    let yielded = drain(&mut driver).await;

    assert_eq!(yielded.len(), 26);
    assert_eq!(yielded.iter().collect::<BTreeSet<_>>().len(), 26);
    assert_eq!(driver.frontier().counts().visited, 26);
    assert!(fetcher.fetch_counts().values().all(|&count| count == 1));
    assert_eq!(driver.stats().snapshot().pages_fetched, 26);
}

#[tokio::test]
async fn test_completed_buffer_never_exceeds_capacity() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(BASE, dir.path());
    config.crawler.fetch_workers = 16;
    config.crawler.completed_buffer = 3;

    let leaves: Vec<String> = (0..40).map(|i| format!("L{}", i)).collect();
    let leaf_refs: Vec<&str> = leaves.iter().map(String::as_str).collect();
    let mut graph: Vec<(&str, &[&str])> = vec![("A", &leaf_refs[..])];
    graph.extend(leaf_refs.iter().map(|leaf| (*leaf, &[][..])));

    let fetcher = GraphFetcher::new(&graph).with_delay(Duration::from_millis(2));
    let mut driver = CrawlDriver::new(&config, fetcher).unwrap();
    driver.start().await;

    let mut yielded = 0;
    let mut max_completed = 0;
    for _ in 0..5000 {
        let counts = driver.frontier().counts();
        max_completed = max_completed.max(counts.completed);
        assert!(counts.completed + counts.in_flight <= 3);

        match driver.next() {
            NextPage::Ready(_) => {
                yielded += 1;
                // Slow consumer so the workers fill the buffer
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            NextPage::NotReady => driver.wait_ready(Duration::from_millis(10)).await,
            NextPage::Finished => break,
        }
    }

    assert_eq!(yielded, 41);
    assert!(max_completed <= 3);
    assert!(max_completed > 0);
}

#[tokio::test]
async fn test_crawl_terminates_with_dead_links() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(BASE, dir.path());
    let fetcher = GraphFetcher::new(&[
        ("A", &["B", "Missing", "Category:Hidden"]),
        ("B", &["C", "Also_missing"]),
        ("C", &["A"]),
    ]);

    let mut driver = CrawlDriver::new(&config, fetcher.clone()).unwrap();
    driver.start().await;
    let titles = drain(&mut driver).await;

    assert_eq!(sorted(titles), vec!["A", "B", "C"]);
    assert!(!driver.is_running());
    assert_eq!(driver.next(), NextPage::Finished);

    let stats = driver.stats().snapshot();
    assert_eq!(stats.fetch_failures, 2);
    assert_eq!(driver.frontier().counts().visited, 5);
    assert!(!fetcher.fetch_counts().contains_key(&url("Category:Hidden")));
}

#[tokio::test]
async fn test_restart_discards_previous_run() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(BASE, dir.path());
    let fetcher = GraphFetcher::new(&[("A", &["B", "C"]), ("B", &[]), ("C", &[])]);

    let mut driver = CrawlDriver::new(&config, fetcher.clone()).unwrap();
    driver.start().await;

    // Consume the seed page only, leaving B and C behind
    loop {
        match driver.next() {
            NextPage::Ready(page) => {
                assert_eq!(page.title, "A");
                break;
            }
            NextPage::NotReady => driver.wait_ready(Duration::from_millis(10)).await,
            NextPage::Finished => panic!("crawl finished before yielding the seed"),
        }
    }

    driver.start().await;
    let counts = driver.frontier().counts();
    assert!(counts.visited <= 1, "only the seed may be visited after restart");

    let titles = drain(&mut driver).await;
    assert_eq!(sorted(titles), vec!["A", "B", "C"]);
    assert_eq!(fetcher.fetch_counts().get(&url("A")), Some(&2));
}

#[tokio::test]
async fn test_start_twice_in_a_row() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(BASE, dir.path());
    let fetcher = GraphFetcher::new(&[("A", &["B"]), ("B", &[])]);

    let mut driver = CrawlDriver::new(&config, fetcher).unwrap();
    driver.start().await;
    driver.start().await;

    let titles = drain(&mut driver).await;
    assert_eq!(sorted(titles), vec!["A", "B"]);
}

#[tokio::test]
async fn test_restore_from_checkpoint() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(BASE, dir.path());
    config.checkpoint.directory = Some(dir.path().join("progress"));
    config.checkpoint.initial_delay = 60;

    // A previous run visited A and was fetching B when it stopped
    let store = CheckpointStore::open(dir.path().join("progress")).unwrap();
    let mut older = Checkpoint::new(vec![url("A")], vec![]);
    older.timestamp = 1.0;
    let mut newer = Checkpoint::new(vec![url("B")], vec![url("A"), url("B")]);
    newer.timestamp = 2.0;
    store.save(0, &newer).unwrap();
    store.save(1, &older).unwrap();

    let fetcher = GraphFetcher::new(&[("A", &["B", "C"]), ("B", &["A", "C"]), ("C", &["A"])]);
    let mut driver = CrawlDriver::new(&config, fetcher.clone()).unwrap();
    driver.start().await;
    let titles = drain(&mut driver).await;

    assert_eq!(sorted(titles), vec!["B", "C"]);
    assert!(!fetcher.fetch_counts().contains_key(&url("A")));
    assert_eq!(driver.frontier().counts().visited, 3);
}

#[tokio::test]
async fn test_fresh_start_ignores_checkpoint() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(BASE, dir.path());
    config.checkpoint.directory = Some(dir.path().join("progress"));
    config.checkpoint.initial_delay = 60;

    let store = CheckpointStore::open(dir.path().join("progress")).unwrap();
    store
        .save(0, &Checkpoint::new(vec![url("B")], vec![url("A"), url("B")]))
        .unwrap();

    let fetcher = GraphFetcher::new(&[("A", &["B"]), ("B", &[])]);
    let mut driver = CrawlDriver::new(&config, fetcher).unwrap();
    driver.discard_checkpoints().unwrap();
    driver.start().await;
    let titles = drain(&mut driver).await;

    assert_eq!(sorted(titles), vec!["A", "B"]);
    assert!(store.load_latest().is_none());
}

#[tokio::test]
async fn test_checkpoint_written_during_crawl() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(BASE, dir.path());
    config.checkpoint.directory = Some(dir.path().join("progress"));
    config.checkpoint.initial_delay = 0;
    config.checkpoint.interval = 1;

    let fetcher =
        GraphFetcher::new(&[("A", &["B"]), ("B", &[])]).with_delay(Duration::from_millis(50));
    let mut driver = CrawlDriver::new(&config, fetcher).unwrap();
    driver.start().await;
    drain(&mut driver).await;

    let store = CheckpointStore::open(dir.path().join("progress")).unwrap();
    let latest = store.load_latest().expect("a checkpoint was written");
    let mut known: BTreeSet<String> = latest.links_to_visit.into_iter().collect();
    known.extend(latest.visited_links);
    assert!(known.contains(&url("A")));
}

#[tokio::test]
async fn test_http_crawl_with_extraction() {
    // Start a mock server
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/wiki/A"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article(
                    "A",
                    &[
                        "/wiki/B",
                        "/wiki/File:Map.png",
                        "/wiki/Gone",
                        "https://elsewhere.example/wiki/B",
                    ],
                    "The sky is blue.",
                ))
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/wiki/B"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(article(
                    "B",
                    &["/wiki/A"],
                    "The journey\ntook two days. Nobody\tknows why!",
                ))
                .insert_header("content-type", "text/html"),
        )
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out");
    let config = create_test_config(&base_url, &output);
    let stats = Arc::new(CrawlStats::default());

    let fetcher = HttpFetcher::new(&config.user_agent).unwrap();
    let mut driver = CrawlDriver::new(&config, fetcher)
        .unwrap()
        .with_stats(stats.clone());

    let queue = Arc::new(ExtractionQueue::new(DequeueOrder::Lifo, None));
    let pool = ExtractionPool::spawn(
        &config.extraction,
        queue.clone(),
        Arc::new(HtmlDocumentParser::wikipedia().unwrap()),
        Arc::new(SentenceFilter::for_language("en").unwrap()),
        stats.clone(),
        Duration::from_millis(10),
    )
    .unwrap();

    driver.start().await;
    let mut pages = Vec::new();
    for _ in 0..5000 {
        match driver.next() {
            NextPage::Ready(page) => {
                pages.push(page.url.clone());
                queue.push(page.title, page.body);
            }
            NextPage::NotReady => driver.wait_ready(Duration::from_millis(10)).await,
            NextPage::Finished => break,
        }
    }
    pool.finish().await;

    pages.sort();
    assert_eq!(
        pages,
        vec![format!("{}/wiki/A", base_url), format!("{}/wiki/B", base_url)]
    );

    let written = std::fs::read_to_string(output.join("w0.txt")).unwrap();
    assert_eq!(written, "B - The journey took two days.\n");

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.pages_fetched, 2);
    assert_eq!(snapshot.fetch_failures, 1); // /wiki/Gone is a 404
    assert_eq!(snapshot.documents_extracted, 2);
    assert_eq!(snapshot.sentences_matched, 1);
}

#[tokio::test]
async fn test_http_seed_failure_finishes_crawl() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/A"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());
    let fetcher = HttpFetcher::new(&config.user_agent).unwrap();
    let mut driver = CrawlDriver::new(&config, fetcher).unwrap();

    driver.start().await;
    let titles = drain(&mut driver).await;

    assert!(titles.is_empty());
    assert_eq!(driver.stats().snapshot().fetch_failures, 1);
}
