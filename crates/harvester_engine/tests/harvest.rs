use std::fs;
use std::num::NonZeroUsize;
use std::time::Duration;

use harvester_core::{NullPolicy, StopReason};
use harvester_engine::{
    run_session, Catalog, FetchSettings, HarvestError, HarvestSettings, SnapshotPage,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    harvest_logging::initialize_for_tests();
}

fn tile(title: &str, critic: &str, audience: &str, date: &str) -> String {
    format!(
        r#"<div data-qa="discovery-media-list-item">
             <span data-qa="discovery-media-list-item-title">{title}</span>
             <rt-text slot="criticsScore">{critic}</rt-text>
             <rt-text slot="audienceScore">{audience}</rt-text>
             <span class="smaller" data-qa="discovery-media-list-item-start-date">{date}</span>
           </div>"#
    )
}

fn listing(tiles: &[String], next_page: Option<u32>) -> String {
    let more = next_page
        .map(|n| format!(r#"<a data-qa="dlp-load-more-button" href="?page={n}">Load more</a>"#))
        .unwrap_or_default();
    format!("<html><body>{}{more}</body></html>", tiles.join("\n"))
}

fn settings(server: &MockServer, dir: &TempDir, cap: usize) -> HarvestSettings {
    HarvestSettings {
        url: format!("{}/browse", server.uri()),
        cap: NonZeroUsize::new(cap).unwrap(),
        control_selector: r#"[data-qa="dlp-load-more-button"]"#.to_string(),
        settle_delay_ms: 0,
        wait_timeout_ms: 0,
        output_dir: dir.path().to_path_buf(),
        output_filename: "movies.csv".to_string(),
        ..Catalog::Netflix.settings()
    }
}

async fn serve(server: &MockServer, page: Option<u32>, body: String) {
    let matcher = Mock::given(method("GET")).and(path("/browse"));
    let response = ResponseTemplate::new(200).set_body_raw(body, "text/html");
    let mock = match page {
        Some(n) => matcher
            .and(query_param("page", n.to_string()))
            .respond_with(response)
            .with_priority(1),
        None => matcher.respond_with(response),
    };
    mock.mount(server).await;
}

#[tokio::test]
async fn single_page_without_control_writes_two_rows() {
    init_logging();
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve(
        &server,
        None,
        listing(
            &[
                tile("Past Lives", "95%", "89%", "Jan 5, 2024"),
                tile("Heat", "N/A", "94%", "garbage"),
            ],
            None,
        ),
    )
    .await;

    let page = SnapshotPage::fetching(FetchSettings::default()).unwrap();
    let summary = run_session(page, settings(&server, &dir, 10)).await.unwrap();

    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.stop_reason(), Some(StopReason::ControlExhausted));
    assert_eq!(summary.stats.advances, 0);
    let csv = fs::read_to_string(&summary.output_path).unwrap();
    assert_eq!(
        csv,
        "Title,Tomatometer,Popcornmeter,Streaming Start\n\
         Past Lives,95.0,89.0,2024-01-05\n\
         Heat,,94.0,\n"
    );
}

#[tokio::test]
async fn disclosure_loop_follows_control_and_dedupes() {
    init_logging();
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve(
        &server,
        None,
        listing(
            &[tile("A", "1%", "2%", "Jan 1, 2024"), tile("B", "3%", "4%", "Jan 2, 2024")],
            Some(2),
        ),
    )
    .await;
    serve(
        &server,
        Some(2),
        listing(
            &[
                tile("A", "1%", "2%", "Jan 1, 2024"),
                tile(" b ", "9%", "9%", "Jan 9, 2024"),
                tile("C", "5%", "6%", "Jan 3, 2024"),
            ],
            None,
        ),
    )
    .await;

    let page = SnapshotPage::fetching(FetchSettings::default()).unwrap();
    let summary = run_session(page, settings(&server, &dir, 10)).await.unwrap();

    assert_eq!(summary.stats.batches, 2);
    assert_eq!(summary.stats.advances, 1);
    assert_eq!(summary.stats.duplicates, 2);
    let csv = fs::read_to_string(&summary.output_path).unwrap();
    let titles: Vec<_> = csv
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn control_linking_to_same_listing_stops_without_progress() {
    init_logging();
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    // No mock for page=1, so following the control serves the same two tiles again.
    serve(
        &server,
        None,
        listing(
            &[tile("A", "1%", "2%", "Jan 1, 2024"), tile("B", "3%", "4%", "Jan 2, 2024")],
            Some(1),
        ),
    )
    .await;

    let page = SnapshotPage::fetching(FetchSettings::default()).unwrap();
    let run = run_session(page, settings(&server, &dir, 10));
    let summary = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("self-linking control must not loop forever")
        .unwrap();

    assert_eq!(summary.stop_reason(), Some(StopReason::NoProgress));
    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.stats.batches, 2);
    assert_eq!(summary.stats.advances, 1);
    assert_eq!(summary.stats.duplicates, 2);
    assert!(summary.output_path.exists());
}

#[tokio::test]
async fn cap_stops_before_clicking_more() {
    init_logging();
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve(
        &server,
        None,
        listing(
            &[
                tile("A", "1%", "2%", "Jan 1, 2024"),
                tile("B", "3%", "4%", "Jan 2, 2024"),
                tile("C", "5%", "6%", "Jan 3, 2024"),
            ],
            Some(2),
        ),
    )
    .await;

    let page = SnapshotPage::fetching(FetchSettings::default()).unwrap();
    let summary = run_session(page, settings(&server, &dir, 2)).await.unwrap();

    assert_eq!(summary.rows_written, 2);
    assert_eq!(summary.stop_reason(), Some(StopReason::CapReached));
    assert_eq!(summary.stats.advances, 0);
}

#[tokio::test]
async fn impute_policy_fills_gaps_in_output() {
    init_logging();
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve(
        &server,
        None,
        listing(
            &[
                tile("A", "80%", "N/A", "Jan 1, 2024"),
                tile("B", "N/A", "60%", "N/A"),
                tile("C", "90%", "N/A", "Jan 3, 2024"),
            ],
            None,
        ),
    )
    .await;

    let settings = HarvestSettings {
        null_policy: NullPolicy::Impute,
        ..settings(&server, &dir, 10)
    };
    let page = SnapshotPage::fetching(FetchSettings::default()).unwrap();
    let summary = run_session(page, settings).await.unwrap();

    let csv = fs::read_to_string(&summary.output_path).unwrap();
    assert_eq!(
        csv.lines().collect::<Vec<_>>(),
        vec![
            "Title,Tomatometer,Popcornmeter,Streaming Start",
            "A,80.0,60.0,2024-01-01",
            "B,85.0,60.0,2024-01-01",
            "C,90.0,60.0,2024-01-03",
        ]
    );
}

#[tokio::test]
async fn page_without_items_still_writes_header() {
    init_logging();
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    serve(&server, None, "<html><body><p>Nothing here</p></body></html>".into()).await;

    let page = SnapshotPage::fetching(FetchSettings::default()).unwrap();
    let summary = run_session(page, settings(&server, &dir, 10)).await.unwrap();

    assert_eq!(summary.rows_written, 0);
    assert_eq!(summary.stop_reason(), Some(StopReason::BatchLocateFailed));
    assert_eq!(
        fs::read_to_string(&summary.output_path).unwrap(),
        "Title,Tomatometer,Popcornmeter,Streaming Start\n"
    );
}

#[tokio::test]
async fn unreachable_listing_is_fatal() {
    init_logging();
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let page = SnapshotPage::fetching(FetchSettings::default()).unwrap();
    let err = run_session(page, settings(&server, &dir, 10))
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::Navigation(_)));
    assert!(!dir.path().join("movies.csv").exists());
}
