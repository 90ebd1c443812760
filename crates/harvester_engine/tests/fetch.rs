use std::time::Duration;

use harvester_engine::{FetchError, FetchSettings, HttpFetcher, Page, SnapshotPage};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(settings: FetchSettings) -> HttpFetcher {
    HttpFetcher::new(settings).unwrap()
}

async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn utf8_listing_is_fetched_and_decoded() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/browse",
        ResponseTemplate::new(200).set_body_raw("<p>Amélie</p>", "text/html; charset=utf-8"),
    )
    .await;

    let url = format!("{}/browse", server.uri());
    let page = fetcher(FetchSettings::default()).fetch(&url).await.unwrap();

    assert_eq!(page.url.as_str(), url);
    assert_eq!(page.html, "<p>Amélie</p>");
    assert_eq!(page.encoding, "UTF-8");
}

#[tokio::test]
async fn legacy_charset_from_header_is_honoured() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/latin",
        ResponseTemplate::new(200).set_body_raw(
            b"<p>Caf\xe9 Society</p>".to_vec(),
            "text/html; charset=ISO-8859-1",
        ),
    )
    .await;

    let page = fetcher(FetchSettings::default())
        .fetch(&format!("{}/latin", server.uri()))
        .await
        .unwrap();
    assert_eq!(page.html, "<p>Café Society</p>");
}

#[tokio::test]
async fn error_status_is_reported() {
    let server = MockServer::start().await;
    serve(&server, "/gone", ResponseTemplate::new(404)).await;

    let err = fetcher(FetchSettings::default())
        .fetch(&format!("{}/gone", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/slow",
        ResponseTemplate::new(200)
            .set_delay(Duration::from_millis(300))
            .set_body_raw("<p>late</p>", "text/html"),
    )
    .await;

    let settings = FetchSettings {
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    };
    let err = fetcher(settings)
        .fetch(&format!("{}/slow", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout(_)));
}

#[tokio::test]
async fn non_html_is_rejected() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/api",
        ResponseTemplate::new(200).set_body_raw("{}", "application/json"),
    )
    .await;

    let err = fetcher(FetchSettings::default())
        .fetch(&format!("{}/api", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::NotHtml { .. }));
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/huge",
        ResponseTemplate::new(200).set_body_raw("x".repeat(4096), "text/html"),
    )
    .await;

    let settings = FetchSettings {
        max_bytes: 1024,
        ..FetchSettings::default()
    };
    let err = fetcher(settings)
        .fetch(&format!("{}/huge", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::TooLarge { max_bytes: 1024, .. }));
}

#[tokio::test]
async fn invalid_url_never_hits_the_network() {
    let err = fetcher(FetchSettings::default())
        .fetch("not a url")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl { .. }));
}

#[tokio::test]
async fn snapshot_click_follows_relative_href() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<ul><li class="item">Second</li></ul>"#,
            "text/html",
        ))
        .with_priority(1)
        .mount(&server)
        .await;
    serve(
        &server,
        "/list",
        ResponseTemplate::new(200).set_body_raw(
            r#"<ul><li class="item">First</li></ul><a class="next" href="?page=2">More</a>"#,
            "text/html",
        ),
    )
    .await;

    let mut page = SnapshotPage::fetching(FetchSettings::default()).unwrap();
    page.navigate(&format!("{}/list", server.uri())).await.unwrap();

    let items = page.wait_for_all("li.item", Duration::ZERO).await.unwrap();
    assert_eq!(page.text(&items[0]).await.unwrap(), "First");

    let next = page
        .wait_for_interactable("a.next", Duration::ZERO)
        .await
        .unwrap();
    page.click(&next).await.unwrap();
    assert!(page.current_url().unwrap().ends_with("/list?page=2"));

    let items = page.wait_for_all("li.item", Duration::ZERO).await.unwrap();
    assert_eq!(page.text(&items[0]).await.unwrap(), "Second");
    assert!(page
        .wait_for_interactable("a.next", Duration::ZERO)
        .await
        .is_err());
}
