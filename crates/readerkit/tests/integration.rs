//! Integration tests for ReaderKit using wiremock

use readerkit::{convert, word_count, Normalizer, Reader, ReaderError, Renderer};
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_ID: &str = "0123456789abcdef0123456789abcdef";

const RICH_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Release Notes</title></head>
<body>
    <nav>Home | Blog | About</nav>
    <main>
        <h1>Release Notes</h1>
        <p>This release makes the converter faster and keeps tables intact
        when they are nested inside list items.</p>
        <ul>
            <li>Faster sanitization</li>
            <li>Better headings</li>
        </ul>
    </main>
    <footer>Copyright</footer>
</body>
</html>"#;

const SHELL_HTML: &str = r#"<html><head><title>Loading</title></head>
<body><div id="root">Loading…</div></body></html>"#;

const THIN_ARTICLE_HTML: &str = r#"<html>
<head><title>Dashboard</title></head>
<body><article><h1>Dashboard</h1><p>Sign in to continue.</p></article></body>
</html>"#;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

fn notion_record_map(title: &str, paragraphs: &[&str]) -> serde_json::Value {
    let page_uuid = "01234567-89ab-cdef-0123-456789abcdef";
    let ids: Vec<String> = (0..paragraphs.len()).map(|i| format!("p{i}")).collect();
    let mut map = serde_json::Map::new();
    map.insert(
        page_uuid.to_string(),
        json!({
            "role": "reader",
            "value": {
                "id": page_uuid,
                "type": "page",
                "alive": true,
                "properties": { "title": [[title]] },
                "content": ids,
            }
        }),
    );
    for (id, text) in ids.iter().zip(paragraphs) {
        map.insert(
            id.clone(),
            json!({
                "role": "reader",
                "value": {
                    "id": id,
                    "type": "text",
                    "alive": true,
                    "properties": { "title": [[text]] },
                }
            }),
        );
    }
    serde_json::Value::Object(map)
}

/// Reader that treats the mock server as a Notion host with a proxy
fn mock_notion_reader(server: &MockServer) -> Reader {
    Reader::builder()
        .structured_host("127.0.0.1")
        .structured_api_base(format!("{}/api/", server.uri()))
        .proxy_host("127.0.0.1")
        .proxy_prefix(format!("{}/proxy/", server.uri()))
        .enable_article(false)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_raw_page_to_markdown() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .respond_with(html(RICH_HTML))
        .mount(&server)
        .await;

    let reader = Reader::builder().enable_article(false).build().unwrap();
    let url = format!("{}/notes", server.uri());
    let result = reader.convert(&url).await.unwrap();

    assert_eq!(result.title.as_deref(), Some("Release Notes"));
    assert!(result.markdown.starts_with("# Release Notes"));
    assert!(result.markdown.contains("Faster sanitization"));
    assert!(!result.markdown.contains("Copyright"));
    assert!(!result.markdown.contains("Home | Blog"));
    assert_eq!(result.word_count, word_count(&result.markdown));
    assert_eq!(result.final_url, url);
    assert_eq!(result.metadata.renderer, Some(Renderer::DirectHttp));
}

#[tokio::test]
async fn test_rich_page_never_tagged_structured_or_proxy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .respond_with(html(RICH_HTML))
        .mount(&server)
        .await;

    let reader = Reader::builder().build().unwrap();
    let result = reader
        .convert(&format!("{}/notes", server.uri()))
        .await
        .unwrap();

    let renderer = result.metadata.renderer.unwrap();
    assert_ne!(renderer, Renderer::NotionApi);
    assert_ne!(renderer, Renderer::Proxy);
    assert_eq!(result.word_count, word_count(&result.markdown));
}

#[tokio::test]
async fn test_redirect_sets_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/notes"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/notes"))
        .respond_with(html(RICH_HTML))
        .mount(&server)
        .await;

    let reader = Reader::builder().enable_article(false).build().unwrap();
    let source = format!("{}/old", server.uri());
    let result = reader.convert(&source).await.unwrap();

    assert_eq!(result.source_url, source);
    assert_eq!(result.final_url, format!("{}/notes", server.uri()));
}

#[tokio::test]
async fn test_raw_fetch_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let reader = Reader::builder().build().unwrap();
    let err = reader.convert(&server.uri()).await.unwrap_err();
    assert!(matches!(err, ReaderError::HttpStatus(500)));
    assert!(err.is_upstream());
}

#[tokio::test]
async fn test_structured_page_short_circuits() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/{PAGE_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(notion_record_map(
            "Roadmap",
            &["The reader ships this quarter with structured page support and proxy escalation."],
        )))
        .expect(1)
        .mount(&server)
        .await;
    // The page itself must never be fetched
    Mock::given(method("GET"))
        .and(path(format!("/Roadmap-{PAGE_ID}")))
        .respond_with(html(SHELL_HTML))
        .expect(0)
        .mount(&server)
        .await;

    let reader = mock_notion_reader(&server);
    let source = format!("{}/Roadmap-{PAGE_ID}", server.uri());
    let result = reader.convert(&source).await.unwrap();

    assert_eq!(result.source_url, source);
    assert_eq!(result.final_url, format!("{source}?pvs=4"));
    assert_eq!(result.title.as_deref(), Some("Roadmap"));
    assert!(result.markdown.starts_with("# Roadmap\n\nThe reader ships"));
    assert_eq!(result.metadata.normalizer, Some(Normalizer::NotionReaderMode));
    assert_eq!(result.metadata.renderer, Some(Renderer::NotionApi));
}

#[tokio::test]
async fn test_thin_structured_page_escalates_to_proxy() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/{PAGE_ID}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(notion_record_map("Draft", &["todo"])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/Roadmap-{PAGE_ID}")))
        .respond_with(html(SHELL_HTML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/proxy/"))
        .respond_with(html(RICH_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let reader = mock_notion_reader(&server);
    let source = format!("{}/Roadmap-{PAGE_ID}", server.uri());
    let result = reader.convert(&source).await.unwrap();

    assert_eq!(result.metadata.renderer, Some(Renderer::Proxy));
    assert_eq!(result.metadata.normalizer, Some(Normalizer::NotionReaderMode));
    assert_eq!(result.final_url, format!("{source}?pvs=4"));
    assert!(result.markdown.contains("Faster sanitization"));
    assert!(result.word_count >= 10);
}

#[tokio::test]
async fn test_thin_article_escalates_to_proxy() {
    init_tracing();
    let server = MockServer::start().await;
    // Fetched once by the article stage and once by the raw stage
    Mock::given(method("GET"))
        .and(path("/app"))
        .respond_with(html(THIN_ARTICLE_HTML))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/proxy/"))
        .respond_with(html(RICH_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let reader = Reader::builder()
        .proxy_host("127.0.0.1")
        .proxy_prefix(format!("{}/proxy/", server.uri()))
        .build()
        .unwrap();
    assert!(reader.options().enable_article);

    let url = format!("{}/app", server.uri());
    let result = reader.convert(&url).await.unwrap();

    assert_eq!(result.metadata.renderer, Some(Renderer::Proxy));
    assert_eq!(result.final_url, url);
    assert!(result.markdown.contains("Faster sanitization"));
    assert!(result.word_count >= 10);
}

#[tokio::test]
async fn test_proxy_failure_falls_back_to_raw() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/{PAGE_ID}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/Roadmap-{PAGE_ID}")))
        .respond_with(html(SHELL_HTML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/proxy/"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let reader = mock_notion_reader(&server);
    let result = reader
        .convert(&format!("{}/Roadmap-{PAGE_ID}", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.metadata.renderer, Some(Renderer::DirectHttp));
    assert_eq!(result.markdown, "Loading…");
    assert_eq!(result.word_count, 1);
}

#[tokio::test]
async fn test_empty_shell_without_proxy_content_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/{PAGE_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/Roadmap-{PAGE_ID}")))
        .respond_with(html(r#"<html><body><div id="root"></div></body></html>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/proxy/"))
        .respond_with(html("<html><body></body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let reader = mock_notion_reader(&server);
    let err = reader
        .convert(&format!("{}/Roadmap-{PAGE_ID}", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, ReaderError::EmptyContent));
}

#[tokio::test]
async fn test_proxy_disabled_keeps_thin_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/app"))
        .respond_with(html(SHELL_HTML))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/proxy/"))
        .respond_with(html(RICH_HTML))
        .expect(0)
        .mount(&server)
        .await;

    let reader = Reader::builder()
        .proxy_host("127.0.0.1")
        .proxy_prefix(format!("{}/proxy/", server.uri()))
        .disable_proxy()
        .enable_article(false)
        .build()
        .unwrap();
    let result = reader
        .convert(&format!("{}/app", server.uri()))
        .await
        .unwrap();
    assert_eq!(result.metadata.renderer, Some(Renderer::DirectHttp));
}

#[tokio::test]
async fn test_invalid_url_scheme() {
    let err = convert("ftp://example.com/file").await.unwrap_err();
    assert!(matches!(err, ReaderError::InvalidUrlScheme));
    assert!(err.is_invalid_input());
}

#[test]
fn test_missing_url() {
    let err = tokio_test::block_on(convert("")).unwrap_err();
    assert!(matches!(err, ReaderError::MissingUrl));
}

#[test]
fn test_output_schema_lists_payload_fields() {
    let reader = Reader::builder().build().unwrap();
    let schema = reader.output_schema();
    assert!(schema["properties"]["word_count"].is_object());
    assert!(schema["properties"]["metadata"].is_object());
}
