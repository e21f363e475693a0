use httpmock::{Method::GET, MockServer};
use pretty_assertions::assert_eq;

use crate::error::Error;

use super::HttpClient;

#[tokio::test]
async fn test_get_content() {
    let server = MockServer::start_async().await;

    server.mock_async(|when, then| {
        when.method(GET).path("/acme/protos/master/foo/bar.proto");
        then.status(200).header("content-type", "text/plain; charset=utf-8").body("syntax = \"proto3\";");
    }).await;

    let url = server.url("/acme/protos/master/foo/bar.proto");
    let content = HttpClient::new().unwrap().get_content(&url).await.unwrap();

    assert_eq!(content.name, url);
    assert_eq!(content.read_to_end().await.unwrap(), b"syntax = \"proto3\";".to_vec());
}

#[tokio::test]
async fn test_error_status_is_not_found() {
    let server = MockServer::start_async().await;

    server.mock_async(|when, then| {
        when.method(GET).path("/missing.proto");
        then.status(404).body("404: Not Found\n");
    }).await;

    let result = HttpClient::new().unwrap().get_content(&server.url("/missing.proto")).await;

    let Err(Error::NotFound(message)) = result else {
        panic!("Expected a not found error");
    };

    assert_eq!(message, "404: Not Found (404 Not Found)");
}

#[tokio::test]
async fn test_html_page_is_not_found() {
    let server = MockServer::start_async().await;

    server.mock_async(|when, then| {
        when.method(GET).path("/login.proto");
        then.status(200).header("content-type", "text/html; charset=utf-8").body("<html><body>Log in</body></html>");
    }).await;

    let result = HttpClient::new().unwrap().get_content(&server.url("/login.proto")).await;

    assert!(matches!(result, Err(Error::NotFound(_))), "{:?}", result.map(|content| content.name));
}

#[tokio::test]
async fn test_invalid_url() {
    let result = HttpClient::new().unwrap().get("not a url").await;

    assert!(matches!(result, Err(Error::GitUrlError(_))), "{:?}", result);
}
