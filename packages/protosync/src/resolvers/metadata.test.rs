use httpmock::{Method::GET, MockServer};
use indoc::indoc;
use pretty_assertions::assert_eq;
use rstest::rstest;

use crate::{error::Error, http::HttpClient, report::{Level, Report}};

use super::{latest_version, read_latest_version};

async fn read(document: &str) -> Result<String, Error> {
    read_latest_version(document.as_bytes(), "maven-metadata.xml").await
}

#[tokio::test]
async fn test_latest_version() {
    let document = indoc! {r#"
        <?xml version="1.0" encoding="UTF-8"?>
        <metadata>
          <groupId>com.example.protos</groupId>
          <artifactId>all-protos</artifactId>
          <versioning>
            <latest>1.42.0</latest>
            <release>1.42.0</release>
            <versions>
              <version>1.41.0</version>
              <version>1.42.0</version>
            </versions>
          </versioning>
        </metadata>
    "#};

    assert_eq!(read(document).await.unwrap(), "1.42.0");
}

#[tokio::test]
async fn test_stops_reading_after_latest() {
    // Anything past the marker is never looked at, however broken it is
    let document = "<metadata><versioning><latest>2.0.0</latest></versioning><<<< not xml </mismatched>";

    assert_eq!(read(document).await.unwrap(), "2.0.0");
}

#[rstest]
#[case("<metadata><versioning><release>1.0.0</release></versioning></metadata>")]
#[case("<metadata><versioning><latest>  </latest></versioning></metadata>")]
#[case("")]
#[tokio::test]
async fn test_missing_latest(#[case] document: &str) {
    let result = read(document).await;

    assert!(matches!(result, Err(Error::MissingLatestVersion(_))), "{:?}", result);
}

#[tokio::test]
async fn test_broken_document_before_latest() {
    let result = read("<metadata></versioning><latest>1.0.0</latest>").await;

    assert!(matches!(result, Err(Error::MetadataError(..))), "{:?}", result);
}

#[tokio::test]
async fn test_latest_version_over_http() {
    let server = MockServer::start_async().await;

    let mock = server.mock_async(|when, then| {
        when.method(GET).path("/releases/com/example/all-protos/maven-metadata.xml");
        then.status(200).body("<metadata><versioning><latest>3.1.4</latest></versioning></metadata>");
    }).await;

    let (report, lines) = Report::buffered(Level::Debug);
    let url = server.url("/releases/com/example/all-protos/maven-metadata.xml");

    let version = latest_version(&HttpClient::new().unwrap(), &url, &report).await.unwrap();

    assert_eq!(version, "3.1.4");
    assert_eq!(lines.lock().unwrap()[0], format!("debug: Syncing {} metadata", url));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_latest_version_http_error() {
    let server = MockServer::start_async().await;

    server.mock_async(|when, then| {
        when.method(GET).path("/maven-metadata.xml");
        then.status(500);
    }).await;

    let (report, _) = Report::buffered(Level::Debug);
    let result = latest_version(&HttpClient::new().unwrap(), &server.url("/maven-metadata.xml"), &report).await;

    assert!(matches!(result, Err(Error::HttpError(_))), "{:?}", result);
}
