use protosync_utils::Unit;
use quick_xml::events::Event;
use tokio::io::{AsyncBufRead, BufReader};

use crate::{error::Error, http::{into_reader, HttpClient}, report::Report};

#[cfg(test)]
#[path = "./metadata.test.rs"]
mod tests;

/// Finds the latest published version of an artifact from its
/// `maven-metadata.xml`. Some repositories are very slow to serve those
/// documents, so the body is parsed as it streams in and the connection is
/// dropped as soon as the `<latest>` element has been read.
pub async fn latest_version(http_client: &HttpClient, url: &str, report: &Report) -> Result<String, Error> {
    report.debug(format!("Syncing {} metadata", url));

    let response = http_client.get(url)
        .await?
        .error_for_status()?;

    report.debug(format!("<- {} ({})", url, Unit::maybe_bytes(response.content_length())));

    let reader
        = BufReader::new(into_reader(response));

    read_latest_version(reader, url).await
}

pub async fn read_latest_version<R: AsyncBufRead + Unpin>(reader: R, source: &str) -> Result<String, Error> {
    let mut reader
        = quick_xml::Reader::from_reader(reader);

    let mut buffer
        = Vec::new();

    let mut latest: Option<String>
        = None;

    let metadata_error
        = |err: quick_xml::Error| Error::MetadataError(source.to_string(), err.to_string());

    loop {
        match reader.read_event_into_async(&mut buffer).await.map_err(metadata_error)? {
            Event::Start(start) if start.local_name().as_ref() == b"latest" => {
                latest = Some(String::new());
            },

            Event::Text(text) => {
                if let Some(latest) = &mut latest {
                    let text = text.unescape()
                        .map_err(|err| Error::MetadataError(source.to_string(), err.to_string()))?;

                    latest.push_str(&text);
                }
            },

            Event::CData(data) => {
                if let Some(latest) = &mut latest {
                    latest.push_str(&String::from_utf8_lossy(&data));
                }
            },

            Event::End(_) => {
                if let Some(latest) = latest.take() {
                    let latest
                        = latest.trim();

                    if latest.is_empty() {
                        return Err(Error::MissingLatestVersion(source.to_string()));
                    }

                    return Ok(latest.to_string());
                }
            },

            Event::Eof => {
                return Err(Error::MissingLatestVersion(source.to_string()));
            },

            _ => {},
        }

        buffer.clear();
    }
}
