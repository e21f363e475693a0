use std::{sync::Arc, time::Duration};

use futures::TryStreamExt;
use reqwest::{header::CONTENT_TYPE, Client, Response, Url};
use tokio_util::io::StreamReader;

use crate::{error::Error, resolver::NamedContent};

#[cfg(test)]
#[path = "./http.test.rs"]
mod tests;

/// Thin wrapper around a shared `reqwest` client. Requests are never retried;
/// the only fallback in the system is the clone-based one of the remote
/// strategy.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Arc<Self>, Error> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(30))

            .connect_timeout(Duration::from_secs(30))
            .read_timeout(Duration::from_secs(60))

            .tcp_keepalive(Duration::from_secs(60))

            .use_rustls_tls()
            .build()?;

        Ok(Arc::new(Self {
            client,
        }))
    }

    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        let url = Url::parse(url)
            .map_err(|err| protosync_git::Error::InvalidUrl(url.to_string(), err.to_string()))?;

        let response = self.client.get(url)
            .send()
            .await?;

        Ok(response)
    }

    /// Fetches a raw file from a source hosting server. Error statuses and
    /// HTML pages (usually a login page served with a 200) are reported as
    /// [`Error::NotFound`] so that callers can try another transport.
    pub async fn get_content(&self, url: &str) -> Result<NamedContent, Error> {
        let response
            = self.get(url).await?;

        let status
            = response.status();

        if !status.is_success() {
            let body = response.text()
                .await
                .unwrap_or_default();

            return Err(Error::NotFound(format!("{} ({})", body.trim(), status)));
        }

        let is_html = response.headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("text/html"));

        if is_html {
            return Err(Error::NotFound(format!("{} answered with an HTML page", url)));
        }

        Ok(NamedContent::new(url, Box::pin(into_reader(response))))
    }
}

pub fn into_reader(response: Response) -> impl tokio::io::AsyncRead + Send + 'static {
    let stream = response.bytes_stream()
        .map_err(std::io::Error::other);

    StreamReader::new(stream)
}
