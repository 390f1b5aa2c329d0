use anyhow::{Context as _, Error, Result, anyhow};
use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::Client;
use tokio::fs::read as tokio_fs_read;
use url::Url;

/// Retrieves runtime resources (module and classic script sources).
pub trait ResourceFetcher: Send + Sync {
    /// Fetch `url` and decode it as UTF-8 text.
    fn fetch_text<'call>(&'call self, url: &'call Url) -> BoxFuture<'call, Result<String>>;
}

/// Fetches over the network or from the local filesystem.
///
/// Supported URL schemes:
/// - `http`, `https`: fetched via `reqwest`; non-success statuses are errors
/// - `file`: read from the local filesystem
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with its own connection pool.
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be initialized (for example, TLS setup).
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Fetch the raw bytes behind `url`.
    ///
    /// # Errors
    ///
    /// - Returns `Err` if the URL scheme is unsupported
    /// - Returns `Err` if the HTTP fetch fails or returns a non-success status
    /// - Returns `Err` if the file path is invalid or the file cannot be read
    pub async fn fetch(&self, url: &Url) -> Result<Bytes, Error> {
        match url.scheme() {
            "http" | "https" => {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|err| anyhow!("Failed to fetch URL {url}: {err}"))?;
                if !response.status().is_success() {
                    return Err(anyhow!(
                        "Failed to fetch URL: {} (Status: {})",
                        url,
                        response.status()
                    ));
                }
                response
                    .bytes()
                    .await
                    .map_err(|err| anyhow!("Failed to read body of {url}: {err}"))
            }
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| anyhow!("Invalid file path for file url: {url}"))?;
                let data = tokio_fs_read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                Ok(Bytes::from(data))
            }
            other => Err(anyhow!("Unsupported url scheme {other}")),
        }
    }
}

impl ResourceFetcher for HttpFetcher {
    fn fetch_text<'call>(&'call self, url: &'call Url) -> BoxFuture<'call, Result<String>> {
        Box::pin(async move {
            let bytes = self.fetch(url).await?;
            String::from_utf8(bytes.to_vec()).with_context(|| format!("{url} is not UTF-8 text"))
        })
    }
}
