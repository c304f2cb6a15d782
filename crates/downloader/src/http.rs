// ABOUTME: The HTTP collaborator seam for feed fetches and episode downloads.
// ABOUTME: ReqwestClient is the blocking production implementation; tests substitute fakes.

use std::io::Read;

use crate::error::FetchError;
use crate::options::ClientOptions;

/// An open, streamable response body for one episode download.
pub struct DownloadStream {
    pub reader: Box<dyn Read>,
    /// Declared Content-Length, when the server sent one.
    pub content_length: Option<u64>,
}

/// What the download runner needs from an HTTP client: one full fetch for the
/// feed document, one streaming GET per planned episode.
pub trait HttpClient {
    /// Fetches the feed document in full.
    fn fetch_feed(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Opens a streaming response for an episode download.
    fn open_download(&self, url: &str) -> Result<DownloadStream, FetchError>;
}

/// Blocking reqwest-backed client with an explicit timeout and user agent.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new(options: &ClientOptions) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout)
            .build()
            .map_err(|err| FetchError::Client(err.to_string()))?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError::network(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl HttpClient for ReqwestClient {
    fn fetch_feed(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url)?;
        let bytes = response
            .bytes()
            .map_err(|err| FetchError::network(url, err))?;
        Ok(bytes.to_vec())
    }

    fn open_download(&self, url: &str) -> Result<DownloadStream, FetchError> {
        let response = self.get(url)?;
        let content_length = response.content_length();
        Ok(DownloadStream {
            reader: Box::new(response),
            content_length,
        })
    }
}
