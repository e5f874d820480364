use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use thiserror::Error;
use tracing::{debug, info};

/// Network failures abort the run with their own exit status.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("invalid user agent {0:?}")]
    UserAgent(String),
}

pub fn build_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent).map_err(|_| FetchError::UserAgent(user_agent.to_string()))?,
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("fr-FR,fr;q=0.9"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|source| FetchError::Request { url: String::new(), source })
}

/// GET a page and return its body, decoded as UTF-8 with invalid bytes replaced.
pub async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    let request_err = |source| FetchError::Request { url: url.to_string(), source };

    info!("Fetching {}", url);
    let response = client.get(url).send().await.map_err(request_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status { url: url.to_string(), status: status.as_u16() });
    }

    let bytes = response.bytes().await.map_err(request_err)?;
    debug!("{} bytes from {}", bytes.len(), url);
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
