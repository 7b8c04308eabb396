//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the mirror:
//! - Building the HTTP client
//! - One GET per page or asset, without retries
//! - Classification of the response into a [`FetchOutcome`]

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchOutcome {
    /// The server answered with a 2xx status
    Success {
        /// Full response body
        bytes: Vec<u8>,
        /// Content-Type header value, empty if absent
        content_type: String,
    },

    /// The server answered with a non-2xx status
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// No usable response (connection refused, DNS failure, TLS error,
    /// body read failure, timeout of the transport)
    TransportError {
        /// Error description
        error: String,
    },
}

impl FetchOutcome {
    /// Short description of a failed outcome for log messages
    pub fn describe(&self) -> String {
        match self {
            Self::Success { bytes, .. } => format!("{} bytes", bytes.len()),
            Self::HttpError { status_code } => format!("HTTP {}", status_code),
            Self::TransportError { error } => error.clone(),
        }
    }
}

/// Builds the HTTP client shared by every fetch of a run
///
/// Redirects, timeouts and headers are the transport defaults; only
/// transparent decompression is switched on.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder().gzip(true).brotli(true).build()
}

/// Fetches a URL with a single GET request
///
/// | Condition | Outcome |
/// |-----------|---------|
/// | 2xx | `Success` with the full body |
/// | Any other status | `HttpError` |
/// | Connection, TLS, timeout or body error | `TransportError` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
pub async fn fetch(client: &Client, url: &Url) -> FetchOutcome {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => return transport_error(e),
    };

    let status = response.status();
    if !status.is_success() {
        return FetchOutcome::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    match response.bytes().await {
        Ok(body) => FetchOutcome::Success {
            bytes: body.to_vec(),
            content_type,
        },
        Err(e) => transport_error(e),
    }
}

/// Classifies a reqwest error into a transport failure
fn transport_error(e: reqwest::Error) -> FetchOutcome {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else {
        e.to_string()
    };

    FetchOutcome::TransportError { error }
}
