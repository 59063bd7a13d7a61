//! Blocking HTTP GET over libcurl.
//!
//! Shared by the data-service and object-store clients. Every request has a
//! connect timeout, a total timeout, and a `CancelToken` polled from the
//! progress callback. Runs in the current thread; call from `spawn_blocking`
//! if used from async code.

mod error;
mod parse;

pub use error::TransportError;
pub use parse::ResponseHeaders;

use crate::cancel::CancelToken;
use crate::config::TimeoutConfig;
use std::collections::HashMap;
use std::str;
use std::time::Duration;

/// Per-request transport limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    /// Upper bound on the whole transfer, body included.
    pub request_timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        HttpOptions::from(&TimeoutConfig::default())
    }
}

impl From<&TimeoutConfig> for HttpOptions {
    fn from(cfg: &TimeoutConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_secs),
            request_timeout: Duration::from_secs(cfg.request_secs),
        }
    }
}

/// A completed exchange. Any status code is returned as-is; callers decide what counts as success.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub headers: ResponseHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs a GET and buffers the response body.
///
/// Follows redirects; headers from intermediate redirect responses are discarded.
pub fn get(
    url: &str,
    custom_headers: &HashMap<String, String>,
    opts: &HttpOptions,
    cancel: &CancelToken,
) -> Result<HttpResponse, TransportError> {
    cancel.check()?;

    let mut header_lines: Vec<String> = Vec::new();
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(TransportError::Setup)?;
    easy.get(true).map_err(TransportError::Setup)?;
    easy.follow_location(true).map_err(TransportError::Setup)?;
    easy.max_redirections(10).map_err(TransportError::Setup)?;
    easy.connect_timeout(opts.connect_timeout)
        .map_err(TransportError::Setup)?;
    easy.timeout(opts.request_timeout)
        .map_err(TransportError::Setup)?;
    easy.progress(true).map_err(TransportError::Setup)?;

    let mut list = curl::easy::List::new();
    for (k, v) in custom_headers {
        list.append(&format!("{}: {}", k.trim(), v.trim()))
            .map_err(TransportError::Setup)?;
    }
    if !custom_headers.is_empty() {
        easy.http_headers(list).map_err(TransportError::Setup)?;
    }

    tracing::debug!("GET {}", url);
    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    // A new status line starts a new response (redirect hop).
                    if s.starts_with("HTTP/") {
                        header_lines.clear();
                    }
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })
            .map_err(TransportError::Setup)?;
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(TransportError::Setup)?;
        transfer
            .progress_function(|_, _, _, _| !cancel.is_cancelled())
            .map_err(TransportError::Setup)?;
        transfer.perform()
    };
    if let Err(e) = performed {
        return Err(TransportError::from_curl(e, cancel));
    }

    let status = easy.response_code().map_err(TransportError::Setup)?;
    Ok(HttpResponse {
        status,
        headers: parse::parse_headers(&header_lines),
        body,
    })
}
