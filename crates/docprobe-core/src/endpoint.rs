//! Base URL, credentials and transport limits shared by the REST clients.

use crate::cancel::CancelToken;
use crate::config::ProbeConfig;
use crate::error::{ErrorBody, ServiceError};
use crate::http::{self, HttpOptions, HttpResponse};
use anyhow::{Context, Result};
use std::collections::HashMap;
use url::Url;

#[derive(Debug, Clone)]
pub struct Endpoint {
    base: Url,
    api_key: Option<String>,
    http: HttpOptions,
}

impl Endpoint {
    pub fn new(base: &str, api_key: Option<String>, http: HttpOptions) -> Result<Self> {
        let base = Url::parse(base.trim()).with_context(|| format!("invalid base URL {base:?}"))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("base URL {base} cannot carry a path");
        }
        Ok(Self { base, api_key, http })
    }

    pub fn from_config(cfg: &ProbeConfig) -> Result<Self> {
        Self::new(
            &cfg.service.url,
            cfg.service.api_key.clone(),
            HttpOptions::from(&cfg.timeouts),
        )
    }

    /// Base URL with `segments` appended, each percent-encoded as one path segment.
    pub fn url<'a, I>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn headers(&self, accept: Option<&str>) -> HashMap<String, String> {
        let mut headers = HashMap::new();
        if let Some(key) = &self.api_key {
            headers.insert("apikey".to_string(), key.clone());
            headers.insert("Authorization".to_string(), format!("Bearer {key}"));
        }
        if let Some(accept) = accept {
            headers.insert("Accept".to_string(), accept.to_string());
        }
        headers
    }

    /// GET `url`; non-2xx responses become `ServiceError::Status` with the parsed error body.
    pub fn get(
        &self,
        url: &Url,
        accept: Option<&str>,
        cancel: &CancelToken,
    ) -> Result<HttpResponse, ServiceError> {
        let resp = http::get(url.as_str(), &self.headers(accept), &self.http, cancel)?;
        if !resp.is_success() {
            return Err(ServiceError::Status {
                status: resp.status,
                body: ErrorBody::parse(&resp.body),
            });
        }
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(base: &str, key: Option<&str>) -> Endpoint {
        Endpoint::new(base, key.map(str::to_string), HttpOptions::default()).unwrap()
    }

    #[test]
    fn url_appends_encoded_segments() {
        let ep = endpoint("https://abc.example.co/", None);
        let url = ep.url(["rest", "v1", "my table"]);
        assert_eq!(url.as_str(), "https://abc.example.co/rest/v1/my%20table");
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let ep = endpoint("http://127.0.0.1:8000/proxy", None);
        let url = ep.url(["storage", "v1"]);
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/proxy/storage/v1");
    }

    #[test]
    fn headers_carry_api_key() {
        let ep = endpoint("https://x.example", Some("k1"));
        let h = ep.headers(Some("application/json"));
        assert_eq!(h.get("apikey").map(String::as_str), Some("k1"));
        assert_eq!(h.get("Authorization").map(String::as_str), Some("Bearer k1"));
        assert_eq!(h.get("Accept").map(String::as_str), Some("application/json"));
    }

    #[test]
    fn headers_empty_without_key() {
        let ep = endpoint("https://x.example", None);
        assert!(ep.headers(None).is_empty());
    }

    #[test]
    fn rejects_non_base_url() {
        assert!(Endpoint::new("mailto:a@b.c", None, HttpOptions::default()).is_err());
        assert!(Endpoint::new("", None, HttpOptions::default()).is_err());
    }
}
