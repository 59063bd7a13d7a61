//! Object store: fetch a stored file by its storage path.

use crate::cancel::CancelToken;
use crate::config::ProbeConfig;
use crate::endpoint::Endpoint;
use crate::error::ServiceError;
use crate::model::Payload;
use anyhow::Result;

/// Read access to binary payloads. Implementations block until the call completes.
pub trait ObjectStore {
    fn fetch(&self, storage_path: &str, cancel: &CancelToken) -> Result<Payload, ServiceError>;
}

/// Storage API client (`/storage/v1/object/{bucket}/{path}`).
#[derive(Debug, Clone)]
pub struct RestObjectStore {
    endpoint: Endpoint,
    bucket: String,
}

impl RestObjectStore {
    pub fn new(endpoint: Endpoint, bucket: &str) -> Self {
        Self {
            endpoint,
            bucket: bucket.trim().to_string(),
        }
    }

    pub fn from_config(cfg: &ProbeConfig) -> Result<Self> {
        Ok(Self::new(Endpoint::from_config(cfg)?, &cfg.storage.bucket))
    }

    fn object_url(&self, storage_path: &str) -> url::Url {
        // Each slash-separated part is one path segment, empty parts included,
        // so the request names exactly the key the record holds.
        let key = storage_path.split('/');
        self.endpoint.url(
            ["storage", "v1", "object", self.bucket.as_str()]
                .into_iter()
                .chain(key),
        )
    }
}

impl ObjectStore for RestObjectStore {
    fn fetch(&self, storage_path: &str, cancel: &CancelToken) -> Result<Payload, ServiceError> {
        let url = self.object_url(storage_path);
        let resp = self.endpoint.get(&url, None, cancel)?;
        if let Some(expected) = resp.headers.content_length {
            if expected != resp.body.len() as u64 {
                tracing::warn!(
                    storage_path = %storage_path,
                    "content-length {} but received {} bytes",
                    expected,
                    resp.body.len()
                );
            }
        }
        Ok(Payload::new(resp.body, resp.headers.content_type))
    }
}
