//! Network backend for the request gate
//!
//! The gate never talks to the network directly; it goes through the
//! `NetworkFetch` trait so tests can substitute a mock and count calls.

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::cache::{RequestKey, StoredResponse};

/// Errors from the HTTP backend
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("preload target {url} answered status {status}")]
    PreloadStatus { url: String, status: u16 },

    #[error("cannot resolve {path} against origin: {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported method {0}")]
    Method(String),
}

/// An intercepted request ready for a live fetch: the cache identity plus
/// everything needed to replay it against the origin.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub key: RequestKey,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl FetchRequest {
    /// A payload-less GET, the common case for asset requests
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            key: RequestKey::get(url),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// Trait for performing a live fetch of an intercepted request
#[async_trait]
pub trait NetworkFetch: Send + Sync {
    /// Fetch the identical request from the network.
    ///
    /// HTTP error statuses are successful fetches and come back as responses;
    /// only transport-level failures are errors.
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse>;
}

/// reqwest-backed fetcher resolving origin-relative paths
pub struct HttpFetcher {
    origin: Url,
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_origin(origin: &str) -> Result<Self> {
        let origin = Url::parse(origin).map_err(|source| FetchError::InvalidUrl {
            path: origin.to_string(),
            source,
        })?;
        Ok(Self::new(origin))
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }
}

#[async_trait]
impl NetworkFetch for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<StoredResponse> {
        let url = self
            .origin
            .join(&request.key.url)
            .map_err(|source| FetchError::InvalidUrl {
                path: request.key.url.clone(),
                source,
            })?;

        let method = reqwest::Method::from_bytes(request.key.method.as_bytes())
            .map_err(|_| FetchError::Method(request.key.method.clone()))?;

        tracing::debug!(%url, method = %request.key.method, "fetching from network");

        let mut builder = self.client.request(method, url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?
            .to_vec();

        Ok(StoredResponse::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_origin_rejects_garbage() {
        assert!(HttpFetcher::from_origin("not a url").is_err());
        assert!(HttpFetcher::from_origin("http://127.0.0.1:8000").is_ok());
    }

    #[test]
    fn test_origin_join_keeps_relative_paths() {
        let fetcher = HttpFetcher::from_origin("http://127.0.0.1:8000").unwrap();
        let joined = fetcher.origin().join("/static/style.css").unwrap();
        assert_eq!(joined.as_str(), "http://127.0.0.1:8000/static/style.css");
    }
}
