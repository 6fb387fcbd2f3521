//! Mockable page-fetching boundary (SPEC_FULL.md §10.5), in the teacher's
//! `ContentFetcher`/`SignalStore`-style trait shape: the real implementation
//! wraps a shared [`reqwest::Client`], tests substitute a canned map of
//! responses.

use std::time::Duration;

use async_trait::async_trait;

use crate::http;

/// A single fetched page, before any text extraction.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, reqwest::Error>;
}

pub struct HttpPageFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPageFetcher {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, reqwest::Error> {
        let fetch = http::get_capped(&self.client, url);
        match tokio::time::timeout(self.timeout, fetch).await {
            Ok(result) => {
                let (status, body) = result?;
                Ok(FetchedPage { status, body })
            }
            Err(_) => Ok(FetchedPage {
                status: 0,
                body: String::new(),
            }),
        }
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Canned-response fetcher for unit and integration tests.
    #[derive(Default)]
    pub struct MockPageFetcher {
        pub responses: HashMap<String, FetchedPage>,
        pub calls: Mutex<Vec<String>>,
    }

    impl MockPageFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_page(mut self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
            self.responses.insert(
                url.into(),
                FetchedPage {
                    status,
                    body: body.into(),
                },
            );
            self
        }
    }

    #[async_trait]
    impl PageFetcher for MockPageFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, reqwest::Error> {
            self.calls.lock().await.push(url.to_string());
            Ok(self
                .responses
                .get(url)
                .cloned()
                .unwrap_or(FetchedPage { status: 404, body: String::new() }))
        }
    }
}
