//! C4 — Parallel Extractor. Fetches every selected path with bounded
//! concurrency, extracts readable text (falling back to a structural strip
//! when the readability heuristic comes up empty), and aggregates the
//! results in selection order (SPEC_FULL.md §4.4).

pub mod fetcher;
mod readability;
mod structural;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::error::TheodoreError;
use crate::http;
use crate::types::{CrawlResult, ExtractorKind, PageResult};
use fetcher::{HttpPageFetcher, PageFetcher};

pub struct ParallelExtractor {
    fetcher: Arc<dyn PageFetcher>,
    concurrency: usize,
    max_content_per_page: usize,
}

impl ParallelExtractor {
    pub fn new(timeout: Duration, concurrency: usize, max_content_per_page: usize) -> Self {
        let client = http::build_client(timeout);
        Self {
            fetcher: Arc::new(HttpPageFetcher::new(client, timeout)),
            concurrency,
            max_content_per_page,
        }
    }

    #[cfg(test)]
    pub fn with_fetcher(
        fetcher: Arc<dyn PageFetcher>,
        concurrency: usize,
        max_content_per_page: usize,
    ) -> Self {
        Self {
            fetcher,
            concurrency,
            max_content_per_page,
        }
    }

    pub async fn extract(&self, base_url: &str, paths: &[String]) -> Result<CrawlResult, TheodoreError> {
        let started = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        let mut handles = Vec::with_capacity(paths.len());
        for path in paths {
            let url = format!("{base_url}{path}");
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);
            let max_len = self.max_content_per_page;

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("semaphore never closed");
                fetch_and_extract(fetcher.as_ref(), &url, max_len).await
            }));
        }

        let mut pages = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(page) => pages.push(page),
                Err(e) => warn!(error = %e, "extraction task panicked"),
            }
        }

        let success_count = pages.iter().filter(|p| p.ok).count();
        let fallback_count = pages
            .iter()
            .filter(|p| p.ok && p.extractor == ExtractorKind::StructuralFallback)
            .count();
        let failure_count = pages.iter().filter(|p| !p.ok).count();

        if success_count == 0 {
            return Err(TheodoreError::ExtractionFailed {
                attempted: pages.len(),
            });
        }

        let mut aggregated_text = String::new();
        let mut total_text_bytes = 0;
        for page in &pages {
            if !page.ok || page.text.is_empty() {
                continue;
            }
            aggregated_text.push_str(&format!("\n\n=== {} ===\n\n", page.url));
            aggregated_text.push_str(&page.text);
            total_text_bytes += page.text.len();
        }

        info!(
            base_url,
            attempted = pages.len(),
            success_count,
            fallback_count,
            failure_count,
            "extraction complete"
        );

        Ok(CrawlResult {
            pages,
            aggregated_text,
            total_text_bytes,
            extraction_seconds: started.elapsed().as_secs_f64(),
            success_count,
            fallback_count,
            failure_count,
        })
    }
}

async fn fetch_and_extract(fetcher: &dyn PageFetcher, url: &str, max_len: usize) -> PageResult {
    let started = Instant::now();

    let fetched = match fetcher.fetch(url).await {
        Ok(page) => page,
        Err(e) => {
            return PageResult {
                url: url.to_string(),
                ok: false,
                extractor: ExtractorKind::None,
                http_status: 0,
                title: None,
                text: String::new(),
                byte_count: 0,
                fetch_seconds: started.elapsed().as_secs_f64(),
                error: Some(e.to_string()),
            };
        }
    };

    if !(200..300).contains(&fetched.status) {
        return PageResult {
            url: url.to_string(),
            ok: false,
            extractor: ExtractorKind::None,
            http_status: fetched.status,
            title: None,
            text: String::new(),
            byte_count: 0,
            fetch_seconds: started.elapsed().as_secs_f64(),
            error: Some(format!("http status {}", fetched.status)),
        };
    }

    let (extractor, title, text) = match readability::extract(&fetched.body) {
        Some(result) => (ExtractorKind::Readable, result.title, result.text),
        None => (ExtractorKind::StructuralFallback, None, structural::extract(&fetched.body)),
    };

    let truncated = ai_client::util::truncate_to_char_boundary(&text, max_len).to_string();

    PageResult {
        url: url.to_string(),
        ok: true,
        extractor,
        http_status: fetched.status,
        title,
        byte_count: truncated.len(),
        text: truncated,
        fetch_seconds: started.elapsed().as_secs_f64(),
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fetcher::mock::MockPageFetcher;

    #[tokio::test]
    async fn aggregates_successful_pages_in_order() {
        let dense_about = "<html><head><title>About</title></head><body><article><p>\
            Acme builds payroll software for small businesses across North America, helping \
            thousands of teams pay their people correctly and on time every single month.\
            </p></article></body></html>";
        let dense_team = "<html><body><article><p>\
            Our leadership team has shipped fintech products for over a decade and cares deeply \
            about reliability, security, and customer trust in every release we ship.\
            </p></article></body></html>";

        let mock = MockPageFetcher::new()
            .with_page("https://acme.test/about", 200, dense_about)
            .with_page("https://acme.test/team", 200, dense_team);

        let extractor = ParallelExtractor::with_fetcher(Arc::new(mock), 4, 10_000);
        let result = extractor
            .extract("https://acme.test", &["/about".to_string(), "/team".to_string()])
            .await
            .unwrap();

        assert_eq!(result.pages.len(), 2);
        assert_eq!(result.success_count, 2);
        assert_eq!(result.failure_count, 0);
        assert!(result.aggregated_text.contains("=== https://acme.test/about ==="));
        assert!(result.aggregated_text.contains("payroll software"));
    }

    #[tokio::test]
    async fn fallback_extracted_pages_count_as_success() {
        // Sparse enough that readability::extract finds no block above its
        // density/length threshold, so the structural fallback engages.
        let sparse = "<html><body><main>Hello World</main></body></html>";

        let mock = MockPageFetcher::new().with_page("https://acme.test/about", 200, sparse);
        let extractor = ParallelExtractor::with_fetcher(Arc::new(mock), 4, 10_000);
        let result = extractor
            .extract("https://acme.test", &["/about".to_string()])
            .await
            .unwrap();

        assert_eq!(result.pages[0].extractor, ExtractorKind::StructuralFallback);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.fallback_count, 1);
        assert_eq!(result.failure_count, 0);
        assert!(result.aggregated_text.contains("Hello World"));
    }

    #[tokio::test]
    async fn all_failures_returns_extraction_failed() {
        let mock = MockPageFetcher::new();
        let extractor = ParallelExtractor::with_fetcher(Arc::new(mock), 4, 10_000);
        let result = extractor
            .extract("https://acme.test", &["/missing".to_string()])
            .await;
        assert!(matches!(result, Err(TheodoreError::ExtractionFailed { attempted: 1 })));
    }
}
