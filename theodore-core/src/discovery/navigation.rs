//! Home-page navigation scan: fetches the base URL, parses it as HTML, and
//! keeps `<a href>` targets that resolve to the same host (SPEC_FULL.md §4.2
//! step 3).

use std::time::Duration;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::http;

pub async fn scan(
    client: &reqwest::Client,
    base_url: &str,
    timeout: Duration,
) -> Result<Vec<String>, reqwest::Error> {
    let fetch = http::get_capped(client, base_url);
    let (status, body) = match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result?,
        Err(_) => {
            debug!(base_url, "home-page scan timed out");
            return Ok(Vec::new());
        }
    };

    if !(200..300).contains(&status) {
        debug!(base_url, status, "home page did not return 2xx");
        return Ok(Vec::new());
    }

    Ok(extract_same_host_paths(&body, base_url))
}

fn extract_same_host_paths(html: &str, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(u) => u,
        Err(_) => return Vec::new(),
    };
    let base_host = base.host_str().map(str::to_string);

    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("static selector is valid");

    let mut paths = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            continue;
        };
        if resolved.host_str().map(str::to_string) != base_host {
            continue;
        }
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }

        let mut path = resolved.path().to_string();
        if path.is_empty() {
            path = "/".to_string();
        }
        if let Some(normalized) = super::normalize_path(&path) {
            paths.push(normalized);
        }
    }
    paths
}
