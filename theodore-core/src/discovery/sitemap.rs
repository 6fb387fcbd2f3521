//! Sitemap sub-discovery: fetches each candidate sitemap URL, follows one
//! level of `<sitemapindex>` nesting, and collects same-host `<loc>` paths
//! (SPEC_FULL.md §4.2 step 2).

use std::time::Duration;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;
use url::Url;

use crate::http;

pub async fn expand(
    client: &reqwest::Client,
    base_url: &str,
    sitemap_urls: &[String],
    timeout: Duration,
) -> Result<Vec<String>, reqwest::Error> {
    let base_host = Url::parse(base_url).ok().and_then(|u| u.host_str().map(str::to_string));

    let mut paths = Vec::new();
    let mut nested_to_fetch = Vec::new();

    for sitemap_url in sitemap_urls {
        let absolute = resolve(base_url, sitemap_url);
        let body = match fetch_one(client, &absolute, timeout).await {
            Some(body) => body,
            None => continue,
        };

        let locs = extract_locs(&body);
        if body.contains("<sitemapindex") {
            nested_to_fetch.extend(locs);
        } else {
            for loc in locs {
                if let Some(path) = same_host_path(&loc, base_host.as_deref()) {
                    paths.push(path);
                }
            }
        }
    }

    // Follow nested sitemaps exactly one level deep.
    for nested_url in nested_to_fetch {
        let body = match fetch_one(client, &nested_url, timeout).await {
            Some(body) => body,
            None => continue,
        };
        for loc in extract_locs(&body) {
            if let Some(path) = same_host_path(&loc, base_host.as_deref()) {
                paths.push(path);
            }
        }
    }

    Ok(paths)
}

async fn fetch_one(client: &reqwest::Client, url: &str, timeout: Duration) -> Option<String> {
    let fetch = http::get_capped(client, url);
    let (status, body) = match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            debug!(url, error = %e, "sitemap fetch failed");
            return None;
        }
        Err(_) => {
            debug!(url, "sitemap fetch timed out");
            return None;
        }
    };
    if !(200..300).contains(&status) {
        return None;
    }
    Some(body)
}

fn resolve(base_url: &str, maybe_relative: &str) -> String {
    if maybe_relative.contains("://") {
        maybe_relative.to_string()
    } else if maybe_relative.starts_with('/') {
        format!("{base_url}{maybe_relative}")
    } else {
        format!("{base_url}/{maybe_relative}")
    }
}

/// Pull every `<loc>...</loc>` text value out of a sitemap document.
fn extract_locs(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut locs = Vec::new();
    let mut in_loc = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"loc" => in_loc = true,
            Ok(Event::End(e)) if e.local_name().as_ref() == b"loc" => in_loc = false,
            Ok(Event::Text(t)) if in_loc => {
                if let Ok(text) = t.unescape() {
                    locs.push(text.into_owned());
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    locs
}

fn same_host_path(loc: &str, base_host: Option<&str>) -> Option<String> {
    let url = Url::parse(loc).ok()?;
    let host = url.host_str()?;
    if let Some(base_host) = base_host {
        if !host.eq_ignore_ascii_case(base_host) {
            return None;
        }
    }
    let mut path = url.path().to_string();
    if path.is_empty() {
        path = "/".to_string();
    }
    super::normalize_path(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_locs_from_urlset() {
        let xml = r#"<?xml version="1.0"?><urlset><url><loc>https://example.com/about</loc></url><url><loc>https://example.com/team</loc></url></urlset>"#;
        let locs = extract_locs(xml);
        assert_eq!(locs, vec!["https://example.com/about", "https://example.com/team"]);
    }

    #[test]
    fn rejects_different_host_locs() {
        let path = same_host_path("https://other.com/about", Some("example.com"));
        assert_eq!(path, None);
        let path = same_host_path("https://example.com/about", Some("example.com"));
        assert_eq!(path, Some("/about".to_string()));
    }
}
