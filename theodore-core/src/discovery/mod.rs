//! C2 — Path Discoverer. Runs three sub-discoveries concurrently and merges
//! their results (SPEC_FULL.md §4.2).

mod navigation;
mod robots;
mod sitemap;

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::TheodoreError;
use crate::http;
use crate::types::{PathSet, PathSource};

pub use robots::RobotsInfo;

pub struct PathDiscoverer {
    client: reqwest::Client,
    timeout: Duration,
}

impl PathDiscoverer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: http::build_client(timeout),
            timeout,
        }
    }

    pub async fn discover(&self, base_url: &str) -> Result<PathSet, TheodoreError> {
        let started = Instant::now();

        // All three sub-discoveries race together against the default
        // sitemap location; robots-declared sitemaps (if different) are
        // only known once robots.txt comes back, so those are fetched as a
        // secondary step afterward.
        let default_sitemap = format!("{base_url}/sitemap.xml");
        let robots_fut = robots::fetch(&self.client, base_url, self.timeout);
        let home_fut = navigation::scan(&self.client, base_url, self.timeout);
        let default_sitemap_fut = sitemap::expand(
            &self.client,
            base_url,
            std::slice::from_ref(&default_sitemap),
            self.timeout,
        );

        let (robots_result, home_result, default_sitemap_result) =
            tokio::join!(robots_fut, home_fut, default_sitemap_fut);

        let robots_info = robots_result.unwrap_or_else(|e| {
            warn!(base_url, error = %e, "robots.txt sub-discovery failed");
            RobotsInfo::default()
        });

        let mut sitemap_paths = default_sitemap_result.unwrap_or_else(|e| {
            warn!(base_url, error = %e, "sitemap sub-discovery failed");
            Vec::new()
        });

        let extra_sitemaps: Vec<String> = robots_info
            .sitemaps
            .iter()
            .filter(|url| *url != &default_sitemap)
            .cloned()
            .collect();
        if !extra_sitemaps.is_empty() {
            match sitemap::expand(&self.client, base_url, &extra_sitemaps, self.timeout).await {
                Ok(more) => sitemap_paths.extend(more),
                Err(e) => warn!(base_url, error = %e, "robots-declared sitemap sub-discovery failed"),
            }
        }

        let nav_paths = home_result.unwrap_or_else(|e| {
            warn!(base_url, error = %e, "home-page navigation scan failed");
            Vec::new()
        });

        if robots_info.raw_paths.is_empty() && sitemap_paths.is_empty() && nav_paths.is_empty() {
            return Err(TheodoreError::DiscoveryFailed);
        }

        let mut paths = Vec::new();
        let mut sources = HashMap::new();
        let mut merge = |candidates: Vec<String>, source: PathSource| {
            for raw in candidates {
                if let Some(normalized) = normalize_path(&raw) {
                    sources.entry(normalized.clone()).or_insert(source);
                    if !paths.contains(&normalized) {
                        paths.push(normalized);
                    }
                }
            }
        };

        merge(robots_info.raw_paths, PathSource::Robots);
        merge(sitemap_paths, PathSource::Sitemap);
        merge(nav_paths, PathSource::Navigation);

        info!(base_url, count = paths.len(), "path discovery complete");

        Ok(PathSet {
            paths,
            sources,
            discovery_seconds: started.elapsed().as_secs_f64(),
        })
    }
}

/// Normalize a path: must begin with `/`, no scheme/host, no fragment,
/// percent-encoding preserved, `..` segments resolved, no trailing slash
/// except for the root path itself.
pub fn normalize_path(raw: &str) -> Option<String> {
    let without_fragment = raw.split('#').next().unwrap_or("");
    if without_fragment.is_empty() {
        return None;
    }
    if !without_fragment.starts_with('/') {
        return None;
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in without_fragment.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Some("/".to_string());
    }
    Some(format!("/{}", segments.join("/")))
}
