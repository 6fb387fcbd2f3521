//! C1 — Seed Resolver. Maps a caller-supplied name or URL to a canonical
//! `base_url` + display name, or fails fast (SPEC_FULL.md §4.1).

use async_trait::async_trait;
use url::Url;

use crate::error::TheodoreError;
use crate::types::{ResolvedSeed, SeedInput, SeedKind};

/// External collaborator that maps a bare company name to a URL
/// (SPEC_FULL.md §6 "Outbound: Name→URL lookup"). The core treats it as
/// opaque; a batch driver might back it with a search API or a directory.
#[async_trait]
pub trait NameLookup: Send + Sync {
    async fn lookup(&self, name: &str) -> Option<String>;
}

/// A [`NameLookup`] that never resolves anything, for callers that only
/// ever pass URL seeds.
pub struct NoNameLookup;

#[async_trait]
impl NameLookup for NoNameLookup {
    async fn lookup(&self, _name: &str) -> Option<String> {
        None
    }
}

pub struct SeedResolver<'a> {
    name_lookup: &'a dyn NameLookup,
}

impl<'a> SeedResolver<'a> {
    pub fn new(name_lookup: &'a dyn NameLookup) -> Self {
        Self { name_lookup }
    }

    pub async fn resolve(&self, seed: &SeedInput) -> Result<ResolvedSeed, TheodoreError> {
        match seed.kind {
            SeedKind::Url => {
                let base_url = normalize_base_url(&seed.raw)
                    .ok_or_else(|| TheodoreError::SeedResolutionFailed(seed.raw.clone()))?;
                let display_name = host_of(&base_url).unwrap_or_else(|| seed.raw.clone());
                Ok(ResolvedSeed {
                    base_url,
                    display_name,
                })
            }
            SeedKind::Name => {
                let resolved_url = self
                    .name_lookup
                    .lookup(&seed.raw)
                    .await
                    .ok_or_else(|| TheodoreError::SeedResolutionFailed(seed.raw.clone()))?;
                let base_url = normalize_base_url(&resolved_url)
                    .ok_or_else(|| TheodoreError::SeedResolutionFailed(seed.raw.clone()))?;
                Ok(ResolvedSeed {
                    base_url,
                    display_name: seed.raw.clone(),
                })
            }
        }
    }
}

/// Normalize to scheme + lowercased host, no path/query/fragment, no
/// trailing slash. Adds `https://` if no scheme was given.
fn normalize_base_url(raw: &str) -> Option<String> {
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let parsed = Url::parse(&with_scheme).ok()?;
    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return None;
    }
    let host = parsed.host_str()?.to_lowercase();
    if host.is_empty() {
        return None;
    }

    let mut base = format!("{scheme}://{host}");
    if let Some(port) = parsed.port() {
        base.push(':');
        base.push_str(&port.to_string());
    }
    Some(base)
}

fn host_of(base_url: &str) -> Option<String> {
    Url::parse(base_url).ok()?.host_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_seed(raw: &str) -> SeedInput {
        SeedInput {
            raw: raw.to_string(),
            kind: SeedKind::Url,
        }
    }

    #[tokio::test]
    async fn normalizes_bare_domain() {
        let lookup = NoNameLookup;
        let resolver = SeedResolver::new(&lookup);
        let resolved = resolver.resolve(&url_seed("cloudgeometry.com")).await.unwrap();
        assert_eq!(resolved.base_url, "https://cloudgeometry.com");
    }

    #[tokio::test]
    async fn strips_path_and_query() {
        let lookup = NoNameLookup;
        let resolver = SeedResolver::new(&lookup);
        let resolved = resolver
            .resolve(&url_seed("https://Example.com/about?x=1#frag"))
            .await
            .unwrap();
        assert_eq!(resolved.base_url, "https://example.com");
    }

    #[tokio::test]
    async fn idempotent_normalization() {
        let lookup = NoNameLookup;
        let resolver = SeedResolver::new(&lookup);
        let once = resolver.resolve(&url_seed("example.com")).await.unwrap();
        let twice = resolver.resolve(&url_seed(&once.base_url)).await.unwrap();
        assert_eq!(once.base_url, twice.base_url);
    }

    #[tokio::test]
    async fn name_seed_without_lookup_fails() {
        let lookup = NoNameLookup;
        let resolver = SeedResolver::new(&lookup);
        let seed = SeedInput {
            raw: "Cloud Geometry".to_string(),
            kind: SeedKind::Name,
        };
        let result = resolver.resolve(&seed).await;
        assert!(matches!(result, Err(TheodoreError::SeedResolutionFailed(_))));
    }

    struct StaticLookup(&'static str);

    #[async_trait]
    impl NameLookup for StaticLookup {
        async fn lookup(&self, _name: &str) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn name_seed_with_lookup_keeps_display_name() {
        let lookup = StaticLookup("https://www.cloudgeometry.com");
        let resolver = SeedResolver::new(&lookup);
        let seed = SeedInput {
            raw: "Cloud Geometry".to_string(),
            kind: SeedKind::Name,
        };
        let resolved = resolver.resolve(&seed).await.unwrap();
        assert_eq!(resolved.base_url, "https://www.cloudgeometry.com");
        assert_eq!(resolved.display_name, "Cloud Geometry");
    }
}
