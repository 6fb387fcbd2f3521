use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::FieldRecord;

/// What a caller handed the core: either a bare name or something URL-shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedKind {
    Url,
    Name,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedInput {
    pub raw: String,
    pub kind: SeedKind,
}

impl SeedInput {
    /// Classify `raw` the way the Seed Resolver expects: a scheme, or a dot
    /// with no whitespace, reads as a URL; everything else is a bare name.
    pub fn infer(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let looks_like_url =
            raw.contains("://") || (raw.contains('.') && !raw.chars().any(char::is_whitespace));
        let kind = if looks_like_url {
            SeedKind::Url
        } else {
            SeedKind::Name
        };
        Self { raw, kind }
    }
}

/// Source label C2 attaches to every discovered path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathSource {
    Robots,
    Sitemap,
    Navigation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedSeed {
    pub base_url: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSet {
    pub paths: Vec<String>,
    pub sources: HashMap<String, PathSource>,
    pub discovery_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionResult {
    pub selected: Vec<String>,
    pub rationale: HashMap<String, String>,
    pub rejected_count: usize,
    pub prompt_text: String,
    pub model_id: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub cost_usd: f64,
    pub selection_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    /// Readable-content extraction (the spec's "trafilatura" role).
    Readable,
    StructuralFallback,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    pub ok: bool,
    pub extractor: ExtractorKind,
    pub http_status: u16,
    pub title: Option<String>,
    pub text: String,
    pub byte_count: usize,
    pub fetch_seconds: f64,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub pages: Vec<PageResult>,
    pub aggregated_text: String,
    pub total_text_bytes: usize,
    pub extraction_seconds: f64,
    pub success_count: usize,
    pub fallback_count: usize,
    pub failure_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistillationResult {
    pub fields: FieldRecord,
    pub prompt_text: String,
    pub model_id: String,
    pub tokens_in: u32,
    pub tokens_out: u32,
    pub cost_usd: f64,
    pub distillation_seconds: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Totals {
    pub seconds: f64,
    pub cost_usd: f64,
    pub tokens: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyIntelligence {
    pub seed: ResolvedSeed,
    pub path_set: PathSet,
    pub selection: SelectionResult,
    pub crawl: CrawlResult,
    pub distillation: DistillationResult,
    pub totals: Totals,
    pub timestamp: DateTime<Utc>,
}

/// Which phase an invocation had reached when it was cancelled or failed,
/// for user-visible diagnostics (§7 "User-visible failure").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    SeedResolution,
    Discovery,
    Selection,
    Extraction,
    Distillation,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::SeedResolution => "seed_resolution",
            Phase::Discovery => "discovery",
            Phase::Selection => "selection",
            Phase::Extraction => "extraction",
            Phase::Distillation => "distillation",
        };
        write!(f, "{s}")
    }
}

/// Per-invocation overrides on top of [`crate::config::Config`]'s process-wide
/// defaults (§6 "Options").
#[derive(Debug, Clone)]
pub struct Options {
    pub concurrency: usize,
    pub max_content_per_page: usize,
    pub selector_timeout_seconds: u64,
    pub distiller_timeout_seconds: u64,
    pub page_fetch_timeout_seconds: u64,
    pub discovery_timeout_seconds: u64,
    pub min_selection_confidence: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            concurrency: 10,
            max_content_per_page: 15_000,
            selector_timeout_seconds: 120,
            distiller_timeout_seconds: 120,
            page_fetch_timeout_seconds: 30,
            discovery_timeout_seconds: 10,
            min_selection_confidence: 0.6,
        }
    }
}

impl Options {
    /// Clamp `concurrency` into the documented valid range (1..=32).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 32);
        self
    }
}

/// A progress event surfaced to an optional caller-supplied observer.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: Phase,
    pub kind: ProgressEventKind,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEventKind {
    Started,
    Completed,
    Failed,
}
