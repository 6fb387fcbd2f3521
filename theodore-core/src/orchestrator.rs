//! Threads C1 through C5 into a single invocation, surfaces progress, and
//! computes the run totals (SPEC_FULL.md §4, §4.6 "Orchestrator").

use std::sync::Arc;
use std::time::{Duration, Instant};

use ai_client::ChatClient;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, Instrument};

use crate::config::Config;
use crate::distillation::FieldDistiller;
use crate::discovery::PathDiscoverer;
use crate::error::TheodoreError;
use crate::extraction::ParallelExtractor;
use crate::progress::{NoopObserver, ProgressObserver};
use crate::seed_resolver::{NameLookup, NoNameLookup, SeedResolver};
use crate::selection::PathSelector;
use crate::types::{CompanyIntelligence, Options, Phase, ProgressEvent, ProgressEventKind, SeedInput, Totals};

pub struct Orchestrator {
    config: Config,
    client: Arc<dyn ChatClient>,
    name_lookup: Box<dyn NameLookup>,
    observer: Box<dyn ProgressObserver>,
}

impl Orchestrator {
    /// Build with a caller-supplied chat client (tests and alternate
    /// providers pass their own; production code goes through
    /// [`Orchestrator::from_env`]).
    pub fn new(config: Config, client: Arc<dyn ChatClient>) -> Self {
        Self {
            config,
            client,
            name_lookup: Box::new(NoNameLookup),
            observer: Box::new(NoopObserver),
        }
    }

    /// Build from process environment, wiring an [`ai_client::OpenRouterClient`].
    pub fn from_env() -> Result<Self, crate::config::ConfigError> {
        let config = Config::from_env()?;
        let client: Arc<dyn ChatClient> = Arc::new(
            ai_client::OpenRouterClient::new(config.open_router_api_key.clone())
                .with_app_name("theodore"),
        );
        Ok(Self::new(config, client))
    }

    pub fn with_name_lookup(mut self, name_lookup: Box<dyn NameLookup>) -> Self {
        self.name_lookup = name_lookup;
        self
    }

    pub fn with_observer(mut self, observer: Box<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    fn emit(&self, phase: Phase, kind: ProgressEventKind, detail: impl Into<String>) {
        self.observer.on_event(ProgressEvent {
            phase,
            kind,
            detail: detail.into(),
        });
    }

    fn fail(&self, phase: Phase, error: TheodoreError) -> TheodoreError {
        self.emit(phase, ProgressEventKind::Failed, error.to_string());
        error
    }

    /// Race a phase's future against `cancel`, turning a firing token into
    /// `TheodoreError::Cancelled` at that phase (SPEC_FULL.md §5/§6:
    /// `Research(seed, opts, cancel)`). Either outcome is reported through
    /// `emit`/`fail` the same way a phase's own error is.
    async fn run_phase<T, Fut>(&self, phase: Phase, cancel: &CancellationToken, fut: Fut) -> Result<T, TheodoreError>
    where
        Fut: std::future::Future<Output = Result<T, TheodoreError>>,
    {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TheodoreError::Cancelled { reached_phase: phase }),
            result = fut => result,
        };
        result.map_err(|e| self.fail(phase, e))
    }

    pub async fn research(
        &self,
        seed: impl Into<String>,
        options: &Options,
        cancel: CancellationToken,
    ) -> Result<CompanyIntelligence, TheodoreError> {
        let run_started = Instant::now();
        let seed = SeedInput::infer(seed);

        self.emit(Phase::SeedResolution, ProgressEventKind::Started, "resolving seed");
        let resolver = SeedResolver::new(self.name_lookup.as_ref());
        let resolved = self
            .run_phase(
                Phase::SeedResolution,
                &cancel,
                resolver.resolve(&seed).instrument(info_span!("seed_resolution", raw = %seed.raw)),
            )
            .await?;
        self.emit(
            Phase::SeedResolution,
            ProgressEventKind::Completed,
            resolved.base_url.clone(),
        );

        self.emit(Phase::Discovery, ProgressEventKind::Started, "discovering paths");
        let discoverer = PathDiscoverer::new(Duration::from_secs(options.discovery_timeout_seconds));
        let path_set = self
            .run_phase(
                Phase::Discovery,
                &cancel,
                discoverer
                    .discover(&resolved.base_url)
                    .instrument(info_span!("discovery", base_url = %resolved.base_url)),
            )
            .await?;
        self.emit(
            Phase::Discovery,
            ProgressEventKind::Completed,
            format!("{} candidate paths", path_set.paths.len()),
        );

        self.emit(Phase::Selection, ProgressEventKind::Started, "selecting paths");
        let selector = PathSelector::new(
            Arc::clone(&self.client),
            self.config.model_id.clone(),
            Duration::from_secs(options.selector_timeout_seconds),
        );
        let selection = self
            .run_phase(
                Phase::Selection,
                &cancel,
                selector
                    .select(&resolved.display_name, &path_set.paths)
                    .instrument(info_span!("selection", base_url = %resolved.base_url)),
            )
            .await?;
        self.emit(
            Phase::Selection,
            ProgressEventKind::Completed,
            format!("{} paths selected", selection.selected.len()),
        );

        self.emit(Phase::Extraction, ProgressEventKind::Started, "extracting pages");
        let extractor = ParallelExtractor::new(
            Duration::from_secs(options.page_fetch_timeout_seconds),
            options.concurrency,
            options.max_content_per_page,
        );
        let crawl = self
            .run_phase(
                Phase::Extraction,
                &cancel,
                extractor
                    .extract(&resolved.base_url, &selection.selected)
                    .instrument(info_span!("extraction", base_url = %resolved.base_url)),
            )
            .await?;
        self.emit(
            Phase::Extraction,
            ProgressEventKind::Completed,
            format!(
                "{} succeeded, {} fallback, {} failed",
                crawl.success_count, crawl.fallback_count, crawl.failure_count
            ),
        );

        self.emit(Phase::Distillation, ProgressEventKind::Started, "distilling fields");
        let distiller = FieldDistiller::new(
            Arc::clone(&self.client),
            self.config.model_id.clone(),
            Duration::from_secs(options.distiller_timeout_seconds),
        );
        let mut distillation = self
            .run_phase(
                Phase::Distillation,
                &cancel,
                distiller
                    .distill(&resolved.display_name, &crawl.aggregated_text)
                    .instrument(info_span!("distillation", base_url = %resolved.base_url)),
            )
            .await?;
        self.emit(
            Phase::Distillation,
            ProgressEventKind::Completed,
            format!("{} fields filled", distillation.fields.len()),
        );

        let totals = Totals {
            seconds: run_started.elapsed().as_secs_f64(),
            cost_usd: selection.cost_usd + distillation.cost_usd,
            tokens: (selection.tokens_in + selection.tokens_out) as u64
                + (distillation.tokens_in + distillation.tokens_out) as u64,
        };

        let crawl_depth = selection
            .selected
            .iter()
            .map(|path| path.matches('/').count())
            .max()
            .unwrap_or(0);
        distillation.fields.set_operational_metadata(
            totals.tokens,
            totals.cost_usd,
            totals.seconds,
            crawl.success_count,
            crawl_depth,
        );

        info!(
            base_url = %resolved.base_url,
            seconds = totals.seconds,
            cost_usd = totals.cost_usd,
            tokens = totals.tokens,
            "research invocation complete"
        );

        Ok(CompanyIntelligence {
            seed: resolved,
            path_set,
            selection,
            crawl,
            distillation,
            totals,
            timestamp: Utc::now(),
        })
    }
}
