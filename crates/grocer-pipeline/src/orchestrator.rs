//! Scrape → parse → collect orchestration over the external processes.
//!
//! One scrape request walks
//! `InvokingScrape → AwaitingHtml → InvokingParse → AwaitingJson → Aggregating → Done`;
//! any warning along the way makes the run end in `Partial` instead.
//!
//! No cross-request lock exists. Two scrapes in flight share the HTML and
//! artifact directories and will see each other's files; run one at a time.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use grocer_core::{ArtifactPayload, ParseResult};
use grocer_store::{parsed_artifact_name, ArtifactRepository};
use serde::{Serialize, Serializer};

use crate::aggregate::Aggregator;
use crate::error::PipelineError;
use crate::outcome::Outcome;
use crate::process::{CommandOutput, CommandRunner, ExternalTools};
use crate::settle::{poll_until, wait_for_stable_listing, SettlePolicy};

/// Filesystem mtimes may be coarser than the clock; artifacts written within
/// this window before a run started still count as fresh.
const FRESHNESS_SLACK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeState {
    InvokingScrape,
    AwaitingHtml,
    InvokingParse,
    AwaitingJson,
    Aggregating,
    Done,
    Partial,
}

/// Data returned from a scrape run.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeData {
    /// The newest batch artifact, in the shape the parser wrote it.
    Batch {
        artifact: String,
        payload: ArtifactPayload,
    },
    /// No batch artifact existed; every per-file artifact in the store.
    Individual(Vec<ParseResult>),
    /// The scraper produced no HTML, so nothing was parsed.
    Empty,
}

impl ScrapeData {
    #[must_use]
    pub fn records(&self) -> &[ParseResult] {
        match self {
            ScrapeData::Batch { payload, .. } => payload.records(),
            ScrapeData::Individual(records) => records,
            ScrapeData::Empty => &[],
        }
    }

    /// Sites with at least one reported product.
    ///
    /// A site that legitimately found nothing is indistinguishable from one
    /// whose scrape failed.
    #[must_use]
    pub fn sites_scraped(&self) -> BTreeSet<String> {
        self.records()
            .iter()
            .filter(|r| r.reported_products())
            .map(|r| r.site_label().to_string())
            .collect()
    }
}

impl Serialize for ScrapeData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ScrapeData::Batch { payload, .. } => payload.serialize(serializer),
            ScrapeData::Individual(records) => records.serialize(serializer),
            ScrapeData::Empty => serializer.collect_seq(std::iter::empty::<&ParseResult>()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeReport {
    pub product: String,
    pub location: String,
    pub state: ScrapeState,
    pub html_files: usize,
    pub data: ScrapeData,
}

/// The artifact produced by a single-file parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArtifact {
    pub artifact: String,
    pub payload: ArtifactPayload,
}

struct ScrapeRun {
    state: ScrapeState,
    started: SystemTime,
    warnings: Vec<String>,
}

impl ScrapeRun {
    fn start() -> Self {
        tracing::debug!(state = ?ScrapeState::InvokingScrape, "scrape run started");
        Self {
            state: ScrapeState::InvokingScrape,
            started: SystemTime::now(),
            warnings: Vec::new(),
        }
    }

    fn advance(&mut self, next: ScrapeState) {
        tracing::debug!(from = ?self.state, to = ?next, "scrape run transition");
        self.state = next;
    }

    fn warn(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        tracing::warn!(state = ?self.state, %warning, "scrape run degraded");
        self.warnings.push(warning);
    }

    fn freshness_floor(&self) -> SystemTime {
        self.started
            .checked_sub(FRESHNESS_SLACK)
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }

    fn finish(
        mut self,
        product: &str,
        location: &str,
        html_files: usize,
        data: ScrapeData,
    ) -> Outcome<ScrapeReport> {
        let terminal = if self.warnings.is_empty() {
            ScrapeState::Done
        } else {
            ScrapeState::Partial
        };
        self.advance(terminal);
        tracing::info!(
            state = ?terminal,
            product,
            location,
            html_files,
            records = data.records().len(),
            warnings = self.warnings.len(),
            "scrape run finished"
        );
        Outcome::from_parts(
            ScrapeReport {
                product: product.to_string(),
                location: location.to_string(),
                state: terminal,
                html_files,
                data,
            },
            self.warnings,
        )
    }

    fn abort(mut self, reason: String) -> Outcome<ScrapeReport> {
        let at = self.state;
        self.advance(ScrapeState::Partial);
        tracing::error!(failed_at = ?at, %reason, "scrape run aborted");
        Outcome::Failure(reason)
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    runner: Arc<dyn CommandRunner>,
    tools: ExternalTools,
    aggregator: Aggregator,
    html_dir: PathBuf,
    settle: SettlePolicy,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        tools: ExternalTools,
        aggregator: Aggregator,
        html_dir: PathBuf,
        settle: SettlePolicy,
    ) -> Self {
        Self {
            runner,
            tools,
            aggregator,
            html_dir,
            settle,
        }
    }

    #[must_use]
    pub fn tools(&self) -> &ExternalTools {
        &self.tools
    }

    #[must_use]
    pub fn html_dir(&self) -> &Path {
        &self.html_dir
    }

    /// Launches the external scraper for one (product, location) pair.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Spawn`] if the process cannot be started.
    pub async fn run_scrape(
        &self,
        product: &str,
        location: &str,
    ) -> Result<CommandOutput, PipelineError> {
        let invocation = self.tools.scrape(product, location);
        tracing::info!(product, location, "invoking scraper");
        self.runner.run(&invocation).await
    }

    /// Launches the external parser over a single HTML file or a directory.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Spawn`] if the process cannot be started.
    pub async fn run_parse(&self, target: &Path) -> Result<CommandOutput, PipelineError> {
        let invocation = self.tools.parse(target);
        tracing::info!(target = %target.display(), "invoking parser");
        let output = self.runner.run(&invocation).await?;
        if !output.stdout.trim().is_empty() {
            tracing::debug!(stdout = %output.stdout.trim(), "parser output");
        }
        Ok(output)
    }

    /// Runs the full scrape pipeline on a best-effort basis.
    ///
    /// A failing scraper or parser exit is recorded as a warning and the run
    /// carries on with whatever artifacts exist. The returned data prefers
    /// the newest batch artifact and falls back to every per-file artifact,
    /// which may include output from earlier, unrelated runs. A batch older
    /// than the run is still returned, but the run ends `Partial`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if the artifact store cannot be listed.
    pub async fn scrape(
        &self,
        product: &str,
        location: &str,
    ) -> Result<Outcome<ScrapeReport>, PipelineError> {
        let mut run = ScrapeRun::start();

        let scraped = match self.run_scrape(product, location).await {
            Ok(output) => output,
            Err(e) => return Ok(run.abort(e.to_string())),
        };
        if !scraped.success {
            // The scraper drives every storefront in one process; some may have succeeded.
            run.warn(format!("Scraping had errors: {}", scraped.failure_detail()));
        }

        run.advance(ScrapeState::AwaitingHtml);
        let html_files = wait_for_stable_listing(&self.html_dir, "html", self.settle).await;
        if html_files.is_empty() {
            run.warn("Scraping completed but no HTML files found");
            return Ok(run.finish(product, location, 0, ScrapeData::Empty));
        }

        run.advance(ScrapeState::InvokingParse);
        match self.run_parse(&self.html_dir).await {
            Ok(parsed) if !parsed.success => {
                run.warn(format!("Parsing had errors: {}", parsed.failure_detail()));
            }
            Ok(_) => {}
            Err(e) => return Ok(run.abort(e.to_string())),
        }

        run.advance(ScrapeState::AwaitingJson);
        let floor = run.freshness_floor();
        let aggregator = &self.aggregator;
        let fresh_batch = poll_until(self.settle, "batch artifact", move || async move {
            aggregator
                .latest_batch()
                .await
                .ok()
                .flatten()
                .filter(|entry| entry.modified >= floor)
        })
        .await;
        if fresh_batch.is_none() {
            tracing::debug!("no batch artifact from this run; resolving from store as-is");
        }

        run.advance(ScrapeState::Aggregating);
        let data = self.collect_scrape_data(&mut run).await?;
        Ok(run.finish(product, location, html_files.len(), data))
    }

    async fn collect_scrape_data(&self, run: &mut ScrapeRun) -> Result<ScrapeData, PipelineError> {
        if let Some(entry) = self.aggregator.latest_batch().await? {
            match self.aggregator.read_batch(&entry).await {
                Ok(payload) => {
                    if entry.modified < run.freshness_floor() {
                        run.warn(format!("newest batch {} predates this run", entry.name));
                    }
                    return Ok(ScrapeData::Batch {
                        artifact: entry.name,
                        payload,
                    })
                }
                Err(e) => run.warn(format!(
                    "latest batch {} unreadable, using per-file artifacts: {e}",
                    entry.name
                )),
            }
        }

        let report = self.aggregator.load_all().await?;
        Ok(ScrapeData::Individual(report.results))
    }

    /// Parses one HTML file and returns the artifact the parser wrote for it.
    ///
    /// - exit 0 with a fresh artifact: `Success`
    /// - non-zero exit with an artifact present, or only a stale artifact: `PartialSuccess`
    /// - no artifact at all: `Failure`
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if the artifact store cannot be queried.
    pub async fn parse_file(
        &self,
        source: &Path,
    ) -> Result<Outcome<ParsedArtifact>, PipelineError> {
        let Some(artifact_name) = parsed_artifact_name(source) else {
            return Ok(Outcome::Failure(format!(
                "cannot derive an artifact name from {}",
                source.display()
            )));
        };

        let floor = SystemTime::now()
            .checked_sub(FRESHNESS_SLACK)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let output = match self.run_parse(source).await {
            Ok(output) => output,
            Err(e) => return Ok(Outcome::Failure(e.to_string())),
        };

        let repo: &dyn ArtifactRepository = self.aggregator.repository();
        let name = artifact_name.as_str();
        let fresh = if output.success {
            poll_until(self.settle, "parsed artifact", move || async move {
                repo.entry(name)
                    .await
                    .ok()
                    .flatten()
                    .filter(|entry| entry.modified >= floor)
            })
            .await
        } else {
            None
        };

        let entry = match fresh {
            Some(entry) => Some(entry),
            None => repo.entry(name).await?,
        };

        let Some(entry) = entry else {
            let reason = if output.success {
                "JSON file was not generated".to_string()
            } else {
                format!("Parsing failed: {}", output.failure_detail())
            };
            return Ok(Outcome::Failure(reason));
        };

        let payload = match repo.read(&entry).await {
            Ok(payload) => payload,
            Err(e) => {
                return Ok(Outcome::Failure(format!(
                    "parser wrote an unreadable artifact: {e}"
                )))
            }
        };

        let mut warnings = Vec::new();
        if !output.success {
            warnings.push(format!("Parsing failed: {}", output.failure_detail()));
        }
        if entry.modified < floor {
            warnings.push(format!("{} predates this parse run", entry.name));
        }

        Ok(Outcome::from_parts(
            ParsedArtifact {
                artifact: entry.name,
                payload,
            },
            warnings,
        ))
    }
}
