//! Loading and merging of parse artifacts.
//!
//! Loading is tolerant: an unreadable or malformed artifact is logged and
//! reported in [`LoadReport::errors`], never allowed to abort the read of the
//! remaining files. Merging is strictly additive; products are concatenated
//! in artifact order and never deduplicated.

use std::collections::BTreeMap;
use std::sync::Arc;

use grocer_core::{ArtifactPayload, ParseResult, Product, Site};
use grocer_store::{ArtifactEntry, ArtifactRepository};
use serde::Serialize;

use crate::error::PipelineError;

/// Records loaded from a set of artifacts plus the artifacts that were skipped.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub results: Vec<ParseResult>,
    pub errors: Vec<SkippedArtifact>,
}

#[derive(Debug, Clone)]
pub struct SkippedArtifact {
    pub artifact: String,
    pub reason: String,
}

/// Per-site merge produced by [`group_by_site`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteGroup {
    /// Location of the first record seen for the site.
    pub location: String,
    pub products: Vec<Product>,
    pub total: usize,
}

#[derive(Clone)]
pub struct Aggregator {
    repo: Arc<dyn ArtifactRepository>,
}

impl Aggregator {
    #[must_use]
    pub fn new(repo: Arc<dyn ArtifactRepository>) -> Self {
        Self { repo }
    }

    #[must_use]
    pub fn repository(&self) -> &dyn ArtifactRepository {
        self.repo.as_ref()
    }

    /// Reads every per-file artifact in the store.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] only if the store itself cannot be
    /// listed; individual artifact failures land in [`LoadReport::errors`].
    pub async fn load_all(&self) -> Result<LoadReport, PipelineError> {
        let index = self.repo.index().await?;
        Ok(self.load_entries(index.per_file()).await)
    }

    /// Reads the per-file artifacts whose names associate them with `site`.
    ///
    /// Records inside those artifacts are not filtered here; pass the result
    /// through [`filter_by_site`].
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if the store cannot be listed.
    pub async fn load_for_site(&self, site: Site) -> Result<LoadReport, PipelineError> {
        let index = self.repo.index().await?;
        Ok(self.load_entries(index.candidates_for_site(site)).await)
    }

    /// Newest batch artifact, if any batch exists.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if the store cannot be listed.
    pub async fn latest_batch(&self) -> Result<Option<ArtifactEntry>, PipelineError> {
        let index = self.repo.index().await?;
        Ok(index.latest_batch().cloned())
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if the artifact cannot be read or decoded.
    pub async fn read_batch(
        &self,
        entry: &ArtifactEntry,
    ) -> Result<ArtifactPayload, PipelineError> {
        Ok(self.repo.read(entry).await?)
    }

    async fn load_entries<'a, I>(&self, entries: I) -> LoadReport
    where
        I: IntoIterator<Item = &'a ArtifactEntry>,
    {
        let mut report = LoadReport::default();
        for entry in entries {
            match self.repo.read(entry).await {
                Ok(payload) => report.results.extend(payload.into_records()),
                Err(e) => {
                    tracing::warn!(artifact = %entry.name, error = %e, "skipping unreadable artifact");
                    report.errors.push(SkippedArtifact {
                        artifact: entry.name.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        report
    }
}

/// Merges records per site in a single pass.
///
/// The first location seen for a site is kept as its representative while
/// products from every later record for that site keep accumulating.
#[must_use]
pub fn group_by_site(results: &[ParseResult]) -> BTreeMap<String, SiteGroup> {
    let mut sites: BTreeMap<String, SiteGroup> = BTreeMap::new();
    for result in results {
        let group = sites
            .entry(result.site_label().to_string())
            .or_insert_with(|| SiteGroup {
                location: result.location_label().to_string(),
                products: Vec::new(),
                total: 0,
            });
        group.products.extend(result.products.iter().cloned());
        group.total += result.products.len();
    }
    sites
}

/// Merges products per location, for a result set already scoped to one site.
#[must_use]
pub fn group_by_location(results: &[ParseResult]) -> BTreeMap<String, Vec<Product>> {
    let mut locations: BTreeMap<String, Vec<Product>> = BTreeMap::new();
    for result in results {
        locations
            .entry(result.location_label().to_string())
            .or_default()
            .extend(result.products.iter().cloned());
    }
    locations
}

/// Concatenation of every record's products, in record order.
#[must_use]
pub fn concat_products(results: &[ParseResult]) -> Vec<Product> {
    results
        .iter()
        .flat_map(|r| r.products.iter().cloned())
        .collect()
}

/// Keeps records whose `site` equals `site`, ignoring case.
#[must_use]
pub fn filter_by_site(results: Vec<ParseResult>, site: Site) -> Vec<ParseResult> {
    results.into_iter().filter(|r| site.matches(&r.site)).collect()
}

/// Keeps records for `site` whose location contains `location`, ignoring case.
///
/// Substring matching lets a typed area name ("andheri") find a scraped
/// address ("Mumbai - Andheri West").
#[must_use]
pub fn filter_by_site_and_location(
    results: Vec<ParseResult>,
    site: Site,
    location: &str,
) -> Vec<ParseResult> {
    let needle = location.to_lowercase();
    results
        .into_iter()
        .filter(|r| site.matches(&r.site) && r.location.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
