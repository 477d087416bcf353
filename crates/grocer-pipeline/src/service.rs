use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use grocer_core::{AppConfig, Site, SUPPORTED_SITES};
use grocer_store::{ArtifactRepository, FsArtifactStore};

use crate::aggregate::{
    concat_products, filter_by_site, filter_by_site_and_location, group_by_location, group_by_site,
    Aggregator,
};
use crate::error::{PipelineError, QueryError};
use crate::orchestrator::{Orchestrator, ParsedArtifact};
use crate::process::{CommandRunner, ExternalTools, TokioCommandRunner};
use crate::responses::{
    AllProductsResponse, HealthResponse, LocationProductsResponse, ParseResponse, ScrapeResponse,
    ServiceInfo, SiteProductsResponse, UploadResponse, MSG_NO_DATA, MSG_NO_HTML, MSG_PARSED,
    MSG_SCRAPED, MSG_SUCCESS, MSG_UPLOADED,
};
use crate::settle::SettlePolicy;

/// Directories and tool locations the pipeline operates on.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub artifacts_dir: PathBuf,
    pub html_dir: PathBuf,
    /// Where uploaded HTML files are written before parsing.
    pub upload_dir: PathBuf,
    pub tools: ExternalTools,
    pub settle: SettlePolicy,
}

impl PipelineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            artifacts_dir: config.artifacts_dir.clone(),
            html_dir: config.html_dir.clone(),
            upload_dir: config.artifacts_dir.clone(),
            tools: ExternalTools {
                program: config.node_bin.clone(),
                workdir: config.tools_dir.clone(),
                parser_script: config.parser_script.clone(),
                scraper_script: config.scraper_script.clone(),
                timeout: config.process_timeout_secs.map(Duration::from_secs),
            },
            settle: SettlePolicy::new(
                Duration::from_millis(config.settle_poll_interval_ms),
                config.settle_max_polls,
            ),
        }
    }
}

/// Read and orchestration operations exposed by the HTTP server and the CLI.
#[derive(Clone)]
pub struct QueryService {
    config: PipelineConfig,
    aggregator: Aggregator,
    orchestrator: Orchestrator,
}

impl QueryService {
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        repo: Arc<dyn ArtifactRepository>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        let aggregator = Aggregator::new(repo);
        let orchestrator = Orchestrator::new(
            runner,
            config.tools.clone(),
            aggregator.clone(),
            config.html_dir.clone(),
            config.settle,
        );
        Self {
            config,
            aggregator,
            orchestrator,
        }
    }

    /// Builds a service over the filesystem store and real external processes,
    /// creating the artifact directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Store`] if the artifact directory cannot be created.
    pub async fn from_app_config(app: &AppConfig) -> Result<Self, PipelineError> {
        let config = PipelineConfig::from_app_config(app);
        let store = FsArtifactStore::new(&config.artifacts_dir);
        store.ensure_root().await?;
        tracing::info!(
            artifacts_dir = %config.artifacts_dir.display(),
            html_dir = %config.html_dir.display(),
            tools_dir = %config.tools.workdir.display(),
            "query service ready"
        );
        Ok(Self::new(config, Arc::new(store), Arc::new(TokioCommandRunner)))
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Every product from every per-file artifact, grouped by site.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Internal`] if the artifact store cannot be listed.
    pub async fn all_products(&self) -> Result<AllProductsResponse, QueryError> {
        let report = self.aggregator.load_all().await?;
        let results = report.results;

        let message = if results.is_empty() {
            MSG_NO_DATA
        } else {
            MSG_SUCCESS
        };
        let sites = group_by_site(&results);
        let all_products = concat_products(&results);

        Ok(AllProductsResponse {
            message: message.to_string(),
            total_products: all_products.len(),
            total_sites: sites.len(),
            sites,
            all_products,
        })
    }

    /// Products for one supported site, grouped by location.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnsupportedSite`] for a site outside the closed
    /// set, or [`QueryError::Internal`] if the store cannot be listed.
    pub async fn products_by_site(&self, site: &str) -> Result<SiteProductsResponse, QueryError> {
        let site: Site = site.parse()?;
        let report = self.aggregator.load_for_site(site).await?;
        let results = filter_by_site(report.results, site);

        let message = if results.is_empty() {
            format!("No data found for site: {site}")
        } else {
            MSG_SUCCESS.to_string()
        };
        let locations = group_by_location(&results);
        let products = concat_products(&results);

        Ok(SiteProductsResponse {
            message,
            site: site.to_string(),
            total_products: products.len(),
            total_locations: locations.len(),
            locations,
            products,
        })
    }

    /// Products for one supported site whose location contains `location`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnsupportedSite`] for a site outside the closed
    /// set, or [`QueryError::Internal`] if the store cannot be listed.
    pub async fn products_by_site_and_location(
        &self,
        site: &str,
        location: &str,
    ) -> Result<LocationProductsResponse, QueryError> {
        let site: Site = site.parse()?;
        let location = location.to_lowercase();
        let report = self.aggregator.load_for_site(site).await?;
        let results = filter_by_site_and_location(report.results, site, &location);

        let message = if results.is_empty() {
            format!("No data found for site: {site}, location: {location}")
        } else {
            MSG_SUCCESS.to_string()
        };
        let products = concat_products(&results);

        Ok(LocationProductsResponse {
            message,
            site: site.to_string(),
            location,
            total_products: products.len(),
            products,
        })
    }

    /// Runs the parser on an existing HTML file and returns its artifact.
    ///
    /// # Errors
    ///
    /// - [`QueryError::FileNotFound`] if `file_path` does not exist
    /// - [`QueryError::InvalidFileType`] if it does not end in `.html`
    /// - [`QueryError::ParseFailed`] unless the parser cleanly produced a fresh artifact
    pub async fn parse_file(&self, file_path: &str) -> Result<ParseResponse, QueryError> {
        let path = Path::new(file_path);
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(QueryError::FileNotFound(file_path.to_string()));
        }
        if !has_html_extension(path) {
            return Err(QueryError::InvalidFileType);
        }

        let parsed = self.parse_strict(path).await?;
        Ok(ParseResponse {
            message: MSG_PARSED.to_string(),
            data: parsed.payload,
        })
    }

    /// Stores an uploaded HTML page in the upload directory and parses it.
    ///
    /// Only the final path component of `filename` is used, so an upload
    /// cannot be written outside the upload directory.
    ///
    /// # Errors
    ///
    /// - [`QueryError::InvalidFileType`] if `filename` does not end in `.html`; nothing is written
    /// - [`QueryError::Internal`] if the file cannot be written
    /// - [`QueryError::ParseFailed`] as for [`QueryService::parse_file`]
    pub async fn upload_and_parse(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<UploadResponse, QueryError> {
        if !filename.ends_with(".html") {
            return Err(QueryError::InvalidFileType);
        }
        let Some(stored_name) = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| has_html_extension(Path::new(n)))
        else {
            return Err(QueryError::InvalidFileType);
        };

        let upload_dir = &self.config.upload_dir;
        tokio::fs::create_dir_all(upload_dir)
            .await
            .map_err(|source| io_error(upload_dir, source))?;
        let target = upload_dir.join(stored_name);
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|source| io_error(&target, source))?;
        tracing::info!(file = %target.display(), bytes = bytes.len(), "stored uploaded page");

        let parsed = self.parse_strict(&target).await?;
        Ok(UploadResponse {
            message: MSG_UPLOADED.to_string(),
            filename: stored_name.to_string(),
            data: parsed.payload,
        })
    }

    /// Scrapes every storefront for `product` near `location`, parses the
    /// pages, and returns what the parser produced.
    ///
    /// Partial failures of the external processes are reported in
    /// [`ScrapeResponse::warnings`] rather than as errors.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Internal`] if a process cannot be launched or the
    /// store cannot be listed.
    pub async fn scrape(
        &self,
        product: &str,
        location: &str,
    ) -> Result<ScrapeResponse, QueryError> {
        let (report, warnings) = self
            .orchestrator
            .scrape(product, location)
            .await?
            .lenient()
            .map_err(QueryError::Internal)?;

        let message = if report.html_files == 0 {
            MSG_NO_HTML
        } else {
            MSG_SCRAPED
        };

        Ok(ScrapeResponse {
            message: message.to_string(),
            location: report.location,
            product: report.product,
            total_sites: report.data.records().len(),
            sites_scraped: report.data.sites_scraped().into_iter().collect(),
            state: report.state,
            data: report.data,
            warnings,
        })
    }

    /// Reports whether the directories and external entry points exist.
    pub async fn health(&self) -> HealthResponse {
        let tools = &self.config.tools;
        let mut required_files = BTreeMap::new();
        for (script, resolved) in [
            (&tools.parser_script, tools.parser_path()),
            (&tools.scraper_script, tools.scraper_path()),
        ] {
            required_files.insert(script.display().to_string(), exists(&resolved).await);
        }

        HealthResponse {
            status: "healthy",
            outputs_directory: self.config.artifacts_dir.display().to_string(),
            outputs_exists: exists(&self.config.artifacts_dir).await,
            output_directory: self.config.html_dir.display().to_string(),
            output_exists: exists(&self.config.html_dir).await,
            required_files,
            supported_sites: SUPPORTED_SITES.to_vec(),
        }
    }

    #[must_use]
    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            message: "E-commerce Product Parser API",
            version: env!("CARGO_PKG_VERSION"),
            supported_sites: SUPPORTED_SITES.to_vec(),
            endpoints: BTreeMap::from([
                ("GET /api/products", "Get all parsed products"),
                ("GET /api/products/{site}", "Get products by site"),
                (
                    "GET /api/products/{site}/{location}",
                    "Get products by site and location",
                ),
                ("POST /api/parse", "Parse HTML file and return JSON"),
                ("POST /api/scrape", "Scrape products from all sites"),
                ("POST /api/upload", "Upload and parse HTML file"),
                ("GET /api/health", "Health check endpoint"),
            ]),
        }
    }

    async fn parse_strict(&self, path: &Path) -> Result<ParsedArtifact, QueryError> {
        // The parser runs in the tools directory; hand it an absolute path.
        let absolute = tokio::fs::canonicalize(path)
            .await
            .map_err(|source| io_error(path, source))?;

        self.orchestrator
            .parse_file(&absolute)
            .await?
            .strict()
            .map_err(|reason| {
                tracing::warn!(file = %absolute.display(), %reason, "parse rejected");
                QueryError::ParseFailed(reason)
            })
    }
}

fn has_html_extension(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("html")
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

fn io_error(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Io {
        path: path.display().to_string(),
        source,
    }
}
