//! Aggregation and scrape orchestration over the artifact store.
//!
//! [`QueryService`] is the entry point used by the server and the CLI. It
//! composes the [`Aggregator`] (reads and merges artifacts) with the
//! [`Orchestrator`] (drives the external scraper and parser).

pub mod aggregate;
pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod process;
pub mod responses;
pub mod service;
pub mod settle;

pub use aggregate::{
    concat_products, filter_by_site, filter_by_site_and_location, group_by_location, group_by_site,
    Aggregator, LoadReport, SiteGroup, SkippedArtifact,
};
pub use error::{PipelineError, QueryError};
pub use orchestrator::{Orchestrator, ParsedArtifact, ScrapeData, ScrapeReport, ScrapeState};
pub use outcome::Outcome;
pub use process::{CommandOutput, CommandRunner, ExternalTools, Invocation, TokioCommandRunner};
pub use responses::{
    AllProductsResponse, HealthResponse, LocationProductsResponse, ParseResponse, ScrapeResponse,
    ServiceInfo, SiteProductsResponse, UploadResponse,
};
pub use service::{PipelineConfig, QueryService};
pub use settle::{poll_until, wait_for_stable_listing, SettlePolicy};
