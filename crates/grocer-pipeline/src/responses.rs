//! Response payloads produced by [`crate::QueryService`].
//!
//! The HTTP routes and the CLI serialize these as-is, so field names are the
//! wire contract.

use std::collections::BTreeMap;

use grocer_core::{ArtifactPayload, Product};
use serde::Serialize;

use crate::aggregate::SiteGroup;
use crate::orchestrator::{ScrapeData, ScrapeState};

pub const MSG_SUCCESS: &str = "Success";
pub const MSG_NO_DATA: &str = "No parsed data found";
pub const MSG_PARSED: &str = "Successfully parsed HTML file";
pub const MSG_UPLOADED: &str = "Successfully uploaded and parsed HTML file";
pub const MSG_SCRAPED: &str = "Successfully scraped and parsed products";
pub const MSG_NO_HTML: &str = "Scraping completed but no HTML files found";

#[derive(Debug, Clone, Serialize)]
pub struct AllProductsResponse {
    pub message: String,
    pub sites: BTreeMap<String, SiteGroup>,
    pub all_products: Vec<Product>,
    pub total_products: usize,
    pub total_sites: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteProductsResponse {
    pub message: String,
    pub site: String,
    pub locations: BTreeMap<String, Vec<Product>>,
    pub products: Vec<Product>,
    pub total_products: usize,
    pub total_locations: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationProductsResponse {
    pub message: String,
    pub site: String,
    pub location: String,
    pub products: Vec<Product>,
    pub total_products: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseResponse {
    pub message: String,
    pub data: ArtifactPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub data: ArtifactPayload,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScrapeResponse {
    pub message: String,
    pub location: String,
    pub product: String,
    pub data: ScrapeData,
    /// Number of records returned, not the number of distinct sites.
    pub total_sites: usize,
    pub sites_scraped: Vec<String>,
    pub state: ScrapeState,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub outputs_directory: String,
    pub outputs_exists: bool,
    pub output_directory: String,
    pub output_exists: bool,
    pub required_files: BTreeMap<String, bool>,
    pub supported_sites: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub supported_sites: Vec<&'static str>,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}
