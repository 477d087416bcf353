//! Subcommand handlers. Each prints the same JSON payload the matching HTTP
//! route returns.

use grocer_pipeline::QueryService;
use serde::Serialize;

/// Print products for every site, one site, or one site and location.
///
/// # Errors
///
/// Returns an error for an unsupported site or an unreadable artifact store.
pub(crate) async fn run_products(
    service: &QueryService,
    site: Option<&str>,
    location: Option<&str>,
) -> anyhow::Result<()> {
    match (site, location) {
        (Some(site), Some(location)) => {
            print_json(&service.products_by_site_and_location(site, location).await?)
        }
        (Some(site), None) => print_json(&service.products_by_site(site).await?),
        (None, _) => print_json(&service.all_products().await?),
    }
}

/// # Errors
///
/// Returns an error if the file is missing, not HTML, or the parser fails.
pub(crate) async fn run_parse(service: &QueryService, file: &str) -> anyhow::Result<()> {
    print_json(&service.parse_file(file).await?)
}

/// # Errors
///
/// Returns an error only if the external scraper cannot be launched or the
/// artifact store cannot be read. Partial scrapes print with warnings.
pub(crate) async fn run_scrape(
    service: &QueryService,
    product: &str,
    location: &str,
) -> anyhow::Result<()> {
    let response = service.scrape(product, location).await?;
    for warning in &response.warnings {
        tracing::warn!(%warning, "scrape warning");
    }
    print_json(&response)
}

pub(crate) async fn run_health(service: &QueryService) -> anyhow::Result<()> {
    print_json(&service.health().await)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
