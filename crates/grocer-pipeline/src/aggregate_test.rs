use std::path::Path;

use grocer_store::FsArtifactStore;
use serde_json::json;

use super::*;

fn record(site: &str, location: &str, names: &[&str]) -> ParseResult {
    serde_json::from_value(json!({
        "site": site,
        "location": location,
        "products": names.iter().map(|n| json!({ "name": n })).collect::<Vec<_>>(),
        "totalProducts": names.len(),
        "filename": format!("{site}.html"),
    }))
    .expect("valid record")
}

fn write(dir: &Path, name: &str, body: &serde_json::Value) {
    std::fs::write(dir.join(name), body.to_string()).expect("write fixture");
}

fn aggregator(dir: &Path) -> Aggregator {
    Aggregator::new(Arc::new(FsArtifactStore::new(dir)))
}

// -----------------------------------------------------------------------
// group_by_site
// -----------------------------------------------------------------------

#[test]
fn group_by_site_totals_sum_across_artifacts() {
    let results = vec![
        record("dmart", "Mumbai", &["Rice", "Dal"]),
        record("zepto", "Pune", &["Milk"]),
        record("dmart", "Thane", &["Oil", "Salt", "Sugar"]),
    ];
    let groups = group_by_site(&results);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups["dmart"].total, 5);
    assert_eq!(groups["dmart"].products.len(), 5);
    assert_eq!(groups["zepto"].total, 1);
}

#[test]
fn group_by_site_keeps_first_seen_location() {
    let results = vec![
        record("dmart", "Mumbai", &["Rice"]),
        record("dmart", "Thane", &["Oil"]),
    ];
    let groups = group_by_site(&results);
    assert_eq!(groups["dmart"].location, "Mumbai");
}

#[test]
fn group_by_site_ignores_reported_total_mismatch() {
    let mut r = record("jiomart", "Delhi", &["Atta"]);
    r.total_products = 40;
    let groups = group_by_site(&[r]);
    assert_eq!(groups["jiomart"].total, 1);
}

#[test]
fn group_by_site_labels_missing_site_unknown() {
    let r: ParseResult =
        serde_json::from_value(json!({ "products": [{ "name": "Soap" }] })).unwrap();
    let groups = group_by_site(&[r]);
    assert_eq!(groups["unknown"].location, "Unknown");
    assert_eq!(groups["unknown"].total, 1);
}

#[test]
fn group_by_location_merges_products_per_location() {
    let results = vec![
        record("dmart", "Mumbai", &["Rice"]),
        record("dmart", "Mumbai", &["Dal"]),
        record("dmart", "Thane", &["Oil"]),
    ];
    let locations = group_by_location(&results);
    assert_eq!(locations.len(), 2);
    assert_eq!(locations["Mumbai"].len(), 2);
    assert_eq!(concat_products(&results).len(), 3);
}

// -----------------------------------------------------------------------
// filters
// -----------------------------------------------------------------------

#[test]
fn filter_by_site_is_case_insensitive_equality() {
    let results = vec![
        record("DMart", "Mumbai", &["Rice"]),
        record("dmart-express", "Mumbai", &["Dal"]),
        record("zepto", "Pune", &["Milk"]),
    ];
    let filtered = filter_by_site(results, Site::Dmart);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].site, "DMart");
}

#[test]
fn filter_by_site_and_location_matches_substring() {
    let results = vec![
        record("swiggy", "Mumbai - Andheri West", &["Bread"]),
        record("swiggy", "Bandra", &["Eggs"]),
        record("zepto", "Andheri East", &["Milk"]),
    ];
    let filtered = filter_by_site_and_location(results, Site::Swiggy, "andheri");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].location, "Mumbai - Andheri West");
}

#[test]
fn filter_by_site_and_location_empty_when_nothing_matches() {
    let results = vec![record("dmart", "Mumbai", &["Rice"])];
    assert!(filter_by_site_and_location(results, Site::Dmart, "pune").is_empty());
}

// -----------------------------------------------------------------------
// loading
// -----------------------------------------------------------------------

#[tokio::test]
async fn load_all_skips_corrupt_artifact() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "dmart-mumbai-parsed.json",
        &json!({ "site": "dmart", "location": "Mumbai", "products": [{ "name": "Rice" }, { "name": "Dal" }], "totalProducts": 2 }),
    );
    write(
        tmp.path(),
        "zepto-pune-parsed.json",
        &json!([{ "site": "zepto", "location": "Pune", "products": [{ "name": "Milk" }], "totalProducts": 1 }]),
    );
    std::fs::write(tmp.path().join("broken-parsed.json"), "{\"site\": ").unwrap();

    let report = aggregator(tmp.path()).load_all().await.expect("load");

    assert_eq!(report.results.len(), 2);
    assert_eq!(concat_products(&report.results).len(), 3);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].artifact, "broken-parsed.json");
}

#[tokio::test]
async fn load_all_excludes_batch_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "parsed-results-20240101.json",
        &json!([{ "site": "dmart", "products": [{ "name": "Rice" }] }]),
    );
    let report = aggregator(tmp.path()).load_all().await.expect("load");
    assert!(report.results.is_empty());
}

#[tokio::test]
async fn load_for_site_reads_each_artifact_once() {
    let tmp = tempfile::tempdir().unwrap();
    // Matches both the `dmart*` and `*dmart*` name patterns.
    write(
        tmp.path(),
        "dmart-dmart-parsed.json",
        &json!({ "site": "dmart", "location": "Mumbai", "products": [{ "name": "Rice" }], "totalProducts": 1 }),
    );
    write(
        tmp.path(),
        "zepto-pune-parsed.json",
        &json!({ "site": "zepto", "location": "Pune", "products": [{ "name": "Milk" }], "totalProducts": 1 }),
    );

    let report = aggregator(tmp.path())
        .load_for_site(Site::Dmart)
        .await
        .expect("load");
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].products.len(), 1);
}

#[tokio::test]
async fn latest_batch_none_when_store_has_only_per_file_artifacts() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "dmart-mumbai-parsed.json",
        &json!({ "site": "dmart", "products": [] }),
    );
    let latest = aggregator(tmp.path()).latest_batch().await.expect("index");
    assert!(latest.is_none());
}
