//! Artifact record shapes written by the external HTML parser.
//!
//! The parser emits camelCase keys (`totalProducts`, `discountAmount`,
//! `isOutOfStock`). Readers are lenient: missing or `null` record-level
//! fields fall back to empty defaults, and keys this crate does not model are carried through
//! untouched so responses echo exactly what the parser wrote.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One product listing as normalized by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mrp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Percentage off MRP, when the storefront shows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_out_of_stock: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The parse of one source HTML page: a site, the delivery location the page
/// was scraped for, and its product list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub site: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub products: Vec<Product>,
    /// Count reported by the parser. Not guaranteed to equal `products.len()`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_products: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filename: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ParseResult {
    /// Site name used for grouping; records without one group under `unknown`.
    #[must_use]
    pub fn site_label(&self) -> &str {
        if self.site.is_empty() {
            "unknown"
        } else {
            &self.site
        }
    }

    /// Location used for grouping; records without one group under `Unknown`.
    #[must_use]
    pub fn location_label(&self) -> &str {
        if self.location.is_empty() {
            "Unknown"
        } else {
            &self.location
        }
    }

    /// `true` when the parser reported at least one product for this page.
    ///
    /// Uses the reported `totalProducts`, not the list length, since that is
    /// what downstream consumers of the scrape summary have always keyed on.
    #[must_use]
    pub fn reported_products(&self) -> bool {
        self.total_products > 0
    }
}

/// Contents of one artifact file: a single record, or a list of records from
/// a batch parse over a directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactPayload {
    Batch(Vec<ParseResult>),
    Single(ParseResult),
}

impl ArtifactPayload {
    /// Uniform view over both shapes.
    #[must_use]
    pub fn records(&self) -> &[ParseResult] {
        match self {
            ArtifactPayload::Batch(records) => records,
            ArtifactPayload::Single(record) => std::slice::from_ref(record),
        }
    }

    #[must_use]
    pub fn into_records(self) -> Vec<ParseResult> {
        match self {
            ArtifactPayload::Batch(records) => records,
            ArtifactPayload::Single(record) => vec![record],
        }
    }

    /// Number of records, counting a single-object artifact as one.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records().len()
    }
}

/// Treats an explicit `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_absent_optionals_stay_absent() {
        let raw = r#"{"name":"Toor Dal 1kg","price":149.0}"#;
        let product: Product = serde_json::from_str(raw).unwrap();
        assert_eq!(product.price, Some(149.0));
        assert!(product.mrp.is_none());
        assert!(!product.is_out_of_stock);

        let back = serde_json::to_value(&product).unwrap();
        assert!(back.get("mrp").is_none_or(Value::is_null));
        assert!(back.get("discountAmount").is_none_or(Value::is_null));
        assert_eq!(back["price"], 149.0);
        assert_eq!(back["isOutOfStock"], false);
    }

    #[test]
    fn product_round_trip_keeps_every_field() {
        let raw = serde_json::json!({
            "name": "Amul Butter 500g",
            "mrp": 285.0,
            "price": 270.0,
            "discount": 5.26,
            "discountAmount": 15.0,
            "isOutOfStock": true,
            "imageUrl": "https://cdn.example.in/butter.png"
        });
        let product: Product = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(product.discount_amount, Some(15.0));
        assert!(product.is_out_of_stock);
        assert_eq!(serde_json::to_value(&product).unwrap(), raw);
    }

    #[test]
    fn product_requires_name() {
        let err = serde_json::from_str::<Product>(r#"{"price": 10}"#);
        assert!(err.is_err());
    }

    #[test]
    fn parse_result_tolerates_missing_fields() {
        let record: ParseResult = serde_json::from_str(r#"{"products": []}"#).unwrap();
        assert_eq!(record.site_label(), "unknown");
        assert_eq!(record.location_label(), "Unknown");
        assert_eq!(record.total_products, 0);
        assert!(!record.reported_products());
    }

    #[test]
    fn payload_accepts_object_and_list() {
        let single: ArtifactPayload = serde_json::from_value(serde_json::json!({
            "site": "dmart",
            "location": "Mumbai",
            "products": [{ "name": "Rice" }],
            "totalProducts": 1,
            "filename": "dmart.html"
        }))
        .unwrap();
        assert!(matches!(single, ArtifactPayload::Single(_)));
        assert_eq!(single.record_count(), 1);

        let batch: ArtifactPayload = serde_json::from_value(serde_json::json!([
            { "site": "dmart", "products": [] },
            { "site": "zepto", "products": [{ "name": "Milk" }], "totalProducts": 1 }
        ]))
        .unwrap();
        assert!(matches!(batch, ArtifactPayload::Batch(_)));
        let sites: Vec<_> = batch.records().iter().map(|r| r.site.as_str()).collect();
        assert_eq!(sites, ["dmart", "zepto"]);
    }

    #[test]
    fn payload_serializes_in_the_shape_it_was_read() {
        let raw = serde_json::json!([{
            "site": "zepto",
            "location": "Pune",
            "products": [],
            "totalProducts": 0,
            "filename": "zepto-pune.html"
        }]);
        let payload: ArtifactPayload = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&payload).unwrap(), raw);
    }

    #[test]
    fn reported_products_uses_total_not_list_length() {
        let record: ParseResult =
            serde_json::from_str(r#"{"site":"jiomart","products":[],"totalProducts":4}"#).unwrap();
        assert!(record.reported_products());
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let raw = serde_json::json!({
            "site": "dmart",
            "location": null,
            "products": [
                { "name": "Rice", "price": 60.0 },
                { "name": "Dal", "price": null, "isOutOfStock": null },
                { "name": "Oil", "isOutOfStock": true }
            ],
            "totalProducts": 3,
            "filename": null
        });
        let payload: ArtifactPayload = serde_json::from_value(raw).unwrap();
        let record = &payload.records()[0];
        assert_eq!(record.products.len(), 3);
        assert_eq!(record.location_label(), "Unknown");
        assert!(record.filename.is_empty());
        assert!(record.products[1].price.is_none());
        assert!(!record.products[1].is_out_of_stock);
        assert!(record.products[2].is_out_of_stock);
    }

    #[test]
    fn null_products_list_reads_as_empty() {
        let record: ParseResult =
            serde_json::from_str(r#"{"site":"zepto","products":null,"totalProducts":null}"#)
                .unwrap();
        assert!(record.products.is_empty());
        assert_eq!(record.total_products, 0);
    }
}
