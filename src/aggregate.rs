// 📊 Aggregator - revenue summed per product across all branches
//
// Pipeline: branch feeds → map revenue → interleave → sum by name → sort.
// Every build is an independent pure computation over its inputs; the
// running-sum map lives only for the duration of one call.

use crate::error::{ReportError, ReportResult};
use crate::feed::{validate_feeds, BranchFeed, LineItem};
use crate::interleave::interleave;
use crate::revenue::{map_feed, RevenueEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// REPORT TYPES
// ============================================================================

/// One product's total revenue across every branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub name: String,
    pub revenue: f64,
}

impl ReportEntry {
    pub fn new(name: impl Into<String>, revenue: f64) -> Self {
        ReportEntry {
            name: name.into(),
            revenue,
        }
    }
}

/// Name-deduplicated revenue summary, sorted ascending by name.
///
/// Filtering produces another AggregatedReport holding a subsequence of the
/// source entries in the same order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregatedReport {
    entries: Vec<ReportEntry>,
}

impl AggregatedReport {
    pub fn empty() -> Self {
        AggregatedReport::default()
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReportEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ReportEntry> {
        self.entries
            .binary_search_by(|entry| entry.name.as_str().cmp(name))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// Keep the entries matching `keep`, preserving order
    pub(crate) fn retain_cloned<F>(&self, mut keep: F) -> AggregatedReport
    where
        F: FnMut(&ReportEntry) -> bool,
    {
        AggregatedReport {
            entries: self.entries.iter().filter(|e| keep(e)).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AggregatedReport {
    type Item = &'a ReportEntry;
    type IntoIter = std::slice::Iter<'a, ReportEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Sum revenue per distinct name, then sort ascending by name.
///
/// Names compare case-sensitively by Unicode scalar value, so "B" sorts
/// before "a". Sums for one name accumulate in input order.
pub fn aggregate(entries: &[RevenueEntry]) -> AggregatedReport {
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for entry in entries {
        *totals.entry(entry.name.as_str()).or_insert(0.0) += entry.revenue;
    }

    let mut result: Vec<ReportEntry> = totals
        .into_iter()
        .map(|(name, revenue)| ReportEntry::new(name, revenue))
        .collect();

    result.sort_by(|a, b| a.name.cmp(&b.name));
    AggregatedReport { entries: result }
}

/// Interleave → map → aggregate over validated feeds.
///
/// Example:
/// ```
/// use revenue_aggregator::{build_report, LineItem};
///
/// let feeds = vec![
///     vec![LineItem::new("A", 10.0, 2)],
///     vec![LineItem::new("A", 5.0, 1)],
///     vec![LineItem::new("B", 3.0, 4)],
/// ];
///
/// let report = build_report(&feeds).unwrap();
/// assert_eq!(report.get("A").unwrap().revenue, 25.0);
/// assert_eq!(report.get("B").unwrap().revenue, 12.0);
/// ```
pub fn build_report(feeds: &[Vec<LineItem>]) -> ReportResult<AggregatedReport> {
    // Mapping is per item, so mapping each feed before interleaving gives the
    // same sequence while keeping the (branch, index) of a bad item.
    let mapped = feeds
        .iter()
        .enumerate()
        .map(|(branch, items)| map_feed(items, branch))
        .collect::<ReportResult<Vec<_>>>()?;

    let merged = interleave(&mapped);
    let report = aggregate(&merged);
    check_finite(&report)?;

    debug!(
        feeds = feeds.len(),
        records = merged.len(),
        products = report.len(),
        "built revenue report"
    );

    Ok(report)
}

/// Every per-product sum must be finite, and so must the sum of their
/// magnitudes, which bounds the total of any filtered subset.
fn check_finite(report: &AggregatedReport) -> ReportResult<()> {
    if let Some(entry) = report.iter().find(|e| !e.revenue.is_finite()) {
        return Err(ReportError::RevenueOverflow {
            scope: format!("product `{}`", entry.name),
        });
    }

    let magnitude: f64 = report.iter().map(|e| e.revenue.abs()).sum();
    if !magnitude.is_finite() {
        return Err(ReportError::RevenueOverflow {
            scope: "the report total".to_string(),
        });
    }

    Ok(())
}

/// Validate raw feeds and build the report; the first malformed record
/// rejects the whole build.
pub fn build_report_from_feeds(feeds: &[BranchFeed]) -> ReportResult<AggregatedReport> {
    let items = validate_feeds(feeds)?;
    build_report(&items)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::total_revenue;
    use proptest::prelude::*;
    use serde_json::json;

    fn sample_feeds() -> Vec<Vec<LineItem>> {
        vec![
            vec![LineItem::new("A", 10.0, 2)],
            vec![LineItem::new("A", 5.0, 1)],
            vec![LineItem::new("B", 3.0, 4)],
        ]
    }

    #[test]
    fn test_build_report_sample_scenario() {
        let report = build_report(&sample_feeds()).unwrap();

        assert_eq!(
            report.entries(),
            &[ReportEntry::new("A", 25.0), ReportEntry::new("B", 12.0)]
        );
    }

    #[test]
    fn test_aggregate_sorts_case_sensitively() {
        let entries = vec![
            RevenueEntry::new("banana", 1.0),
            RevenueEntry::new("Cherry", 2.0),
            RevenueEntry::new("apple", 3.0),
            RevenueEntry::new("Banana", 4.0),
        ];

        let report = aggregate(&entries);
        let names: Vec<&str> = report.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(names, vec!["Banana", "Cherry", "apple", "banana"]);
    }

    #[test]
    fn test_empty_feed_set_is_empty_report() {
        assert!(build_report(&[]).unwrap().is_empty());
        assert!(build_report(&[vec![], vec![]]).unwrap().is_empty());
        assert!(build_report_from_feeds(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_build_report_rejects_malformed_item() {
        let feeds = vec![
            vec![LineItem::new("A", 1.0, 1)],
            vec![LineItem::new("B", 2.0, 1), LineItem::new("C", f64::NAN, 1)],
        ];

        let err = build_report(&feeds).unwrap_err();
        assert!(matches!(
            err,
            ReportError::MalformedLineItem { branch: 1, index: 1, .. }
        ));
    }

    #[test]
    fn test_build_report_rejects_overflowing_product_sum() {
        let feeds = vec![vec![
            LineItem::new("A", 1e308, 1),
            LineItem::new("A", 1e308, 1),
            LineItem::new("B", -1e308, 1),
            LineItem::new("B", -1e308, 1),
        ]];

        let err = build_report(&feeds).unwrap_err();
        assert_eq!(
            err,
            ReportError::RevenueOverflow {
                scope: "product `A`".to_string()
            }
        );
    }

    #[test]
    fn test_build_report_rejects_overflowing_total() {
        let feeds = vec![
            vec![LineItem::new("A", 1e308, 1)],
            vec![LineItem::new("B", 1e308, 1)],
        ];

        let err = build_report(&feeds).unwrap_err();
        assert!(matches!(err, ReportError::RevenueOverflow { .. }));
    }

    #[test]
    fn test_large_but_finite_sums_are_kept() {
        let feeds = vec![vec![LineItem::new("A", 1e307, 5), LineItem::new("B", -1e307, 5)]];

        let report = build_report(&feeds).unwrap();
        assert!(total_revenue(&report).is_finite());
        assert!(report.get("A").unwrap().revenue > 4e307);
    }

    #[test]
    fn test_build_report_from_raw_feeds() {
        let good: BranchFeed = serde_json::from_value(json!({
            "products": [
                {"name": "A", "unitPrice": 10, "sold": 2},
                {"name": "B", "unitPrice": 3, "sold": 4}
            ]
        }))
        .unwrap();
        let bad: BranchFeed = serde_json::from_value(json!({
            "products": [{"name": "A", "unitPrice": "5", "sold": 1}]
        }))
        .unwrap();

        let report = build_report_from_feeds(&[good.clone()]).unwrap();
        assert_eq!(report.len(), 2);

        let err = build_report_from_feeds(&[good, bad]).unwrap_err();
        assert_eq!(err.field(), "unitPrice");
    }

    #[test]
    fn test_report_lookup_by_name() {
        let report = build_report(&sample_feeds()).unwrap();

        assert_eq!(report.get("B"), Some(&ReportEntry::new("B", 12.0)));
        assert_eq!(report.get("b"), None);
    }

    #[test]
    fn test_report_serializes_as_plain_list() {
        let report = build_report(&sample_feeds()).unwrap();
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(
            value,
            json!([{"name": "A", "revenue": 25.0}, {"name": "B", "revenue": 12.0}])
        );
    }

    fn line_item() -> impl Strategy<Value = LineItem> {
        ("[A-Ca-c]{1,2}", 0.0f64..1000.0, 0i64..100)
            .prop_map(|(name, price, sold)| LineItem::new(name, price, sold))
    }

    fn feed_set() -> impl Strategy<Value = Vec<Vec<LineItem>>> {
        prop::collection::vec(prop::collection::vec(line_item(), 0..12), 0..5)
    }

    proptest! {
        #[test]
        fn prop_names_distinct_and_sorted(feeds in feed_set()) {
            let report = build_report(&feeds).unwrap();
            for pair in report.entries().windows(2) {
                prop_assert!(pair[0].name < pair[1].name);
            }
        }

        #[test]
        fn prop_revenue_is_conserved(feeds in feed_set()) {
            let report = build_report(&feeds).unwrap();
            let expected: f64 = feeds
                .iter()
                .flatten()
                .map(|item| item.unit_price * item.sold as f64)
                .sum();
            let actual: f64 = report.iter().map(|e| e.revenue).sum();

            prop_assert!((expected - actual).abs() <= 1e-6 * expected.abs().max(1.0));
        }

        #[test]
        fn prop_build_is_idempotent(feeds in feed_set()) {
            prop_assert_eq!(build_report(&feeds).unwrap(), build_report(&feeds).unwrap());
        }
    }
}
