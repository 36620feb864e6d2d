// 🔍 Search Filter - case-insensitive substring match on product names

use crate::aggregate::AggregatedReport;

/// Entries whose name contains `query`, ignoring case. An empty query keeps
/// everything. The source report is never modified and the result keeps its
/// order.
///
/// Case folding is Unicode lowercasing of both sides.
pub fn filter_report(report: &AggregatedReport, query: &str) -> AggregatedReport {
    if query.is_empty() {
        return report.clone();
    }

    let needle = query.to_lowercase();
    report.retain_cloned(|entry| entry.name.to_lowercase().contains(&needle))
}
