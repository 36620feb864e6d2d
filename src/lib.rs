// Revenue Aggregator - Core Library
// Merges per-branch sales feeds into one revenue report with search and totals.
// Exposes all modules for use in the CLI, the terminal UI and the API server.

pub mod error;
pub mod feed;
pub mod interleave;
pub mod revenue;
pub mod aggregate;
pub mod search;
pub mod format;
pub mod config;
pub mod logging;

#[cfg(feature = "tui")]
pub mod ui;

#[cfg(feature = "server")]
pub mod server;

// Re-export commonly used types
pub use error::{ReportError, ReportResult};
pub use feed::{
    BranchFeed, LineItem, RawLineItem,
    load_feed, load_feeds, validate_feeds,
};
pub use interleave::interleave;
pub use revenue::{RevenueEntry, map_revenue, map_feed};
pub use aggregate::{
    AggregatedReport, ReportEntry,
    aggregate, build_report, build_report_from_feeds,
};
pub use search::filter_report;
pub use format::{
    ReportSummary, SummaryRow,
    format_revenue, render_table, total_revenue,
};
pub use config::{Config, MissingFeedPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load the configured feeds and build the report in one step
pub fn load_report(config: &Config) -> anyhow::Result<AggregatedReport> {
    let feeds = load_feeds(&config.feeds, config.missing_feed)?;
    let report = build_report_from_feeds(&feeds)?;
    tracing::info!(
        feeds = feeds.len(),
        products = report.len(),
        "revenue report built"
    );
    Ok(report)
}
