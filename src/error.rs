// Error taxonomy for the report pipeline
//
// Only malformed input is an error. An empty feed set is a valid (empty)
// report, and transport failures belong to whoever loads the feeds.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    /// A line item is missing a field or carries a value that cannot be
    /// turned into revenue. Rejects the whole build.
    #[error("malformed line item at branch {branch}, position {index}: `{field}` {reason}")]
    MalformedLineItem {
        branch: usize,
        index: usize,
        field: &'static str,
        reason: String,
    },

    /// A feed is valid JSON but not shaped like `{ "products": [...] }`
    #[error("malformed feed at branch {branch}: {reason}")]
    MalformedFeed { branch: usize, reason: String },

    /// Summed revenue left the finite f64 range
    #[error("revenue for {scope} overflows")]
    RevenueOverflow { scope: String },
}

impl ReportError {
    pub fn malformed(branch: usize, index: usize, field: &'static str, reason: impl Into<String>) -> Self {
        ReportError::MalformedLineItem {
            branch,
            index,
            field,
            reason: reason.into(),
        }
    }

    /// Which field was rejected
    pub fn field(&self) -> &str {
        match self {
            ReportError::MalformedLineItem { field, .. } => field,
            ReportError::MalformedFeed { .. } => "products",
            ReportError::RevenueOverflow { .. } => "revenue",
        }
    }
}

pub type ReportResult<T> = std::result::Result<T, ReportError>;
