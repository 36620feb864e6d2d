// 📦 Branch Feeds - per-branch product sales
//
// A feed arrives as JSON (`{ "products": [...] }`) or CSV (`name,unitPrice,sold`).
// Records are read leniently into RawLineItem and only become LineItem once
// every field has been checked, so a bad record is reported with its position
// instead of turning into NaN revenue further down.

use crate::config::MissingFeedPolicy;
use crate::error::{ReportError, ReportResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ============================================================================
// CORE TYPES
// ============================================================================

/// One product as reported by one branch. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub unit_price: f64,
    pub sold: i64,
}

impl LineItem {
    pub fn new(name: impl Into<String>, unit_price: f64, sold: i64) -> Self {
        LineItem {
            name: name.into(),
            unit_price,
            sold,
        }
    }
}

/// A record exactly as it came off the wire, before validation.
///
/// Deserializing never fails: a `products` element that is not an object is
/// kept as a raw item and rejected by `validate` with its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct RawLineItem {
    pub name: Option<Value>,
    pub unit_price: Option<Value>,
    pub sold: Option<Value>,
    /// The element itself, when it was not an object
    #[serde(skip)]
    pub not_a_record: Option<String>,
}

impl From<Value> for RawLineItem {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut record) => {
                // null counts as missing
                let mut take = |key: &str| record.remove(key).filter(|v| !v.is_null());
                RawLineItem {
                    name: take("name"),
                    unit_price: take("unitPrice"),
                    sold: take("sold"),
                    not_a_record: None,
                }
            }
            other => RawLineItem {
                not_a_record: Some(other.to_string()),
                ..RawLineItem::default()
            },
        }
    }
}

impl RawLineItem {
    /// Check every field and produce a LineItem.
    ///
    /// `branch` and `index` only locate the record in error messages.
    pub fn validate(&self, branch: usize, index: usize) -> ReportResult<LineItem> {
        if let Some(found) = &self.not_a_record {
            return Err(ReportError::malformed(
                branch,
                index,
                "record",
                format!("is not an object ({})", found),
            ));
        }

        let name = match &self.name {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(ReportError::malformed(
                    branch,
                    index,
                    "name",
                    format!("is not a string ({})", other),
                ))
            }
            None => return Err(ReportError::malformed(branch, index, "name", "is missing")),
        };

        let unit_price = match &self.unit_price {
            Some(Value::Number(n)) => match n.as_f64() {
                Some(price) if price.is_finite() => price,
                _ => {
                    return Err(ReportError::malformed(
                        branch,
                        index,
                        "unitPrice",
                        format!("is not a finite number ({})", n),
                    ))
                }
            },
            Some(other) => {
                return Err(ReportError::malformed(
                    branch,
                    index,
                    "unitPrice",
                    format!("is not a number ({})", other),
                ))
            }
            None => return Err(ReportError::malformed(branch, index, "unitPrice", "is missing")),
        };

        let sold = match &self.sold {
            Some(Value::Number(n)) => quantity_from_number(n).ok_or_else(|| {
                ReportError::malformed(branch, index, "sold", format!("is not an integer ({})", n))
            })?,
            Some(other) => {
                return Err(ReportError::malformed(
                    branch,
                    index,
                    "sold",
                    format!("is not a number ({})", other),
                ))
            }
            None => return Err(ReportError::malformed(branch, index, "sold", "is missing")),
        };

        Ok(LineItem {
            name,
            unit_price,
            sold,
        })
    }
}

/// Accepts `4` and `4.0`, rejects `4.5` and anything outside i64
fn quantity_from_number(n: &serde_json::Number) -> Option<i64> {
    if let Some(q) = n.as_i64() {
        return Some(q);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// One branch's feed: `{ "products": [...] }`
///
/// Any well-formed JSON deserializes; a document of the wrong shape is
/// remembered and reported by `line_items` as a malformed feed, never
/// confused with a feed that could not be read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct BranchFeed {
    pub products: Vec<RawLineItem>,
    #[serde(skip)]
    shape_error: Option<String>,
}

impl From<Value> for BranchFeed {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut feed) => match feed.remove("products") {
                Some(Value::Array(products)) => BranchFeed {
                    products: products.into_iter().map(RawLineItem::from).collect(),
                    shape_error: None,
                },
                Some(other) => BranchFeed::misshapen(format!("`products` is not a list ({})", other)),
                None => BranchFeed::misshapen("has no `products` list"),
            },
            other => BranchFeed::misshapen(format!("is not an object ({})", other)),
        }
    }
}

impl BranchFeed {
    pub fn empty() -> Self {
        BranchFeed::default()
    }

    pub fn new(products: Vec<RawLineItem>) -> Self {
        BranchFeed {
            products,
            shape_error: None,
        }
    }

    fn misshapen(reason: impl Into<String>) -> Self {
        BranchFeed {
            products: Vec::new(),
            shape_error: Some(reason.into()),
        }
    }

    /// Validate every record of this feed, stopping at the first bad one
    pub fn line_items(&self, branch: usize) -> ReportResult<Vec<LineItem>> {
        if let Some(reason) = &self.shape_error {
            return Err(ReportError::MalformedFeed {
                branch,
                reason: reason.clone(),
            });
        }

        self.products
            .iter()
            .enumerate()
            .map(|(index, raw)| raw.validate(branch, index))
            .collect()
    }
}

/// Validate a whole feed set, branch by branch
pub fn validate_feeds(feeds: &[BranchFeed]) -> ReportResult<Vec<Vec<LineItem>>> {
    feeds
        .iter()
        .enumerate()
        .map(|(branch, feed)| feed.line_items(branch))
        .collect()
}

// ============================================================================
// LOADING
// ============================================================================

/// CSV row with every column optional so that gaps surface during validation
#[derive(Debug, Deserialize)]
struct CsvLineItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "unitPrice")]
    unit_price: Option<String>,
    #[serde(default)]
    sold: Option<String>,
}

impl From<CsvLineItem> for RawLineItem {
    fn from(row: CsvLineItem) -> Self {
        RawLineItem {
            name: row.name.map(Value::String),
            unit_price: row.unit_price.map(|s| numeric_cell(&s)),
            sold: row.sold.map(|s| numeric_cell(&s)),
            not_a_record: None,
        }
    }
}

/// CSV cells are text; numbers become JSON numbers, anything else stays a
/// string and fails validation.
fn numeric_cell(cell: &str) -> Value {
    let trimmed = cell.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Load one feed file. `.csv` files are read as CSV, everything else as JSON.
pub fn load_feed(path: &Path) -> Result<BranchFeed> {
    let feed = if is_csv(path) {
        let mut rdr = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open CSV feed {}", path.display()))?;

        let mut products = Vec::new();
        for result in rdr.deserialize() {
            let row: CsvLineItem = result
                .with_context(|| format!("Failed to read CSV record in {}", path.display()))?;
            products.push(RawLineItem::from(row));
        }
        BranchFeed::new(products)
    } else {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON feed {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse JSON feed {}", path.display()))?
    };

    info!(path = %path.display(), records = feed.products.len(), "loaded branch feed");
    Ok(feed)
}

/// Load every feed in order. Under `MissingFeedPolicy::Skip` a feed that
/// cannot be read is replaced by an explicit empty feed.
pub fn load_feeds(paths: &[PathBuf], policy: MissingFeedPolicy) -> Result<Vec<BranchFeed>> {
    let mut feeds = Vec::with_capacity(paths.len());

    for path in paths {
        match load_feed(path) {
            Ok(feed) => feeds.push(feed),
            Err(e) if policy == MissingFeedPolicy::Skip => {
                let reason = format!("{:#}", e);
                warn!(path = %path.display(), error = %reason, "feed unavailable, using empty feed");
                feeds.push(BranchFeed::empty());
            }
            Err(e) => return Err(e),
        }
    }

    Ok(feeds)
}

// ============================================================================
// TESTS
// ============================================================================
