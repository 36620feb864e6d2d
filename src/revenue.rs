// 💵 Revenue Mapper - line item → (name, revenue)

use crate::error::{ReportError, ReportResult};
use crate::feed::LineItem;
use serde::{Deserialize, Serialize};

/// Revenue of one line item. Several entries may share a name until they are
/// aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueEntry {
    pub name: String,
    pub revenue: f64,
}

impl RevenueEntry {
    pub fn new(name: impl Into<String>, revenue: f64) -> Self {
        RevenueEntry {
            name: name.into(),
            revenue,
        }
    }
}

/// revenue = unitPrice × sold
///
/// Fails instead of producing NaN or infinite revenue. `branch` and `index`
/// locate the item for the error.
pub fn map_revenue(item: &LineItem, branch: usize, index: usize) -> ReportResult<RevenueEntry> {
    if !item.unit_price.is_finite() {
        return Err(ReportError::malformed(
            branch,
            index,
            "unitPrice",
            format!("is not a finite number ({})", item.unit_price),
        ));
    }

    let revenue = item.unit_price * item.sold as f64;
    if !revenue.is_finite() {
        return Err(ReportError::malformed(
            branch,
            index,
            "sold",
            format!("overflows revenue ({} × {})", item.unit_price, item.sold),
        ));
    }

    Ok(RevenueEntry::new(item.name.clone(), revenue))
}

/// Map a whole branch feed, stopping at the first malformed item
pub fn map_feed(items: &[LineItem], branch: usize) -> ReportResult<Vec<RevenueEntry>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| map_revenue(item, branch, index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_revenue_multiplies_price_by_quantity() {
        let entry = map_revenue(&LineItem::new("A", 10.0, 2), 0, 0).unwrap();
        assert_eq!(entry, RevenueEntry::new("A", 20.0));

        let zero = map_revenue(&LineItem::new("B", 3.5, 0), 0, 0).unwrap();
        assert_eq!(zero.revenue, 0.0);
    }

    #[test]
    fn test_map_revenue_allows_negative_inputs() {
        let entry = map_revenue(&LineItem::new("Return", 4.0, -3), 0, 0).unwrap();
        assert_eq!(entry.revenue, -12.0);
    }

    #[test]
    fn test_map_revenue_rejects_nan_price() {
        let err = map_revenue(&LineItem::new("A", f64::NAN, 1), 2, 5).unwrap_err();
        assert!(matches!(
            err,
            ReportError::MalformedLineItem { branch: 2, index: 5, field: "unitPrice", .. }
        ));
    }

    #[test]
    fn test_map_revenue_rejects_overflow() {
        let err = map_revenue(&LineItem::new("A", f64::MAX, 10), 0, 0).unwrap_err();
        assert_eq!(err.field(), "sold");
    }

    #[test]
    fn test_map_feed_stops_at_first_bad_item() {
        let items = vec![
            LineItem::new("A", 1.0, 1),
            LineItem::new("B", f64::INFINITY, 1),
            LineItem::new("C", f64::NAN, 1),
        ];

        let err = map_feed(&items, 1).unwrap_err();
        assert!(matches!(err, ReportError::MalformedLineItem { index: 1, .. }));
    }
}
