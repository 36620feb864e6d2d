// 🧾 Report Formatter - totals and revenue rendering
//
// Revenue renders with exactly two decimals, `,` thousands grouping and `.`
// as decimal separator. Rounding is half-to-even on the shortest decimal
// representation of the value, so 2.675 renders as "2.68" and 0.125 as "0.12".

use crate::aggregate::{AggregatedReport, ReportEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// TOTALS
// ============================================================================

/// Sum of revenue over whichever list is displayed. 0 for an empty list.
pub fn total_revenue(entries: &AggregatedReport) -> f64 {
    entries.iter().map(|entry| entry.revenue).sum()
}

// ============================================================================
// NUMBER FORMAT
// ============================================================================

/// Render `value` as e.g. "1,234,567.89".
///
/// A value that rounds to zero prints without a sign. NaN prints "NaN" and
/// infinities "∞" / "-∞".
pub fn format_revenue(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞" } else { "-∞" }.to_string();
    }

    // Display for f64 is the shortest round-trip form and never uses exponents
    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    // int digits followed by exactly two fraction digits
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    let rest = frac_part.as_bytes().get(2..).unwrap_or(&[]);
    if round_up_half_even(&digits, rest) {
        increment(&mut digits);
    }

    let split = digits.len() - 2;
    let is_zero = digits.iter().all(|&d| d == 0);

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(&digits[..split]));
    out.push('.');
    out.extend(digits[split..].iter().map(|d| char::from(b'0' + d)));
    out
}

/// Decide rounding from the discarded digits `rest` (ASCII)
fn round_up_half_even(kept: &[u8], rest: &[u8]) -> bool {
    match rest.first() {
        None => false,
        Some(&first) if first > b'5' => true,
        Some(&first) if first < b'5' => false,
        Some(_) => {
            let beyond_half = rest[1..].iter().any(|&b| b != b'0');
            let last_odd = kept.last().map(|d| d % 2 == 1).unwrap_or(false);
            beyond_half || last_odd
        }
    }
}

fn increment(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == 9 {
            *d = 0;
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, 1);
}

fn group_thousands(int_digits: &[u8]) -> String {
    let mut out = String::with_capacity(int_digits.len() + int_digits.len() / 3);
    for (i, d) in int_digits.iter().enumerate() {
        if i > 0 && (int_digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(char::from(b'0' + d));
    }
    out
}

// ============================================================================
// TABLE & SUMMARY
// ============================================================================

/// Plain-text table: Product / Revenue rows and a Total footer
pub fn render_table(entries: &AggregatedReport) -> String {
    let total = format_revenue(total_revenue(entries));
    let rows: Vec<(&str, String)> = entries
        .iter()
        .map(|e| (e.name.as_str(), format_revenue(e.revenue)))
        .collect();

    let name_width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .chain(["Product".len(), "Total".len()])
        .max()
        .unwrap_or(0);
    let revenue_width = rows
        .iter()
        .map(|(_, revenue)| revenue.chars().count())
        .chain(["Revenue".len(), total.chars().count()])
        .max()
        .unwrap_or(0);

    let rule = format!("{}  {}\n", "─".repeat(name_width), "─".repeat(revenue_width));
    let mut out = String::new();

    out.push_str(&format!(
        "{:<nw$}  {:>rw$}\n",
        "Product",
        "Revenue",
        nw = name_width,
        rw = revenue_width
    ));
    out.push_str(&rule);
    for (name, revenue) in &rows {
        out.push_str(&format!(
            "{:<nw$}  {:>rw$}\n",
            name,
            revenue,
            nw = name_width,
            rw = revenue_width
        ));
    }
    out.push_str(&rule);
    out.push_str(&format!(
        "{:<nw$}  {:>rw$}\n",
        "Total",
        total,
        nw = name_width,
        rw = revenue_width
    ));

    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub name: String,
    pub revenue: f64,
    pub formatted: String,
}

impl From<&ReportEntry> for SummaryRow {
    fn from(entry: &ReportEntry) -> Self {
        SummaryRow {
            name: entry.name.clone(),
            revenue: entry.revenue,
            formatted: format_revenue(entry.revenue),
        }
    }
}

/// Displayed list plus its formatted total, as served over JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub entries: Vec<SummaryRow>,
    pub total: f64,
    pub total_formatted: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportSummary {
    pub fn new(entries: &AggregatedReport, query: Option<&str>) -> Self {
        let total = total_revenue(entries);
        ReportSummary {
            query: query.filter(|q| !q.is_empty()).map(str::to_string),
            entries: entries.iter().map(SummaryRow::from).collect(),
            total,
            total_formatted: format_revenue(total),
            generated_at: Utc::now(),
        }
    }

    pub fn summary(&self) -> String {
        let count = self.entries.len();
        format!(
            "{} {}, total revenue {}",
            count,
            if count == 1 { "product" } else { "products" },
            self.total_formatted
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
