use crate::amount::{contains_currency_symbol, parse_amount};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A category name paired with its summed amount, as handed to charts and tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount: f64,
}

/// Category name → summed amount. Names are unique; repeated names add up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    entries: BTreeMap<String, f64>,
}

impl CategoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, category: impl Into<String>, amount: f64) {
        *self.entries.entry(category.into()).or_insert(0.0) += amount;
    }

    /// Fold every entry of `other` into this table.
    pub fn merge(&mut self, other: &CategoryTable) {
        for (category, amount) in &other.entries {
            self.add(category.clone(), *amount);
        }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.entries.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, amount)| (name.as_str(), *amount))
    }

    /// Entries ordered smallest amount first; equal amounts fall back to name order.
    pub fn sorted_ascending(&self) -> Vec<CategoryAmount> {
        let mut rows: Vec<CategoryAmount> = self
            .entries
            .iter()
            .map(|(category, amount)| CategoryAmount {
                category: category.clone(),
                amount: *amount,
            })
            .collect();
        rows.sort_by(|a, b| {
            a.amount
                .total_cmp(&b.amount)
                .then_with(|| a.category.cmp(&b.category))
        });
        rows
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for CategoryTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut table = CategoryTable::new();
        for (category, amount) in iter {
            table.add(category, amount);
        }
        table
    }
}

/// Body of the section introduced by `marker`: everything after its first
/// occurrence up to the next blank line.
pub fn section_after<'a>(text: &'a str, marker: &str) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    Some(rest.split("\n\n").next().unwrap_or(rest))
}

/// Split a `- Label: $12.00` line into its label and amount text.
/// Lines without a `:` or a currency symbol are not entries.
fn split_entry_line(line: &str) -> Option<(&str, &str)> {
    if !line.contains(':') || !contains_currency_symbol(line) {
        return None;
    }
    let (label, value) = line.split_once(':')?;
    let label = label
        .trim_start_matches(|c: char| matches!(c, '-' | '*' | '•') || c.is_whitespace())
        .trim_end_matches('*')
        .trim();
    Some((label, value))
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

/// Pull `Category: <symbol><amount>` pairs out of the section that follows `marker`.
///
/// A missing marker yields an empty table. Entries with an empty name or an
/// amount of exactly zero are dropped, and repeated names within the section
/// are summed.
pub fn extract_categories(text: &str, marker: &str) -> CategoryTable {
    let text = normalize_newlines(text);
    let mut table = CategoryTable::new();

    let Some(section) = section_after(&text, marker) else {
        warn!("Section marker '{}' not found in response", marker.trim());
        return table;
    };

    for line in section.lines() {
        let Some((category, value)) = split_entry_line(line) else {
            continue;
        };
        if category.is_empty() {
            debug!("Skipping entry without a category name: {:?}", line);
            continue;
        }

        let amount = parse_amount(value);
        // A literal zero is indistinguishable from an unparsable amount here.
        if amount == 0.0 {
            debug!("Dropping zero-amount entry '{}' ({:?})", category, value.trim());
            continue;
        }

        table.add(category, amount);
    }

    table
}

/// Totals reported in a statement's summary section. Zero values are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementTotals {
    pub total_debits: Option<f64>,
    pub total_credits: Option<f64>,
    pub net_change: Option<f64>,
}

impl StatementTotals {
    pub fn is_empty(&self) -> bool {
        self.total_debits.is_none() && self.total_credits.is_none() && self.net_change.is_none()
    }
}

pub fn extract_totals(text: &str, marker: &str) -> StatementTotals {
    let text = normalize_newlines(text);
    let mut totals = StatementTotals::default();

    let Some(section) = section_after(&text, marker) else {
        return totals;
    };

    for line in section.lines() {
        let Some((label, value)) = split_entry_line(line) else {
            continue;
        };
        let amount = Some(parse_amount(value));
        match label.to_ascii_lowercase().as_str() {
            "total debits" => totals.total_debits = amount,
            "total credits" => totals.total_credits = amount,
            "net change" => totals.net_change = amount,
            other => debug!("Ignoring unknown totals line '{}'", other),
        }
    }

    totals
}

/// Text following `marker` on the same line, e.g. the statement period.
pub fn extract_line_value(text: &str, marker: &str) -> Option<String> {
    let start = text.find(marker)? + marker.len();
    let value = text[start..].lines().next().unwrap_or("").trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = "STATEMENT PERIOD: March 2024\n\
        DEBITS BY CATEGORY:\n\
        - Groceries: $120.50\n\
        - Groceries: $30.00\n\
        - Utilities: $89.99\n\
        \n\
        CREDITS BY CATEGORY:\n\
        - Salary: $3,200.00\n\
        \n\
        TOTAL SUMMARY:\n\
        Total Debits: $240.49\n\
        Total Credits: $3,200.00\n\
        Net Change: $0.00\n";

    #[test]
    fn test_same_section_duplicates_sum() {
        let table = extract_categories(RESPONSE, "DEBITS BY CATEGORY:");
        assert_eq!(table.len(), 2);
        assert!((table.get("Groceries").unwrap() - 150.50).abs() < 1e-9);
        assert!((table.get("Utilities").unwrap() - 89.99).abs() < 1e-9);
    }

    #[test]
    fn test_section_stops_at_blank_line() {
        let table = extract_categories(RESPONSE, "CREDITS BY CATEGORY:");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Salary"), Some(3200.0));
        assert_eq!(table.get("Total Debits"), None);
    }

    #[test]
    fn test_missing_marker_returns_empty_table() {
        let table = extract_categories("Nothing structured here.", "DEBITS BY CATEGORY:");
        assert!(table.is_empty());
    }

    #[test]
    fn test_lines_without_symbol_or_separator_are_ignored() {
        let text = "DEBITS BY CATEGORY:\n\
            Here is what I found:\n\
            - Rent 1000\n\
            - Travel: 250 USD\n\
            * **Dining**: €42.10\n\
            - : $5.00\n\
            - Fees: $0.00\n";
        let table = extract_categories(text, "DEBITS BY CATEGORY:");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Dining"), Some(42.10));
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "DEBITS BY CATEGORY:\r\n- Rent: £900\r\n\r\nCREDITS BY CATEGORY:\r\n- Refund: £20\r\n";
        let table = extract_categories(text, "DEBITS BY CATEGORY:");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("Rent"), Some(900.0));
    }

    #[test]
    fn test_merge_and_sort() {
        let mut first: CategoryTable = [("Rent", 1000.0), ("Coffee", 12.0)].into_iter().collect();
        let second: CategoryTable = [("Rent", 1000.0), ("Books", 40.0)].into_iter().collect();
        first.merge(&second);

        assert_eq!(first.get("Rent"), Some(2000.0));
        let sorted = first.sorted_ascending();
        let names: Vec<&str> = sorted.iter().map(|row| row.category.as_str()).collect();
        assert_eq!(names, vec!["Coffee", "Books", "Rent"]);
        assert_eq!(first.total(), 2052.0);
    }

    #[test]
    fn test_totals_and_period() {
        let totals = extract_totals(RESPONSE, "TOTAL SUMMARY:");
        assert_eq!(totals.total_debits, Some(240.49));
        assert_eq!(totals.total_credits, Some(3200.0));
        assert_eq!(totals.net_change, Some(0.0));

        assert_eq!(
            extract_line_value(RESPONSE, "STATEMENT PERIOD:"),
            Some("March 2024".to_string())
        );
        assert_eq!(extract_line_value("no period", "STATEMENT PERIOD:"), None);
    }
}
