use serde_json::Value;

use crate::fmt::{self, Currency};
use crate::normalize::NormalizedTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Currency,
    Percentage,
    Plain,
}

pub const PERCENT_KEYWORDS: &[&str] = &[
    "percent",
    "percentage",
    "rate",
    "contribution_percent",
    "achievement_percent",
];

pub const CURRENCY_KEYWORDS: &[&str] = &[
    "value", "price", "sales", "revenue", "margin", "profit", "discount", "amount", "cost",
    "total", "subtotal",
];

/// What the sample value must look like for a rule to apply.
#[derive(Debug, Clone, Copy)]
enum Sample {
    Numeric,
    NumericOrAbsent,
}

struct Rule {
    keywords: &'static [&'static str],
    sample: Sample,
    kind: ColumnKind,
}

// Evaluated top-down; the first match wins, so percentage shadows currency.
const RULES: &[Rule] = &[
    Rule {
        keywords: PERCENT_KEYWORDS,
        sample: Sample::NumericOrAbsent,
        kind: ColumnKind::Percentage,
    },
    Rule {
        keywords: CURRENCY_KEYWORDS,
        sample: Sample::Numeric,
        kind: ColumnKind::Currency,
    },
];

impl Rule {
    fn matches(&self, lowered_name: &str, sample: &Value) -> bool {
        let sample_ok = match self.sample {
            Sample::Numeric => sample.is_number(),
            Sample::NumericOrAbsent => sample.is_number() || sample.is_null(),
        };
        sample_ok && self.keywords.iter().any(|k| lowered_name.contains(k))
    }
}

pub fn classify(column: &str, sample: &Value) -> ColumnKind {
    let lowered = column.to_lowercase();
    RULES
        .iter()
        .find(|r| r.matches(&lowered, sample))
        .map_or(ColumnKind::Plain, |r| r.kind)
}

/// Classify every column of a table from its first non-null value.
pub fn classify_table(table: &NormalizedTable) -> Vec<ColumnKind> {
    table
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| classify(name, table.sample(i)))
        .collect()
}

/// Render one cell. Non-numeric values in numeric columns fall back to
/// their plain form.
pub fn format_value(kind: ColumnKind, value: &Value, currency: &Currency) -> String {
    match (kind, value.as_f64()) {
        (ColumnKind::Percentage, Some(n)) => fmt::percent(n),
        (ColumnKind::Currency, Some(n)) => currency.format(n),
        _ => fmt::plain(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_percentage_beats_currency_keyword() {
        assert_eq!(classify("discount_percentage", &json!(12.5)), ColumnKind::Percentage);
        assert_eq!(classify("profit_margin_percent", &json!(3)), ColumnKind::Percentage);
        assert_eq!(classify("conversion_rate", &json!(0.4)), ColumnKind::Percentage);
    }

    #[test]
    fn test_currency_needs_numeric_sample() {
        assert_eq!(classify("total_amount", &json!(1234.5)), ColumnKind::Currency);
        assert_eq!(classify("total_amount", &json!("1234.5")), ColumnKind::Plain);
        assert_eq!(classify("Selling_Price", &json!(10)), ColumnKind::Currency);
    }

    #[test]
    fn test_plain_columns() {
        assert_eq!(classify("sku", &json!("A1")), ColumnKind::Plain);
        assert_eq!(classify("quantity_sold", &json!(4)), ColumnKind::Plain);
        assert_eq!(classify("discount_percentage", &json!("n/a")), ColumnKind::Plain);
    }

    #[test]
    fn test_all_null_percent_column_stays_percentage() {
        assert_eq!(classify("achievement_percent", &Value::Null), ColumnKind::Percentage);
        assert_eq!(classify("total_sales", &Value::Null), ColumnKind::Plain);
    }

    #[test]
    fn test_format_value() {
        let inr = Currency::default();
        assert_eq!(format_value(ColumnKind::Currency, &json!(1234.5), &inr), "₹1,234.50");
        assert_eq!(format_value(ColumnKind::Percentage, &json!(12.5), &inr), "12.50%");
        assert_eq!(format_value(ColumnKind::Currency, &Value::Null, &inr), "-");
        assert_eq!(format_value(ColumnKind::Percentage, &json!("x"), &inr), "x");
        assert_eq!(format_value(ColumnKind::Plain, &json!(7), &inr), "7");
    }

    #[test]
    fn test_classify_table_uses_first_non_null() {
        let t = NormalizedTable {
            container: "products".into(),
            columns: vec!["sku".into(), "total_sales".into(), "margin_percent".into()],
            rows: vec![
                vec![json!("A1"), Value::Null, json!(10.0)],
                vec![json!("B2"), json!(500), json!(12.0)],
            ],
        };
        assert_eq!(
            classify_table(&t),
            vec![ColumnKind::Plain, ColumnKind::Currency, ColumnKind::Percentage]
        );
    }
}
