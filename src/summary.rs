use serde_json::Value;

use crate::fmt::Currency;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CardValue {
    Currency(f64),
    Count(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryCard {
    pub key: &'static str,
    pub label: &'static str,
    pub value: CardValue,
}

impl SummaryCard {
    pub fn display(&self, currency: &Currency) -> String {
        match self.value {
            CardValue::Currency(v) => currency.format(v),
            CardValue::Count(v) if v.fract() == 0.0 => format!("{v:.0}"),
            CardValue::Count(v) => v.to_string(),
        }
    }
}

enum Source {
    Currency,
    Count,
    ArrayLength,
}

/// Well-known aggregate fields, in card order.
const SUMMARY_FIELDS: &[(&str, &str, Source)] = &[
    ("total_sales", "Total Sales", Source::Currency),
    ("num_bills", "Number of Bills", Source::Count),
    ("average_bill_value", "Average Bill Value", Source::Currency),
    ("products", "Total Items", Source::ArrayLength),
    ("categories", "Categories", Source::ArrayLength),
];

/// Highlight cards for whichever well-known fields the payload carries.
/// Absent or mistyped fields produce no card.
pub fn extract_summary(payload: &Value) -> Vec<SummaryCard> {
    SUMMARY_FIELDS
        .iter()
        .filter_map(|(key, label, source)| {
            let field = payload.get(*key)?;
            let value = match source {
                Source::Currency => CardValue::Currency(field.as_f64()?),
                Source::Count => CardValue::Count(field.as_f64()?),
                Source::ArrayLength => CardValue::Count(field.as_array()?.len() as f64),
            };
            Some(SummaryCard {
                key: *key,
                label: *label,
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cards_follow_fixed_order() {
        let payload = json!({
            "categories": [{}, {}],
            "num_bills": 40,
            "total_sales": 12000
        });
        let keys: Vec<_> = extract_summary(&payload).iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["total_sales", "num_bills", "categories"]);
    }

    #[test]
    fn test_absent_fields_produce_no_cards() {
        assert!(extract_summary(&json!({ "staff": [] })).is_empty());
        assert!(extract_summary(&json!({ "total_sales": null })).is_empty());
    }

    #[test]
    fn test_array_length_card() {
        let cards = extract_summary(&json!({ "products": [{"sku": "A"}, {"sku": "B"}, {"sku": "C"}] }));
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].label, "Total Items");
        assert_eq!(cards[0].display(&Currency::default()), "3");
    }

    #[test]
    fn test_display() {
        let inr = Currency::default();
        let cards = extract_summary(&json!({ "total_sales": 125000.5, "average_bill_value": 312.5 }));
        assert_eq!(cards[0].display(&inr), "₹1,25,000.50");
        assert_eq!(cards[1].display(&inr), "₹312.50");
    }
}
