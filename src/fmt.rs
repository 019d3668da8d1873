use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rendered in place of null or missing values.
pub const PLACEHOLDER: &str = "-";

/// Thousands grouping style for currency amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grouping {
    /// 12,34,567.89 (lakh / crore)
    #[default]
    Indian,
    /// 1,234,567.89
    Western,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    pub symbol: String,
    pub grouping: Grouping,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            symbol: "₹".to_string(),
            grouping: Grouping::Indian,
        }
    }
}

impl Currency {
    pub fn new(symbol: impl Into<String>, grouping: Grouping) -> Self {
        Self {
            symbol: symbol.into(),
            grouping,
        }
    }

    /// Format a float as a currency amount with two decimals: ₹12,34,567.89
    pub fn format(&self, val: f64) -> String {
        let cents = format!("{:.2}", val.abs());
        let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
        let grouped = group_digits(int_part, self.grouping);
        let negative = val < 0.0 && cents != "0.00";

        if negative {
            format!("-{}{grouped}.{dec_part}", self.symbol)
        } else {
            format!("{}{grouped}.{dec_part}", self.symbol)
        }
    }
}

fn group_digits(digits: &str, grouping: Grouping) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, c) in digits.chars().rev().enumerate() {
        let boundary = match grouping {
            Grouping::Western => i > 0 && i % 3 == 0,
            Grouping::Indian => i == 3 || (i > 3 && (i - 3) % 2 == 0),
        };
        if boundary {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}

/// Two decimals and a trailing percent sign: 12.50%
pub fn percent(val: f64) -> String {
    format!("{val:.2}%")
}

/// `total_sales` -> `Total Sales`
pub fn label(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Natural string form of a JSON value; null renders as the placeholder.
pub fn plain(value: &Value) -> String {
    match value {
        Value::Null => PLACEHOLDER.to_string(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

pub fn file_size(bytes: usize) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_western_money_formatting() {
        let usd = Currency::new("$", Grouping::Western);
        assert_eq!(usd.format(1234.56), "$1,234.56");
        assert_eq!(usd.format(-500.00), "-$500.00");
        assert_eq!(usd.format(0.0), "$0.00");
        assert_eq!(usd.format(1000000.99), "$1,000,000.99");
        assert_eq!(usd.format(42.10), "$42.10");
    }

    #[test]
    fn test_indian_money_formatting() {
        let inr = Currency::default();
        assert_eq!(inr.format(1234.5), "₹1,234.50");
        assert_eq!(inr.format(1234567.0), "₹12,34,567.00");
        assert_eq!(inr.format(123456789.25), "₹12,34,56,789.25");
        assert_eq!(inr.format(999.0), "₹999.00");
        assert_eq!(inr.format(-100000.0), "-₹1,00,000.00");
    }

    #[test]
    fn test_tiny_negative_does_not_render_minus_zero() {
        assert_eq!(Currency::default().format(-0.001), "₹0.00");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(12.5), "12.50%");
        assert_eq!(percent(0.0), "0.00%");
        assert_eq!(percent(33.3333), "33.33%");
    }

    #[test]
    fn test_label() {
        assert_eq!(label("total_sales"), "Total Sales");
        assert_eq!(label("sku"), "Sku");
        assert_eq!(label("avg__bill"), "Avg Bill");
    }

    #[test]
    fn test_plain() {
        assert_eq!(plain(&Value::Null), "-");
        assert_eq!(plain(&json!("A1")), "A1");
        assert_eq!(plain(&json!(40)), "40");
        assert_eq!(plain(&json!(true)), "true");
        assert_eq!(plain(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_file_size() {
        assert_eq!(file_size(512), "512 B");
        assert_eq!(file_size(2048), "2.0 KB");
        assert_eq!(file_size(5 * 1024 * 1024), "5.0 MB");
    }
}
