use serde_json::{Map, Value};

/// Top-level keys under which the report endpoints nest their row arrays,
/// in priority order. When several hold rows, the first listed wins.
pub const CONTAINER_KEYS: &[&str] = &[
    "products",
    "categories",
    "staff",
    "staff_report",
    "staff_incentives",
    "stock_report",
    "stock_analysis",
    "reorder_report",
    "high_value_stock",
    "margin_report",
    "brand_report",
    "payment_breakdown",
    "repeat_customers",
    "warranty_due_list",
    "customers",
    "items",
    "brands",
    "payment_modes",
    "receivables",
];

/// Date-range echoes; never rendered as data.
pub const METADATA_KEYS: &[&str] = &["start_date", "end_date", "date"];

static NULL: Value = Value::Null;

/// Uniform rows drawn from one container array. Each row holds one value
/// per column, `Null` where the record lacked the key.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub container: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl NormalizedTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// First non-null value in a column, or `Null` if there is none.
    pub fn sample(&self, col: usize) -> &Value {
        self.rows
            .iter()
            .filter_map(|r| r.get(col))
            .find(|v| !v.is_null())
            .unwrap_or(&NULL)
    }

    /// Restrict to `names`, in that order. Unknown names are skipped; if none
    /// match, the table is returned unchanged.
    pub fn select(&self, names: &[String]) -> NormalizedTable {
        let picks: Vec<usize> = names.iter().filter_map(|n| self.column_index(n)).collect();
        if picks.is_empty() {
            return self.clone();
        }
        NormalizedTable {
            container: self.container.clone(),
            columns: picks.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| picks.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FallbackEntry {
    /// A top-level scalar rendered as label / value.
    Field { key: String, value: Value },
    /// A nested object rendered as its own key / value sub-table.
    Section { key: String, fields: Vec<(String, Value)> },
}

impl FallbackEntry {
    pub fn key(&self) -> &str {
        match self {
            Self::Field { key, .. } | Self::Section { key, .. } => key,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackView {
    pub entries: Vec<FallbackEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportShape {
    Table(NormalizedTable),
    Fallback(FallbackView),
    Empty,
}

/// Reduce an arbitrary report payload to a table, a flat view, or empty.
pub fn normalize(payload: &Value) -> ReportShape {
    let Some(map) = payload.as_object() else {
        return ReportShape::Empty;
    };

    if let Some((key, records)) = find_container(map) {
        return ReportShape::Table(tabulate(key, records));
    }

    let entries = fallback_entries(map);
    if entries.is_empty() {
        ReportShape::Empty
    } else {
        ReportShape::Fallback(FallbackView { entries })
    }
}

/// The first container key holding a non-empty array decides. If its first
/// record is not an object with fields there is no table, even when a later
/// container would qualify.
fn find_container<'a>(map: &'a Map<String, Value>) -> Option<(&'static str, &'a [Value])> {
    let (key, records) = CONTAINER_KEYS.iter().find_map(|&key| {
        let records = map.get(key)?.as_array()?;
        (!records.is_empty()).then_some((key, records.as_slice()))
    })?;
    match records.first()?.as_object() {
        Some(first) if !first.is_empty() => Some((key, records)),
        _ => None,
    }
}

fn tabulate(container: &str, records: &[Value]) -> NormalizedTable {
    let columns: Vec<String> = records
        .first()
        .and_then(Value::as_object)
        .map(|first| first.keys().cloned().collect())
        .unwrap_or_default();

    let rows = records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|c| record.get(c).cloned().unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    NormalizedTable {
        container: container.to_string(),
        columns,
        rows,
    }
}

fn fallback_entries(map: &Map<String, Value>) -> Vec<FallbackEntry> {
    map.iter()
        .filter(|(key, _)| !METADATA_KEYS.contains(&key.as_str()))
        .filter_map(|(key, value)| match value {
            Value::Object(inner) => Some(FallbackEntry::Section {
                key: key.clone(),
                fields: inner.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            }),
            Value::Array(_) | Value::Null => None,
            scalar => Some(FallbackEntry::Field {
                key: key.clone(),
                value: scalar.clone(),
            }),
        })
        .collect()
}
