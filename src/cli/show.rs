use colored::Colorize;
use comfy_table::{Cell, Table};
use serde_json::Value;

use reportdesk::catalog::{self, ReportDescriptor};
use reportdesk::classify::{classify, classify_table, format_value};
use reportdesk::error::{ReportError, Result};
use reportdesk::fmt::{self, Currency};
use reportdesk::invoker::{ReportInvoker, ReportSession, ViewState};
use reportdesk::normalize::{normalize, FallbackEntry, FallbackView, NormalizedTable, ReportShape};
use reportdesk::params::{self, Purpose};
use reportdesk::settings::effective_settings;
use reportdesk::summary::extract_summary;

use super::{api_client, ReportArgs};

pub const EMPTY_MESSAGE: &str = "No data available for the selected criteria";

pub fn run(args: &ReportArgs, columns: &[String], json: bool) -> Result<()> {
    let descriptor = catalog::require(&args.id)?;
    let range = args.range()?;
    let settings = effective_settings();
    let client = api_client(&settings)?;
    let params = params::build(descriptor, &range, Purpose::Preview, &args.overrides());

    let mut session = ReportSession::new();
    match ReportInvoker::new(&client).run(&mut session, descriptor, &params) {
        ViewState::Loaded { payload, .. } => {
            if json {
                println!("{}", serde_json::to_string_pretty(payload)?);
            } else {
                print!(
                    "{}",
                    render_report(descriptor, payload, columns, &settings.currency())
                );
            }
            Ok(())
        }
        ViewState::Failed { message, .. } => Err(ReportError::Other(message.clone())),
        ViewState::Idle | ViewState::Loading { .. } => {
            Err(ReportError::Other(incomplete_message(descriptor)))
        }
    }
}

fn incomplete_message(descriptor: &ReportDescriptor) -> String {
    format!("Report '{}' did not complete", descriptor.id)
}

/// Full terminal rendering: title, period, summary cards, then the body.
pub fn render_report(
    descriptor: &ReportDescriptor,
    payload: &Value,
    columns: &[String],
    currency: &Currency,
) -> String {
    let mut out = format!("{}\n{}\n\n", descriptor.name.bold(), period_line(payload));

    let cards = extract_summary(payload);
    if !cards.is_empty() {
        let mut table = Table::new();
        table.set_header(cards.iter().map(|c| Cell::new(c.label)).collect::<Vec<_>>());
        table.add_row(cards.iter().map(|c| Cell::new(c.display(currency))).collect::<Vec<_>>());
        out.push_str(&format!("{table}\n\n"));
    }

    match normalize(payload) {
        ReportShape::Table(t) => {
            let t = if columns.is_empty() { t } else { t.select(columns) };
            out.push_str(&format!("{}\n{} rows\n", format_table(&t, currency), t.rows.len()));
        }
        ReportShape::Fallback(view) => out.push_str(&format_fallback(&view, currency)),
        ReportShape::Empty => out.push_str(&format!("{EMPTY_MESSAGE}\n")),
    }
    out
}

/// `"<start> to <end>"` when the payload echoes its range, else `Current Data`.
pub fn period_line(payload: &Value) -> String {
    let date = |key: &str| {
        payload
            .get(key)
            .and_then(Value::as_str)
            .map(|s| s.split('T').next().unwrap_or(s).to_string())
    };
    match (date("start_date"), date("end_date")) {
        (Some(start), Some(end)) => format!("{start} to {end}"),
        _ => "Current Data".to_string(),
    }
}

fn format_table(table: &NormalizedTable, currency: &Currency) -> Table {
    let kinds = classify_table(table);
    let mut out = Table::new();
    out.set_header(
        table
            .columns
            .iter()
            .map(|c| Cell::new(fmt::label(c)))
            .collect::<Vec<_>>(),
    );
    for row in &table.rows {
        out.add_row(
            row.iter()
                .zip(&kinds)
                .map(|(v, kind)| Cell::new(format_value(*kind, v, currency)))
                .collect::<Vec<_>>(),
        );
    }
    out
}

fn format_fallback(view: &FallbackView, currency: &Currency) -> String {
    let mut fields = Table::new();
    let mut field_count = 0;
    let mut sections = String::new();
    for entry in &view.entries {
        match entry {
            FallbackEntry::Field { key, value } => {
                fields.add_row(vec![Cell::new(fmt::label(key)), Cell::new(scalar(key, value, currency))]);
                field_count += 1;
            }
            FallbackEntry::Section { key, fields: inner } => {
                let mut t = Table::new();
                for (k, v) in inner {
                    t.add_row(vec![Cell::new(fmt::label(k)), Cell::new(scalar(k, v, currency))]);
                }
                sections.push_str(&format!("{}\n{t}\n\n", fmt::label(key).bold()));
            }
        }
    }

    let mut out = String::new();
    if field_count > 0 {
        out.push_str(&format!("{fields}\n\n"));
    }
    out.push_str(&sections);
    out
}

// Nested objects inside a section are shown as compact JSON.
fn scalar(key: &str, value: &Value, currency: &Currency) -> String {
    match value {
        Value::Object(_) | Value::Array(_) => value.to_string(),
        _ => format_value(classify(key, value), value, currency),
    }
}
