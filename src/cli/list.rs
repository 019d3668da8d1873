use colored::Colorize;
use comfy_table::{Cell, Table};

use reportdesk::catalog::{self, ReportDescriptor};
use reportdesk::error::{ReportError, Result};

pub fn run(category: Option<&str>) -> Result<()> {
    let categories: Vec<&str> = catalog::categories()
        .into_iter()
        .filter(|c| category.map_or(true, |want| c.eq_ignore_ascii_case(want)))
        .collect();
    if categories.is_empty() {
        return Err(ReportError::Other(format!(
            "Unknown category: {}",
            category.unwrap_or_default()
        )));
    }

    for name in categories {
        let reports: Vec<&ReportDescriptor> = catalog::list()
            .iter()
            .filter(|d| d.category == name)
            .collect();
        println!("{}\n{}\n", name.bold(), format_reports(&reports));
    }
    Ok(())
}

fn format_reports(reports: &[&ReportDescriptor]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Id", "Report", "Output", "Description"]);
    for d in reports {
        table.add_row(vec![
            Cell::new(d.id),
            Cell::new(d.name),
            Cell::new(outputs(d)),
            Cell::new(d.description),
        ]);
    }
    table
}

fn outputs(d: &ReportDescriptor) -> &'static str {
    match (d.has_preview, d.has_export) {
        (true, true) => "view, xlsx",
        (true, false) => "view",
        (false, true) => "xlsx",
        (false, false) => "-",
    }
}
