use crate::error::{ReportError, Result};
use crate::params::{DateRange, ParamMap};

/// How a report takes its date parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateHandling {
    /// Point-in-time snapshot; the backend rejects date parameters.
    None,
    /// `start_date` / `end_date` as full-day timestamps.
    Range,
    /// A single `date` equal to the range's end date.
    SingleDate,
}

pub type ExtraParams = fn(&DateRange) -> ParamMap;

#[derive(Clone, Copy)]
pub struct ReportDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub preview_endpoint: &'static str,
    pub has_preview: bool,
    pub has_export: bool,
    /// Defaults to `preview_endpoint + "/excel"`.
    pub export_endpoint: Option<&'static str>,
    pub preview_dates: DateHandling,
    pub export_dates: DateHandling,
    pub extra_params: Option<ExtraParams>,
}

impl ReportDescriptor {
    const fn ranged(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        category: &'static str,
        preview_endpoint: &'static str,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category,
            preview_endpoint,
            has_preview: true,
            has_export: true,
            export_endpoint: None,
            preview_dates: DateHandling::Range,
            export_dates: DateHandling::Range,
            extra_params: None,
        }
    }

    const fn point_in_time(mut self) -> Self {
        self.preview_dates = DateHandling::None;
        self.export_dates = DateHandling::None;
        self
    }

    const fn single_date_export(mut self) -> Self {
        self.export_dates = DateHandling::SingleDate;
        self
    }

    const fn with_extra(mut self, extra: ExtraParams) -> Self {
        self.extra_params = Some(extra);
        self
    }

    const fn download_only(mut self) -> Self {
        self.has_preview = false;
        self
    }

    pub fn export_endpoint(&self) -> String {
        match self.export_endpoint {
            Some(endpoint) => endpoint.to_string(),
            None => format!("{}/excel", self.preview_endpoint),
        }
    }
}

impl std::fmt::Debug for ReportDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportDescriptor")
            .field("id", &self.id)
            .field("preview_endpoint", &self.preview_endpoint)
            .field("preview_dates", &self.preview_dates)
            .field("export_dates", &self.export_dates)
            .finish_non_exhaustive()
    }
}

fn thirty_days_ahead(_: &DateRange) -> ParamMap {
    ParamMap::new().with("days_ahead", 30)
}

const SALES: &str = "Sales Analytics";
const STAFF: &str = "Staff Performance";
const INVENTORY: &str = "Inventory Analytics";
const PROFIT: &str = "Profitability Analysis";
const CUSTOMERS: &str = "Customer Analytics";
const FINANCE: &str = "Financial Reports";
const DATA_EXPORTS: &str = "Data Exports";

static CATALOG: &[ReportDescriptor] = &[
    // Sales
    ReportDescriptor::ranged(
        "product-wise",
        "Product-wise Sales Report",
        "Sales by product with quantities, revenue, margins, and discounts",
        SALES,
        "/reports/sales/product-wise",
    ),
    ReportDescriptor::ranged(
        "category-wise",
        "Category-wise Sales Analysis",
        "Revenue and profit by product category with contribution percentages",
        SALES,
        "/reports/sales/category-wise",
    ),
    ReportDescriptor::ranged(
        "daily-summary",
        "Daily Sales Summary",
        "Day's sales compared to the previous day and week, with payment mode breakdown",
        SALES,
        "/reports/sales/daily-summary",
    )
    .single_date_export(),
    // Staff
    ReportDescriptor::ranged(
        "staff-sales",
        "Staff Sales Performance",
        "Bills generated, sales value, and units sold per staff member",
        STAFF,
        "/reports/staff/sales-report",
    ),
    ReportDescriptor::ranged(
        "staff-incentive",
        "Staff Incentive Report",
        "Incentives from targets achieved and pending payments",
        STAFF,
        "/reports/staff/incentive-report",
    ),
    ReportDescriptor::ranged(
        "staff-attendance",
        "Attendance & Sales Correlation",
        "Staff attendance linked with sales performance",
        STAFF,
        "/reports/staff/attendance-sales-correlation",
    ),
    // Inventory
    ReportDescriptor::ranged(
        "live-stock",
        "Live Stock Report",
        "Current stock levels across all products with last sold dates",
        INVENTORY,
        "/reports/inventory/live-stock",
    )
    .point_in_time(),
    ReportDescriptor::ranged(
        "stock-movement",
        "Stock Movement Analysis",
        "Fast vs slow moving items with stock ageing classification",
        INVENTORY,
        "/reports/inventory/movement-analysis",
    ),
    ReportDescriptor::ranged(
        "reorder-level",
        "Reorder Level Alert",
        "Products below minimum stock with suggested reorder quantities and costs",
        INVENTORY,
        "/reports/inventory/reorder-level",
    ),
    ReportDescriptor::ranged(
        "high-value-stock",
        "High Value Stock Report",
        "High-value inventory with low movement",
        INVENTORY,
        "/reports/inventory/high-value-stock",
    ),
    // Profitability
    ReportDescriptor::ranged(
        "item-margin",
        "Item-wise Margin Report",
        "Cost vs selling price with net margins and margin percentages",
        PROFIT,
        "/reports/profitability/item-wise-margin",
    ),
    ReportDescriptor::ranged(
        "brand-profitability",
        "Brand-wise Profitability",
        "Revenue and profit by brand with margin analysis",
        PROFIT,
        "/reports/profitability/brand-wise",
    ),
    ReportDescriptor::ranged(
        "discount-impact",
        "Discount Impact Analysis",
        "Total discount given and resulting profit erosion",
        PROFIT,
        "/reports/profitability/discount-impact",
    ),
    // Customers
    ReportDescriptor::ranged(
        "repeat-customers",
        "Repeat Customer Analysis",
        "Customers with multiple visits, lifetime value, and preferred products",
        CUSTOMERS,
        "/reports/customers/repeat-customers",
    )
    .point_in_time(),
    ReportDescriptor::ranged(
        "warranty-due",
        "Warranty Expiry Alert",
        "Products with warranties expiring soon, for follow-up",
        CUSTOMERS,
        "/reports/customers/warranty-due",
    )
    .with_extra(thirty_days_ahead),
    // Finance
    ReportDescriptor::ranged(
        "payment-mode",
        "Payment Mode Breakdown",
        "Transaction count and amount by payment method",
        FINANCE,
        "/reports/finance/payment-mode-report",
    ),
    ReportDescriptor::ranged(
        "outstanding",
        "Outstanding Receivables",
        "Pending payments with customer details and ageing",
        FINANCE,
        "/reports/finance/outstanding-receivables",
    )
    .point_in_time(),
    // Spreadsheet-only downloads
    ReportDescriptor::ranged(
        "sales-export",
        "Sales Report",
        "Detailed sales transactions",
        DATA_EXPORTS,
        "/reports/sales",
    )
    .download_only(),
    ReportDescriptor::ranged(
        "inventory-export",
        "Inventory Report",
        "Stock levels, product details, and valuations",
        DATA_EXPORTS,
        "/reports/inventory",
    )
    .download_only(),
    ReportDescriptor::ranged(
        "customers-export",
        "Customer Report",
        "Customer database with purchase history",
        DATA_EXPORTS,
        "/reports/customers",
    )
    .download_only(),
    ReportDescriptor::ranged(
        "expenses-export",
        "Expenses Report",
        "Expense records with vouchers",
        DATA_EXPORTS,
        "/reports/expenses",
    )
    .download_only(),
    ReportDescriptor::ranged(
        "profit-loss-export",
        "Profit & Loss Statement",
        "Revenue and expense breakdown",
        DATA_EXPORTS,
        "/reports/profit-loss",
    )
    .download_only(),
    ReportDescriptor::ranged(
        "tax-export",
        "GST/Tax Report",
        "GST collected, paid, and compliance records",
        DATA_EXPORTS,
        "/reports/tax",
    )
    .download_only(),
];

pub fn list() -> &'static [ReportDescriptor] {
    CATALOG
}

pub fn by_id(id: &str) -> Option<&'static ReportDescriptor> {
    CATALOG.iter().find(|d| d.id == id)
}

/// Like [`by_id`], but an unknown id is an error.
pub fn require(id: &str) -> Result<&'static ReportDescriptor> {
    by_id(id).ok_or_else(|| ReportError::UnknownReport(id.to_string()))
}

/// Category labels in catalog order, without duplicates.
pub fn categories() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for d in CATALOG {
        if !out.contains(&d.category) {
            out.push(d.category);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<_> = list().iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), list().len());
    }

    #[test]
    fn test_every_report_has_a_category() {
        let cats = categories();
        assert!(list().iter().all(|d| cats.contains(&d.category)));
        assert_eq!(cats.first(), Some(&"Sales Analytics"));
        assert_eq!(cats.last(), Some(&"Data Exports"));
    }

    #[test]
    fn test_export_endpoint_defaults_to_excel_suffix() {
        let d = by_id("product-wise").unwrap();
        assert_eq!(d.export_endpoint(), "/reports/sales/product-wise/excel");
        let d = by_id("profit-loss-export").unwrap();
        assert_eq!(d.export_endpoint(), "/reports/profit-loss/excel");
    }

    #[test]
    fn test_download_only_reports() {
        let d = by_id("tax-export").unwrap();
        assert!(!d.has_preview);
        assert!(d.has_export);
        assert!(by_id("daily-summary").unwrap().has_preview);
    }

    #[test]
    fn test_require_unknown() {
        let err = require("nope").unwrap_err();
        assert_eq!(err.to_string(), "Unknown report: nope");
    }
}
