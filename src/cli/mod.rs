pub mod completions;
pub mod export;
pub mod health;
pub mod init;
pub mod list;
pub mod show;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use reportdesk::client::ApiClient;
use reportdesk::error::{ReportError, Result};
use reportdesk::params::{DateRange, Overrides};
use reportdesk::settings::{Settings, StoredSession};

/// Days covered when no `--from`/`--to` is given.
pub(crate) const DEFAULT_RANGE_DAYS: i64 = 30;

#[derive(Parser)]
#[command(
    name = "reportdesk",
    version,
    about = "Preview and export retail reports from the point-of-sale backend."
)]
pub struct Cli {
    /// Log requests and responses to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save the API address and access token.
    Init {
        /// API base URL (default: http://localhost:8000/api/v1)
        #[arg(long = "api-url")]
        api_url: Option<String>,
        /// Access token; prompted for when omitted
        #[arg(long)]
        token: Option<String>,
    },
    /// List available reports grouped by category.
    List {
        /// Only show one category (case-insensitive)
        #[arg(long)]
        category: Option<String>,
    },
    /// Run a report and render it in the terminal.
    Show {
        #[command(flatten)]
        report: ReportArgs,
        /// Comma-separated columns to display, in order
        #[arg(long, value_delimiter = ',')]
        columns: Vec<String>,
        /// Print the raw payload as JSON
        #[arg(long)]
        json: bool,
    },
    /// Download a report as a spreadsheet.
    Export {
        #[command(flatten)]
        report: ReportArgs,
        /// Directory to save into (default: export_dir setting)
        #[arg(long = "output-dir", short = 'o')]
        output_dir: Option<PathBuf>,
    },
    /// Check whether the backend is reachable.
    Health,
    /// Print shell completions.
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Report id (see `reportdesk list`)
    pub id: String,
    /// Start date (YYYY-MM-DD)
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long = "to")]
    pub to_date: Option<String>,
    /// Look-ahead window for expiry reports
    #[arg(long = "days-ahead")]
    pub days_ahead: Option<u32>,
    /// Restrict to one store
    #[arg(long = "store")]
    pub store: Option<i64>,
}

impl ReportArgs {
    pub fn range(&self) -> Result<DateRange> {
        resolve_range(
            self.from_date.as_deref(),
            self.to_date.as_deref(),
            Local::now().date_naive(),
        )
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            days_ahead: self.days_ahead,
            store_id: self.store,
        }
    }
}

/// Both dates or neither; neither means the trailing window ending today.
pub(crate) fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<DateRange> {
    match (from, to) {
        (Some(f), Some(t)) => DateRange::parse(f, t),
        (Some(_), None) => Err(ReportError::InvalidRange("--from requires --to".into())),
        (None, Some(_)) => Err(ReportError::InvalidRange("--to requires --from".into())),
        (None, None) => Ok(DateRange::trailing(today, DEFAULT_RANGE_DAYS)),
    }
}

pub(crate) fn api_client(settings: &Settings) -> Result<ApiClient> {
    ApiClient::new(
        &settings.api_url,
        settings.timeout(),
        Arc::new(StoredSession::from_settings(settings)),
    )
}
