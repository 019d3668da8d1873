use thiserror::Error;

use crate::client::ApiError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown report: {0}")]
    UnknownReport(String),

    #[error("Report '{0}' has no on-screen preview; use `reportdesk export {0}`")]
    NoPreview(String),

    #[error("Report '{0}' has no spreadsheet export")]
    NoExport(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Report generation failed: {0}")]
    Preview(ApiError),

    #[error("Download failed: {0}")]
    Download(ApiError),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
