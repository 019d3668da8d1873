use std::io::Write;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tempfile::NamedTempFile;

use crate::catalog::ReportDescriptor;
use crate::client::ApiClient;
use crate::error::{ReportError, Result};
use crate::params::{self, DateRange, Overrides, Purpose};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub path: PathBuf,
    pub bytes: usize,
}

pub struct ExportCoordinator<'a> {
    client: &'a ApiClient,
}

impl<'a> ExportCoordinator<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Download the spreadsheet for the same report and range as the
    /// preview, and save it into `dest_dir`.
    pub fn export_to_file(
        &self,
        descriptor: &ReportDescriptor,
        range: &DateRange,
        overrides: &Overrides,
        dest_dir: &Path,
    ) -> Result<ExportOutcome> {
        if !descriptor.has_export {
            return Err(ReportError::NoExport(descriptor.id.to_string()));
        }
        let params = params::build(descriptor, range, Purpose::Export, overrides);
        let download = self
            .client
            .get_bytes(&descriptor.export_endpoint(), &params)
            .map_err(ReportError::Download)?;

        let filename = download
            .content_disposition
            .as_deref()
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| default_filename(descriptor, range));

        let path = persist(dest_dir, &filename, &download.bytes)?;
        tracing::info!(path = %path.display(), bytes = download.bytes.len(), "saved export");
        Ok(ExportOutcome {
            path,
            bytes: download.bytes.len(),
        })
    }
}

/// `<report-id>_<start>_<end>.xlsx`
pub fn default_filename(descriptor: &ReportDescriptor, range: &DateRange) -> String {
    format!(
        "{}_{}_{}.xlsx",
        descriptor.id,
        range.start().format("%Y-%m-%d"),
        range.end().format("%Y-%m-%d")
    )
}

/// Suggested filename from a `Content-Disposition` header. An RFC 5987
/// `filename*=` takes precedence over a plain `filename=`; quoted and
/// unquoted forms are both accepted.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    extended_filename(header)
        .and_then(|name| sanitize(&name))
        .or_else(|| plain_filename(header).and_then(|name| sanitize(&name)))
}

static EXTENDED_FILENAME: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#"(?i)filename\*\s*=\s*([^;]+)"#).ok());

static PLAIN_FILENAME: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:^|;)\s*filename\s*=\s*(?:"([^"]*)"|'([^']*)'|([^;\r\n]*))"#).ok()
});

fn extended_filename(header: &str) -> Option<String> {
    let re = EXTENDED_FILENAME.as_ref()?;
    let raw = re.captures(header)?.get(1)?.as_str().trim().trim_matches('"');
    // charset'language'percent-encoded-name
    let encoded = raw.splitn(3, '\'').nth(2).unwrap_or(raw);
    urlencoding::decode(encoded).ok().map(|s| s.into_owned())
}

fn plain_filename(header: &str) -> Option<String> {
    let caps = PLAIN_FILENAME.as_ref()?.captures(header)?;
    let value = caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3))?;
    Some(value.as_str().replace(['"', '\''], ""))
}

/// Keep only the final path component; reject empty and dot names.
fn sanitize(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next()?.trim();
    if base.is_empty() || base.chars().all(|c| c == '.') {
        None
    } else {
        Some(base.to_string())
    }
}

/// Write through a temp file in `dir` and rename into place. If anything
/// fails before the rename, dropping the temp file deletes it.
fn persist(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    let dest = dir.join(filename);
    tmp.persist(&dest).map_err(|e| ReportError::Io(e.error))?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::by_id;
    use crate::client::StaticSession;
    use std::sync::Arc;
    use std::time::Duration;

    fn jan() -> DateRange {
        DateRange::parse("2025-01-01", "2025-01-31").unwrap()
    }

    fn client(server: &mockito::Server) -> ApiClient {
        ApiClient::new(
            &format!("{}/api/v1", server.url()),
            Duration::from_secs(5),
            Arc::new(StaticSession::default()),
        )
        .unwrap()
    }

    fn temp_entries(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_quoted_filename() {
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="sales_jan.xlsx""#).as_deref(),
            Some("sales_jan.xlsx")
        );
    }

    #[test]
    fn test_unquoted_filename() {
        assert_eq!(
            filename_from_disposition("attachment; filename=sales_jan.xlsx").as_deref(),
            Some("sales_jan.xlsx")
        );
        assert_eq!(
            filename_from_disposition("attachment; filename=a.xlsx; size=10").as_deref(),
            Some("a.xlsx")
        );
    }

    #[test]
    fn test_extended_filename_wins() {
        let h = r#"attachment; filename="fallback.xlsx"; filename*=UTF-8''sales%20jan.xlsx"#;
        assert_eq!(filename_from_disposition(h).as_deref(), Some("sales jan.xlsx"));
    }

    #[test]
    fn test_empty_extended_filename_falls_back_to_plain() {
        let h = r#"attachment; filename="sales_jan.xlsx"; filename*=UTF-8''"#;
        assert_eq!(filename_from_disposition(h).as_deref(), Some("sales_jan.xlsx"));
        let h = r#"attachment; filename*=UTF-8''..; filename=report.xlsx"#;
        assert_eq!(filename_from_disposition(h).as_deref(), Some("report.xlsx"));
    }

    #[test]
    fn test_unusable_filenames() {
        assert_eq!(filename_from_disposition("attachment"), None);
        assert_eq!(filename_from_disposition(r#"attachment; filename="""#), None);
        assert_eq!(filename_from_disposition(r#"attachment; filename="..""#), None);
        assert_eq!(
            filename_from_disposition(r#"attachment; filename="../../etc/x.xlsx""#).as_deref(),
            Some("x.xlsx")
        );
    }

    #[test]
    fn test_default_filename() {
        let d = by_id("product-wise").unwrap();
        assert_eq!(default_filename(d, &jan()), "product-wise_2025-01-01_2025-01-31.xlsx");
    }

    #[test]
    fn test_export_uses_server_filename() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/v1/reports/sales/product-wise/excel")
            .match_query(mockito::Matcher::UrlEncoded(
                "start_date".into(),
                "2025-01-01T00:00:00".into(),
            ))
            .with_status(200)
            .with_header("content-disposition", r#"attachment; filename="sales_jan.xlsx""#)
            .with_body(b"PK\x03\x04sheet")
            .create();

        let dir = tempfile::tempdir().unwrap();
        let api = client(&server);
        let out = ExportCoordinator::new(&api)
            .export_to_file(by_id("product-wise").unwrap(), &jan(), &Overrides::default(), dir.path())
            .unwrap();

        mock.assert();
        assert_eq!(out.path, dir.path().join("sales_jan.xlsx"));
        assert_eq!(std::fs::read(&out.path).unwrap(), b"PK\x03\x04sheet");
        assert_eq!(temp_entries(dir.path()), vec!["sales_jan.xlsx"]);
    }

    #[test]
    fn test_export_without_header_synthesizes_name() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/api/v1/reports/customers/warranty-due/excel")
            .match_query(mockito::Matcher::UrlEncoded("days_ahead".into(), "30".into()))
            .with_status(200)
            .with_body(b"xlsx")
            .create();

        let dir = tempfile::tempdir().unwrap();
        let api = client(&server);
        let out = ExportCoordinator::new(&api)
            .export_to_file(by_id("warranty-due").unwrap(), &jan(), &Overrides::default(), dir.path())
            .unwrap();
        assert_eq!(
            out.path.file_name().unwrap().to_string_lossy(),
            "warranty-due_2025-01-01_2025-01-31.xlsx"
        );
    }

    #[test]
    fn test_daily_summary_export_sends_single_date() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/v1/reports/sales/daily-summary/excel")
            .match_query(mockito::Matcher::Regex(
                r"^date=2025-01-31T00(%3A|:)00(%3A|:)00$".into(),
            ))
            .with_status(200)
            .with_body(b"xlsx")
            .create();

        let dir = tempfile::tempdir().unwrap();
        let api = client(&server);
        ExportCoordinator::new(&api)
            .export_to_file(by_id("daily-summary").unwrap(), &jan(), &Overrides::default(), dir.path())
            .unwrap();
        mock.assert();
    }

    #[test]
    fn test_failed_download_leaves_no_files() {
        let mut server = mockito::Server::new();
        let _m = server
            .mock("GET", "/api/v1/reports/finance/outstanding-receivables/excel")
            .with_status(400)
            .with_body(r#"{"detail": "No receivables"}"#)
            .create();

        let dir = tempfile::tempdir().unwrap();
        let api = client(&server);
        let err = ExportCoordinator::new(&api)
            .export_to_file(by_id("outstanding").unwrap(), &jan(), &Overrides::default(), dir.path())
            .unwrap_err();
        assert_eq!(err.to_string(), "Download failed: No receivables");
        assert!(temp_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_persist_failure_cleans_up_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the target name makes the rename fail
        std::fs::create_dir(dir.path().join("taken.xlsx")).unwrap();
        std::fs::write(dir.path().join("taken.xlsx").join("keep"), b"x").unwrap();
        assert!(persist(dir.path(), "taken.xlsx", b"data").is_err());
        assert_eq!(temp_entries(dir.path()), vec!["taken.xlsx"]);
    }
}
