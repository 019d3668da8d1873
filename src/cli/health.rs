use colored::Colorize;

use reportdesk::error::{ReportError, Result};
use reportdesk::settings::effective_settings;

use super::api_client;

pub fn run() -> Result<()> {
    let settings = effective_settings();
    let client = api_client(&settings)?;
    if client.health() {
        println!("{} {}", "reachable".green().bold(), client.origin());
        Ok(())
    } else {
        println!("{} {}", "unreachable".red().bold(), client.origin());
        Err(ReportError::Other(
            "Backend is not responding. Check that the server is running.".into(),
        ))
    }
}
