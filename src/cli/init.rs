use std::io::IsTerminal;

use reportdesk::error::{ReportError, Result};
use reportdesk::settings::{load_settings, save_settings, settings_path};

pub fn run(api_url: Option<String>, token: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(url) = api_url {
        settings.api_url = url.trim_end_matches('/').to_string();
    }

    let token = match token {
        Some(t) => Some(t),
        None if std::io::stdin().is_terminal() => {
            let entered = rpassword::prompt_password("Access token (leave blank to keep): ")
                .map_err(|e| ReportError::Settings(format!("could not read token: {e}")))?;
            Some(entered)
        }
        None => None,
    };
    if let Some(t) = token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        settings.token = Some(t);
    }

    save_settings(&settings)?;
    println!("Saved settings to {}", settings_path().display());
    println!("API: {}", settings.api_url);
    if settings.token.is_none() {
        println!("No access token stored; requests will be sent unauthenticated.");
    }
    Ok(())
}
