use std::path::PathBuf;

use reportdesk::catalog;
use reportdesk::error::Result;
use reportdesk::export::ExportCoordinator;
use reportdesk::fmt::file_size;
use reportdesk::settings::effective_settings;

use super::{api_client, ReportArgs};

pub fn run(args: &ReportArgs, output_dir: Option<PathBuf>) -> Result<()> {
    let descriptor = catalog::require(&args.id)?;
    let range = args.range()?;
    let settings = effective_settings();
    let dest = output_dir.unwrap_or_else(|| settings.export_path());
    let client = api_client(&settings)?;

    let outcome = ExportCoordinator::new(&client).export_to_file(
        descriptor,
        &range,
        &args.overrides(),
        &dest,
    )?;
    println!("Wrote {}", outcome.path.display());
    println!("Size: {}", file_size(outcome.bytes));
    Ok(())
}
