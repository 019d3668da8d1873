mod cli;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    reportdesk::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Init { api_url, token } => cli::init::run(api_url, token),
        Commands::List { category } => cli::list::run(category.as_deref()),
        Commands::Show {
            report,
            columns,
            json,
        } => cli::show::run(&report, &columns, json),
        Commands::Export { report, output_dir } => cli::export::run(&report, output_dir),
        Commands::Health => cli::health::run(),
        Commands::Completions { shell } => {
            cli::completions::run(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
