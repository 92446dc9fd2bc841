use aperture_oas::cli::commands::document;
use aperture_oas::cli::errors::print_error_with_json;
use aperture_oas::cli::tracing_init::init_tracing;
use aperture_oas::cli::{Cli, Commands};
use aperture_oas::config::ConfigManager;
use aperture_oas::error::Error;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;
    init_tracing(cli.verbosity);

    match run_command(cli).await {
        Ok(output) => println!("{output}"),
        Err(e) => {
            print_error_with_json(&e, json_errors);
            std::process::exit(1);
        }
    }
}

async fn run_command(cli: Cli) -> Result<String, Error> {
    let mut config = ConfigManager::default().load(cli.config.as_deref())?;
    if cli.no_remote {
        config.allow_remote = false;
    }

    match cli.command {
        Commands::Roundtrip { file, format } => document::roundtrip(&file, format),
        Commands::Resolve { file, strict } => {
            document::resolve(&file, &config.to_resolve_options()?, strict).await
        }
        Commands::Find {
            file,
            pointer,
            format,
        } => document::find(&file, &pointer, format, &config.to_resolve_options()?).await,
        Commands::Validate {
            file,
            pointer,
            instance,
        } => document::validate(&file, &pointer, &instance, &config.to_resolve_options()?).await,
    }
}
