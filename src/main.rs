use clap::Parser;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod core;
mod matching;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("barcode_solver=debug,info")
    } else {
        EnvFilter::new("barcode_solver=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Identify(args) => {
            cli::identify::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Group(args) => {
            cli::group::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Layout(args) => {
            cli::layout::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
