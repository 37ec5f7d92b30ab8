use clap::Parser;
use tracing_subscriber::EnvFilter;
use twstock::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
