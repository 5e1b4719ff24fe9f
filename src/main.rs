use clap::Parser;
use colored::*;
use fabula::cli::{Cli, Commands};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize logging with FABULA_LOG environment variable support
    let log_level = std::env::var("FABULA_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level)),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);

        let exit_code = match e.downcast_ref::<fabula::FabulaError>() {
            Some(fabula::FabulaError::Config(_)) => 2,
            Some(fabula::FabulaError::Io(_)) => 3,
            Some(fabula::FabulaError::Parse(_)) => 4,
            _ => 1,
        };
        process::exit(exit_code);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let num_threads = if cli.threads == 0 {
        num_cpus::get()
    } else {
        cli.threads
    };

    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .expect("Failed to initialize thread pool");

    if cli.verbose > 0 {
        eprintln!("Using {} threads", num_threads);
    }

    match cli.command {
        Commands::Init(args) => fabula::cli::commands::init::run(args),
        Commands::Sketch(args) => fabula::cli::commands::sketch::run(args),
        Commands::Run(args) => fabula::cli::commands::run::run(args),
        Commands::Stage(args) => fabula::cli::commands::stage::run(args),
    }
}
