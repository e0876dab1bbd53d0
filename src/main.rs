use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{ConfigCommand, LogCommand, ScanCommand};
use foodlog::{Config, FileStore, FoodLog};

#[derive(Parser)]
#[command(name = "foodlog")]
#[command(version)]
#[command(about = "Log food with calorie and protein totals", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add, list, and delete logged food
    Log(LogCommand),

    /// Log food from a barcode scan
    Scan(ScanCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    // Diagnostics go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "foodlog=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load(cli.config)?;
    tracing::debug!("Data directory: {}", config.data_dir.value.display());

    match cli.command {
        Some(Commands::Log(cmd)) => {
            let mut log = FoodLog::open(FileStore::new(config.data_dir.value.clone()));
            cmd.run(&mut log)?;
        }
        Some(Commands::Scan(cmd)) => {
            let mut log = FoodLog::open(FileStore::new(config.data_dir.value.clone()));
            cmd.run(&mut log, &config)?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
