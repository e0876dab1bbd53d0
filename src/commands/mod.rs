mod config_cmd;
mod log_cmd;
mod scan_cmd;

use clap::ValueEnum;

pub use config_cmd::ConfigCommand;
pub use log_cmd::LogCommand;
pub use scan_cmd::ScanCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
