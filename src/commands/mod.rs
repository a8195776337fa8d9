use clap::ValueEnum;

mod config_cmd;
mod sync_cmd;
mod wedding;

pub use config_cmd::ConfigCommand;
pub use sync_cmd::{SyncCommand, SyncCommandError};
pub use wedding::WeddingCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
