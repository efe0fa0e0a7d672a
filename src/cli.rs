//! Command-line argument parsing

use std::path::PathBuf;

use clap::Parser;

use crate::config::Settings;

/// Highlight log files with regular expression rules
#[derive(Parser, Debug)]
#[command(name = "traces-reader", version, about = "Highlight log files with regular expression rules")]
pub struct CliArgs {
    /// Log files to show
    #[arg(value_name = "FILES", required = true)]
    pub files: Vec<PathBuf>,

    /// JSON file with the highlight configurations
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Keep watching the files and redraw on change
    #[arg(short, long)]
    pub follow: bool,

    /// Tick interval in milliseconds (follow mode)
    #[arg(short, long, value_name = "MS")]
    pub interval: Option<u64>,
}

impl CliArgs {
    /// Layer the command line over the settings file
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(config) = &self.config {
            settings.configurations = Some(config.clone());
        }
        if self.follow {
            settings.follow = true;
        }
        if let Some(ms) = self.interval {
            settings = settings.with_tick_interval(ms);
        }
        settings
    }
}
