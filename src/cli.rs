use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::api::Sort;
use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "gallery")]
#[command(about = "Browse the coloring-page gallery from the terminal", long_about = None)]
pub struct Cli {
    /// Base URL of the gallery REST API
    #[arg(long, value_name = "URL")]
    pub api_base: Option<String>,

    /// Gallery ordering (newest, popular, downloads)
    #[arg(short, long)]
    pub sort: Option<Sort>,

    /// Items requested per page
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Force dark mode (overrides auto-detection)
    #[arg(long, conflicts_with = "light")]
    pub dark: bool,

    /// Force light mode (overrides auto-detection)
    #[arg(long, conflicts_with = "dark")]
    pub light: bool,

    /// Custom config directory (default: ~/.config/gallery)
    #[arg(long, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Enable verbose logging (prints log path, sets DEBUG level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Command-line flags take precedence over the settings file.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(api_base) = &self.api_base {
            settings.api_base = api_base.clone();
        }
        if let Some(sort) = self.sort {
            settings.sort = Some(sort);
        }
        if let Some(page_size) = self.page_size {
            settings.page_size = page_size.max(1);
        }
        if self.dark {
            settings.theme = Some("dark".into());
        } else if self.light {
            settings.theme = Some("light".into());
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective settings
    Show {
        /// Output format (toml or json)
        #[arg(short, long, default_value = "toml")]
        format: OutputFormat,
    },
    /// Show where the settings file and log live
    Path,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Toml,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {s}. Use 'toml' or 'json'")),
        }
    }
}
