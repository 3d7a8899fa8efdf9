//! Command-line interface definitions using clap

use clap::Parser;

/// Scanlinker - scan tracking service for dynamic QR codes
#[derive(Parser, Debug)]
#[command(name = "scanlinker")]
#[command(version)]
#[command(about = "Scan tracking service for dynamic QR codes", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c')]
    pub config: Option<String>,

    /// Write a sample configuration and exit; prints to stdout when no path is given
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "-")]
    pub generate_config: Option<String>,
}
