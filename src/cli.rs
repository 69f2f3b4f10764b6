//! CLI definitions

use clap::Parser;
use std::path::PathBuf;

/// Gatechat - chat agent with authorization-gated tool calls
#[derive(Parser)]
#[command(
    name = "gatechat",
    about = "Chat agent whose tool calls pass through an authorization gate",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Session key (conversation context identifier)
    #[arg(short, long, default_value = "1")]
    pub session: String,

    /// Initial message to send before reading interactive input
    pub message: Option<String>,
}

/// Path to the log file, used for both logging setup and the help footer
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gatechat")
        .join("logs")
        .join("gatechat.log")
}
