// ABOUTME: Command-line arguments for the crewline binary - listing presets and
// ABOUTME: running a preset or crew file with key=value inputs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "crewline")]
#[command(author, version, about = "Run multi-agent crews", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in crews and the inputs they take
    List,
    /// Run a built-in crew or a crew file
    Run(RunArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Name of a built-in crew (see `crewline list`)
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub preset: Option<String>,

    /// Path to a TOML crew file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Input parameter as key=value; repeatable
    #[arg(short, long = "input", value_name = "KEY=VALUE", value_parser = parse_input)]
    pub inputs: Vec<(String, String)>,

    /// Model for agents that do not name one
    #[arg(long, env = "CREWLINE_DEFAULT_MODEL")]
    pub model: Option<String>,

    /// Directory that relative output files are written under
    #[arg(long, env = "CREWLINE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Fail a task that takes longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Parse a `key=value` pair. The value may itself contain `=`.
pub fn parse_input(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    Ok((key.to_string(), value.to_string()))
}
