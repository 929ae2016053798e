// src/args.rs
// Command-line argument parsing

use clap::Parser;
use clap_complete::Shell;

/// Prompt for a line of input, printing a default if none arrives in time
#[derive(Parser, Debug)]
#[command(name = "inputtimeout")]
#[command(version = "1.0")]
#[command(about = "Show PROMPT, read one line, and fall back to a default after DURATION", long_about = None)]
pub struct Args {
    /// Generate shell completions (bash, zsh, fish, powershell, elvish)
    #[arg(long = "generate-completions", value_name = "SHELL", hide = true)]
    pub generate_completions: Option<Shell>,

    /// How long to wait for input (e.g., 10, 10s, 1.5m, 2h). If no unit, seconds are assumed.
    #[arg(short = 't', long = "timeout", value_name = "DURATION", default_value = "30")]
    pub timeout: String,

    /// Value printed when no input arrives in time
    #[arg(
        short = 'd',
        long = "default",
        value_name = "VALUE",
        default_value = inputtimeout::DEFAULT_RETURN_VALUE
    )]
    pub default_value: String,

    /// Exit with this status when the default was used instead of 0
    #[arg(long = "status-on-timeout", value_name = "STATUS")]
    pub status_on_timeout: Option<i32>,

    /// Report the input strategy and outcome to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Text shown before reading
    #[arg(value_name = "PROMPT", default_value = "")]
    pub prompt: String,
}
