// ABOUTME: Command line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "microterm", version, about = "A small terminal with tabs and split panes")]
pub struct Cli {
    /// Configuration file [default: ~/.config/microterm/microterm.conf]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Working directory for new sessions
    #[arg(short, long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Run COMMAND through $SHELL -c instead of an interactive shell
    #[arg(short = 'e', long = "execute", value_name = "COMMAND")]
    pub command: Option<String>,

    /// Fixed window title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    pub debug: bool,
}
