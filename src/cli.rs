use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML config file (default: ~/.tgchat/config.yaml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
