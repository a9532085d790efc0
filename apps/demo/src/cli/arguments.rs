use std::path::PathBuf;

use clap::Args;

#[derive(Args, Debug)]
pub struct Run {
    /// Path to the TOML configuration file. Defaults are used for every missing value.
    #[clap(short, long)]
    pub config: Option<PathBuf>,
}
