mod actions;
mod arguments;
use clap::Parser;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub enum Cli {
    /// Run the chat room scenario, see `run --help` for more information
    Run(arguments::Run),
}

impl Cli {
    pub fn exec(self) -> eyre::Result<()> {
        match self {
            Self::Run(args) => actions::run(args),
        }
    }
}

pub fn run() -> eyre::Result<()> {
    Cli::parse().exec()
}
