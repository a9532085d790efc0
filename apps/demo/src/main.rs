use eyre::Result;

mod cli;
pub(crate) mod config;
mod scenario;

fn main() -> Result<()> {
    cli::run()
}
