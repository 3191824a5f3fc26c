use crate::commands::Cli;
use aqua_license_core::Result;
use clap::Args;

#[derive(Debug, Args)]
#[command(visible_aliases = ["v"])]
pub struct VersionCommand {}

impl VersionCommand {
    pub fn run(&self, _cli: &Cli) -> Result<()> {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        Ok(())
    }
}
