use crate::commands::Cli;
use crate::output::OperationResult;
use aqua_license_core::{ProfileStore, Result};
use clap::Args;

#[derive(Debug, Args)]
#[command(visible_alias = "default")]
pub struct SetDefaultCommand {
    /// Profile name to make the default
    pub name: String,
}

impl SetDefaultCommand {
    pub fn run(&self, cli: &Cli, store: &ProfileStore) -> Result<()> {
        self.apply(store)?.render(cli.verbose)
    }

    pub fn apply(&self, store: &ProfileStore) -> Result<OperationResult<'_>> {
        store.set_default(&self.name)?;
        Ok(OperationResult {
            success: true,
            action: "set-default",
            profile: &self.name,
            message: format!("Default profile set to '{}'", self.name),
        })
    }
}
