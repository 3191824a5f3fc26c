use crate::commands::Cli;
use crate::output::OperationResult;
use aqua_license_core::{ProfileStore, Result};
use clap::Args;

#[derive(Debug, Args)]
#[command(visible_aliases = ["rm", "remove"])]
pub struct DeleteCommand {
    /// Profile name to delete
    pub name: String,
}

impl DeleteCommand {
    pub fn run(&self, cli: &Cli, store: &ProfileStore) -> Result<()> {
        self.apply(store)?.render(cli.verbose)
    }

    pub fn apply(&self, store: &ProfileStore) -> Result<OperationResult<'_>> {
        let cleared_default = store.delete(&self.name)?;

        let mut message = format!("Deleted profile '{}'", self.name);
        if cleared_default {
            message.push_str("; no default profile is set now");
        }
        Ok(OperationResult {
            success: true,
            action: "delete",
            profile: &self.name,
            message,
        })
    }
}
