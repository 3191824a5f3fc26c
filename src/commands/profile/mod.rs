use crate::commands::Cli;
use aqua_license_core::{ProfileStore, Result};
use clap::{Args, Subcommand};

mod delete;
mod list;
mod set_default;
mod show;

pub use delete::DeleteCommand;
pub use list::ListCommand;
pub use set_default::SetDefaultCommand;
pub use show::ShowCommand;

#[derive(Debug, Args)]
#[command(visible_alias = "profiles")]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub action: Option<ProfileAction>,
}

#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// Delete a profile
    Delete(DeleteCommand),

    /// List available profiles
    List(ListCommand),

    /// Set the default profile
    SetDefault(SetDefaultCommand),

    /// Show profile details (secrets masked)
    Show(ShowCommand),
}

impl ProfileCommand {
    pub fn run(&self, cli: &Cli, store: &ProfileStore) -> Result<()> {
        match &self.action {
            None => ListCommand { complete: false }.run(cli, store),
            Some(ProfileAction::Delete(cmd)) => cmd.run(cli, store),
            Some(ProfileAction::List(cmd)) => cmd.run(cli, store),
            Some(ProfileAction::SetDefault(cmd)) => cmd.run(cli, store),
            Some(ProfileAction::Show(cmd)) => cmd.run(cli, store),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::commands::Commands;
    use aqua_license_core::{Credentials, Deployment, ProfileRecord};
    use clap::Parser;
    use tempfile::TempDir;

    /// Store with a SaaS default `prod` and an on-premise `onprem`.
    pub(crate) fn fixture() -> (TempDir, ProfileStore) {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path().join("aqua"));
        store
            .create(
                "prod",
                ProfileRecord {
                    deployment: Deployment::Saas,
                    csp_endpoint: "https://abc.cloud.aquasec.com".to_string(),
                    api_endpoint: Some("https://api.cloudsploit.com".to_string()),
                    credentials: Credentials::UsernamePassword {
                        username: "alice".to_string(),
                        password: "hunter2".to_string(),
                    },
                },
            )
            .unwrap();
        store
            .create(
                "onprem",
                ProfileRecord {
                    deployment: Deployment::OnPremise,
                    csp_endpoint: "https://aqua.corp.example".to_string(),
                    api_endpoint: None,
                    credentials: Credentials::ApiKeySecret {
                        key: "AKID".to_string(),
                        secret: "s3cr3t".to_string(),
                        role: None,
                        methods: Vec::new(),
                    },
                },
            )
            .unwrap();
        store.set_default("prod").unwrap();
        (dir, store)
    }

    pub(crate) fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(["aqua-license"].iter().chain(args)).unwrap()
    }

    pub(crate) fn action(cli: &Cli) -> &ProfileAction {
        match &cli.command {
            Commands::Profile(ProfileCommand {
                action: Some(action),
            }) => action,
            other => panic!("not a profile action: {other:?}"),
        }
    }

    #[test]
    fn test_bare_profile_command_has_no_action() {
        let cli = parse(&["profiles"]);
        assert!(matches!(
            cli.command,
            Commands::Profile(ProfileCommand { action: None })
        ));
    }
}
