use crate::commands::Cli;
use crate::output::{ProfileView, print_json, print_table};
use aqua_license_core::{Profile, ProfileStore, Result};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Args)]
#[command(visible_aliases = ["ls"])]
pub struct ListCommand {
    /// Output profile names for shell completion (one per line)
    #[arg(long, hide = true)]
    pub complete: bool,
}

#[derive(Debug, Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Credentials")]
    kind: String,
    #[tabled(rename = "Deployment")]
    deployment: String,
    #[tabled(rename = "CSP Endpoint")]
    csp_endpoint: String,
    #[tabled(rename = "API Endpoint")]
    api_endpoint: String,
}

#[derive(Debug, Serialize)]
struct ProfileList<'a> {
    default_profile: Option<&'a str>,
    profiles: Vec<ProfileView<'a>>,
}

impl<'a> ProfileList<'a> {
    fn new(profiles: &'a [Profile]) -> Self {
        Self {
            default_profile: profiles
                .iter()
                .find(|p| p.is_default)
                .map(|p| p.name.as_str()),
            profiles: profiles.iter().map(ProfileView::from).collect(),
        }
    }
}

impl ListCommand {
    pub fn run(&self, cli: &Cli, store: &ProfileStore) -> Result<()> {
        tracing::debug!("Listing profiles in {}", store.path().display());
        let profiles: Vec<Profile> = store.list()?.collect();

        if self.complete {
            for profile in &profiles {
                println!("{}", profile.name);
            }
            return Ok(());
        }

        if !cli.verbose {
            return print_json(&ProfileList::new(&profiles));
        }

        if profiles.is_empty() {
            println!("No profiles configured. Run 'aqua-license setup' to create one.");
            return Ok(());
        }

        let rows = profiles
            .iter()
            .map(|p| ProfileRow {
                marker: if p.is_default { "*" } else { "" },
                name: p.name.clone(),
                kind: p.record.kind().to_string(),
                deployment: p.record.deployment.to_string(),
                csp_endpoint: p.record.csp_endpoint.clone(),
                api_endpoint: p.record.api_endpoint.clone().unwrap_or_default(),
            })
            .collect();
        print_table(rows);

        if !profiles.iter().any(|p| p.is_default) {
            println!("\nNo default profile set. Use 'aqua-license profile set-default <name>'.");
        }
        Ok(())
    }
}
