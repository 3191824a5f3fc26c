use crate::commands::Cli;
use crate::output::{print_json, print_lines};
use aqua_license_core::{CliOverrides, EnvVars, ProfileStore, Result, resolve_credentials};
use clap::Args;

#[derive(Debug, Args)]
#[command(visible_alias = "whoami")]
pub struct ResolveCommand {}

impl ResolveCommand {
    pub fn run(&self, cli: &Cli, store: &ProfileStore) -> Result<()> {
        let overrides = CliOverrides {
            profile: cli.profile.clone(),
        };
        let env = EnvVars::from_process();
        let context = resolve_credentials(store, &overrides, &env)?;
        let summary = context.summary();

        if !cli.verbose {
            return print_json(&summary);
        }

        println!("Using {}", context.source());
        let mut lines = vec![
            ("Credentials", summary.kind.to_string()),
            ("Deployment", summary.deployment.to_string()),
            ("Principal", summary.principal.to_string()),
        ];
        if let Some(role) = summary.role {
            lines.push(("Role", role.to_string()));
        }
        if !summary.methods.is_empty() {
            lines.push(("Methods", summary.methods.join(", ")));
        }
        lines.push(("CSP endpoint", summary.csp_endpoint.to_string()));
        lines.push((
            "API endpoint",
            summary.api_endpoint.unwrap_or("(none)").to_string(),
        ));
        print_lines(&lines);
        Ok(())
    }
}
