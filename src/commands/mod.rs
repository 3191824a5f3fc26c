use std::path::PathBuf;

use aqua_license_core::{ProfileStore, Result, env};
use clap::{Parser, Subcommand};

pub mod profile;
pub mod resolve;
pub mod setup;
pub mod version;

#[derive(Debug, Parser)]
#[command(name = "aqua-license")]
#[command(
    about = "Extract license utilization from an Aqua Security platform",
    long_about = None
)]
#[command(version)]
#[command(help_expected = true)]
pub struct Cli {
    /// Show debug output on stderr
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Configuration profile to use (default: the stored default profile)
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Show human-readable output instead of JSON
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding profiles.toml (default: ~/.aqua)
    #[arg(long, global = true, env = "AQUA_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The store handle for this invocation.
    pub fn store(&self) -> ProfileStore {
        let dir = self
            .config_dir
            .clone()
            .unwrap_or_else(env::default_config_dir);
        ProfileStore::new(dir)
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage configuration profiles (defaults to list)
    Profile(profile::ProfileCommand),

    /// Show which credentials this invocation would use
    Resolve(resolve::ResolveCommand),

    /// Create or update a profile (interactive when run in a terminal)
    Setup(setup::SetupCommand),

    /// Show version information
    Version(version::VersionCommand),
}

impl Commands {
    pub fn run(&self, cli: &Cli, store: &ProfileStore) -> Result<()> {
        match self {
            Commands::Version(cmd) => cmd.run(cli),
            Commands::Profile(cmd) => cmd.run(cli, store),
            Commands::Resolve(cmd) => cmd.run(cli, store),
            Commands::Setup(cmd) => cmd.run(cli, store),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn assert_subcommands_sorted(cmd: &clap::Command) {
        let names: Vec<_> = cmd.get_subcommands().map(|c| c.get_name()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted, "subcommands of '{}'", cmd.get_name());
        for sub in cmd.get_subcommands() {
            assert_subcommands_sorted(sub);
        }
    }

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_ordering() {
        assert_subcommands_sorted(&Cli::command());
    }

    #[test]
    fn test_global_flags_anywhere() {
        let before = Cli::try_parse_from(["aqua-license", "-v", "-d", "-p", "prod", "resolve"])
            .unwrap();
        let after = Cli::try_parse_from(["aqua-license", "resolve", "-v", "-d", "-p", "prod"])
            .unwrap();
        for cli in [before, after] {
            assert!(cli.verbose);
            assert!(cli.debug);
            assert_eq!(cli.profile.as_deref(), Some("prod"));
            assert!(matches!(cli.command, Commands::Resolve(_)));
        }
    }

    #[test]
    fn test_profile_defaults_to_none() {
        let cli = Cli::try_parse_from(["aqua-license", "profile", "list"]).unwrap();
        assert!(cli.profile.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_explicit_config_dir() {
        let cli =
            Cli::try_parse_from(["aqua-license", "--config-dir", "/tmp/aqua-test", "version"])
                .unwrap();
        assert_eq!(cli.store().dir(), std::path::Path::new("/tmp/aqua-test"));
    }
}
