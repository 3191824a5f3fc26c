use crate::commands::Cli;
use crate::output::{ProfileView, print_json, print_lines};
use aqua_license_core::{Profile, ProfileStore, Result};
use clap::Args;

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Profile name to show (defaults to -p, then the default profile)
    pub name: Option<String>,
}

impl ShowCommand {
    pub fn run(&self, cli: &Cli, store: &ProfileStore) -> Result<()> {
        let profile = self.target(cli, store)?;
        tracing::debug!("Showing profile '{}'", profile.name);

        let view = ProfileView::from(&profile);
        if cli.verbose {
            print_lines(&view.lines());
            Ok(())
        } else {
            print_json(&view)
        }
    }

    /// The positional name, else `-p`, else the stored default.
    pub fn target(&self, cli: &Cli, store: &ProfileStore) -> Result<Profile> {
        match self.name.as_deref().or(cli.profile.as_deref()) {
            Some(name) => store.get(name),
            None => store.get_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{action, fixture, parse};
    use super::super::ProfileAction;
    use super::*;
    use aqua_license_core::AquaError;

    fn show(cli: &Cli) -> &ShowCommand {
        match action(cli) {
            ProfileAction::Show(cmd) => cmd,
            other => panic!("expected show, got {other:?}"),
        }
    }

    #[test]
    fn test_show_name_then_flag_then_default() {
        let (_dir, store) = fixture();

        let cli = parse(&["-p", "prod", "profile", "show", "onprem"]);
        assert_eq!(show(&cli).target(&cli, &store).unwrap().name, "onprem");

        let cli = parse(&["-p", "onprem", "profile", "show"]);
        assert_eq!(show(&cli).target(&cli, &store).unwrap().name, "onprem");

        let cli = parse(&["profile", "show"]);
        let profile = show(&cli).target(&cli, &store).unwrap();
        assert_eq!(profile.name, "prod");
        assert!(profile.is_default);
    }

    #[test]
    fn test_show_masks_secrets() {
        let (_dir, store) = fixture();
        let cli = parse(&["profile", "show", "onprem"]);
        let profile = show(&cli).target(&cli, &store).unwrap();

        let json = serde_json::to_value(ProfileView::from(&profile)).unwrap();
        assert_eq!(json["name"], "onprem");
        assert_eq!(json["key"], "AKID");
        assert_eq!(json["secret"], "********");
        assert_eq!(json["deployment"], "on_premise");
        assert!(!json.to_string().contains("s3cr3t"));
    }

    #[test]
    fn test_show_unknown_or_missing_default() {
        let (_dir, store) = fixture();

        let cli = parse(&["profile", "show", "nope"]);
        let err = show(&cli).target(&cli, &store).unwrap_err();
        assert!(matches!(err, AquaError::ProfileNotFound { .. }), "{err:?}");

        store.delete("prod").unwrap();
        let cli = parse(&["profile", "show"]);
        let err = show(&cli).target(&cli, &store).unwrap_err();
        assert!(matches!(err, AquaError::NoDefaultProfile), "{err:?}");
    }
}
