use crate::commands::Cli;
use crate::output::OperationResult;
use aqua_license_core::{
    AquaError, CredentialKind, Credentials, Deployment, Profile, ProfileRecord, ProfileStore,
    Result,
};
use clap::{Args, ValueEnum};
use demand::{Confirm, DemandOption, Input, Select};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeploymentArg {
    /// Hosted platform (needs --api-endpoint)
    Saas,
    /// Self-hosted console
    OnPremise,
}

impl From<DeploymentArg> for Deployment {
    fn from(arg: DeploymentArg) -> Self {
        match arg {
            DeploymentArg::Saas => Deployment::Saas,
            DeploymentArg::OnPremise => Deployment::OnPremise,
        }
    }
}

#[derive(Debug, Args)]
#[command(visible_alias = "init")]
pub struct SetupCommand {
    /// Profile name to create or update (defaults to -p, then "default")
    pub profile_name: Option<String>,

    /// Overwrite an existing profile without asking
    #[arg(short, long)]
    pub force: bool,

    /// API endpoint, e.g. https://api.cloudsploit.com (SaaS only)
    #[arg(long)]
    pub api_endpoint: Option<String>,

    /// Console (CSP) endpoint
    #[arg(long)]
    pub csp_endpoint: Option<String>,

    /// Make this profile the default
    #[arg(long)]
    pub default: bool,

    /// Deployment type (default: saas when --api-endpoint is given, else on-premise)
    #[arg(long, value_enum)]
    pub deployment: Option<DeploymentArg>,

    /// API key
    #[arg(long)]
    pub key: Option<String>,

    /// Allowed API methods, comma separated
    #[arg(long, value_delimiter = ',')]
    pub methods: Vec<String>,

    /// Never prompt; fail when a required field is missing
    #[arg(long)]
    pub non_interactive: bool,

    /// Password (prefer the prompt to keep it out of shell history)
    #[arg(long)]
    pub password: Option<String>,

    /// Role for API key authentication
    #[arg(long)]
    pub role: Option<String>,

    /// API secret (prefer the prompt to keep it out of shell history)
    #[arg(long)]
    pub secret: Option<String>,

    /// Username
    #[arg(long)]
    pub username: Option<String>,
}

/// What `setup` changed.
#[derive(Debug, PartialEq, Eq)]
pub struct SetupOutcome {
    pub name: String,
    pub updated: bool,
    pub is_default: bool,
}

impl SetupCommand {
    pub fn run(&self, cli: &Cli, store: &ProfileStore) -> Result<()> {
        let name = self
            .profile_name
            .clone()
            .or_else(|| cli.profile.clone())
            .unwrap_or_else(|| "default".to_string());
        let interactive = !self.non_interactive && atty::is(atty::Stream::Stdin);
        tracing::debug!(
            "Setting up profile '{}' in {} (interactive: {})",
            name,
            store.path().display(),
            interactive
        );

        let Some(outcome) = self.apply(&name, store, interactive)? else {
            println!("Setup cancelled; profile '{}' left unchanged", name);
            return Ok(());
        };

        let mut message = format!(
            "{} profile '{}'",
            if outcome.updated { "Updated" } else { "Created" },
            outcome.name
        );
        if outcome.is_default {
            message.push_str(" (default)");
        }
        OperationResult {
            success: true,
            action: if outcome.updated { "update" } else { "create" },
            profile: &outcome.name,
            message,
        }
        .render(cli.verbose)
    }

    /// Create or update `name`. Returns `None` when the user declines to
    /// overwrite an existing profile.
    pub fn apply(
        &self,
        name: &str,
        store: &ProfileStore,
        interactive: bool,
    ) -> Result<Option<SetupOutcome>> {
        let existing = match store.get(name) {
            Ok(profile) => Some(profile),
            Err(AquaError::ProfileNotFound { .. }) => None,
            Err(e) => return Err(e),
        };

        if existing.is_some() && !self.force {
            if !interactive {
                return Err(AquaError::DuplicateProfile {
                    profile: name.to_string(),
                });
            }
            let overwrite = Confirm::new(format!("Profile '{}' exists. Overwrite it?", name))
                .affirmative("Yes")
                .negative("No")
                .run()
                .map_err(prompt_err)?;
            if !overwrite {
                return Ok(None);
            }
        }

        let record = if interactive {
            println!("\n🔐 Aqua license utility setup: profile '{}'\n", name);
            self.prompt_record(existing.as_ref())?
        } else {
            self.record_from_flags()?
        };

        let updated = existing.is_some();
        if updated {
            store.update(name, record)?;
        } else {
            store.create(name, record)?;
        }

        let is_default = if self.default || !store.has_default()? {
            store.set_default(name)?;
            true
        } else {
            existing.is_some_and(|p| p.is_default)
        };

        Ok(Some(SetupOutcome {
            name: name.to_string(),
            updated,
            is_default,
        }))
    }

    fn flag_kind(&self) -> Result<Option<CredentialKind>> {
        let has_user = self.username.is_some() || self.password.is_some();
        let has_key = self.key.is_some() || self.secret.is_some();
        match (has_user, has_key) {
            (true, true) => Err(AquaError::Validation {
                message: "use either --username/--password or --key/--secret, not both"
                    .to_string(),
            }),
            (true, false) => Ok(Some(CredentialKind::UsernamePassword)),
            (false, true) => Ok(Some(CredentialKind::ApiKeySecret)),
            (false, false) => Ok(None),
        }
    }

    fn deployment_from_flags(&self) -> Deployment {
        match self.deployment {
            Some(arg) => arg.into(),
            None if self.api_endpoint.is_some() => Deployment::Saas,
            None => Deployment::OnPremise,
        }
    }

    /// Build a record purely from flags.
    pub fn record_from_flags(&self) -> Result<ProfileRecord> {
        let credentials = match self.flag_kind()? {
            Some(CredentialKind::UsernamePassword) => Credentials::UsernamePassword {
                username: required(&self.username, "--username")?,
                password: required(&self.password, "--password")?,
            },
            Some(CredentialKind::ApiKeySecret) => Credentials::ApiKeySecret {
                key: required(&self.key, "--key")?,
                secret: required(&self.secret, "--secret")?,
                role: self.role.clone(),
                methods: self.methods.clone(),
            },
            None => {
                return Err(AquaError::Validation {
                    message: "credentials required: pass --username/--password or --key/--secret"
                        .to_string(),
                });
            }
        };

        Ok(ProfileRecord {
            deployment: self.deployment_from_flags(),
            csp_endpoint: required(&self.csp_endpoint, "--csp-endpoint")?,
            api_endpoint: self.api_endpoint.clone(),
            credentials,
        })
    }

    /// Ask for every field not given as a flag. On update, an empty answer
    /// keeps the current value.
    fn prompt_record(&self, existing: Option<&Profile>) -> Result<ProfileRecord> {
        let current = existing.map(|p| &p.record);

        let deployment = match self.deployment {
            Some(arg) => arg.into(),
            None => Select::new("Deployment type")
                .filterable(false)
                .option(
                    DemandOption::new(Deployment::Saas)
                        .label("SaaS")
                        .description("Hosted platform; console and API endpoints differ"),
                )
                .option(
                    DemandOption::new(Deployment::OnPremise)
                        .label("On-premise")
                        .description("Self-hosted console that serves the API"),
                )
                .run()
                .map_err(prompt_err)?,
        };

        let csp_endpoint = match &self.csp_endpoint {
            Some(v) => v.clone(),
            None => ask(
                "CSP endpoint:",
                "https://xxxxxxxx.cloud.aquasec.com",
                current.map(|r| r.csp_endpoint.as_str()),
                false,
            )?,
        };

        let api_endpoint = match (&self.api_endpoint, deployment) {
            (Some(v), _) => Some(v.clone()),
            (None, Deployment::Saas) => Some(ask(
                "API endpoint:",
                "https://api.cloudsploit.com",
                current.and_then(|r| r.api_endpoint.as_deref()),
                false,
            )?),
            (None, Deployment::OnPremise) => None,
        };

        let kind = match self.flag_kind()? {
            Some(kind) => kind,
            None => Select::new("Authentication method")
                .filterable(false)
                .option(
                    DemandOption::new(CredentialKind::UsernamePassword)
                        .label("Username and password"),
                )
                .option(
                    DemandOption::new(CredentialKind::ApiKeySecret)
                        .label("API key and secret")
                        .description("Key-based access with an optional role and method list"),
                )
                .run()
                .map_err(prompt_err)?,
        };

        let current_credentials = current.map(|r| &r.credentials);
        let credentials = match kind {
            CredentialKind::UsernamePassword => {
                let (cur_user, cur_pass) = match current_credentials {
                    Some(Credentials::UsernamePassword { username, password }) => {
                        (Some(username.as_str()), Some(password.as_str()))
                    }
                    _ => (None, None),
                };
                Credentials::UsernamePassword {
                    username: or_ask(&self.username, "Username:", "admin", cur_user, false)?,
                    password: or_ask(&self.password, "Password:", "", cur_pass, true)?,
                }
            }
            CredentialKind::ApiKeySecret => {
                let (cur_key, cur_secret, cur_role) = match current_credentials {
                    Some(Credentials::ApiKeySecret {
                        key, secret, role, ..
                    }) => (Some(key.as_str()), Some(secret.as_str()), role.as_deref()),
                    _ => (None, None, None),
                };
                let role = match &self.role {
                    Some(role) => Some(role.clone()),
                    None => Some(ask("Role (optional):", "", cur_role, false)?)
                        .filter(|r| !r.is_empty()),
                };
                let methods = if self.methods.is_empty() {
                    ask("Methods, comma separated (optional):", "ANY", None, false)?
                        .split(',')
                        .map(str::trim)
                        .filter(|m| !m.is_empty())
                        .map(str::to_string)
                        .collect()
                } else {
                    self.methods.clone()
                };
                Credentials::ApiKeySecret {
                    key: or_ask(&self.key, "API key:", "", cur_key, false)?,
                    secret: or_ask(&self.secret, "API secret:", "", cur_secret, true)?,
                    role,
                    methods,
                }
            }
        };

        Ok(ProfileRecord {
            deployment,
            csp_endpoint,
            api_endpoint,
            credentials,
        })
    }
}

fn required(value: &Option<String>, flag: &str) -> Result<String> {
    value.clone().ok_or_else(|| AquaError::Validation {
        message: format!("{} is required when not running interactively", flag),
    })
}

fn or_ask(
    flag: &Option<String>,
    title: &str,
    placeholder: &str,
    current: Option<&str>,
    secret: bool,
) -> Result<String> {
    match flag {
        Some(v) => Ok(v.clone()),
        None => ask(title, placeholder, current, secret),
    }
}

fn ask(title: &str, placeholder: &str, current: Option<&str>, secret: bool) -> Result<String> {
    let mut input = Input::new(title).password(secret);
    match current {
        Some(value) if !secret => input = input.placeholder(value),
        _ if !placeholder.is_empty() => input = input.placeholder(placeholder),
        _ => {}
    }
    if current.is_some() {
        input = input.description("Leave empty to keep the current value");
    }

    let answer = input.run().map_err(prompt_err)?;
    let answer = if secret { answer } else { answer.trim().to_string() };
    match current {
        Some(value) if answer.is_empty() => Ok(value.to_string()),
        _ => Ok(answer),
    }
}

fn prompt_err(e: std::io::Error) -> AquaError {
    AquaError::Prompt(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Commands;
    use clap::Parser;
    use tempfile::TempDir;

    fn setup(args: &[&str]) -> SetupCommand {
        let argv = ["aqua-license", "setup"].iter().chain(args.iter());
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Setup(cmd) => cmd,
            _ => unreachable!(),
        }
    }

    fn temp_store() -> (TempDir, ProfileStore) {
        let dir = TempDir::new().unwrap();
        let store = ProfileStore::new(dir.path().join("aqua"));
        (dir, store)
    }

    const SAAS_USER: &[&str] = &[
        "--username",
        "alice",
        "--password",
        "pw",
        "--csp-endpoint",
        "https://abc.cloud.aquasec.com",
        "--api-endpoint",
        "https://eu-1.api.cloudsploit.com",
    ];

    #[test]
    fn test_record_from_flags_infers_saas() {
        let record = setup(SAAS_USER).record_from_flags().unwrap();
        assert_eq!(record.deployment, Deployment::Saas);
        assert_eq!(
            record.credentials,
            Credentials::UsernamePassword {
                username: "alice".to_string(),
                password: "pw".to_string(),
            }
        );
    }

    #[test]
    fn test_record_from_flags_api_key() {
        let record = setup(&[
            "--key",
            "k",
            "--secret",
            "s",
            "--methods",
            "GET,POST",
            "--csp-endpoint",
            "https://aqua.corp.example",
        ])
        .record_from_flags()
        .unwrap();
        assert_eq!(record.deployment, Deployment::OnPremise);
        assert_eq!(
            record.credentials,
            Credentials::ApiKeySecret {
                key: "k".to_string(),
                secret: "s".to_string(),
                role: None,
                methods: vec!["GET".to_string(), "POST".to_string()],
            }
        );
    }

    #[test]
    fn test_record_from_flags_rejects_mixed_or_missing() {
        assert!(matches!(
            setup(&["--username", "u", "--key", "k"]).record_from_flags(),
            Err(AquaError::Validation { .. })
        ));
        assert!(matches!(
            setup(&["--username", "u", "--csp-endpoint", "https://x.example"])
                .record_from_flags(),
            Err(AquaError::Validation { .. })
        ));
        assert!(matches!(
            setup(&["--csp-endpoint", "https://x.example"]).record_from_flags(),
            Err(AquaError::Validation { .. })
        ));
    }

    #[test]
    fn test_saas_without_api_endpoint_is_rejected() {
        let (_dir, store) = temp_store();
        let cmd = setup(&[
            "prod",
            "--deployment",
            "saas",
            "--username",
            "u",
            "--password",
            "p",
            "--csp-endpoint",
            "https://abc.cloud.aquasec.com",
        ]);
        assert!(matches!(
            cmd.apply("prod", &store, false),
            Err(AquaError::Validation { .. })
        ));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_first_profile_becomes_default() {
        let (_dir, store) = temp_store();

        let outcome = setup(SAAS_USER).apply("first", &store, false).unwrap().unwrap();
        assert!(outcome.is_default);
        assert!(!outcome.updated);

        let outcome = setup(SAAS_USER).apply("second", &store, false).unwrap().unwrap();
        assert!(!outcome.is_default);
        assert_eq!(store.get_default().unwrap().name, "first");

        let mut args = SAAS_USER.to_vec();
        args.push("--default");
        let outcome = setup(&args).apply("third", &store, false).unwrap().unwrap();
        assert!(outcome.is_default);
        assert_eq!(store.get_default().unwrap().name, "third");
    }

    #[test]
    fn test_existing_profile_needs_force() {
        let (_dir, store) = temp_store();
        setup(SAAS_USER).apply("prod", &store, false).unwrap();

        assert!(matches!(
            setup(SAAS_USER).apply("prod", &store, false),
            Err(AquaError::DuplicateProfile { .. })
        ));

        let mut args = vec!["--force"];
        args.extend_from_slice(&[
            "--key",
            "k",
            "--secret",
            "s",
            "--csp-endpoint",
            "https://aqua.corp.example",
        ]);
        let outcome = setup(&args).apply("prod", &store, false).unwrap().unwrap();
        assert!(outcome.updated);
        assert!(outcome.is_default);
        assert_eq!(
            store.get("prod").unwrap().record.kind(),
            CredentialKind::ApiKeySecret
        );
    }
}
