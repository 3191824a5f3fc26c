//! Credential resolution for one invocation.
//!
//! Precedence, highest first:
//! 1. an explicitly named profile (`-p <name>`)
//! 2. the `AQUA_*` / `CSP_ENDPOINT` environment variables
//! 3. the stored default profile
//!
//! Exactly one layer supplies every field of the result.

use crate::context::{ContextSource, CredentialContext};
use crate::env::{
    AQUA_ENDPOINT, AQUA_KEY, AQUA_METHODS, AQUA_PASSWORD, AQUA_ROLE, AQUA_SECRET, AQUA_USER,
    CSP_ENDPOINT, EnvVars,
};
use crate::error::{AquaError, Result};
use crate::record::{CredentialKind, Credentials, Deployment, validate_endpoints};
use crate::store::ProfileStore;

/// Options supplied on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub profile: Option<String>,
}

impl CliOverrides {
    pub fn profile(name: impl Into<String>) -> Self {
        Self {
            profile: Some(name.into()),
        }
    }
}

pub struct ProfileResolver<'a> {
    store: &'a ProfileStore,
}

impl<'a> ProfileResolver<'a> {
    pub fn new(store: &'a ProfileStore) -> Self {
        Self { store }
    }

    pub fn resolve(&self, overrides: &CliOverrides, env: &EnvVars) -> Result<CredentialContext> {
        let context = if let Some(name) = &overrides.profile {
            tracing::debug!("Resolving credentials from explicit profile '{}'", name);
            let profile = self.store.get(name)?;
            CredentialContext::from_profile(profile.name, profile.record)
        } else if !env.is_empty() {
            tracing::debug!(
                "Resolving credentials from environment ({})",
                env.names().join(", ")
            );
            from_environment(env)?
        } else {
            tracing::debug!("Resolving credentials from the default profile");
            let profile = self.store.get_default().map_err(|e| match e {
                AquaError::NoDefaultProfile => AquaError::NoCredentialsAvailable,
                other => other,
            })?;
            CredentialContext::from_profile(profile.name, profile.record)
        };

        validate_endpoints(
            context.deployment(),
            context.csp_endpoint(),
            context.api_endpoint(),
        )?;

        tracing::debug!(
            "Using {} credentials from {}",
            context.kind(),
            context.source()
        );
        Ok(context)
    }
}

/// Resolve the credentials for this invocation.
pub fn resolve_credentials(
    store: &ProfileStore,
    overrides: &CliOverrides,
    env: &EnvVars,
) -> Result<CredentialContext> {
    ProfileResolver::new(store).resolve(overrides, env)
}

fn from_environment(env: &EnvVars) -> Result<CredentialContext> {
    let has_user = env.contains(AQUA_USER) || env.contains(AQUA_PASSWORD);
    let has_key = env.contains(AQUA_KEY) || env.contains(AQUA_SECRET);

    let credentials = match (has_user, has_key) {
        (true, true) => {
            return Err(AquaError::validation(format!(
                "both {}/{} and {}/{} are set; set only one credential kind",
                AQUA_USER, AQUA_PASSWORD, AQUA_KEY, AQUA_SECRET
            )));
        }
        (true, false) => {
            let (username, password) = require_pair(
                env,
                CredentialKind::UsernamePassword,
                AQUA_USER,
                AQUA_PASSWORD,
            )?;
            Credentials::UsernamePassword { username, password }
        }
        (false, true) => {
            let (key, secret) =
                require_pair(env, CredentialKind::ApiKeySecret, AQUA_KEY, AQUA_SECRET)?;
            Credentials::ApiKeySecret {
                key,
                secret,
                role: env.get(AQUA_ROLE).map(str::to_string),
                methods: env.get(AQUA_METHODS).map(parse_methods).unwrap_or_default(),
            }
        }
        (false, false) => {
            return Err(AquaError::IncompleteCredentials {
                kind: None,
                missing: vec![AQUA_USER, AQUA_PASSWORD, AQUA_KEY, AQUA_SECRET],
            });
        }
    };

    let Some(csp_endpoint) = env.get(CSP_ENDPOINT) else {
        return Err(AquaError::IncompleteCredentials {
            kind: Some(credentials.kind()),
            missing: vec![CSP_ENDPOINT],
        });
    };

    let api_endpoint = env.get(AQUA_ENDPOINT).map(str::to_string);
    let deployment = if api_endpoint.is_some() {
        Deployment::Saas
    } else {
        Deployment::OnPremise
    };

    Ok(CredentialContext::new(
        ContextSource::Environment,
        deployment,
        csp_endpoint.to_string(),
        api_endpoint,
        credentials,
    ))
}

fn require_pair(
    env: &EnvVars,
    kind: CredentialKind,
    first: &'static str,
    second: &'static str,
) -> Result<(String, String)> {
    match (env.get(first), env.get(second)) {
        (Some(a), Some(b)) => Ok((a.to_string(), b.to_string())),
        (a, b) => {
            let missing = [(first, a), (second, b)]
                .into_iter()
                .filter(|(_, value)| value.is_none())
                .map(|(name, _)| name)
                .collect();
            Err(AquaError::IncompleteCredentials {
                kind: Some(kind),
                missing,
            })
        }
    }
}

fn parse_methods(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
