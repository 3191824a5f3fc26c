//! Persisted profile records and their validation rules.

use crate::error::{AquaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};
use url::Url;

/// Endpoint topology of a platform deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Deployment {
    /// Hosted platform; console and API live on different hosts
    Saas,
    /// Self-hosted console that also serves the API
    OnPremise,
}

/// Which credential variant a profile or context carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CredentialKind {
    UsernamePassword,
    ApiKeySecret,
}

/// Credential fields, tagged by kind in the store file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credentials {
    UsernamePassword {
        username: String,
        password: String,
    },
    ApiKeySecret {
        key: String,
        secret: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        methods: Vec<String>,
    },
}

impl Credentials {
    pub fn kind(&self) -> CredentialKind {
        match self {
            Credentials::UsernamePassword { .. } => CredentialKind::UsernamePassword,
            Credentials::ApiKeySecret { .. } => CredentialKind::ApiKeySecret,
        }
    }

    /// Non-secret identifier: the username or the API key.
    pub fn principal(&self) -> &str {
        match self {
            Credentials::UsernamePassword { username, .. } => username,
            Credentials::ApiKeySecret { key, .. } => key,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Credentials::UsernamePassword { username, password } => {
                require_field("username", username)?;
                require_field("password", password)
            }
            Credentials::ApiKeySecret {
                key,
                secret,
                role,
                methods,
            } => {
                require_field("key", key)?;
                require_field("secret", secret)?;
                if let Some(role) = role {
                    require_field("role", role)?;
                }
                if methods.iter().any(|m| m.trim().is_empty()) {
                    return Err(AquaError::validation("methods must not contain empty entries"));
                }
                Ok(())
            }
        }
    }
}

// Secrets never reach logs or panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::UsernamePassword { username, .. } => f
                .debug_struct("UsernamePassword")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::ApiKeySecret {
                key, role, methods, ..
            } => f
                .debug_struct("ApiKeySecret")
                .field("key", key)
                .field("secret", &"<redacted>")
                .field("role", role)
                .field("methods", methods)
                .finish(),
        }
    }
}

/// A stored profile, keyed by name in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileRecord {
    pub deployment: Deployment,

    /// Console (CSP) URL
    pub csp_endpoint: String,

    /// API URL; required for SaaS, optional for on-premise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,

    pub credentials: Credentials,
}

impl ProfileRecord {
    pub fn kind(&self) -> CredentialKind {
        self.credentials.kind()
    }

    /// Check endpoint topology and credential fields.
    pub fn validate(&self) -> Result<()> {
        validate_endpoints(
            self.deployment,
            &self.csp_endpoint,
            self.api_endpoint.as_deref(),
        )?;
        self.credentials.validate()
    }
}

/// Endpoint rules shared by stored profiles and environment contexts.
///
/// SaaS needs both endpoints. On-premise may only carry an API endpoint that
/// shares the console's authority.
pub fn validate_endpoints(
    deployment: Deployment,
    csp_endpoint: &str,
    api_endpoint: Option<&str>,
) -> Result<()> {
    let csp = parse_endpoint("csp_endpoint", csp_endpoint)?;
    let api = api_endpoint
        .map(|raw| parse_endpoint("api_endpoint", raw))
        .transpose()?;

    match (deployment, api) {
        (Deployment::Saas, None) => Err(AquaError::validation(
            "SaaS deployments require api_endpoint",
        )),
        (Deployment::Saas, Some(_)) => Ok(()),
        (Deployment::OnPremise, None) => Ok(()),
        (Deployment::OnPremise, Some(api)) => {
            if authority(&api) == authority(&csp) {
                Ok(())
            } else {
                Err(AquaError::validation(format!(
                    "on-premise api_endpoint '{}' does not match the console endpoint '{}'",
                    api_endpoint.unwrap_or_default(),
                    csp_endpoint
                )))
            }
        }
    }
}

fn parse_endpoint(field: &str, raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AquaError::validation(format!("{} '{}' is not a valid URL: {}", field, raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AquaError::validation(format!(
            "{} '{}' must use http or https",
            field, raw
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(AquaError::validation(format!(
            "{} '{}' has no host",
            field, raw
        )));
    }
    Ok(url)
}

fn authority(url: &Url) -> (Option<String>, Option<u16>) {
    (
        url.host_str().map(str::to_ascii_lowercase),
        url.port_or_known_default(),
    )
}

fn require_field(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AquaError::validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Validates that a profile name is a usable store key.
///
/// Rejects empty names, `.`/`..`, path separators and control characters.
pub fn is_valid_profile_name(name: &str) -> bool {
    if name.is_empty() || name == "." || name == ".." {
        return false;
    }

    !name
        .chars()
        .any(|ch| matches!(ch, '/' | '\\' | '\0') || ch.is_control())
}

pub(crate) fn validate_profile_name(name: &str) -> Result<()> {
    if is_valid_profile_name(name) {
        Ok(())
    } else {
        Err(AquaError::validation(format!(
            "profile name '{}' must be non-empty and contain no path separators or control characters",
            name.escape_default()
        )))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn saas_record(username: &str) -> ProfileRecord {
        ProfileRecord {
            deployment: Deployment::Saas,
            csp_endpoint: "https://abc123.cloud.aquasec.com".to_string(),
            api_endpoint: Some("https://eu-1.api.cloudsploit.com".to_string()),
            credentials: Credentials::UsernamePassword {
                username: username.to_string(),
                password: "hunter2".to_string(),
            },
        }
    }

    pub(crate) fn on_prem_api_key_record() -> ProfileRecord {
        ProfileRecord {
            deployment: Deployment::OnPremise,
            csp_endpoint: "https://aqua.internal.example:8443".to_string(),
            api_endpoint: None,
            credentials: Credentials::ApiKeySecret {
                key: "AKID".to_string(),
                secret: "shh".to_string(),
                role: Some("Administrator".to_string()),
                methods: vec!["ANY".to_string()],
            },
        }
    }

    #[test]
    fn test_valid_records() {
        saas_record("alice").validate().unwrap();
        on_prem_api_key_record().validate().unwrap();
    }

    #[test]
    fn test_saas_requires_api_endpoint() {
        let mut record = saas_record("alice");
        record.api_endpoint = None;
        let err = record.validate().unwrap_err();
        assert!(matches!(err, AquaError::Validation { .. }), "{err:?}");
    }

    #[test]
    fn test_on_prem_api_endpoint_must_share_authority() {
        let mut record = on_prem_api_key_record();
        record.api_endpoint = Some("https://aqua.internal.example:8443/api".to_string());
        record.validate().unwrap();

        record.api_endpoint = Some("https://eu-1.api.cloudsploit.com".to_string());
        assert!(matches!(
            record.validate(),
            Err(AquaError::Validation { .. })
        ));
    }

    #[test]
    fn test_malformed_endpoints() {
        for bad in ["", "not a url", "ftp://aqua.example", "https://", "aqua.example.com"] {
            let mut record = saas_record("alice");
            record.csp_endpoint = bad.to_string();
            assert!(
                matches!(record.validate(), Err(AquaError::Validation { .. })),
                "accepted csp_endpoint {bad:?}"
            );
        }
    }

    #[test]
    fn test_empty_credential_fields() {
        let mut record = saas_record("alice");
        record.credentials = Credentials::UsernamePassword {
            username: "alice".to_string(),
            password: " ".to_string(),
        };
        assert!(matches!(
            record.validate(),
            Err(AquaError::Validation { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", on_prem_api_key_record());
        assert!(debug.contains("AKID"));
        assert!(!debug.contains("shh"));
        let debug = format!("{:?}", saas_record("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_valid_profile_names() {
        assert!(is_valid_profile_name("production"));
        assert!(is_valid_profile_name("Prod"));
        assert!(is_valid_profile_name("test-env_2"));
        assert!(is_valid_profile_name("prod-v2.0"));
    }

    #[test]
    fn test_invalid_profile_names() {
        assert!(!is_valid_profile_name(""));
        assert!(!is_valid_profile_name("."));
        assert!(!is_valid_profile_name(".."));
        assert!(!is_valid_profile_name("../production"));
        assert!(!is_valid_profile_name("C:\\Windows"));
        assert!(!is_valid_profile_name("prod\0uction"));
        assert!(!is_valid_profile_name("prod\ntest"));
    }

    #[test]
    fn test_deployment_display() {
        assert_eq!(Deployment::OnPremise.to_string(), "on_premise");
        assert_eq!(
            "saas".parse::<Deployment>().unwrap(),
            Deployment::Saas
        );
        assert_eq!(CredentialKind::ApiKeySecret.to_string(), "api_key_secret");
    }
}
