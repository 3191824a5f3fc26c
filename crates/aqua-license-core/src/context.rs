//! The resolved credential set for a single invocation.

use crate::record::{CredentialKind, Credentials, Deployment, ProfileRecord};
use serde::Serialize;
use std::fmt;

/// Where a [`CredentialContext`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum ContextSource {
    /// A stored profile, named explicitly or as the default
    Profile(String),
    /// The AQUA_* / CSP_ENDPOINT environment variables
    Environment,
}

impl fmt::Display for ContextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextSource::Profile(name) => write!(f, "profile '{}'", name),
            ContextSource::Environment => write!(f, "environment"),
        }
    }
}

/// Immutable credentials handed to the API client.
///
/// Only the resolver constructs one, and only after validation. All fields
/// come from a single layer.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialContext {
    source: ContextSource,
    deployment: Deployment,
    csp_endpoint: String,
    api_endpoint: Option<String>,
    credentials: Credentials,
}

impl CredentialContext {
    pub(crate) fn new(
        source: ContextSource,
        deployment: Deployment,
        csp_endpoint: String,
        api_endpoint: Option<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            source,
            deployment,
            csp_endpoint,
            api_endpoint,
            credentials,
        }
    }

    pub(crate) fn from_profile(name: String, record: ProfileRecord) -> Self {
        Self::new(
            ContextSource::Profile(name),
            record.deployment,
            record.csp_endpoint,
            record.api_endpoint,
            record.credentials,
        )
    }

    pub fn source(&self) -> &ContextSource {
        &self.source
    }

    pub fn deployment(&self) -> Deployment {
        self.deployment
    }

    pub fn kind(&self) -> CredentialKind {
        self.credentials.kind()
    }

    pub fn csp_endpoint(&self) -> &str {
        &self.csp_endpoint
    }

    pub fn api_endpoint(&self) -> Option<&str> {
        self.api_endpoint.as_deref()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Serializable view with secrets removed.
    pub fn summary(&self) -> ContextSummary<'_> {
        let (role, methods) = match &self.credentials {
            Credentials::ApiKeySecret { role, methods, .. } => (role.as_deref(), methods.as_slice()),
            Credentials::UsernamePassword { .. } => (None, &[][..]),
        };
        ContextSummary {
            source: &self.source,
            kind: self.kind(),
            deployment: self.deployment,
            principal: self.credentials.principal(),
            role,
            methods,
            csp_endpoint: &self.csp_endpoint,
            api_endpoint: self.api_endpoint.as_deref(),
        }
    }
}

impl fmt::Debug for CredentialContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialContext")
            .field("source", &self.source)
            .field("deployment", &self.deployment)
            .field("csp_endpoint", &self.csp_endpoint)
            .field("api_endpoint", &self.api_endpoint)
            .field("credentials", &self.credentials)
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct ContextSummary<'a> {
    pub source: &'a ContextSource,
    pub kind: CredentialKind,
    pub deployment: Deployment,
    pub principal: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub methods: &'a [String],
    pub csp_endpoint: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::{on_prem_api_key_record, saas_record};

    #[test]
    fn test_summary_has_no_secrets() {
        let ctx = CredentialContext::from_profile("p".to_string(), on_prem_api_key_record());
        let json = serde_json::to_string(&ctx.summary()).unwrap();
        assert!(json.contains("\"principal\":\"AKID\""));
        assert!(json.contains("\"source\":{\"type\":\"profile\",\"name\":\"p\"}"));
        assert!(!json.contains("shh"));
        assert!(!format!("{ctx:?}").contains("shh"));
    }

    #[test]
    fn test_environment_source_serialization() {
        let record = saas_record("alice");
        let ctx = CredentialContext::new(
            ContextSource::Environment,
            record.deployment,
            record.csp_endpoint,
            record.api_endpoint,
            record.credentials,
        );
        let value = serde_json::to_value(ctx.summary()).unwrap();
        assert_eq!(value["source"]["type"], "environment");
        assert_eq!(value["kind"], "username_password");
        assert_eq!(value["deployment"], "saas");
        assert!(value.get("role").is_none());
        assert_eq!(ctx.source().to_string(), "environment");
    }
}
