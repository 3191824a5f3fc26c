use crate::record::CredentialKind;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum AquaError {
    // ========================================================================
    // Profile Errors
    // ========================================================================
    #[error("Invalid profile: {message}")]
    #[diagnostic(
        code(aqua::profile::invalid),
        help("Check the profile name, endpoints and credential fields and try again")
    )]
    Validation { message: String },

    #[error("Profile '{profile}' already exists")]
    #[diagnostic(
        code(aqua::profile::already_exists),
        help(
            "To replace it:\n  • Overwrite: aqua-license setup {profile} --force\n  • Remove first: aqua-license profile delete {profile}"
        )
    )]
    DuplicateProfile { profile: String },

    #[error("Profile '{profile}' not found")]
    #[diagnostic(
        code(aqua::profile::not_found),
        help(
            "{suggest}Available profiles: {available}",
            suggest = suggestion.as_ref().map(|s| format!("{}\n", s)).unwrap_or_default(),
            available = if available_profiles.is_empty() {
                "(none, run 'aqua-license setup' to create one)".to_string()
            } else {
                available_profiles.join(", ")
            }
        )
    )]
    ProfileNotFound {
        profile: String,
        available_profiles: Vec<String>,
        suggestion: Option<String>,
    },

    #[error("No default profile is set")]
    #[diagnostic(
        code(aqua::profile::no_default),
        help("Choose one with: aqua-license profile set-default <name>")
    )]
    NoDefaultProfile,

    // ========================================================================
    // Resolution Errors
    // ========================================================================
    #[error("{}", incomplete_message(*kind, missing))]
    #[diagnostic(
        code(aqua::credentials::incomplete),
        help(
            "Set the missing environment variables, or unset all AQUA_* / CSP_ENDPOINT variables to use a stored profile"
        )
    )]
    IncompleteCredentials {
        /// `None` when no credential variable is set at all
        kind: Option<CredentialKind>,
        missing: Vec<&'static str>,
    },

    #[error("No credentials available")]
    #[diagnostic(
        code(aqua::credentials::unavailable),
        help(
            "You can:\n  1. Run 'aqua-license setup' to store a profile\n  2. Set environment variables (AQUA_USER/AQUA_PASSWORD or AQUA_KEY/AQUA_SECRET, plus CSP_ENDPOINT)\n  3. Pick a stored profile with -p <name>"
        )
    )]
    NoCredentialsAvailable,

    // ========================================================================
    // Store Errors
    // ========================================================================
    #[error("Refusing to use profile store with insecure permissions: {}", path.display())]
    #[diagnostic(
        code(aqua::store::permission),
        help("{details}\nThe store file must be owner-only (chmod 600) and its directory not writable by others (chmod go-w)")
    )]
    Permission { path: PathBuf, details: String },

    #[error("Profile store is locked by another process: {}", path.display())]
    #[diagnostic(
        code(aqua::store::locked),
        help(
            "Gave up after {waited_ms} ms. Retry once the other aqua-license invocation finishes, or raise AQUA_LOCK_TIMEOUT_MS"
        )
    )]
    StoreLocked { path: PathBuf, waited_ms: u64 },

    #[error("Profile store is not valid TOML: {}", path.display())]
    #[diagnostic(
        code(aqua::store::corrupted),
        help("Fix or remove the file; it is never overwritten automatically")
    )]
    StoreCorrupted {
        path: PathBuf,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("Failed to serialize profile store to TOML")]
    #[diagnostic(code(aqua::store::serialize_failed))]
    StoreSerialize {
        #[source]
        source: toml_edit::ser::Error,
    },

    #[error("Profile store I/O failed: {}", path.display())]
    #[diagnostic(
        code(aqua::store::io),
        help("Check that the config directory exists and is writable by you")
    )]
    StoreIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ========================================================================
    // Input/Output Errors
    // ========================================================================
    #[error("Prompt failed: {0}")]
    #[diagnostic(code(aqua::io::prompt))]
    Prompt(String),

    #[error("I/O error: {0}")]
    #[diagnostic(code(aqua::io::error))]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(aqua::json::error))]
    Json(String),
}

impl AquaError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        AquaError::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn store_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AquaError::StoreIo {
            path: path.into(),
            source,
        }
    }
}

fn incomplete_message(kind: Option<CredentialKind>, missing: &[&str]) -> String {
    match kind {
        Some(kind) => format!(
            "Incomplete {} credentials in environment: missing {}",
            kind,
            missing.join(", ")
        ),
        None => format!(
            "No credential variables set in environment (expected {})",
            missing.join(", ")
        ),
    }
}

impl From<serde_json::Error> for AquaError {
    fn from(err: serde_json::Error) -> Self {
        AquaError::Json(err.to_string())
    }
}

impl From<toml_edit::ser::Error> for AquaError {
    fn from(source: toml_edit::ser::Error) -> Self {
        AquaError::StoreSerialize { source }
    }
}

pub type Result<T> = std::result::Result<T, AquaError>;
