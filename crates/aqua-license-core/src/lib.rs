//! Credential profile store and resolution for aqua-license.
//!
//! [`ProfileStore`] persists named profiles in a per-user TOML file with
//! locked, rename-based writes. [`resolve_credentials`] turns CLI overrides,
//! an environment snapshot and the store into one [`CredentialContext`].

pub mod context;
pub mod env;
pub mod error;
pub mod lock;
pub mod record;
pub mod resolver;
pub mod store;
pub mod suggest;

pub use context::{ContextSource, CredentialContext};
pub use env::EnvVars;
pub use error::{AquaError, Result};
pub use record::{CredentialKind, Credentials, Deployment, ProfileRecord};
pub use resolver::{CliOverrides, ProfileResolver, resolve_credentials};
pub use store::{Profile, ProfileStore};
