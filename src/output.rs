//! Rendering helpers shared by commands: pretty JSON by default, tables and
//! text with `--verbose`.

use aqua_license_core::{AquaError, Credentials, Profile, Result};
use miette::Diagnostic;
use serde::Serialize;
use tabled::settings::{
    Color, Format, Modify, Style,
    object::Rows,
};
use tabled::{Table, Tabled};

const MASK: &str = "********";

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::empty());

    if console::colors_enabled() {
        table.with(
            Modify::new(Rows::first())
                .with(Color::FG_BRIGHT_BLUE)
                .with(Format::content(|s| format!("\x1b[1m{}\x1b[0m", s))),
        );
    }

    println!("{}", table);
}

/// Machine-readable form of a failed command, printed on stdout in JSON mode.
pub fn error_json(err: &AquaError) -> serde_json::Value {
    serde_json::json!({
        "error": err.to_string(),
        "code": err.code().map(|c| c.to_string()),
    })
}

/// Outcome of a profile mutation.
#[derive(Debug, Serialize)]
pub struct OperationResult<'a> {
    pub success: bool,
    pub action: &'a str,
    pub profile: &'a str,
    pub message: String,
}

impl OperationResult<'_> {
    pub fn render(&self, verbose: bool) -> Result<()> {
        if verbose {
            let check = console::style("✓").green();
            println!("{check} {}", self.message);
            Ok(())
        } else {
            print_json(self)
        }
    }
}

/// Profile view with secrets masked.
#[derive(Debug, Serialize)]
pub struct ProfileView<'a> {
    pub name: &'a str,
    pub is_default: bool,
    pub kind: String,
    pub deployment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub methods: &'a [String],
    pub csp_endpoint: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<&'a str>,
}

impl<'a> From<&'a Profile> for ProfileView<'a> {
    fn from(profile: &'a Profile) -> Self {
        let record = &profile.record;
        let mut view = ProfileView {
            name: &profile.name,
            is_default: profile.is_default,
            kind: record.kind().to_string(),
            deployment: record.deployment.to_string(),
            username: None,
            password: None,
            key: None,
            secret: None,
            role: None,
            methods: &[],
            csp_endpoint: &record.csp_endpoint,
            api_endpoint: record.api_endpoint.as_deref(),
        };
        match &record.credentials {
            Credentials::UsernamePassword { username, .. } => {
                view.username = Some(username);
                view.password = Some(MASK);
            }
            Credentials::ApiKeySecret {
                key, role, methods, ..
            } => {
                view.key = Some(key);
                view.secret = Some(MASK);
                view.role = role.as_deref();
                view.methods = methods;
            }
        }
        view
    }
}

impl ProfileView<'_> {
    /// `field: value` lines for verbose output.
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("Profile", self.name.to_string()),
            ("Default", if self.is_default { "yes" } else { "no" }.to_string()),
            ("Credentials", self.kind.clone()),
            ("Deployment", self.deployment.clone()),
        ];
        if let Some(username) = self.username {
            lines.push(("Username", username.to_string()));
        }
        if let Some(password) = self.password {
            lines.push(("Password", password.to_string()));
        }
        if let Some(key) = self.key {
            lines.push(("API key", key.to_string()));
        }
        if let Some(secret) = self.secret {
            lines.push(("API secret", secret.to_string()));
        }
        if let Some(role) = self.role {
            lines.push(("Role", role.to_string()));
        }
        if !self.methods.is_empty() {
            lines.push(("Methods", self.methods.join(", ")));
        }
        lines.push(("CSP endpoint", self.csp_endpoint.to_string()));
        lines.push((
            "API endpoint",
            self.api_endpoint.unwrap_or("(none)").to_string(),
        ));
        lines
    }
}

pub fn print_lines(lines: &[(&str, String)]) {
    let width = lines.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (key, value) in lines {
        println!("{:width$}  {}", format!("{key}:"), value, width = width + 1);
    }
}
