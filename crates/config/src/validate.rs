//! Configuration validation.
//!
//! Checks value shapes (colours, sizes, URLs) and reports missing
//! credentials as warnings only. Missing credentials never block startup;
//! the host rejects unauthenticated calls at request time.

use crate::schema::{MediaHostConfig, parse_hex_color};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "credentials", "type-error", "security"
    pub category: &'static str,
    /// Dotted path, e.g. "placeholder.background"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity, self.category, self.path, self.message
        )
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(
        &mut self,
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(Diagnostic {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate a loaded configuration.
#[must_use]
pub fn validate(config: &MediaHostConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_credentials(config, &mut result);
    check_api_base(&config.api_base, &mut result);

    for (path, folder) in [
        ("upload_folder", &config.upload_folder),
        ("placeholder_folder", &config.placeholder_folder),
    ] {
        if folder.trim().is_empty() {
            result.push(Severity::Error, "type-error", path, "folder must not be empty");
        } else if folder.starts_with('/') || folder.ends_with('/') {
            result.push(
                Severity::Warning,
                "type-error",
                path,
                "leading or trailing '/' creates an empty folder segment",
            );
        }
    }

    if config.timeout_secs == 0 {
        result.push(
            Severity::Error,
            "type-error",
            "timeout_secs",
            "timeout must be at least one second",
        );
    }

    let style = &config.placeholder;
    for (path, color) in [
        ("placeholder.background", &style.background),
        ("placeholder.text_color", &style.text_color),
    ] {
        if parse_hex_color(color).is_none() {
            result.push(
                Severity::Error,
                "type-error",
                path,
                format!("expected #RRGGBB, got {color:?}"),
            );
        }
    }
    for (path, value) in [
        ("placeholder.width", style.width),
        ("placeholder.height", style.height),
        ("placeholder.font_size", style.font_size),
    ] {
        if value == 0 {
            result.push(Severity::Error, "type-error", path, "must be greater than zero");
        }
    }

    result
}

fn check_credentials(config: &MediaHostConfig, result: &mut ValidationResult) {
    use secrecy::ExposeSecret;

    if config.cloud_name.as_deref().is_none_or(|c| c.trim().is_empty()) {
        result.push(
            Severity::Warning,
            "credentials",
            "cloud_name",
            "not set; uploads will be rejected by the host (set CLOUDINARY_CLOUD_NAME)",
        );
    }
    for (path, secret, var) in [
        ("api_key", &config.api_key, "CLOUDINARY_API_KEY"),
        ("api_secret", &config.api_secret, "CLOUDINARY_API_SECRET"),
    ] {
        if secret
            .as_ref()
            .is_none_or(|s| s.expose_secret().trim().is_empty())
        {
            result.push(
                Severity::Warning,
                "credentials",
                path,
                format!("not set; requests will fail host authentication (set {var})"),
            );
        }
    }
}

fn check_api_base(api_base: &str, result: &mut ValidationResult) {
    match url::Url::parse(api_base) {
        Ok(url) if url.scheme() == "https" => {},
        Ok(url) if url.scheme() == "http" => result.push(
            Severity::Warning,
            "security",
            "api_base",
            "plain http sends signed requests unencrypted",
        ),
        Ok(url) => result.push(
            Severity::Error,
            "type-error",
            "api_base",
            format!("unsupported scheme {}://", url.scheme()),
        ),
        Err(e) => result.push(
            Severity::Error,
            "type-error",
            "api_base",
            format!("invalid URL: {e}"),
        ),
    }
}
