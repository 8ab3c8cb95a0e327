use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{
    env_subst::substitute_env,
    error::{Context, Error, Result},
    schema::MediaHostConfig,
};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "mediahost.toml",
    "mediahost.yaml",
    "mediahost.yml",
    "mediahost.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> Result<MediaHostConfig> {
    let raw = std::fs::read_to_string(path).map_err(|e| Error::read(path, e))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations, then overlay the
/// `CLOUDINARY_*` environment.
///
/// Search order:
/// 1. `./mediahost.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/mediahost/mediahost.{toml,yaml,yml,json}` (user-global)
///
/// Falls back to `MediaHostConfig::default()` when no file is found or the
/// file fails to parse.
pub fn discover_and_load() -> MediaHostConfig {
    let mut config = MediaHostConfig::default();
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => config = cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    apply_env_overrides(&mut config);
    config
}

/// Overlay credentials from the process environment.
///
/// `CLOUDINARY_URL` is applied first; the individual variables win over it.
pub fn apply_env_overrides(config: &mut MediaHostConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

fn apply_env_overrides_with(
    config: &mut MediaHostConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(raw) = lookup("CLOUDINARY_URL") {
        match parse_cloudinary_url(&raw) {
            Ok((cloud, key, secret)) => {
                config.cloud_name = Some(cloud);
                config.api_key = Some(Secret::new(key));
                config.api_secret = Some(Secret::new(secret));
            },
            Err(e) => warn!(error = %e, "ignoring malformed CLOUDINARY_URL"),
        }
    }
    if let Some(cloud) = lookup("CLOUDINARY_CLOUD_NAME") {
        config.cloud_name = Some(cloud);
    }
    if let Some(key) = lookup("CLOUDINARY_API_KEY") {
        config.api_key = Some(Secret::new(key));
    }
    if let Some(secret) = lookup("CLOUDINARY_API_SECRET") {
        config.api_secret = Some(Secret::new(secret));
    }
}

/// Split `cloudinary://<api_key>:<api_secret>@<cloud_name>` into its parts.
pub fn parse_cloudinary_url(raw: &str) -> Result<(String, String, String)> {
    let parsed = url::Url::parse(raw.trim()).context("invalid CLOUDINARY_URL")?;
    if parsed.scheme() != "cloudinary" {
        return Err(Error::message(format!(
            "CLOUDINARY_URL must use the cloudinary:// scheme, got {}://",
            parsed.scheme()
        )));
    }
    let cloud = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .context("CLOUDINARY_URL has no cloud name")?;
    let key = Some(parsed.username())
        .filter(|u| !u.is_empty())
        .context("CLOUDINARY_URL has no api key")?;
    let secret = parsed
        .password()
        .filter(|p| !p.is_empty())
        .context("CLOUDINARY_URL has no api secret")?;
    Ok((cloud.to_string(), key.to_string(), secret.to_string()))
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    // Project-local
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/mediahost/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "mediahost").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> Result<MediaHostConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => Err(Error::UnsupportedFormat(ext.to_string())),
    }
}
