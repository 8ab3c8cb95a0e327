//! Configuration loading, validation and env substitution for mediahost.
//!
//! Config files: `mediahost.toml`, `mediahost.yaml`, or `mediahost.json`
//! Searched in `./` then `~/.config/mediahost/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values. Media host
//! credentials are finally overlaid from `CLOUDINARY_URL` or the individual
//! `CLOUDINARY_*` variables.

pub mod env_subst;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    error::{Error, Result},
    loader::{apply_env_overrides, config_dir, discover_and_load, load_config, parse_cloudinary_url},
    schema::{MediaHostConfig, PlaceholderStyle, SignatureAlgorithm, parse_hex_color},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
