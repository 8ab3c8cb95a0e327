//! Request signing for the Cloudinary upload API.
//!
//! The signature is the hex digest of all signed parameters, sorted by name
//! and joined as `k=v&k=v`, with the API secret appended. `file`,
//! `cloud_name`, `resource_type` and `api_key` are never signed. The digest
//! is SHA-1 unless the account has been switched to SHA-256.

use std::collections::BTreeMap;

use {
    mediahost_config::SignatureAlgorithm,
    sha1::Sha1,
    sha2::{Digest, Sha256},
};

/// Parameters excluded from the string to sign.
const UNSIGNED_PARAMS: &[&str] = &["file", "cloud_name", "resource_type", "api_key"];

/// Build the canonical `k=v&k=v` string. Empty values are skipped.
#[must_use]
pub fn string_to_sign(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .filter(|(k, v)| !v.is_empty() && !UNSIGNED_PARAMS.contains(*k))
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Sign `params` with `api_secret`.
#[must_use]
pub fn sign(
    params: &BTreeMap<&str, String>,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> String {
    let payload = format!("{}{api_secret}", string_to_sign(params));
    match algorithm {
        SignatureAlgorithm::Sha1 => format!("{:x}", Sha1::digest(payload.as_bytes())),
        SignatureAlgorithm::Sha256 => format!("{:x}", Sha256::digest(payload.as_bytes())),
    }
}
