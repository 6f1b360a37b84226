// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loading. Splits a `Paths` helper (cache directory detection) from a
//! deserializable `Config` tree loaded with `toml_edit` + `serde`, read once at `Core::load`
//! time and never again.

pub mod paths;
pub mod substitutions;

pub use paths::Paths;

use crate::errors::ConfigError;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CACHE_MAX_SIZE: usize = 1000;
const DEFAULT_CURL_TIMEOUT_SECS: u64 = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    pub store: Option<StoreConfig>,
    #[serde(default, rename = "certificate")]
    pub certificates: Vec<CertificateConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    pub ca_file: Option<String>,
    pub ca_path: Option<String>,
    #[serde(default = "default_cache_max_size")]
    pub cache_max_size: usize,
    #[serde(default = "default_curl_timeout")]
    pub curl_timeout: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            ca_file: None,
            ca_path: None,
            cache_max_size: default_cache_max_size(),
            curl_timeout: default_curl_timeout(),
        }
    }
}

fn default_cache_max_size() -> usize {
    DEFAULT_CACHE_MAX_SIZE
}

fn default_curl_timeout() -> u64 {
    DEFAULT_CURL_TIMEOUT_SECS
}

/// Signing-side certificate discovery: a template resolved per caller TN via
/// `${CERTIFICATE}` substitution, unless a [[certificate]] entry overrides it outright.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    pub path: String,
    pub public_key_url: String,
}

/// A per-certificate override (`certificate.path`/`certificate.public_key_url`), keyed by the
/// caller telephone number it applies to.
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateConfig {
    pub id: String,
    pub path: Option<String>,
    pub public_key_url: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| ConfigError::Read(path.to_path_buf(), err))?;
        let config: Config = toml_edit::de::from_str(&raw)
            .map_err(|err| ConfigError::Parse(path.to_path_buf(), err))?;
        if let Some(store) = &config.store {
            substitutions::require_certificate_placeholder(&store.public_key_url)?;
        }
        for certificate in &config.certificates {
            if let Some(path) = &certificate.path {
                validate_certificate_key(&certificate.id, Path::new(path))?;
            }
        }
        Ok(config)
    }
}

/// Checks that a `[[certificate]]` override's `path` points at a PEM file that actually parses
/// as a PKCS8 ECDSA-P256 private key, so a misconfigured override is caught at load time rather
/// than on the first `sign` call that resolves to it.
fn validate_certificate_key(certificate: &str, path: &Path) -> Result<(), ConfigError> {
    let pem = std::fs::read_to_string(path)
        .map_err(|err| ConfigError::CertificateKeyLoadFailed {
            certificate: certificate.to_string(),
            source: stir_shaken_trust::Error::InvalidKey(err.to_string()),
        })?;
    stir_shaken_trust::crypto::EcdsaPrivateKey::from_pkcs8_pem(&pem).map_err(|source| {
        ConfigError::CertificateKeyLoadFailed {
            certificate: certificate.to_string(),
            source,
        }
    })?;
    Ok(())
}
