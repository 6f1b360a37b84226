// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The certificate store. Resolves a caller telephone number to a `CertHandle` exposing
//! `public_key_url()`/`private_key()`, backed by the `[store]`/`[[certificate]]` configuration
//! sections.
//!
//! Real deployments may back this with a reference-counted, pluggable object system; here it is a
//! thin, `Arc`-backed resolver over the loaded `Config`, which gives the same reference-counted
//! handle semantics without needing an external collaborator in tests.

use crate::config::substitutions::substitute;
use crate::config::{CertificateConfig, Config};
use crate::errors::ConfigError;
use std::sync::Arc;

pub trait CertificateStore: Send + Sync {
    fn by_caller_tn(&self, tn: &str) -> Option<CertHandle>;
}

/// A reference-counted handle to a resolved certificate. Cloning increments the reference count;
/// dropping the last clone releases it. `release` is provided to mirror an explicit
/// acquire/release protocol some callers expect, though in this in-process implementation it is
/// equivalent to dropping the handle.
#[derive(Clone)]
pub struct CertHandle {
    public_key_url: String,
    private_key_path: Arc<str>,
}

impl CertHandle {
    pub fn public_key_url(&self) -> &str {
        &self.public_key_url
    }

    pub fn private_key(&self) -> &str {
        &self.private_key_path
    }

    #[cfg(test)]
    pub(crate) fn for_test(public_key_url: &str, private_key_path: &str) -> Self {
        CertHandle {
            public_key_url: public_key_url.to_string(),
            private_key_path: private_key_path.into(),
        }
    }
}

pub struct ConfigCertificateStore {
    config: Config,
}

impl ConfigCertificateStore {
    pub fn new(config: Config) -> Self {
        ConfigCertificateStore { config }
    }

    fn find_override(&self, tn: &str) -> Option<&CertificateConfig> {
        self.config.certificates.iter().find(|cert| cert.id == tn)
    }

    /// Resolves `tn` via a [[certificate]] override first, falling back to the generic
    /// `[store]` template. Returns `Ok(None)` (rather than an error) when neither applies — the
    /// caller surfaces that as `NoCertificateError`.
    fn resolve(&self, tn: &str) -> Result<Option<CertHandle>, ConfigError> {
        let vars = [("CERTIFICATE", tn)];

        if let Some(over) = self.find_override(tn) {
            let store = self.config.store.as_ref();
            let private_key_path = match (&over.path, store) {
                (Some(path), _) => path.clone(),
                (None, Some(store)) => substitute(&store.path, &vars)?,
                (None, None) => return Ok(None),
            };
            let public_key_url = match (&over.public_key_url, store) {
                (Some(url), _) => url.clone(),
                (None, Some(store)) => substitute(&store.public_key_url, &vars)?,
                (None, None) => return Ok(None),
            };
            return Ok(Some(CertHandle {
                public_key_url,
                private_key_path: private_key_path.into(),
            }));
        }

        let Some(store) = self.config.store.as_ref() else {
            return Ok(None);
        };
        Ok(Some(CertHandle {
            public_key_url: substitute(&store.public_key_url, &vars)?,
            private_key_path: substitute(&store.path, &vars)?.into(),
        }))
    }
}

impl CertificateStore for ConfigCertificateStore {
    fn by_caller_tn(&self, tn: &str) -> Option<CertHandle> {
        self.resolve(tn).ok().flatten()
    }
}

pub fn release(_handle: CertHandle) {}
