// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `Core` facade: the process-wide configuration handle and KV the original C module kept as
//! globals, reshaped into an explicit struct constructed at `load` time and threaded through
//! every call instead.

use crate::cert_store::{CertificateStore, ConfigCertificateStore};
use crate::config::{Config, Paths};
use crate::errors::{ConfigError, Error};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::key_store::KeyStore;
use crate::kv::{FileKeyValueStore, KeyValueStore};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use stir_shaken_trust::payload::Payload;

/// The signing-and-verification engine, holding every external collaborator left pluggable
/// (KV store, fetcher, certificate store) plus the configuration read at load time.
pub struct Core {
    key_store: KeyStore,
    fetcher: Arc<dyn Fetcher>,
    cert_store: Arc<dyn CertificateStore>,
    keys_dir: PathBuf,
}

impl Core {
    /// Loads configuration from `config_path`, detects the data/cache directories, and wires up
    /// the production collaborators (`FileKeyValueStore`, `HttpFetcher`, `ConfigCertificateStore`).
    ///
    /// Kept as an explicit `load`/[`unload`](Core::unload) pair for API parity with the source
    /// module's `load_module`/`unload_module`, even though Rust's ownership model means `unload`
    /// has no required body beyond dropping the `Core`.
    #[tracing::instrument(skip_all)]
    pub fn load(config_path: &Path) -> Result<Core, ConfigError> {
        let config = Config::load(config_path)?;
        let paths = Paths::detect(None, None)?;

        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::load(&paths.kv_store_file())?);
        let key_store = KeyStore::new(kv, config.general.cache_max_size);

        let fetcher: Arc<dyn Fetcher> =
            Arc::new(HttpFetcher::new(Duration::from_secs(config.general.curl_timeout))?);
        let cert_store: Arc<dyn CertificateStore> = Arc::new(ConfigCertificateStore::new(config));

        Ok(Core {
            key_store,
            fetcher,
            cert_store,
            keys_dir: paths.keys_dir(),
        })
    }

    /// Assembles a `Core` from explicit collaborators, bypassing configuration loading. Intended
    /// for embedding the engine in a host that already owns its own KV/fetcher/certificate store,
    /// and for integration tests that swap in in-memory or mock implementations.
    pub fn with_collaborators(
        key_store: KeyStore,
        fetcher: Arc<dyn Fetcher>,
        cert_store: Arc<dyn CertificateStore>,
        keys_dir: PathBuf,
    ) -> Core {
        Core {
            key_store,
            fetcher,
            cert_store,
            keys_dir,
        }
    }

    /// Releases the engine. No-op beyond dropping `self`; kept for API parity with the source
    /// module's `unload_module`.
    pub fn unload(self) {}

    /// Signs an outgoing call's PASSporT.
    pub fn sign(&self, input: Value) -> Result<Payload, Error> {
        crate::sign::sign(&input, self.cert_store.as_ref())
    }

    /// Verifies an incoming call's PASSporT.
    #[allow(clippy::too_many_arguments)]
    pub fn verify(
        &self,
        header: &str,
        payload: &str,
        signature: &str,
        algorithm: &str,
        public_key_url: &str,
    ) -> Result<Payload, Error> {
        crate::verify::verify(
            header,
            payload,
            signature,
            algorithm,
            public_key_url,
            &self.key_store,
            self.fetcher.as_ref(),
            &self.keys_dir,
        )
    }
}
