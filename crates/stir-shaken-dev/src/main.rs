// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A smoke test a human can run by hand: spawns a mock key server, signs a sample PASSporT
//! against a throwaway signing key, verifies it right back, and prints the outcome. Not a
//! PBX integration; just enough wiring to see the whole engine move in one process.

use serde_json::json;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use stir_shaken_core::cert_store::{CertificateStore, ConfigCertificateStore};
use stir_shaken_core::config::{CertificateConfig, Config, GeneralConfig};
use stir_shaken_core::fetcher::HttpFetcher;
use stir_shaken_core::key_store::KeyStore;
use stir_shaken_core::kv::FileKeyValueStore;
use stir_shaken_core::Core;

const CALLER_TN: &str = "+15551234567";

// A throwaway ES256 keypair, valid PKCS8/SPKI PEM, used only so this binary has something to
// sign and verify with out of the box.
const PRIVATE_KEY_PEM: &str = include_str!("../keys/dev_private_key.pem");
const PUBLIC_KEY_PEM: &str = include_str!("../keys/dev_public_key.pem");

fn main() {
    tracing_subscriber::fmt()
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    if let Err(err) = run() {
        tracing::error!(%err, "demo run failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let workdir = tempfile::tempdir()?;
    let private_key_path = workdir.path().join("signing_key.pem");
    std::fs::write(&private_key_path, PRIVATE_KEY_PEM)?;

    let server = stir_shaken_mock_key_server::new(PUBLIC_KEY_PEM)
        .cache_control("max-age=3600")
        .start();
    println!("mock key server listening at {}", server.url());

    let kv = Arc::new(FileKeyValueStore::load(&workdir.path().join("kv.json"))?);
    let key_store = KeyStore::new(kv, GeneralConfig::default().cache_max_size);
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(2))?);
    let cert_store: Arc<dyn CertificateStore> = Arc::new(ConfigCertificateStore::new(Config {
        general: GeneralConfig::default(),
        store: None,
        certificates: vec![CertificateConfig {
            id: CALLER_TN.to_string(),
            path: Some(private_key_path.to_string_lossy().to_string()),
            public_key_url: Some(server.public_key_url()),
        }],
    }));
    let core = Core::with_collaborators(key_store, fetcher, cert_store, workdir.path().to_path_buf());

    let signed = core.sign(json!({
        "header": {"alg": "ES256", "ppt": "shaken", "typ": "passport"},
        "payload": {"orig": {"tn": CALLER_TN}, "dest": {"tn": "+15557654321"}},
    }))?;
    println!("signed PASSporT: {}", serde_json::to_string_pretty(&signed.payload)?);

    let verified = core.verify(
        &serde_json::to_string(&signed.header)?,
        &serde_json::to_string(&signed.payload)?,
        &signed.signature,
        &signed.algorithm,
        &signed.public_key_url,
    )?;
    println!(
        "verified caller tn: {}",
        verified.payload["orig"]["tn"].as_str().unwrap_or("?")
    );
    println!(
        "fetched key server {} time(s)",
        server.served_requests_count()
    );

    Ok(())
}
