// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end signing/verification scenarios, driven against a real `HttpFetcher` talking to a
//! `stir-shaken-mock-key-server` instance, the way `criticalup-cli/tests` drives
//! `criticalup-core` against `mock-download-server`.

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use stir_shaken_core::cert_store::{CertificateStore, ConfigCertificateStore};
use stir_shaken_core::config::{CertificateConfig, Config, GeneralConfig};
use stir_shaken_core::fetcher::{HttpFetcher, ResponseMeta};
use stir_shaken_core::key_store::KeyStore;
use stir_shaken_core::kv::{FileKeyValueStore, KeyValueStore};
use stir_shaken_core::Core;

const PRIVATE_KEY_PEM: &str = include_str!("../test-data/private_key.pem");
const PUBLIC_KEY_PEM: &str = include_str!("../test-data/public_key.pem");

fn core_with_cert(
    keys_dir: &std::path::Path,
    kv_path: &std::path::Path,
    caller_tn: &str,
    private_key_path: &std::path::Path,
    public_key_url: &str,
) -> Core {
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::load(kv_path).unwrap());
    let key_store = KeyStore::new(kv, 1000);
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(2)).unwrap());
    let cert_store: Arc<dyn CertificateStore> = Arc::new(ConfigCertificateStore::new(Config {
        general: GeneralConfig::default(),
        store: None,
        certificates: vec![CertificateConfig {
            id: caller_tn.to_string(),
            path: Some(private_key_path.to_string_lossy().to_string()),
            public_key_url: Some(public_key_url.to_string()),
        }],
    }));

    Core::with_collaborators(key_store, fetcher, cert_store, keys_dir.to_path_buf())
}

#[test]
fn test_scenario_3_cache_miss_then_verify_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let caller_tn = "+15551234567";
    let key_file = dir.path().join("signing_key.pem");
    std::fs::write(&key_file, PRIVATE_KEY_PEM).unwrap();

    let server = stir_shaken_mock_key_server::new(PUBLIC_KEY_PEM)
        .cache_control("max-age=3600")
        .start();

    let core = core_with_cert(
        dir.path(),
        &dir.path().join("kv.json"),
        caller_tn,
        &key_file,
        &server.public_key_url(),
    );

    let signed = core
        .sign(json!({
            "header": {"alg": "ES256", "ppt": "shaken", "typ": "passport"},
            "payload": {"orig": {"tn": caller_tn}},
        }))
        .unwrap();

    let header_json = serde_json::to_string(&signed.header).unwrap();
    let payload_json = serde_json::to_string(&signed.payload).unwrap();

    let verified = core
        .verify(
            &header_json,
            &payload_json,
            &signed.signature,
            "ES256",
            &server.public_key_url(),
        )
        .unwrap();

    assert_eq!(caller_tn, verified.payload["orig"]["tn"].as_str().unwrap());
    assert_eq!(1, server.served_requests_count());
}

#[test]
fn test_scenario_4_stale_cache_causes_exactly_one_refetch() {
    let dir = tempfile::tempdir().unwrap();
    let caller_tn = "+15551234567";
    let key_file = dir.path().join("signing_key.pem");
    std::fs::write(&key_file, PRIVATE_KEY_PEM).unwrap();
    let kv_path = dir.path().join("kv.json");

    let server = stir_shaken_mock_key_server::new(PUBLIC_KEY_PEM)
        .cache_control("max-age=3600")
        .start();

    let core = core_with_cert(
        dir.path(),
        &kv_path,
        caller_tn,
        &key_file,
        &server.public_key_url(),
    );

    let signed = core
        .sign(json!({
            "header": {"alg": "ES256", "ppt": "shaken", "typ": "passport"},
            "payload": {"orig": {"tn": caller_tn}},
        }))
        .unwrap();
    let header_json = serde_json::to_string(&signed.header).unwrap();
    let payload_json = serde_json::to_string(&signed.payload).unwrap();

    // First verify: cache miss, exactly one fetch, entry cached fresh for an hour.
    core.verify(
        &header_json,
        &payload_json,
        &signed.signature,
        "ES256",
        &server.public_key_url(),
    )
    .unwrap();
    assert_eq!(1, server.served_requests_count());

    // Simulate the cache entry going stale (time passing) without touching `served_requests`,
    // by poking the same backing KV file a second `KeyStore` handle points at.
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::load(&kv_path).unwrap());
    KeyStore::new(kv, 1000)
        .set_expiration(
            &server.public_key_url(),
            &ResponseMeta {
                cache_control: Some("max-age=0".to_string()),
                expires: None,
            },
        )
        .unwrap();

    // Second verify: the now-stale cached entry triggers exactly one refetch, then succeeds.
    core.verify(
        &header_json,
        &payload_json,
        &signed.signature,
        "ES256",
        &server.public_key_url(),
    )
    .unwrap();
    assert_eq!(2, server.served_requests_count());
}

#[test]
fn test_scenario_5_corrupt_pem_after_refetch_is_key_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let kv_path = dir.path().join("kv.json");
    let server = stir_shaken_mock_key_server::new("not a pem")
        .cache_control("max-age=3600")
        .start();

    // A cache hit whose PEM is missing on disk: the orchestrator refetches once, and the mock
    // server serves the same corrupt bytes on that refetch too.
    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::load(&kv_path).unwrap());
    let key_store = KeyStore::new(kv, 1000);
    key_store
        .put(&server.public_key_url(), &dir.path().join("missing.pem"))
        .unwrap();
    key_store
        .set_expiration(
            &server.public_key_url(),
            &ResponseMeta {
                cache_control: Some("max-age=3600".to_string()),
                expires: None,
            },
        )
        .unwrap();

    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(2)).unwrap());
    let cert_store: Arc<dyn CertificateStore> =
        Arc::new(ConfigCertificateStore::new(Config {
            general: GeneralConfig::default(),
            store: None,
            certificates: vec![],
        }));
    let core = Core::with_collaborators(key_store, fetcher, cert_store, dir.path().to_path_buf());

    let result = core.verify(
        r#"{"alg":"ES256"}"#,
        r#"{"orig":{"tn":"+15551234567"}}"#,
        "sig",
        "ES256",
        &server.public_key_url(),
    );

    assert!(matches!(
        result,
        Err(stir_shaken_core::Error::KeyReadError(_, _))
    ));
    assert_eq!(1, server.served_requests_count());
}

#[test]
fn test_scenario_1_empty_header_is_input_error_with_no_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let server = stir_shaken_mock_key_server::new(PUBLIC_KEY_PEM).start();
    let kv_path = dir.path().join("kv.json");

    let kv: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::load(&kv_path).unwrap());
    let key_store = KeyStore::new(kv, 1000);
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(2)).unwrap());
    let cert_store: Arc<dyn CertificateStore> =
        Arc::new(ConfigCertificateStore::new(Config {
            general: GeneralConfig::default(),
            store: None,
            certificates: vec![],
        }));
    let core = Core::with_collaborators(key_store, fetcher, cert_store, dir.path().to_path_buf());

    let result = core.verify(
        "",
        r#"{"orig":{"tn":"+15551234567"}}"#,
        "sig",
        "ES256",
        &server.public_key_url(),
    );

    assert!(matches!(result, Err(stir_shaken_core::Error::InputError(_))));
    assert_eq!(0, server.served_requests_count());
    assert!(!kv_path.exists());
}
