// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The sign orchestrator: validate the input PASSporT shape, resolve the caller's
//! certificate, inject `x5u`/`attest`/`origid`/`iat`, serialize, sign.

use crate::cert_store::CertificateStore;
use crate::errors::Error;
use serde_json::Value;
use stir_shaken_trust::crypto::{self, EcdsaPrivateKey};
use stir_shaken_trust::newtypes::PayloadBytes;
use stir_shaken_trust::payload::{Payload, PayloadKind};
use stir_shaken_trust::profile;
use std::time::{SystemTime, UNIX_EPOCH};

/// Attestation level hard-coded pending a policy hook: mapping call context to an attestation
/// level is left to a layer above this core.
const ATTEST_PLACEHOLDER: &str = "B";

/// `origid` hard-coded to a constant string rather than a generated UUID; we use the crate name,
/// which is at least traceable to this implementation.
const ORIGID_PLACEHOLDER: &str = env!("CARGO_PKG_NAME");

/// Signs `input` (a JSON object shaped `{"header": ..., "payload": ...}`), returning a
/// [`Payload`] carrying the mutated header/payload and the base64 ES256 signature.
///
/// Grounded on `stir_shaken_sign`/`stir_shaken_add_x5u`/`stir_shaken_add_attest`/
/// `stir_shaken_add_origid`/`stir_shaken_add_iat` in the original C module, collapsed into one
/// mutation pass since a `serde_json::Value` field assignment cannot fail the way the C
/// allocations could.
#[tracing::instrument(skip_all)]
pub fn sign(input: &Value, cert_store: &dyn CertificateStore) -> Result<Payload, Error> {
    let header = input.get("header").cloned().unwrap_or(Value::Null);
    let payload = input.get("payload").cloned().unwrap_or(Value::Null);

    let validated = profile::validate(&header, &payload)?;
    let caller_tn = validated.orig_tn;

    let cert = cert_store.by_caller_tn(&caller_tn).ok_or_else(|| {
        tracing::error!(caller_tn, "no certificate on file for caller");
        Error::NoCertificateError(caller_tn.clone())
    })?;

    let mut header = header;
    let mut payload = payload;
    header["x5u"] = Value::String(cert.public_key_url().to_string());
    payload["attest"] = Value::String(ATTEST_PLACEHOLDER.to_string());
    payload["origid"] = Value::String(ORIGID_PLACEHOLDER.to_string());
    payload["iat"] = Value::from(now_seconds());

    let serialized = serde_json::to_string(&payload)?;

    let private_key_pem = std::fs::read_to_string(cert.private_key())
        .map_err(|err| Error::PrivateKeyReadError(cert.private_key().into(), err))?;
    let private_key = EcdsaPrivateKey::from_pkcs8_pem(&private_key_pem)
        .map_err(Error::CryptoError)?;

    let signature = crypto::sign(
        &PayloadBytes::borrowed(serialized.as_bytes()),
        &private_key,
    )
    .map_err(Error::CryptoError)?;

    let public_key_url = cert.public_key_url().to_string();
    crate::cert_store::release(cert);

    Ok(Payload::new(
        header,
        payload,
        signature,
        "ES256".to_string(),
        public_key_url,
        PayloadKind::Signed,
    ))
}

/// `tv_sec + tv_usec/1000` preserved verbatim from the source, including its truncating integer
/// division: `tv_usec/1000` is the current second's millisecond count (0-999), added as whole
/// units onto `tv_sec` rather than as a fraction of a second, which is almost certainly a bug —
/// `iat` drifts up to ~999 seconds ahead of the real Unix time. Callers may already depend on the
/// exact shape of this value so it is kept as-is rather than silently fixed. The division stays
/// integer (not floating-point), so the result is still a JSON integer, matching `"iat":<int>`.
fn now_seconds() -> i64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_secs() as i64 + now.subsec_micros() as i64 / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert_store::CertHandle;
    use serde_json::json;

    const PRIVATE_KEY_PEM: &str = include_str!("../test-data/private_key.pem");

    struct SingleCertStore {
        path: String,
    }

    impl CertificateStore for SingleCertStore {
        fn by_caller_tn(&self, tn: &str) -> Option<CertHandle> {
            if tn == "+15551234567" {
                Some(CertHandle::for_test(
                    "https://keys.example.com/+15551234567.pem",
                    &self.path,
                ))
            } else {
                None
            }
        }
    }

    fn write_private_key() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), PRIVATE_KEY_PEM).unwrap();
        file
    }

    fn valid_input() -> Value {
        json!({
            "header": {"alg": "ES256", "ppt": "shaken", "typ": "passport"},
            "payload": {"orig": {"tn": "+15551234567"}},
        })
    }

    #[test]
    fn test_sign_injects_x5u_attest_origid_iat() {
        let key_file = write_private_key();
        let store = SingleCertStore {
            path: key_file.path().to_string_lossy().to_string(),
        };

        let signed = sign(&valid_input(), &store).unwrap();

        assert_eq!(
            "https://keys.example.com/+15551234567.pem",
            signed.header["x5u"].as_str().unwrap()
        );
        assert_eq!("B", signed.payload["attest"].as_str().unwrap());
        assert_eq!(
            env!("CARGO_PKG_NAME"),
            signed.payload["origid"].as_str().unwrap()
        );
        assert!(signed.payload["iat"].is_i64());
        assert!(!signed.signature.is_empty());
        assert_eq!("ES256", signed.algorithm);
        assert_eq!(
            "https://keys.example.com/+15551234567.pem",
            signed.public_key_url
        );
    }

    #[test]
    fn test_missing_ppt_fails_with_profile_error() {
        let key_file = write_private_key();
        let store = SingleCertStore {
            path: key_file.path().to_string_lossy().to_string(),
        };

        let mut input = valid_input();
        input["header"].as_object_mut().unwrap().remove("ppt");

        assert!(matches!(
            sign(&input, &store),
            Err(Error::ProfileError { field: "ppt", .. })
        ));
    }

    #[test]
    fn test_unknown_caller_is_no_certificate_error() {
        let key_file = write_private_key();
        let store = SingleCertStore {
            path: key_file.path().to_string_lossy().to_string(),
        };

        let mut input = valid_input();
        input["payload"]["orig"]["tn"] = json!("+19998887777");

        assert!(matches!(
            sign(&input, &store),
            Err(Error::NoCertificateError(tn)) if tn == "+19998887777"
        ));
    }
}
