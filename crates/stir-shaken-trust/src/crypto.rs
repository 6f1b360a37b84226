// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ES256 (ECDSA P-256 + SHA-256) sign/verify, and the base64 helpers the key
//! store and the orchestrators build on top of.

use crate::newtypes::{PayloadBytes, PublicKeyBytes};
use crate::Error;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use elliptic_curve::pkcs8::{DecodePrivateKey, DecodePublicKey};
use p256::ecdsa::signature::{Signer, Verifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};

/// An ECDSA P-256 public key, loaded from a SPKI-encoded PEM file.
#[derive(Clone)]
pub struct EcdsaPublicKey {
    key: VerifyingKey,
    raw: PublicKeyBytes<'static>,
}

impl EcdsaPublicKey {
    pub fn from_spki_pem(pem: &str) -> Result<Self, Error> {
        let key = VerifyingKey::from_public_key_pem(pem)
            .map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(Self {
            raw: PublicKeyBytes::owned(key.to_encoded_point(false).as_bytes().to_vec()),
            key,
        })
    }

    /// Raw (uncompressed SEC1) encoding of the point, exposed for diagnostics/hashing.
    pub fn raw(&self) -> &PublicKeyBytes<'static> {
        &self.raw
    }
}

/// An ECDSA P-256 private key, loaded from a PKCS8-encoded PEM file.
#[derive(Clone)]
pub struct EcdsaPrivateKey {
    key: SigningKey,
}

impl EcdsaPrivateKey {
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, Error> {
        let key =
            SigningKey::from_pkcs8_pem(pem).map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    #[cfg(test)]
    pub(crate) fn public_key(&self) -> EcdsaPublicKey {
        let verifying: VerifyingKey = *self.key.verifying_key();
        EcdsaPublicKey {
            raw: PublicKeyBytes::owned(verifying.to_encoded_point(false).as_bytes().to_vec()),
            key: verifying,
        }
    }
}

/// Signs `message` with `privkey`, returning the standard-padded base64 encoding of the
/// DER-encoded ECDSA-P256 signature over its SHA-256 digest.
pub fn sign(message: &PayloadBytes<'_>, privkey: &EcdsaPrivateKey) -> Result<String, Error> {
    let signature: Signature = privkey
        .key
        .try_sign(message.as_bytes())
        .map_err(|_| Error::SignatureFailed)?;
    Ok(BASE64.encode(signature.to_der().as_bytes()))
}

/// Verifies `signature_b64` (the base64-encoded DER signature) over `message` against `pubkey`.
///
/// Returns `Ok(true)`/`Ok(false)` for a well-formed signature that matches or doesn't; only
/// malformed input (bad base64, bad DER) is surfaced as an `Err`.
pub fn verify(
    message: &PayloadBytes<'_>,
    signature_b64: &str,
    pubkey: &EcdsaPublicKey,
) -> Result<bool, Error> {
    let decoded = BASE64.decode(signature_b64)?;
    debug_assert_eq!(decoded.len(), padding_aware_decoded_len(signature_b64));

    let signature = match Signature::from_der(&decoded) {
        Ok(signature) => signature,
        Err(_) => return Ok(false),
    };

    Ok(pubkey.key.verify(message.as_bytes(), &signature).is_ok())
}

/// Computes the decoded length of a base64 string the way the original C implementation did:
/// `decoded_len = (len / 4) * 3 - padding_count`, counting trailing `=` characters.
///
/// Kept for callers that need the decoded length without allocating a decode buffer; the
/// actual decoding above is delegated to the `base64` crate.
pub fn padding_aware_decoded_len(b64: &str) -> usize {
    let len = b64.len();
    let padding_count = b64.bytes().rev().take_while(|&b| b == b'=').count();
    (len / 4) * 3 - padding_count
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PRIVATE_KEY_PEM: &str = include_str!("../test-data/private_key.pem");
    const SAMPLE_PUBLIC_KEY_PEM: &str = include_str!("../test-data/public_key.pem");

    #[test]
    fn test_sign_then_verify_roundtrip() {
        let private = EcdsaPrivateKey::from_pkcs8_pem(SAMPLE_PRIVATE_KEY_PEM).unwrap();
        let public = EcdsaPublicKey::from_spki_pem(SAMPLE_PUBLIC_KEY_PEM).unwrap();

        let message = PayloadBytes::borrowed(b"hello stir/shaken");
        let signature = sign(&message, &private).unwrap();

        assert!(verify(&message, &signature, &public).unwrap());
    }

    #[test]
    fn test_verify_rejects_tampered_message() {
        let private = EcdsaPrivateKey::from_pkcs8_pem(SAMPLE_PRIVATE_KEY_PEM).unwrap();
        let public = EcdsaPublicKey::from_spki_pem(SAMPLE_PUBLIC_KEY_PEM).unwrap();

        let message = PayloadBytes::borrowed(b"hello stir/shaken");
        let signature = sign(&message, &private).unwrap();

        let tampered = PayloadBytes::borrowed(b"hello stir-shaken");
        assert!(!verify(&tampered, &signature, &public).unwrap());
    }

    #[test]
    fn test_public_key_derived_from_private_key_matches() {
        let private = EcdsaPrivateKey::from_pkcs8_pem(SAMPLE_PRIVATE_KEY_PEM).unwrap();
        let message = PayloadBytes::borrowed(b"hello stir/shaken");
        let signature = sign(&message, &private).unwrap();

        assert!(verify(&message, &signature, &private.public_key()).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_base64() {
        let public = EcdsaPrivateKey::from_pkcs8_pem(SAMPLE_PRIVATE_KEY_PEM)
            .unwrap()
            .public_key();
        let message = PayloadBytes::borrowed(b"hello");
        assert!(matches!(
            verify(&message, "not-valid-base64!!", &public),
            Err(Error::Base64Decode(_))
        ));
    }

    #[test]
    fn test_padding_aware_decoded_len() {
        // "Zm9vYg==" is base64 for "foob" (4 bytes), 2 trailing '='.
        assert_eq!(4, padding_aware_decoded_len("Zm9vYg=="));
        // "Zm9v" is base64 for "foo" (3 bytes), no padding.
        assert_eq!(3, padding_aware_decoded_len("Zm9v"));
        // "Zm9vYmE=" is base64 for "fooba" (5 bytes), 1 trailing '='.
        assert_eq!(5, padding_aware_decoded_len("Zm9vYmE="));
    }
}
