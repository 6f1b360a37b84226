// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The verify orchestrator: cache lookup → fetch → freshness check → read key →
//! signature check, with at most one refetch on a stale or unreadable key.

use crate::errors::Error;
use crate::fetcher::Fetcher;
use crate::key_store::KeyStore;
use stir_shaken_trust::crypto::{self, EcdsaPublicKey};
use stir_shaken_trust::newtypes::PayloadBytes;
use stir_shaken_trust::payload::{Payload, PayloadKind};
use std::path::{Path, PathBuf};

/// Runs the five-input verify state machine, returning a [`Payload`] on success.
///
/// Grounded on `res_stir_shaken.c`'s `stir_shaken_verify_json`: a single coarse retry on a stale
/// or corrupt cached key, never more.
#[tracing::instrument(skip_all, fields(public_key_url))]
pub fn verify(
    header: &str,
    payload: &str,
    signature: &str,
    algorithm: &str,
    public_key_url: &str,
    key_store: &KeyStore,
    fetcher: &dyn Fetcher,
    keys_dir: &Path,
) -> Result<Payload, Error> {
    if header.is_empty()
        || payload.is_empty()
        || signature.is_empty()
        || algorithm.is_empty()
        || public_key_url.is_empty()
    {
        tracing::error!("verify called with one or more empty arguments");
        return Err(Error::InputError(
            "header, payload, signature, algorithm and public_key_url must all be non-empty"
                .to_string(),
        ));
    }

    let mut fetched = false;
    let mut path = match key_store.lookup(public_key_url)? {
        Some(path) => path,
        None => {
            key_store.remove(public_key_url)?;
            let dest = default_key_path(keys_dir, public_key_url);
            fetch_and_record(key_store, fetcher, public_key_url, &dest)?;
            fetched = true;
            dest
        }
    };

    if key_store.is_expired(public_key_url)? {
        tracing::debug!(url = public_key_url, "cached public key is stale");
        key_store.remove(public_key_url)?;
        if fetched {
            return Err(Error::StaleAfterRefetch(path));
        }
        let dest = default_key_path(keys_dir, public_key_url);
        fetch_and_record(key_store, fetcher, public_key_url, &dest)?;
        fetched = true;
        path = dest;
        if key_store.is_expired(public_key_url)? {
            tracing::error!(url = public_key_url, "refetched public key is still stale");
            return Err(Error::StaleAfterRefetch(path));
        }
    }

    let pubkey = match read_public_key(&path) {
        Ok(pubkey) => pubkey,
        Err(read_err) => {
            tracing::debug!(url = public_key_url, "cached public key is unreadable");
            key_store.remove(public_key_url)?;
            if fetched {
                tracing::error!(url = public_key_url, "public key unreadable after refetch");
                return Err(Error::KeyReadError(path, read_err));
            }
            let dest = default_key_path(keys_dir, public_key_url);
            fetch_and_record(key_store, fetcher, public_key_url, &dest)?;
            path = dest;
            read_public_key(&path).map_err(|err| Error::KeyReadError(path.clone(), err))?
        }
    };

    let message = PayloadBytes::borrowed(payload.as_bytes());
    let matches = crypto::verify(&message, signature, &pubkey).map_err(Error::CryptoError)?;
    if !matches {
        tracing::error!(url = public_key_url, "signature verification mismatch");
        return Err(Error::SignatureError);
    }

    let header_json = serde_json::from_str(header)
        .map_err(|err| Error::InputError(format!("header is not valid JSON: {err}")))?;
    let payload_json = serde_json::from_str(payload)
        .map_err(|err| Error::InputError(format!("payload is not valid JSON: {err}")))?;

    Ok(Payload::new(
        header_json,
        payload_json,
        signature.to_string(),
        algorithm.to_string(),
        public_key_url.to_string(),
        PayloadKind::Verified,
    ))
}

fn fetch_and_record(
    key_store: &KeyStore,
    fetcher: &dyn Fetcher,
    url: &str,
    dest: &Path,
) -> Result<(), Error> {
    let meta = fetcher
        .fetch(url, dest)
        .map_err(|source| Error::FetchError {
            url: url.to_string(),
            source,
        })?;
    key_store.set_expiration(url, &meta)?;
    key_store.put(url, dest)?;
    Ok(())
}

fn default_key_path(keys_dir: &Path, url: &str) -> PathBuf {
    let basename = url.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(url);
    keys_dir.join(basename)
}

fn read_public_key(path: &Path) -> Result<EcdsaPublicKey, stir_shaken_trust::Error> {
    let pem = std::fs::read_to_string(path)
        .map_err(|err| stir_shaken_trust::Error::InvalidKey(format!("unreadable: {err}")))?;
    EcdsaPublicKey::from_spki_pem(&pem)
}
