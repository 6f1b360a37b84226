// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The key store: URL-addressed lookup of a cached PEM path with expiration metadata, layered on
//! top of the generic [`KeyValueStore`].

use crate::errors::StoreError;
use crate::fetcher::ResponseMeta;
use crate::kv::{hash_url, KeyValueStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;

const INDEX_FAMILY: &str = "STIR_SHAKEN";
const FIELD_PATH: &str = "path";
const FIELD_EXPIRATION: &str = "expiration";

/// Family/key the store uses to track recency of use, purely to support `general.cache_max_size`
/// eviction as LRU-by-last-use. Kept inside the same `KeyValueStore` contract (only
/// `put`/`get`/`del`) rather than a bespoke enumeration API.
const LRU_FAMILY: &str = "STIR_SHAKEN_LRU";
const LRU_KEY: &str = "order";

pub struct KeyStore {
    kv: Arc<dyn KeyValueStore>,
    cache_max_size: usize,
}

impl KeyStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, cache_max_size: usize) -> Self {
        KeyStore { kv, cache_max_size }
    }

    /// Returns the cached PEM path for `url`, if indexed.
    pub fn lookup(&self, url: &str) -> Result<Option<PathBuf>, StoreError> {
        let hash = hash_url(url);
        if self.kv.get(INDEX_FAMILY, url)?.as_deref() != Some(hash.as_str()) {
            return Ok(None);
        }
        let path = self.kv.get(&hash, FIELD_PATH)?.map(PathBuf::from);
        if path.is_some() {
            self.record_use(url)?;
        }
        Ok(path)
    }

    /// Records `url → hash → {path}`, overwriting any prior entry for the same url, and touches
    /// the LRU order, evicting the least-recently-used entry once `cache_max_size` is exceeded.
    pub fn put(&self, url: &str, path: &Path) -> Result<(), StoreError> {
        let hash = hash_url(url);
        self.kv.put(INDEX_FAMILY, url, &hash)?;
        self.kv.put(&hash, FIELD_PATH, &path.to_string_lossy())?;
        self.record_use(url)?;
        self.enforce_cache_limit()?;
        Ok(())
    }

    fn load_order(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .kv
            .get(LRU_FAMILY, LRU_KEY)?
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default())
    }

    fn store_order(&self, order: &[String]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(order).expect("LRU order serialization cannot fail");
        self.kv.put(LRU_FAMILY, LRU_KEY, &raw)
    }

    fn record_use(&self, url: &str) -> Result<(), StoreError> {
        let mut order = self.load_order()?;
        order.retain(|existing| existing != url);
        order.push(url.to_string());
        self.store_order(&order)
    }

    fn forget_use(&self, url: &str) -> Result<(), StoreError> {
        let mut order = self.load_order()?;
        order.retain(|existing| existing != url);
        self.store_order(&order)
    }

    /// Evicts least-recently-used entries until at most `cache_max_size` distinct urls remain.
    fn enforce_cache_limit(&self) -> Result<(), StoreError> {
        if self.cache_max_size == 0 {
            return Ok(());
        }
        loop {
            let order = self.load_order()?;
            if order.len() <= self.cache_max_size {
                return Ok(());
            }
            let oldest = order[0].clone();
            self.remove(&oldest)?;
        }
    }

    /// Computes and records the absolute expiration epoch from response cache headers, using
    /// `s-maxage` > `max-age` > `Expires` > "now" precedence.
    pub fn set_expiration(&self, url: &str, meta: &ResponseMeta) -> Result<(), StoreError> {
        let hash = hash_url(url);
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let expiration = expiration_from_headers(meta).unwrap_or(now);
        self.kv
            .put(&hash, FIELD_EXPIRATION, &expiration.to_string())?;
        Ok(())
    }

    /// True if no expiration is recorded, the stored value is unparseable, or `now >= expiration`.
    pub fn is_expired(&self, url: &str) -> Result<bool, StoreError> {
        let hash = hash_url(url);
        let stored = match self.kv.get(&hash, FIELD_EXPIRATION)? {
            Some(value) => value,
            None => return Ok(true),
        };
        let expiration: i64 = match stored.trim().parse() {
            Ok(value) => value,
            Err(_) => return Ok(true),
        };
        let now = OffsetDateTime::now_utc().unix_timestamp();
        Ok(now >= expiration)
    }

    /// Deletes the cached PEM (best-effort) and the whole `hash.*` subtree plus the url index.
    pub fn remove(&self, url: &str) -> Result<(), StoreError> {
        let hash = hash_url(url);
        if let Some(path) = self.kv.get(&hash, FIELD_PATH)? {
            let _ = std::fs::remove_file(path);
        }
        self.kv.del(INDEX_FAMILY, url)?;
        self.kv.del_tree(&hash)?;
        self.forget_use(url)?;
        Ok(())
    }
}

fn expiration_from_headers(meta: &ResponseMeta) -> Option<i64> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    if let Some(cache_control) = &meta.cache_control {
        if let Some(seconds) = directive_value(cache_control, "s-maxage") {
            return Some(now + seconds);
        }
        if let Some(seconds) = directive_value(cache_control, "max-age") {
            return Some(now + seconds);
        }
    }
    if let Some(expires) = &meta.expires {
        if let Ok(parsed) = OffsetDateTime::parse(expires, &Rfc2822) {
            return Some(parsed.unix_timestamp());
        }
    }
    None
}

fn directive_value(cache_control: &str, directive: &str) -> Option<i64> {
    cache_control.split(',').find_map(|part| {
        let part = part.trim();
        let (name, value) = part.split_once('=')?;
        if name.trim().eq_ignore_ascii_case(directive) {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}
