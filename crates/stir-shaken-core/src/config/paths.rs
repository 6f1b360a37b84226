// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::ConfigError;
use std::env;
use std::path::PathBuf;

const KEYS_SUBDIR: &str = "keys/stir_shaken";

#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Paths {
    /// Root data directory; fetched public keys are cached under
    /// `{data_dir}/keys/stir_shaken/{basename(url)}`.
    pub data_dir: PathBuf,
    /// Directory holding the key/value store's backing file.
    pub cache_dir: PathBuf,
}

impl Paths {
    pub fn detect(
        data_dir: Option<PathBuf>,
        cache_dir: Option<PathBuf>,
    ) -> Result<Paths, ConfigError> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => find_data_dir().ok_or(ConfigError::CouldNotDetectCacheDirectory)?,
        };
        let cache_dir = match cache_dir {
            Some(dir) => dir,
            None => find_cache_dir().ok_or(ConfigError::CouldNotDetectCacheDirectory)?,
        };
        Ok(Paths {
            data_dir,
            cache_dir,
        })
    }

    pub fn keys_dir(&self) -> PathBuf {
        self.data_dir.join(KEYS_SUBDIR)
    }

    pub fn kv_store_file(&self) -> PathBuf {
        self.cache_dir.join("stir_shaken_keys.json")
    }
}

fn find_data_dir() -> Option<PathBuf> {
    match env::var_os("STIR_SHAKEN_ROOT") {
        Some(val) if val.is_empty() => platform_specific_data_dir(),
        Some(val) => Some(PathBuf::from(val)),
        None => platform_specific_data_dir(),
    }
}

fn platform_specific_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|v| v.join("stir-shaken"))
}

fn find_cache_dir() -> Option<PathBuf> {
    match env::var_os("STIR_SHAKEN_CACHE_DIR") {
        Some(val) if val.is_empty() => platform_specific_cache_dir(),
        Some(val) => Some(PathBuf::from(val)),
        None => platform_specific_cache_dir(),
    }
}

fn platform_specific_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|v| v.join("stir-shaken"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_paths_are_used_verbatim() {
        let paths = Paths::detect(Some("/opt/stir-shaken".into()), Some("/cache/stir-shaken".into()))
            .unwrap();
        assert_eq!(PathBuf::from("/opt/stir-shaken"), paths.data_dir);
        assert_eq!(PathBuf::from("/cache/stir-shaken"), paths.cache_dir);
        assert_eq!(
            PathBuf::from("/opt/stir-shaken/keys/stir_shaken"),
            paths.keys_dir()
        );
        assert_eq!(
            PathBuf::from("/cache/stir-shaken/stir_shaken_keys.json"),
            paths.kv_store_file()
        );
    }
}
