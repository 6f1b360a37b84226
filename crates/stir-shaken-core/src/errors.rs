// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::path::PathBuf;

/// We use a custom error enum instead of `Box<dyn Error>` so that callers (and we) can match on
/// every failure mode sign/verify can produce, rather than accidentally bubbling up a dependency's
/// error type unwrapped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InputError(String),

    #[error("JWT profile violation on field `{field}`")]
    ProfileError {
        field: &'static str,
        expected: Option<String>,
        got: Option<String>,
    },

    #[error("no certificate on file for caller number {0}")]
    NoCertificateError(String),

    #[error("failed to fetch {url}")]
    FetchError {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("key at {} is still expired immediately after a refetch", .0.display())]
    StaleAfterRefetch(PathBuf),

    #[error("failed to read or parse the public key at {}", .0.display())]
    KeyReadError(PathBuf, #[source] stir_shaken_trust::Error),

    #[error("ECDSA signature verification returned a mismatch")]
    SignatureError,

    #[error("crypto library failure")]
    CryptoError(#[source] stir_shaken_trust::Error),

    #[error("failed to read the private key at {}", .0.display())]
    PrivateKeyReadError(PathBuf, #[source] std::io::Error),

    #[error("key/value store failure")]
    Store(#[from] StoreError),
}

impl From<stir_shaken_trust::Error> for Error {
    /// Profile violations from the lower crate are re-shaped into our own `ProfileError`
    /// variant so callers only ever match on this crate's taxonomy; anything else is a crypto
    /// failure.
    fn from(err: stir_shaken_trust::Error) -> Self {
        match err {
            stir_shaken_trust::Error::ProfileError {
                field,
                expected,
                got,
            } => Error::ProfileError {
                field,
                expected,
                got,
            },
            other => Error::CryptoError(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network request failed")]
    Network(#[from] reqwest::Error),
    #[error("the server returned an unexpected status code {0}")]
    UnexpectedStatus(reqwest::StatusCode),
    #[error("writing fetched bytes to `{}`", .0.display())]
    Write(PathBuf, #[source] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("reading `{}`", .0.display())]
    Read(PathBuf, #[source] std::io::Error),
    #[error("writing `{}`", .0.display())]
    Write(PathBuf, #[source] std::io::Error),
    #[error("creating `{}`", .0.display())]
    Create(PathBuf, #[source] std::io::Error),
    #[error("the key/value store file at {} is corrupt", .0.display())]
    Corrupt(PathBuf, #[source] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not detect a cache directory to store fetched public keys in")]
    CouldNotDetectCacheDirectory,
    #[error("failed to read configuration at {}", .0.display())]
    Read(PathBuf, #[source] std::io::Error),
    #[error("failed to parse configuration at {}", .0.display())]
    Parse(PathBuf, #[source] toml_edit::de::Error),
    #[error("certificate store URL template is missing the ${{CERTIFICATE}} placeholder: {0}")]
    MissingCertificateTemplatePlaceholder(String),
    #[error("unknown variable substitution: ${{{0}}}")]
    UnknownVariableSubstitution(String),
    #[error("unterminated variable substitution")]
    UnterminatedVariable,
    #[error("failed to load the private key for certificate `{certificate}`")]
    CertificateKeyLoadFailed {
        certificate: String,
        #[source]
        source: stir_shaken_trust::Error,
    },

    #[error("failed to initialize the key/value store")]
    KeyValueStoreInit(#[from] StoreError),

    #[error("failed to initialize the HTTP fetcher")]
    FetcherInit(#[from] FetchError),
}
