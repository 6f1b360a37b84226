// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to sign data.")]
    SignatureFailed,
    #[error("Failed to verify signed data.")]
    VerificationFailed,
    #[error("Failed to load key from PEM: {0}")]
    InvalidKey(String),
    #[error("Input JSON is missing field `{field}`{}", .got.as_ref().map(|g| format!(" (found {g})")).unwrap_or_default())]
    ProfileError {
        field: &'static str,
        expected: Option<String>,
        got: Option<String>,
    },
    #[error("Malformed base64 signature: {0}")]
    Base64Decode(#[from] base64::DecodeError),
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}
