// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

use serde::Serialize;
use serde_json::Value;

/// Which operation produced a [`Payload`]. Diagnostic only; never part of the wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadKind {
    Signed,
    #[default]
    Verified,
}

/// The object returned by both `sign` and `verify`.
///
/// On a verify result, `signature` is the base64 string as received from the caller; on a sign
/// result, it's the base64 encoding of the freshly computed ES256 signature. Both directions
/// share this one textual representation.
#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    pub header: Value,
    pub payload: Value,
    pub signature: String,
    pub algorithm: String,
    pub public_key_url: String,
    #[serde(skip)]
    pub kind: PayloadKind,
}

impl Payload {
    pub fn new(
        header: Value,
        payload: Value,
        signature: String,
        algorithm: String,
        public_key_url: String,
        kind: PayloadKind,
    ) -> Self {
        Self {
            header,
            payload,
            signature,
            algorithm,
            public_key_url,
            kind,
        }
    }
}

/// Releases a payload. Kept for API parity with the C module's `free_payload`; Rust's ownership
/// model already drops a [`Payload`] when it goes out of scope, so this is a documented no-op.
pub fn free_payload(_payload: Payload) {}
