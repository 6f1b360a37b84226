// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural validation of the PASSporT ("shaken") profile: `header.ppt == "shaken"`,
//! `header.typ == "passport"`, `header.alg == "ES256"`, and a non-empty `payload.orig.tn`.

use crate::Error;
use serde_json::Value;

const EXPECTED_PPT: &str = "shaken";
const EXPECTED_TYP: &str = "passport";
const EXPECTED_ALG: &str = "ES256";

/// The fields the profile validator extracts on success.
pub struct ValidatedProfile {
    pub algorithm: String,
    pub orig_tn: String,
}

/// Validates that `header`/`payload` conform to the STIR/SHAKEN PASSporT profile.
///
/// Grounded on the original module's JWT shape check, which runs before signing to make sure
/// the caller supplied a well-formed identity header before the core injects `x5u`/`attest`/
/// `origid`/`iat`.
pub fn validate(header: &Value, payload: &Value) -> Result<ValidatedProfile, Error> {
    require_str_field(header, "ppt", EXPECTED_PPT)?;
    require_str_field(header, "typ", EXPECTED_TYP)?;
    let algorithm = require_str_field(header, "alg", EXPECTED_ALG)?;

    let orig_tn = payload
        .get("orig")
        .and_then(|orig| orig.get("tn"))
        .and_then(Value::as_str)
        .filter(|tn| !tn.is_empty())
        .ok_or_else(|| Error::ProfileError {
            field: "payload.orig.tn",
            expected: Some("non-empty string".to_string()),
            got: payload
                .get("orig")
                .and_then(|orig| orig.get("tn"))
                .map(|v| v.to_string()),
        })?
        .to_string();

    Ok(ValidatedProfile {
        algorithm,
        orig_tn,
    })
}

fn require_str_field(object: &Value, field: &'static str, expected: &str) -> Result<String, Error> {
    match object.get(field).and_then(Value::as_str) {
        Some(value) if value == expected => Ok(value.to_string()),
        Some(other) => Err(Error::ProfileError {
            field,
            expected: Some(expected.to_string()),
            got: Some(other.to_string()),
        }),
        None => Err(Error::ProfileError {
            field,
            expected: Some(expected.to_string()),
            got: None,
        }),
    }
}
