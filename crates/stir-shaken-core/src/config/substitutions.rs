// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `${VAR}` template substitution for `store.path`/`store.public_key_url` and their
//! per-certificate overrides.

use crate::errors::ConfigError;

/// Expands `${CERTIFICATE}` (and any other `${VAR}` the caller supplies) in `template`.
///
/// Grounded on the variable-substitution pass run over manifest paths elsewhere in this
/// ecosystem, generalized here to a single caller-supplied variable rather than a fixed
/// whitelist.
pub fn substitute(template: &str, variables: &[(&str, &str)]) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .ok_or(ConfigError::UnterminatedVariable)?;
        let name = &after[..end];
        let value = variables
            .iter()
            .find(|(var, _)| *var == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| ConfigError::UnknownVariableSubstitution(name.to_string()))?;
        output.push_str(value);
        rest = &after[end + 1..];
    }
    output.push_str(rest);
    Ok(output)
}

/// Checks a `store.public_key_url`/`store.path` template actually contains `${CERTIFICATE}`,
/// so every resolved certificate path is distinct per caller.
pub fn require_certificate_placeholder(template: &str) -> Result<(), ConfigError> {
    if template.contains("${CERTIFICATE}") {
        Ok(())
    } else {
        Err(ConfigError::MissingCertificateTemplatePlaceholder(
            template.to_string(),
        ))
    }
}
