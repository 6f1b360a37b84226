// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-identity signing and verification engine for a softswitch/PBX (STIR/SHAKEN), per
//! ATIS-1000074 / RFC 8224 / RFC 8225 / RFC 8226.
//!
//! [`Core`] is the single entry point: load it once from a configuration file (or from explicit
//! collaborators, for embedding or testing), then call [`Core::sign`] for each outgoing call and
//! [`Core::verify`] for each incoming one.

pub mod cert_store;
pub mod config;
mod core;
pub mod errors;
pub mod fetcher;
pub mod key_store;
pub mod kv;
mod sign;
mod verify;

pub use crate::core::Core;
pub use errors::Error;
pub use stir_shaken_trust::payload::{free_payload, Payload, PayloadKind};
