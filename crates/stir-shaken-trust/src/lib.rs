// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod crypto;
pub mod errors;
pub mod newtypes;
pub mod payload;
pub mod profile;

pub use errors::Error;
pub use payload::{free_payload, Payload, PayloadKind};
