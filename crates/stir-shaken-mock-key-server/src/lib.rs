// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A `tiny_http`-based server that serves a PEM public key with configurable `Cache-Control` /
//! `Expires` response headers, standing in for the key-issuer endpoint `stir-shaken-core`'s
//! `HttpFetcher` downloads `x5u` from. Grounded on `mock-download-server`'s
//! spawn-a-thread-per-server, `Arc<Mutex<Data>>`-backed shape, simplified to the single GET
//! endpoint the fetcher actually needs.

mod handlers;
mod server;

pub use crate::server::MockKeyServer;

pub(crate) struct Data {
    pem: Vec<u8>,
    cache_control: Option<String>,
    expires: Option<String>,
    status_code: u16,
}

/// Starts building a mock key server serving `pem` verbatim.
pub fn new(pem: impl Into<Vec<u8>>) -> Builder {
    Builder {
        data: Data {
            pem: pem.into(),
            cache_control: None,
            expires: None,
            status_code: 200,
        },
    }
}

pub struct Builder {
    data: Data,
}

impl Builder {
    pub fn cache_control(mut self, value: impl Into<String>) -> Self {
        self.data.cache_control = Some(value.into());
        self
    }

    pub fn expires(mut self, value: impl Into<String>) -> Self {
        self.data.expires = Some(value.into());
        self
    }

    pub fn status_code(mut self, value: u16) -> Self {
        self.data.status_code = value;
        self
    }

    pub fn start(self) -> MockKeyServer {
        MockKeyServer::spawn(self.data)
    }
}
