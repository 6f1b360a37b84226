// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The HTTP fetcher: downloading a public key PEM over HTTP is an implementation detail the core
//! only sees through the `Fetcher` trait below. Grounded on
//! `criticalup-core::download_server_client::DownloadServerClient`, which wraps a
//! `reqwest_middleware::ClientWithMiddleware` built around a retry policy; since the core here
//! runs synchronously and is called from arbitrary threads, this wraps `reqwest::blocking::Client`
//! instead and drives the `reqwest_retry` backoff policy by hand rather than through async
//! middleware.

use crate::errors::FetchError;
use reqwest::header::{CACHE_CONTROL, EXPIRES};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryPolicy;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Response cache metadata the key store needs to compute an expiration.
#[derive(Debug, Default, Clone)]
pub struct ResponseMeta {
    pub cache_control: Option<String>,
    pub expires: Option<String>,
}

pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, dest_path: &Path) -> Result<ResponseMeta, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    retry_policy: ExponentialBackoff,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(HttpFetcher {
            client,
            retry_policy: ExponentialBackoff::builder().build_with_max_retries(2),
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest_path: &Path) -> Result<ResponseMeta, FetchError> {
        let mut attempt = 0u32;
        loop {
            match self.try_fetch(url, dest_path) {
                Ok(meta) => return Ok(meta),
                Err(err) => {
                    let retry_decision = self.retry_policy.should_retry(SystemTime::now(), attempt);
                    match retry_decision {
                        reqwest_retry::RetryDecision::Retry { execute_after } => {
                            attempt += 1;
                            if let Ok(sleep_for) = execute_after.duration_since(SystemTime::now()) {
                                std::thread::sleep(sleep_for);
                            }
                        }
                        reqwest_retry::RetryDecision::DoNotRetry => return Err(err),
                    }
                }
            }
        }
    }
}

impl HttpFetcher {
    fn try_fetch(&self, url: &str, dest_path: &Path) -> Result<ResponseMeta, FetchError> {
        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            return Err(FetchError::UnexpectedStatus(response.status()));
        }

        let cache_control = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let expires = response
            .headers()
            .get(EXPIRES)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes()?;
        // The core does not create intermediate directories; a deployment step is responsible
        // for `${DATA_DIR}/keys/stir_shaken` existing.
        std::fs::write(dest_path, &bytes)
            .map_err(|err| FetchError::Write(dest_path.to_path_buf(), err))?;

        Ok(ResponseMeta {
            cache_control,
            expires,
        })
    }
}
