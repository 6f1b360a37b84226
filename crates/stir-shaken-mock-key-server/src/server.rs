// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::handlers::handle_request;
use crate::Data;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use tiny_http::Server;

pub struct MockKeyServer {
    data: Arc<Mutex<Data>>,
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
    served_requests: Arc<AtomicUsize>,
}

impl MockKeyServer {
    pub(crate) fn spawn(data: Data) -> Self {
        let data = Arc::new(Mutex::new(data));

        // Binding on port 0 lets the OS pick a free port; the real port is read back from the
        // bound server's address below, so tests never need to guess or reserve one.
        let server = Arc::new(Server::http("127.0.0.1:0").unwrap());
        let served_requests = Arc::new(AtomicUsize::new(0));

        let data_clone = data.clone();
        let server_clone = server.clone();
        let served_requests_clone = served_requests.clone();
        let handle = std::thread::spawn(move || {
            server_thread(data_clone, server_clone, served_requests_clone);
        });

        Self {
            data,
            server,
            handle: Some(handle),
            served_requests,
        }
    }

    /// Base URL of the running server, e.g. `http://127.0.0.1:51234`.
    pub fn url(&self) -> String {
        format!("http://{}", self.server.server_addr())
    }

    /// URL of the single PEM endpoint this server exposes, suitable as a `public_key_url`.
    pub fn public_key_url(&self) -> String {
        format!("{}/key.pem", self.url())
    }

    pub fn served_requests_count(&self) -> usize {
        self.served_requests.load(Ordering::SeqCst)
    }

    /// Mutates the served PEM/headers in place, for tests exercising cache invalidation and
    /// refetch paths against a still-running server.
    pub fn edit_data(&self, f: impl FnOnce(&mut MockKeyServerData)) {
        let mut data = self.data.lock().unwrap();
        let mut view = MockKeyServerData { inner: &mut data };
        f(&mut view);
    }
}

/// A mutable view over the server's served response, handed to [`MockKeyServer::edit_data`]'s
/// closure so callers can't reach into private fields directly.
pub struct MockKeyServerData<'a> {
    inner: &'a mut Data,
}

impl MockKeyServerData<'_> {
    pub fn set_pem(&mut self, pem: impl Into<Vec<u8>>) {
        self.inner.pem = pem.into();
    }

    pub fn set_cache_control(&mut self, value: Option<String>) {
        self.inner.cache_control = value;
    }

    pub fn set_expires(&mut self, value: Option<String>) {
        self.inner.expires = value;
    }

    pub fn set_status_code(&mut self, value: u16) {
        self.inner.status_code = value;
    }
}

impl Drop for MockKeyServer {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(_) => (),
                Err(err) => eprintln!("{err:?}"),
            }
        }
    }
}

fn server_thread(data: Arc<Mutex<Data>>, server: Arc<Server>, served_requests: Arc<AtomicUsize>) {
    for request in server.incoming_requests() {
        let response = handle_request(&data.lock().unwrap(), &request);
        request.respond(response).unwrap();
        served_requests.fetch_add(1, Ordering::SeqCst);
    }
}
