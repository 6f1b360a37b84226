// SPDX-FileCopyrightText: The Stir-Shaken Developers
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::Data;
use tiny_http::{Header, Request, Response, ResponseBox, StatusCode};

pub(crate) fn handle_request(data: &Data, _req: &Request) -> ResponseBox {
    let mut response = Response::from_data(data.pem.clone())
        .with_status_code(StatusCode(data.status_code))
        .boxed();

    if let Some(cache_control) = &data.cache_control {
        response = add_header(response, "Cache-Control", cache_control);
    }
    if let Some(expires) = &data.expires {
        response = add_header(response, "Expires", expires);
    }
    response
}

fn add_header(response: ResponseBox, name: &str, value: &str) -> ResponseBox {
    response.with_header(Header::from_bytes(name.as_bytes(), value.as_bytes()).unwrap())
}
