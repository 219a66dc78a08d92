//! Decoders: URL, cookies and form bodies into request state.

use std::borrow::Cow;
use std::future::ready;

use tracing::debug;

use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use crate::state::{Key, Params};

/// Splits the target at the first `?`.
///
/// - `resource`: the percent-decoded path
/// - `url_query`: the raw query, when present
/// - `url_params`: the decoded query, when it contains `=`
pub fn url_decoder() -> Middleware {
    Middleware::map("URLDecoder", |mut req: Request, res: Response| {
        decode_url(&mut req);
        ready((req, res))
    })
    .provides(["resource", "url_query", "url_params"])
}

/// Parses `Cookie: k1=v1; k2=v2` into `cookies`. A missing header yields an
/// empty map.
pub fn cookie_decoder() -> Middleware {
    Middleware::map("CookieDecoder", |mut req: Request, res: Response| {
        let cookies = req.header_value("cookie").map(parse_cookies).unwrap_or_default();
        req.state.insert(Key::COOKIES, cookies);
        ready((req, res))
    })
    .provides(["cookies"])
}

/// Parses a form-encoded body into `data` when the body contains `=`.
pub fn body_decoder() -> Middleware {
    Middleware::map("BodyDecoder", |mut req: Request, res: Response| {
        if req.body.contains(&b'=') {
            if let Some(data) = parse_form(&req.body) {
                req.state.insert(Key::DATA, data);
            }
        }
        ready((req, res))
    })
    .provides(["data"])
}

fn decode_url(req: &mut Request) {
    let (path, query) = match req.target.split_once('?') {
        Some((path, query)) => (path, Some(query.to_owned())),
        None => (req.target.as_str(), None),
    };
    let resource = percent_decode(path).into_owned();
    req.state.insert(Key::RESOURCE, resource);

    if let Some(query) = query {
        if query.contains('=') {
            if let Some(params) = parse_form(query.as_bytes()) {
                req.state.insert(Key::URL_PARAMS, params);
            }
        }
        req.state.insert(Key::URL_QUERY, query);
    }
}

/// Invalid UTF-8 after decoding is replaced rather than rejected.
fn percent_decode(path: &str) -> Cow<'_, str> {
    match urlencoding::decode(path) {
        Ok(decoded) => decoded,
        Err(_) => {
            let bytes = urlencoding::decode_binary(path.as_bytes());
            Cow::Owned(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// `application/x-www-form-urlencoded` → map. Later duplicates win.
fn parse_form(input: &[u8]) -> Option<Params> {
    match serde_urlencoded::from_bytes::<Vec<(String, String)>>(input) {
        Ok(pairs) => Some(pairs.into_iter().collect()),
        Err(e) => {
            debug!(error = %e, "form decoding failed");
            None
        }
    }
}

/// Splits on `"; "`, then each pair on its first `=`. Segments without `=`
/// are skipped.
pub fn parse_cookies(header: &str) -> Params {
    header
        .split("; ")
        .filter_map(|pair| pair.split_once('='))
        .map(|(name, value)| (name.to_owned(), value.to_owned()))
        .collect()
}
