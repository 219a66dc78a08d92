//! Incoming HTTP request type.

use crate::state::{Key, Params, State};

/// An incoming request as seen by the middleware chain.
///
/// Built by the HTTP layer once per request. Middleware read the method,
/// target and headers, and pass derived data forward through [`State`].
#[derive(Debug)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) target: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) state: State,
}

impl Request {
    /// A request with no headers, an empty body and an empty state bag.
    ///
    /// `target` is the raw path plus query string, e.g. `/search?q=rust`.
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            headers: Vec::new(),
            body: Vec::new(),
            state: State::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn target(&self) -> &str { &self.target }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn raw_body(&self) -> &[u8] { &self.body }
    pub fn state(&self) -> &State { &self.state }
    pub fn state_mut(&mut self) -> &mut State { &mut self.state }

    /// Case-insensitive header lookup.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The decoded path if `URLDecoder` ran, otherwise `None`.
    pub fn resource(&self) -> Option<&str> {
        self.state.get::<String>(Key::RESOURCE).map(String::as_str)
    }

    pub fn url_query(&self) -> Option<&str> {
        self.state.get::<String>(Key::URL_QUERY).map(String::as_str)
    }

    pub fn url_params(&self) -> Option<&Params> {
        self.state.get(Key::URL_PARAMS)
    }

    pub fn cookies(&self) -> Option<&Params> {
        self.state.get(Key::COOKIES)
    }

    pub fn data(&self) -> Option<&Params> {
        self.state.get(Key::DATA)
    }

    /// The path the chain should act on: the decoded resource when
    /// available, else the raw target up to the first `?`.
    pub(crate) fn path(&self) -> &str {
        match self.resource() {
            Some(resource) => resource,
            None => self.target.split('?').next().unwrap_or_default(),
        }
    }
}
