//! Per-request state bag.
//!
//! Decoding middleware store what they derive (the decoded path, cookies,
//! form fields) under a [`Key`] so later middleware can read it without
//! parsing again. Values are type-erased; readers name the type they expect.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Decoded `key=value` pairs (query strings, cookies, form bodies).
pub type Params = HashMap<String, String>;

/// A symbolic key into [`State`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Key(&'static str);

impl Key {
    /// Percent-decoded path, a `String`. Written by `URLDecoder`.
    pub const RESOURCE: Key = Key("resource");
    /// Raw query string after `?`, a `String`. Written by `URLDecoder`.
    pub const URL_QUERY: Key = Key("url_query");
    /// Decoded query parameters, [`Params`]. Written by `URLDecoder`.
    pub const URL_PARAMS: Key = Key("url_params");
    /// Decoded cookies, [`Params`]. Written by `CookieDecoder`.
    pub const COOKIES: Key = Key("cookies");
    /// Decoded form body, [`Params`]. Written by `BodyDecoder`.
    pub const DATA: Key = Key("data");

    /// A custom key for application middleware.
    pub const fn new(name: &'static str) -> Self {
        Key(name)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Type-erased map from [`Key`] to any `Send + Sync` value.
///
/// Owned by exactly one request; never shared between requests.
#[derive(Default)]
pub struct State {
    entries: HashMap<Key, Box<dyn Any + Send + Sync>>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: Key, value: T) {
        self.entries.insert(key, Box::new(value));
    }

    /// Returns the entry under `key` if present and of type `T`.
    pub fn get<T: Any>(&self, key: Key) -> Option<&T> {
        self.entries.get(&key)?.downcast_ref()
    }

    pub fn get_mut<T: Any>(&mut self, key: Key) -> Option<&mut T> {
        self.entries.get_mut(&key)?.downcast_mut()
    }

    pub fn contains(&self, key: Key) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}
