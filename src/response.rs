//! Outgoing HTTP response type.
//!
//! A [`Response`] starts as `200` with no headers and an empty body, and is
//! threaded through every middleware in the stack. Any middleware may set
//! the status, overwrite headers or append to the body. Setting the
//! `finished` flag ends the chain.

use std::fmt;
use std::io;

/// An outgoing HTTP response.
///
/// ```rust
/// use std::io::Write;
/// use meddle::Response;
///
/// let mut res = Response::new(404);
/// res.set_header("content-type", "text/plain");
/// res.write("not ");
/// write!(res, "{}", "here").unwrap();
///
/// assert_eq!(res.status(), 404);
/// assert_eq!(res.body(), b"not here");
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    pub(crate) status: u16,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Vec<u8>,
    pub(crate) finished: bool,
}

impl Response {
    /// A response with the given status, no headers and an empty body.
    pub fn new(status: u16) -> Self {
        Self { status, headers: Vec::new(), body: Vec::new(), finished: false }
    }

    pub fn status(&self) -> u16 { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn is_finished(&self) -> bool { self.finished }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Sets a header, overwriting any existing value under the same name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(slot) => slot.1 = value,
            None => self.headers.push((name, value)),
        }
    }

    /// Appends `chunk` to the body. Text is written as its UTF-8 bytes, so
    /// `"foo"` and `b"foo"` produce the same body.
    pub fn write(&mut self, chunk: impl AsRef<[u8]>) {
        self.body.extend_from_slice(chunk.as_ref());
    }

    /// Marks the response finished. No further middleware will run.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// By-value form of [`finish`](Self::finish), for returning straight
    /// out of a handler: `return res.respond();`
    pub fn respond(mut self) -> Self {
        self.finish();
        self
    }
}

/// Header order is not significant: two responses are equal when they
/// carry the same header values under case-insensitively equal names.
impl PartialEq for Response {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.finished == other.finished
            && self.body == other.body
            && self.headers.len() == other.headers.len()
            && self.headers.iter().all(|(name, value)| other.header(name) == Some(value.as_str()))
    }
}

impl Default for Response {
    fn default() -> Self { Self::new(200) }
}

impl From<u16> for Response {
    fn from(status: u16) -> Self { Self::new(status) }
}

/// Lets `write!(res, ...)` append to the body.
impl io::Write for Response {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Write for Response {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.body.extend_from_slice(s.as_bytes());
        Ok(())
    }
}
