//! Middleware values and the built-in middleware library.
//!
//! A [`Middleware`] is a named [`Handler`] plus two sets of capability
//! labels: what it `expects` earlier middleware to have provided, and what
//! it `provides` to later ones. The labels are metadata; a
//! [`StackBuilder`](crate::StackBuilder) only checks them when asked to.
//!
//! | Constructor | Name | Behaviour |
//! |---|---|---|
//! | [`default_headers`] | `DefaultHeaders` | appends `<product>/<version>` to `Server` |
//! | [`url_decoder`] | `URLDecoder` | decoded path, raw query and query params into state |
//! | [`cookie_decoder`] | `CookieDecoder` | `Cookie` header into state |
//! | [`body_decoder`] | `BodyDecoder` | form-encoded body into state |
//! | [`file_server`] | `FileServer` | serves files below a root directory |
//! | [`not_found`] | `NotFound` | always responds `404` |
//! | [`log_request`] | `LogRequest` | logs method, resource and status |

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::config::Config;
use crate::handler::{BoxedHandler, Handler, Next};
use crate::request::Request;
use crate::response::Response;

mod decode;
mod file_server;
mod headers;
mod log;
mod not_found;

pub use decode::{body_decoder, cookie_decoder, parse_cookies, url_decoder};
pub use file_server::{file_server, mounted_file_server};
pub use headers::default_headers;
pub use log::log_request;
pub use not_found::not_found;

/// A named unit in a [`Stack`](crate::Stack).
///
/// Cloning is cheap: the handler is shared, never copied. A middleware holds
/// no per-request data of its own; anything derived from a request lives in
/// that request's [`State`](crate::State).
///
/// ```rust
/// use meddle::{Middleware, Next, Request, Response};
///
/// async fn auth(req: Request, res: Response, next: Next) -> Response {
///     if req.cookies().is_some_and(|c| c.contains_key("session")) {
///         return next.run(req, res).await;
///     }
///     let mut res = res;
///     res.set_status(401);
///     res.respond()
/// }
///
/// let mw = Middleware::new("Auth", auth).expects(["cookies"]).provides(["user"]);
/// assert_eq!(mw.name(), "Auth");
/// ```
#[derive(Clone)]
pub struct Middleware {
    pub(crate) name: Arc<str>,
    pub(crate) handler: BoxedHandler,
    pub(crate) expects: Vec<String>,
    pub(crate) provides: Vec<String>,
}

impl Middleware {
    /// Wraps a continuation-style handler: `(req, res, next) -> res`.
    pub fn new(name: impl Into<Arc<str>>, handler: impl Handler) -> Self {
        Self::from_boxed(name.into(), handler.into_boxed_handler())
    }

    /// Wraps a handler under its own type name, with no capability labels.
    pub fn from_fn<H: Handler>(handler: H) -> Self {
        Self::new(short_type_name::<H>(), handler)
    }

    /// Wraps a handler written against the `finished` flag convention:
    /// `(req, res) -> (req, res)`.
    ///
    /// The chain continues only when the returned response is not
    /// finished, so `f` short-circuits with `res.respond()`.
    pub fn map<F, Fut>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = (Request, Response)> + Send + 'static,
    {
        Self::new(name, move |req: Request, res: Response, next: Next| {
            let step = f(req, res);
            async move {
                let (req, res) = step.await;
                if res.is_finished() {
                    return res;
                }
                next.run(req, res).await
            }
        })
    }

    pub(crate) fn from_boxed(name: Arc<str>, handler: BoxedHandler) -> Self {
        Self { name, handler, expects: Vec::new(), provides: Vec::new() }
    }

    /// Declares capability labels this middleware needs from earlier ones.
    pub fn expects<I>(mut self, labels: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.expects.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Declares capability labels this middleware makes available.
    pub fn provides<I>(mut self, labels: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.provides.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn expected(&self) -> &[String] { &self.expects }
    pub fn provided(&self) -> &[String] { &self.provides }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name)
            .field("expects", &self.expects)
            .field("provides", &self.provides)
            .finish_non_exhaustive()
    }
}

/// The conventional head of a stack: header injection followed by the
/// URL, cookie and body decoders.
pub fn defaults(config: &Config) -> Vec<Middleware> {
    vec![
        default_headers(config),
        url_decoder(),
        cookie_decoder(),
        body_decoder(),
    ]
}

/// `my_app::auth` → `auth`. Closures keep their full path.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    if full.contains('{') {
        return full;
    }
    full.rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn passthrough(req: Request, res: Response, next: Next) -> Response {
        next.run(req, res).await
    }

    #[test]
    fn from_fn_names_after_function() {
        let mw = Middleware::from_fn(passthrough);
        assert_eq!(mw.name(), "passthrough");
        assert!(mw.expected().is_empty());
        assert!(mw.provided().is_empty());
    }

    #[test]
    fn capability_labels_accumulate() {
        let mw = Middleware::new("Session", passthrough)
            .expects(["cookies"])
            .provides(["sessions"])
            .provides(vec![String::from("user")]);

        assert_eq!(mw.expected(), ["cookies"]);
        assert_eq!(mw.provided(), ["sessions", "user"]);
    }

    #[test]
    fn defaults_keep_declared_order() {
        let names: Vec<_> = defaults(&Config::default())
            .iter()
            .map(|mw| mw.name().to_owned())
            .collect();

        assert_eq!(names, ["DefaultHeaders", "URLDecoder", "CookieDecoder", "BodyDecoder"]);
    }
}
