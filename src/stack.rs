//! Stack composition.
//!
//! A [`Stack`] is an ordered list of [`Middleware`] folded, right to left,
//! into a single handler. Each link holds its middleware and the already
//! composed rest of the chain; at request time it hands the middleware a
//! [`Next`] bound to that rest. The innermost link is the terminal handler,
//! which continues into whatever `Next` the whole stack was called with.
//!
//! ```text
//! [A, B, C]  →  A( B( C( terminal ) ) )
//! ```
//!
//! Because the composed handler has the same `(req, res, next)` shape as a
//! single middleware, a stack nests inside another stack via
//! [`Stack::into_middleware`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::trace;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, Next};
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// An ordered, immutable chain of middleware composed into one handler.
///
/// Build it once at startup and share it: cloning is one `Arc` increment.
///
/// ```rust
/// use meddle::{middleware, Request, Response, Stack};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), meddle::Error> {
/// let stack = Stack::builder()
///     .push(middleware::url_decoder())
///     .push(middleware::not_found())
///     .build()?;
///
/// let res = stack.handle(Request::new("GET", "/nothing/here"), Response::default()).await;
/// assert_eq!(res.status(), 404);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Stack {
    layers: Arc<[Middleware]>,
    composed: BoxedHandler,
}

impl Stack {
    pub fn builder() -> StackBuilder {
        StackBuilder::new()
    }

    /// Composes `layers` without capability validation.
    pub fn new(layers: impl IntoIterator<Item = Middleware>) -> Result<Self, Error> {
        Self::builder().extend(layers).build()
    }

    /// A stack with no middleware; it returns every response unchanged.
    pub fn empty() -> Self {
        Self::compose(Vec::new())
    }

    fn compose(layers: Vec<Middleware>) -> Self {
        let terminal: BoxedHandler = Arc::new(Terminal);
        let composed = layers.iter().enumerate().rev().fold(terminal, |rest, (index, mw)| {
            let link: BoxedHandler = Arc::new(Link {
                index,
                name: Arc::clone(&mw.name),
                handler: Arc::clone(&mw.handler),
                rest,
            });
            link
        });
        Self { layers: layers.into(), composed }
    }

    /// Runs `req` and `res` through the chain.
    ///
    /// Stops at the first middleware that returns without calling `next`
    /// or leaves the response finished. If none does, the response the
    /// last middleware passed on is returned.
    pub fn handle(&self, req: Request, res: Response) -> BoxFuture {
        self.composed.call(req, res, Next::terminal())
    }

    /// Wraps the composed chain as one middleware so it can be nested.
    ///
    /// When the inner chain runs out without short-circuiting, control
    /// continues into the outer stack's next middleware. The wrapper
    /// expects whatever the inner chain expects but does not provide
    /// itself, and provides everything the inner chain provides.
    pub fn into_middleware(self, name: impl Into<Arc<str>>) -> Middleware {
        let mut provided: HashSet<&str> = HashSet::new();
        let mut expects = Vec::new();
        let mut provides = Vec::new();
        for mw in self.layers.iter() {
            for label in &mw.expects {
                if !provided.contains(label.as_str()) && !expects.contains(label) {
                    expects.push(label.clone());
                }
            }
            for label in &mw.provides {
                if provided.insert(label.as_str()) {
                    provides.push(label.clone());
                }
            }
        }
        Middleware::from_boxed(name.into(), self.composed.clone())
            .expects(expects)
            .provides(provides)
    }

    pub fn len(&self) -> usize { self.layers.len() }
    pub fn is_empty(&self) -> bool { self.layers.is_empty() }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(Middleware::name)
    }
}

impl Default for Stack {
    fn default() -> Self { Self::empty() }
}

// ── Links ─────────────────────────────────────────────────────────────────────

/// One middleware bound to the composed remainder of its chain.
struct Link {
    index: usize,
    name: Arc<str>,
    handler: BoxedHandler,
    rest: BoxedHandler,
}

impl ErasedHandler for Link {
    fn call(&self, req: Request, res: Response, next: Next) -> BoxFuture {
        trace!(operation = "mw_handle", index = self.index as u64, middleware = %self.name);
        self.handler.call(req, res, Next::then(Arc::clone(&self.rest), next))
    }
}

/// End of a composed chain: defer to whatever follows the chain.
struct Terminal;

impl ErasedHandler for Terminal {
    fn call(&self, req: Request, res: Response, next: Next) -> BoxFuture {
        next.run(req, res)
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

/// Collects middleware in order and composes them into a [`Stack`].
///
/// Construction fails fast on configuration errors so a broken stack never
/// sees a request.
#[derive(Default)]
pub struct StackBuilder {
    layers: Vec<Middleware>,
    validate: bool,
}

impl StackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, mw: Middleware) -> Self {
        self.layers.push(mw);
        self
    }

    /// Appends a bare handler, named after its type, with no capability
    /// labels.
    pub fn handler<H: Handler>(self, handler: H) -> Self {
        self.push(Middleware::from_fn(handler))
    }

    pub fn extend(mut self, layers: impl IntoIterator<Item = Middleware>) -> Self {
        self.layers.extend(layers);
        self
    }

    /// Require every `expects` label to be provided by an earlier
    /// middleware. Off by default.
    pub fn validate_capabilities(mut self, enabled: bool) -> Self {
        self.validate = enabled;
        self
    }

    pub fn build(self) -> Result<Stack, Error> {
        if let Some(index) = self.layers.iter().position(|mw| mw.name.trim().is_empty()) {
            return Err(Error::UnnamedMiddleware { index });
        }
        if self.validate {
            check_capabilities(&self.layers)?;
        }
        Ok(Stack::compose(self.layers))
    }
}

fn check_capabilities(layers: &[Middleware]) -> Result<(), Error> {
    let mut provided: HashSet<&str> = HashSet::new();
    for mw in layers {
        if let Some(missing) = mw.expects.iter().find(|label| !provided.contains(label.as_str())) {
            return Err(Error::MissingCapability {
                middleware: mw.name.to_string(),
                capability: missing.clone(),
            });
        }
        provided.extend(mw.provides.iter().map(String::as_str));
    }
    Ok(())
}
