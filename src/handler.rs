//! Handler trait, continuation and type erasure.
//!
//! # How middleware handlers are stored
//!
//! A [`Stack`](crate::Stack) holds handlers of *different* concrete types in
//! one `Vec`, so each one is hidden behind a trait object
//! (`dyn ErasedHandler`) with a common call signature:
//!
//! ```text
//! async fn auth(req, res, next) -> Response { … }   ← user writes this
//!        ↓ Middleware::new("auth", auth)
//! auth.into_boxed_handler()                        ← Handler blanket impl
//!        ↓
//! Arc::new(FnHandler(auth))                        ← stored as BoxedHandler
//!        ↓
//! handler.call(req, res, next) at request time     ← one vtable dispatch
//! ```
//!
//! # Continuation
//!
//! Every handler receives a [`Next`]. Calling `next.run(req, res)` runs the
//! remainder of the chain and yields its response; returning without
//! calling it short-circuits.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::Response;

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` because it appears in the return type of the public
/// `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request, res: Response, next: Next) -> BoxFuture;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid middleware handler.
///
/// Satisfied automatically by any function or closure of the shape:
///
/// ```text
/// async fn name(req: Request, res: Response, next: Next) -> Response
/// ```
///
/// The trait is sealed; only the blanket impl below can satisfy it.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut> private::Sealed for F
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
}

impl<F, Fut> Handler for F
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

struct FnHandler<F>(F);

impl<F, Fut> ErasedHandler for FnHandler<F>
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request, res: Response, next: Next) -> BoxFuture {
        Box::pin((self.0)(req, res, next))
    }
}

// ── Continuation ──────────────────────────────────────────────────────────────

/// "Run the rest of the chain."
///
/// A `Next` is handed to every handler. It is consumed by [`run`](Next::run),
/// so a handler can continue the chain at most once.
pub struct Next {
    kind: NextKind,
}

enum NextKind {
    /// End of the outermost chain: hand the response back unchanged.
    Terminal,
    /// The rest of a composed chain, followed by whatever comes after it.
    Rest { rest: BoxedHandler, after: Box<Next> },
}

impl Next {
    /// The implicit terminal handler appended to every chain.
    pub fn terminal() -> Self {
        Self { kind: NextKind::Terminal }
    }

    pub(crate) fn then(rest: BoxedHandler, after: Next) -> Self {
        Self { kind: NextKind::Rest { rest, after: Box::new(after) } }
    }

    /// Runs the remainder of the chain.
    ///
    /// A response that is already finished is returned as-is; nothing
    /// further runs.
    pub fn run(self, req: Request, res: Response) -> BoxFuture {
        if res.is_finished() {
            return Box::pin(std::future::ready(res));
        }
        match self.kind {
            NextKind::Terminal => Box::pin(std::future::ready(res)),
            NextKind::Rest { rest, after } => rest.call(req, res, *after),
        }
    }
}
