//! # meddle
//!
//! Composable middleware stacks for HTTP request handling.
//!
//! ## The contract
//!
//! Your HTTP library parses the request. meddle runs it through an ordered
//! list of small handlers and hands back one response. Nothing more.
//!
//! Each middleware receives the request, the response built so far, and a
//! [`Next`] continuation. It either calls `next.run(req, res)` to let the
//! rest of the stack work, or returns a response on its own to stop there.
//! Middleware written against a `finished` flag instead (see
//! [`Middleware::map`]) stop the chain by calling [`Response::respond`].
//!
//! What meddle intentionally leaves to the HTTP layer:
//!
//! - **Sockets and TLS**: the listener belongs to hyper (or whatever you use)
//! - **Wire parsing**: meddle sees parsed requests only
//! - **Routing by pattern**: each middleware decides what it handles
//!
//! ## Quick start
//!
//! ```rust
//! use meddle::{middleware, Config, Next, Request, Response, Stack};
//!
//! async fn hello(req: Request, mut res: Response, next: Next) -> Response {
//!     if req.resource() != Some("/hello") {
//!         return next.run(req, res).await;
//!     }
//!     let name = req.url_params()
//!         .and_then(|p| p.get("name").cloned())
//!         .unwrap_or_else(|| "world".to_owned());
//!     res.write(format!("hello, {name}"));
//!     res.respond()
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), meddle::Error> {
//! let stack = Stack::builder()
//!     .extend(middleware::defaults(&Config::default()))
//!     .handler(hello)
//!     .push(middleware::not_found())
//!     .build()?;
//!
//! let res = stack.handle(Request::new("GET", "/hello?name=ada"), Response::default()).await;
//! assert_eq!(res.body(), b"hello, ada");
//!
//! let res = stack.handle(Request::new("GET", "/elsewhere"), Response::default()).await;
//! assert_eq!(res.status(), 404);
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatch;
mod error;
mod handler;
mod request;
mod response;
mod service;
mod stack;
mod state;

pub mod middleware;

pub use config::Config;
pub use dispatch::handle;
pub use error::Error;
pub use handler::{BoxFuture, Handler, Next};
pub use middleware::Middleware;
pub use request::Request;
pub use response::Response;
pub use stack::{Stack, StackBuilder};
pub use state::{Key, Params, State};
