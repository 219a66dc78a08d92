use std::future::ready;

use crate::handler::Next;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Always responds `404` and ends the chain.
///
/// Put it last so requests nothing else handled still get a meaningful
/// status instead of the default `200`.
pub fn not_found() -> Middleware {
    Middleware::new("NotFound", |_req: Request, mut res: Response, _next: Next| {
        res.set_status(404);
        ready(res.respond())
    })
}
