//! Request dispatch.

use crate::request::Request;
use crate::response::Response;
use crate::stack::Stack;

/// Runs one request through `stack` and returns the final response.
///
/// Stops at the first middleware that short-circuits. When the stack is
/// exhausted the response is returned as the last middleware left it. No
/// retries and no error recovery: a panicking middleware unwinds into the
/// caller.
pub async fn handle(stack: &Stack, req: Request, res: Response) -> Response {
    stack.handle(req, res).await
}
