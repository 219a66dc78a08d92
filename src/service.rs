//! Boundary with the `http` crate types used by hyper.
//!
//! meddle owns no listener. The HTTP layer parses a request, converts it
//! with [`Request::from_http`], runs the stack and writes back the result of
//! [`Response::into_http`]. [`Stack::serve_http`] does all three.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use tracing::debug;

use crate::request::Request;
use crate::response::Response;
use crate::stack::Stack;
use crate::state::State;

impl Request {
    /// Buffers the body and copies method, path+query and headers.
    ///
    /// Header values are read as UTF-8; invalid bytes become U+FFFD.
    pub async fn from_http<B>(req: http::Request<B>) -> Result<Self, B::Error>
    where
        B: Body,
    {
        let (parts, body) = req.into_parts();
        let body = body.collect().await?.to_bytes();

        let target = match parts.uri.path_and_query() {
            Some(pq) => pq.as_str().to_owned(),
            None => parts.uri.path().to_owned(),
        };
        let headers = parts.headers.iter()
            .map(|(name, value)| {
                let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                (name.as_str().to_owned(), value)
            })
            .collect();

        Ok(Self {
            method: parts.method.as_str().to_owned(),
            target,
            headers,
            body: body.to_vec(),
            state: State::new(),
        })
    }
}

impl Response {
    /// Converts into an `http::Response` ready for hyper.
    ///
    /// A status outside `100..=999` becomes `500`; headers with invalid
    /// names or values are dropped.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut out = http::Response::new(Full::new(Bytes::from(self.body)));
        *out.status_mut() = StatusCode::from_u16(self.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        for (name, value) in self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                (Ok(name), Ok(value)) => {
                    out.headers_mut().append(name, value);
                }
                _ => debug!(header = %name, "dropping invalid response header"),
            }
        }
        out
    }
}

impl Stack {
    /// Converts, dispatches and converts back.
    ///
    /// Only a failure to read the request body is an error; everything the
    /// chain does ends in a response.
    pub async fn serve_http<B>(&self, req: http::Request<B>) -> Result<http::Response<Full<Bytes>>, B::Error>
    where
        B: Body,
    {
        let req = Request::from_http(req).await?;
        Ok(self.handle(req, Response::default()).await.into_http())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Next;
    use crate::middleware::{self, Middleware};

    #[tokio::test]
    async fn copies_request_parts() {
        let req = http::Request::builder()
            .method("POST")
            .uri("/search?q=rust")
            .header("Cookie", "a=1")
            .body(Full::new(Bytes::from_static(b"x=1")))
            .unwrap();

        let req = Request::from_http(req).await.unwrap();

        assert_eq!(req.method(), "POST");
        assert_eq!(req.target(), "/search?q=rust");
        assert_eq!(req.header_value("cookie"), Some("a=1"));
        assert_eq!(req.raw_body(), b"x=1");
        assert!(req.state().is_empty());
    }

    #[tokio::test]
    async fn keeps_non_ascii_header_values() {
        let req = http::Request::builder()
            .uri("/")
            .header("cookie", HeaderValue::from_bytes("name=Zoë".as_bytes()).unwrap())
            .body(Full::new(Bytes::new()))
            .unwrap();

        let req = Request::from_http(req).await.unwrap();

        assert_eq!(req.header_value("cookie"), Some("name=Zoë"));
    }

    #[tokio::test]
    async fn non_ascii_cookie_reaches_cookie_decoder() {
        let seen = Middleware::new("seen", |req: Request, mut res: Response, _next: Next| {
            let name = req.cookies().and_then(|c| c.get("name")).cloned().unwrap_or_default();
            res.write(name);
            std::future::ready(res.respond())
        });
        let stack = Stack::new([middleware::cookie_decoder(), seen]).unwrap();
        let req = http::Request::builder()
            .uri("/")
            .header("cookie", HeaderValue::from_bytes("name=Zoë".as_bytes()).unwrap())
            .body(Full::new(Bytes::new()))
            .unwrap();

        let res = stack.serve_http(req).await.unwrap();
        let body = res.into_body().collect().await.unwrap().to_bytes();

        assert_eq!(&body[..], "Zoë".as_bytes());
    }

    #[test]
    fn converts_response() {
        let mut res = Response::new(404);
        res.set_header("content-type", "text/plain");
        res.set_header("bad header", "dropped");
        res.write("gone");

        let out = res.into_http();

        assert_eq!(out.status(), StatusCode::NOT_FOUND);
        assert_eq!(out.headers().get("content-type").unwrap(), "text/plain");
        assert_eq!(out.headers().len(), 1);
    }

    #[test]
    fn out_of_range_status_becomes_500() {
        let out = Response::new(42).into_http();
        assert_eq!(out.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn serve_http_runs_the_stack() {
        let stack = Stack::new([middleware::not_found()]).unwrap();
        let req = http::Request::builder()
            .uri("/anything")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let res = stack.serve_http(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = res.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}
