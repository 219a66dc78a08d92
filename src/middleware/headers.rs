use std::future::ready;

use crate::config::Config;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Appends `<product>/<version>` to the `Server` header, then continues.
///
/// An existing value is kept and the token is added after a space; an
/// absent header is created with the token alone. Not idempotent: put it in
/// a stack once.
pub fn default_headers(config: &Config) -> Middleware {
    let token = config.server_token();
    Middleware::map("DefaultHeaders", move |req: Request, mut res: Response| {
        let value = match res.header("server") {
            Some(existing) => format!("{existing} {token}"),
            None => token.clone(),
        };
        res.set_header("Server", value);
        ready((req, res))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stack;

    fn config() -> Config {
        Config::default().version("1.2.3")
    }

    #[tokio::test]
    async fn creates_server_header() {
        let stack = Stack::new([default_headers(&config())]).unwrap();
        let res = stack.handle(Request::new("GET", "/"), Response::default()).await;

        assert_eq!(res.header("Server"), Some("Meddle/1.2.3"));
    }

    #[tokio::test]
    async fn appends_to_existing_server_header() {
        let stack = Stack::new([default_headers(&config())]).unwrap();
        let mut res = Response::default();
        res.set_header("Server", "hyper");

        let res = stack.handle(Request::new("GET", "/"), res).await;

        assert_eq!(res.header("server"), Some("hyper Meddle/1.2.3"));
    }

    #[tokio::test]
    async fn runs_once_per_request_for_a_single_entry() {
        let stack = Stack::new([default_headers(&config())]).unwrap();

        for _ in 0..3 {
            let res = stack.handle(Request::new("GET", "/"), Response::default()).await;
            assert_eq!(res.header("Server"), Some("Meddle/1.2.3"));
        }
    }

    #[tokio::test]
    async fn listed_twice_appends_twice() {
        let stack = Stack::new([default_headers(&config()), default_headers(&config())]).unwrap();
        let res = stack.handle(Request::new("GET", "/"), Response::default()).await;

        assert_eq!(res.header("Server"), Some("Meddle/1.2.3 Meddle/1.2.3"));
    }
}
