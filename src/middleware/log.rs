use std::future::ready;

use tracing::info;

use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Logs method, resource and the status so far, then continues.
pub fn log_request() -> Middleware {
    Middleware::map("LogRequest", |req: Request, res: Response| {
        info!(method = %req.method(), resource = %req.path(), status = res.status(), "request");
        ready((req, res))
    })
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::handler::Next;
    use crate::Stack;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn marker() -> Middleware {
        Middleware::new("marker", |req: Request, mut res: Response, next: Next| async move {
            res.set_header("x-marker", "ran");
            next.run(req, res).await
        })
    }

    #[tokio::test]
    async fn continues_without_finishing() {
        let stack = Stack::new([log_request(), marker()]).unwrap();
        let res = stack.handle(Request::new("GET", "/items"), Response::default()).await;

        assert_eq!(res.header("x-marker"), Some("ran"));
        assert!(!res.is_finished());
        assert_eq!(res.status(), 200);
    }

    #[tokio::test]
    async fn emits_method_resource_and_status() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let stack = Stack::new([log_request(), marker()]).unwrap();
        let mut res = Response::default();
        res.set_status(201);
        stack.handle(Request::new("POST", "/items?page=2"), res).await;

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("method=POST"), "{output}");
        assert!(output.contains("resource=/items"), "{output}");
        assert!(!output.contains("page=2"), "{output}");
        assert!(output.contains("status=201"), "{output}");
    }
}
