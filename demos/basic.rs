//! Serves `./public` through a meddle stack on hyper.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/index.html
//!   curl -i 'http://localhost:3000/hello?name=ada'
//!   curl -i --path-as-is http://localhost:3000/../../etc/passwd   → 400
//!   curl -i http://localhost:3000/missing                        → 404

use std::net::SocketAddr;

use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use meddle::{middleware, Config, Next, Request, Response, Stack};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let stack = Stack::builder()
        .extend(middleware::defaults(&Config::default()))
        .push(middleware::log_request())
        .handler(hello)
        .push(middleware::file_server("public")?)
        .push(middleware::not_found())
        .build()?;

    let addr: SocketAddr = "127.0.0.1:3000".parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, stack = ?stack.names().collect::<Vec<_>>(), "listening");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    // Open connections are dropped with the runtime on ctrl-c.
    loop {
        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!(error = %e, "accept failed");
                    continue;
                }
            },
        };

        tokio::spawn(serve(stack.clone(), stream, peer));
    }

    info!("stopped");
    Ok(())
}

async fn serve(stack: Stack, stream: TcpStream, peer: SocketAddr) {
    let svc = service_fn(move |req| {
        let stack = stack.clone();
        async move { stack.serve_http(req).await }
    });
    let builder = ConnBuilder::new(TokioExecutor::new());
    if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
        error!(%peer, error = %e, "connection failed");
    }
}

// GET /hello?name=…; everything else falls through to the file server.
async fn hello(req: Request, mut res: Response, next: Next) -> Response {
    if req.resource() != Some("/hello") {
        return next.run(req, res).await;
    }
    let name = req.url_params()
        .and_then(|p| p.get("name").cloned())
        .unwrap_or_else(|| "world".to_owned());
    res.set_header("content-type", "text/plain; charset=utf-8");
    res.write(format!("hello, {name}\n"));
    res.respond()
}
