//! Static file serving with directory-escape protection.
//!
//! The request path is matched against `<prefix>/{*path}`. The captured
//! remainder is joined onto the root and normalized lexically (`.`, `..` and
//! repeated separators resolved, no filesystem access). The result must
//! still lie under the normalized root or the request is rejected with
//! `400` before anything is read.
//!
//! A path that stays under the root but does not name a regular file is
//! passed through to the next middleware untouched.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{error, warn};

use crate::error::Error;
use crate::handler::Next;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;

/// Serves files below `root` for any path starting with `/`.
pub fn file_server(root: impl AsRef<Path>) -> Result<Middleware, Error> {
    mounted_file_server("", root)
}

/// Serves files below `root` for paths under `prefix`, e.g. `/assets`.
///
/// Leading and trailing slashes on `prefix` are optional: `assets`,
/// `/assets` and `/assets/` mount at the same place.
///
/// Fails if `prefix` does not form a valid route pattern or the working
/// directory needed to absolutize a relative `root` is unavailable.
pub fn mounted_file_server(prefix: &str, root: impl AsRef<Path>) -> Result<Middleware, Error> {
    let pattern = match prefix.trim_matches('/') {
        "" => "/{*path}".to_owned(),
        trimmed => format!("/{trimmed}/{{*path}}"),
    };
    let mut matcher = matchit::Router::new();
    if let Err(source) = matcher.insert(pattern.as_str(), ()) {
        return Err(Error::InvalidMount { pattern, source });
    }

    let root = normalize(&std::path::absolute(root)?);
    let server = Arc::new(FileServer { root, matcher });

    Ok(Middleware::new("FileServer", move |req: Request, res: Response, next: Next| {
        let server = Arc::clone(&server);
        async move { server.serve(req, res, next).await }
    }))
}

struct FileServer {
    root: PathBuf,
    matcher: matchit::Router<()>,
}

impl FileServer {
    async fn serve(&self, req: Request, mut res: Response, next: Next) -> Response {
        let captured = match self.matcher.at(req.path()) {
            Ok(matched) => matched.params.get("path").map(str::to_owned),
            Err(_) => None,
        };
        let Some(captured) = captured else {
            return next.run(req, res).await;
        };

        let Some(file) = self.resolve(&captured) else {
            warn!(path = %captured, root = %self.root.display(), "rejected path outside root");
            res.set_status(400);
            return res.respond();
        };

        match tokio::fs::metadata(&file).await {
            Ok(meta) if meta.is_file() => {}
            _ => return next.run(req, res).await,
        }

        match tokio::fs::read(&file).await {
            Ok(contents) => {
                res.set_header("content-type", content_type(&file));
                res.write(contents);
                res.respond()
            }
            Err(e) => {
                error!(path = %file.display(), error = %e, "failed to read file");
                res.set_status(500);
                res.respond()
            }
        }
    }

    /// `None` when the normalized candidate escapes the root.
    fn resolve(&self, captured: &str) -> Option<PathBuf> {
        let candidate = normalize(&self.root.join(captured));
        candidate.starts_with(&self.root).then_some(candidate)
    }
}

/// Lexical normalization; `..` at the filesystem root stays at the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn content_type(path: &Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css"          => "text/css; charset=utf-8",
        "js" | "mjs"   => "text/javascript; charset=utf-8",
        "json"         => "application/json",
        "txt"          => "text/plain; charset=utf-8",
        "xml"          => "application/xml",
        "svg"          => "image/svg+xml",
        "png"          => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif"          => "image/gif",
        "ico"          => "image/x-icon",
        "wasm"         => "application/wasm",
        "pdf"          => "application/pdf",
        _              => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(root: &str) -> FileServer {
        let mut matcher = matchit::Router::new();
        matcher.insert("/{*path}", ()).unwrap();
        FileServer { root: normalize(Path::new(root)), matcher }
    }

    #[test]
    fn normalize_resolves_dots() {
        assert_eq!(normalize(Path::new("/srv/www/./a//b/../c")), Path::new("/srv/www/a/c"));
        assert_eq!(normalize(Path::new("/../../etc")), Path::new("/etc"));
    }

    #[test]
    fn resolve_accepts_descendants() {
        let server = server("/srv/www");
        assert_eq!(server.resolve("css/site.css"), Some(PathBuf::from("/srv/www/css/site.css")));
        assert_eq!(server.resolve("a/../index.html"), Some(PathBuf::from("/srv/www/index.html")));
    }

    #[test]
    fn resolve_rejects_escapes() {
        let server = server("/srv/www");
        assert_eq!(server.resolve("../../etc/passwd"), None);
        assert_eq!(server.resolve("/etc/passwd"), None);
    }

    #[test]
    fn sibling_with_shared_prefix_is_not_a_descendant() {
        let server = server("/srv/www");
        assert_eq!(server.resolve("../www-private/key.pem"), None);
    }

    #[test]
    fn invalid_prefix_is_a_configuration_error() {
        let err = mounted_file_server("/{*rest}", "/srv/www").err();
        assert!(matches!(err, Some(Error::InvalidMount { .. })));
    }

    #[test]
    fn prefix_slashes_are_optional() {
        for prefix in ["static", "/static", "static/", "/static/"] {
            let mw = mounted_file_server(prefix, "/srv/www").unwrap();
            assert_eq!(mw.name(), "FileServer");
        }
    }

    #[test]
    fn guesses_content_type_from_extension() {
        assert_eq!(content_type(Path::new("index.HTML")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("blob")), "application/octet-stream");
    }
}
