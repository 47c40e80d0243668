// src/server/static_files.rs
use hyper::{Body, Request, Response, StatusCode};
use std::path::{Path, PathBuf};
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};

use super::response;

/// Serves a prebuilt single-page frontend from one directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    dir: ServeDir<ServeFile>,
}

impl StaticFiles {
    /// Unknown paths fall back to `index.html` so client-side routes resolve.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let dir = ServeDir::new(&root).fallback(ServeFile::new(root.join("index.html")));
        Self { root, dir }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn serve(&self, req: Request<Body>) -> Response<Body> {
        let response = match self.dir.clone().oneshot(req).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        if response.status() == StatusCode::NOT_FOUND {
            return response::error(
                StatusCode::NOT_FOUND,
                "frontend_not_found",
                format!("no frontend build at {}", self.root.display()),
            );
        }

        let (parts, body) = response.into_parts();
        match hyper::body::to_bytes(body).await {
            Ok(bytes) => Response::from_parts(parts, Body::from(bytes)),
            Err(e) => {
                tracing::warn!("Failed to read static file below {}: {}", self.root.display(), e);
                response::error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::CONTENT_TYPE;

    async fn body_string(response: Response<Body>) -> String {
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn get(path: &str) -> Request<Body> {
        Request::get(path).body(Body::empty()).unwrap()
    }

    fn build_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>app</html>").unwrap();
        std::fs::create_dir(dir.path().join("static")).unwrap();
        std::fs::write(dir.path().join("static").join("main.css"), "body{}").unwrap();
        std::fs::write(dir.path().join("my photo.jpeg"), [0xffu8, 0xd8, 0xff]).unwrap();
        dir
    }

    #[tokio::test]
    async fn serves_files_with_content_type() {
        let dir = build_dir();
        let files = StaticFiles::new(dir.path());

        let response = files.serve(get("/static/main.css")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/css");
        assert_eq!(body_string(response).await, "body{}");
    }

    #[tokio::test]
    async fn percent_encoded_names_are_decoded() {
        let dir = build_dir();
        let files = StaticFiles::new(dir.path());

        let response = files.serve(get("/my%20photo.jpeg")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/jpeg");
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(&bytes[..], &[0xffu8, 0xd8, 0xff]);
    }

    #[tokio::test]
    async fn unknown_routes_fall_back_to_index() {
        let dir = build_dir();
        let files = StaticFiles::new(dir.path());

        for path in ["/", "/predict/form", "/static/missing.js"] {
            let response = files.serve(get(path)).await;
            assert_eq!(response.status(), StatusCode::OK, "{path}");
            assert_eq!(body_string(response).await, "<html>app</html>");
        }
    }

    #[tokio::test]
    async fn traversal_never_leaves_the_root() {
        let dir = build_dir();
        std::fs::write(dir.path().join("static").join("index.html"), "<html>inner</html>").unwrap();
        let files = StaticFiles::new(dir.path().join("static"));

        let response = files.serve(get("/../index.html")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "<html>inner</html>");
    }

    #[tokio::test]
    async fn missing_build_reports_frontend_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let files = StaticFiles::new(dir.path().join("build"));
        let response = files.serve(get("/")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_string(response).await.contains("frontend_not_found"));
    }
}
