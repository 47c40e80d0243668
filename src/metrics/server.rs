// src/metrics/server.rs
use anyhow::{Context, Result};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

use super::MetricsRegistry;

fn render(registry: &MetricsRegistry, path: &str, req: &Request<Body>) -> Response<Body> {
    if req.uri().path() != path {
        let mut response = Response::new(Body::from("Not Found"));
        *response.status_mut() = StatusCode::NOT_FOUND;
        return response;
    }

    match registry.gather() {
        Ok(metrics) => {
            let mut response = Response::new(Body::from(metrics));
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            );
            response
        }
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

/// Serve the Prometheus text format on its own port, in a background task.
pub async fn start_metrics_server(
    addr: SocketAddr,
    registry: Arc<MetricsRegistry>,
    path: String,
) -> Result<()> {
    let metrics_path = Arc::new(path);
    let service_path = metrics_path.clone();

    let make_service = hyper::service::make_service_fn(move |_| {
        let registry = registry.clone();
        let path = service_path.clone();

        async move {
            Ok::<_, Infallible>(hyper::service::service_fn(move |req: Request<Body>| {
                let response = render(&registry, path.as_str(), &req);
                async move { Ok::<_, Infallible>(response) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind metrics server on {}", addr))?
        .serve(make_service);

    info!(
        "Metrics server listening on http://{}{}",
        addr,
        metrics_path.as_str()
    );

    tokio::spawn(async move {
        if let Err(e) = server.await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_only_the_configured_path() {
        let registry = MetricsRegistry::new().unwrap();
        registry.collector().set_model_loaded(false);

        let req = Request::get("/metrics").body(Body::empty()).unwrap();
        let response = render(&registry, "/metrics", &req);
        assert_eq!(response.status(), StatusCode::OK);

        let req = Request::get("/other").body(Body::empty()).unwrap();
        let response = render(&registry, "/metrics", &req);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
