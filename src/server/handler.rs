// src/server/handler.rs
use hyper::body::{Bytes, HttpBody};
use hyper::header::{HeaderValue, CONTENT_LENGTH};
use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tower::{Layer, Service};
use tower_http::cors::{AllowHeaders, AllowOrigin, Cors, CorsLayer};
use tracing::{error, info, warn, Instrument};

use super::response;
use super::static_files::StaticFiles;
use crate::config::{Config, CorsConfig};
use crate::metrics::{MetricsCollector, Timer};
use crate::prediction::{PredictionError, PredictionResponse, PredictionService};

pub const PREDICTION_PATH: &str = "/diabetes_prediction";
pub const HEALTH_PATH: &str = "/health";
pub const MODEL_INFO_PATH: &str = "/api/model-info";

const REQUEST_ID_HEADER: &str = "x-request-id";
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(3600);

/// Everything a request needs, built once at startup.
pub struct AppState {
    pub service: PredictionService,
    pub metrics: Option<Arc<MetricsCollector>>,
    pub frontend: Option<StaticFiles>,
    pub cors: CorsConfig,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(service: PredictionService, config: &Config) -> Self {
        Self {
            service,
            metrics: None,
            frontend: config
                .frontend
                .enabled
                .then(|| StaticFiles::new(config.frontend.build_dir.clone())),
            cors: config.cors.clone(),
            max_body_bytes: config.server.max_body_bytes,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        metrics.set_model_loaded(self.service.is_model_loaded());
        self.metrics = Some(metrics);
        self
    }
}

#[derive(Clone)]
pub struct RequestHandler {
    state: Arc<AppState>,
}

impl RequestHandler {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Wraps the handler in the configured CORS policy. Preflights are
    /// answered by the layer and never reach routing.
    pub fn with_cors(self) -> Cors<RequestHandler> {
        cors_layer(&self.state.cors).layer(self)
    }

    async fn handle(&self, req: Request<Body>) -> (&'static str, Response<Body>) {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        match path.as_str() {
            PREDICTION_PATH => {
                let response = if method == Method::POST {
                    self.predict(req).await
                } else {
                    response::method_not_allowed("POST, OPTIONS")
                };
                (PREDICTION_PATH, response)
            }
            HEALTH_PATH => {
                let response = if method == Method::GET || method == Method::HEAD {
                    response::json(StatusCode::OK, &self.state.service.health())
                } else {
                    response::method_not_allowed("GET, OPTIONS")
                };
                (HEALTH_PATH, response)
            }
            MODEL_INFO_PATH => {
                let response = if method == Method::GET || method == Method::HEAD {
                    response::json(StatusCode::OK, &self.state.service.model_info())
                } else {
                    response::method_not_allowed("GET, OPTIONS")
                };
                (MODEL_INFO_PATH, response)
            }
            _ => match &self.state.frontend {
                Some(files) if method == Method::GET || method == Method::HEAD => {
                    ("static", files.serve(req).await)
                }
                _ => ("unmatched", response::not_found()),
            },
        }
    }

    async fn predict(&self, req: Request<Body>) -> Response<Body> {
        let limit = self.state.max_body_bytes;
        let body = match read_body(req, limit).await {
            Ok(body) => body,
            Err(BodyError::TooLarge) => {
                warn!("Rejected prediction body larger than {} bytes", limit);
                return response::payload_too_large(limit);
            }
            Err(BodyError::Transport(e)) => {
                warn!("Failed to read request body: {}", e);
                return response::error(
                    StatusCode::BAD_REQUEST,
                    "bad_request",
                    "failed to read request body",
                );
            }
        };

        let result = self.state.service.predict_json(&body);
        if let Some(metrics) = &self.state.metrics {
            metrics.record_prediction(&result);
        }

        match result {
            Ok(outcome) => {
                info!(outcome = outcome.as_str(), "Prediction served");
                response::json(StatusCode::OK, &PredictionResponse::from(outcome))
            }
            Err(err) => {
                match &err {
                    PredictionError::ClassifierInvocation(e) => {
                        error!("Classifier invocation failed: {}", e)
                    }
                    PredictionError::ModelUnavailable(reason) => {
                        warn!("Prediction rejected, model unavailable: {}", reason)
                    }
                    PredictionError::Validation(errors) => {
                        info!("Prediction rejected, invalid input: {}", errors)
                    }
                }
                err.into()
            }
        }
    }
}

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allowed_origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .max_age(PREFLIGHT_MAX_AGE)
}

enum BodyError {
    TooLarge,
    Transport(hyper::Error),
}

async fn read_body(req: Request<Body>, limit: usize) -> Result<Bytes, BodyError> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.map_or(false, |len| len > limit) {
        return Err(BodyError::TooLarge);
    }

    let mut body = req.into_body();
    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk.map_err(BodyError::Transport)?;
        if buf.len() + chunk.len() > limit {
            return Err(BodyError::TooLarge);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buf))
}

impl Service<Request<Body>> for RequestHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let handler = self.clone();
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "request",
            id = %request_id,
            method = %req.method(),
            path = %req.uri().path(),
        );

        Box::pin(
            async move {
                let timer = Timer::new();
                let method = req.method().clone();

                let (route, mut response) = handler.handle(req).await;

                if let Ok(value) = HeaderValue::from_str(&request_id) {
                    response.headers_mut().insert(REQUEST_ID_HEADER, value);
                }

                let status = response.status().as_u16();
                let elapsed = timer.elapsed();
                if let Some(metrics) = &handler.state.metrics {
                    metrics.record_request(method.as_str(), route, status, elapsed);
                }
                info!(status, latency_ms = elapsed.as_millis() as u64, "Request completed");

                Ok(response)
            }
            .instrument(span),
        )
    }
}
