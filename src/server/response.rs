// src/server/response.rs
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Response, StatusCode};
use serde::Serialize;

use crate::prediction::PredictionError;

#[derive(Debug, Serialize)]
pub struct ErrorBody<D: Serialize> {
    pub error: &'static str,
    pub detail: D,
}

pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            let mut response = Response::new(Body::from(bytes));
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            response
        }
        Err(e) => {
            tracing::error!("Failed to serialize response body: {}", e);
            empty(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub fn error<D: Serialize>(status: StatusCode, error: &'static str, detail: D) -> Response<Body> {
    json(status, &ErrorBody { error, detail })
}

pub fn empty(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

pub fn not_found() -> Response<Body> {
    error(StatusCode::NOT_FOUND, "not_found", "Not Found")
}

pub fn method_not_allowed(allow: &'static str) -> Response<Body> {
    let mut response = error(
        StatusCode::METHOD_NOT_ALLOWED,
        "method_not_allowed",
        "Method Not Allowed",
    );
    response
        .headers_mut()
        .insert(hyper::header::ALLOW, HeaderValue::from_static(allow));
    response
}

pub fn payload_too_large(limit: usize) -> Response<Body> {
    error(
        StatusCode::PAYLOAD_TOO_LARGE,
        "payload_too_large",
        format!("request body exceeds {limit} bytes"),
    )
}

// Internals of classifier faults stay in the logs.
impl From<PredictionError> for Response<Body> {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::Validation(errors) => {
                error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", errors)
            }
            PredictionError::ModelUnavailable(reason) => {
                error(StatusCode::SERVICE_UNAVAILABLE, "model_unavailable", reason)
            }
            PredictionError::ClassifierInvocation(_) => error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error",
            ),
        }
    }
}
