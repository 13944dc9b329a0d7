//! HTTP surface: routes, CORS and rejection mapping

use crate::context::ServiceContext;
use crate::inference;
use sfr_features::{ErrorBody, InputRecord, Liveness};
use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;
use warp::http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE,
    ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN, VARY,
};
use warp::http::{Method, StatusCode};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

/// Largest accepted `/predict` body
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

/// Preflight cache lifetime, seconds
const CORS_MAX_AGE: &str = "600";

/// Complete route tree; every reply carries the CORS headers
pub fn routes(ctx: Arc<ServiceContext>) -> impl Filter<Extract = (Response,), Error = Infallible> + Clone {
    preflight()
        .or(liveness())
        .unify()
        .or(predict(ctx))
        .unify()
        .recover(handle_rejection)
        .unify()
        .and(warp::header::headers_cloned())
        .map(|response: Response, headers: HeaderMap| with_cors(response, &headers))
}

/// `GET /`
pub fn liveness() -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path::end()
        .and(warp::get())
        .map(|| warp::reply::json(&Liveness::default()).into_response())
}

/// CORS preflight on any path: the requested method and headers are echoed back
///
/// Anything else, including an `OPTIONS` without
/// `Access-Control-Request-Method`, falls through to the other routes.
pub fn preflight() -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::method()
        .and(warp::header::headers_cloned())
        .and_then(|method: Method, headers: HeaderMap| async move {
            let requested = headers.get(ACCESS_CONTROL_REQUEST_METHOD).cloned();
            let Some(requested) = requested.filter(|_| method == Method::OPTIONS) else {
                return Err(warp::reject::not_found());
            };
            let mut response = warp::reply().into_response();
            let out = response.headers_mut();
            out.insert(ACCESS_CONTROL_ALLOW_METHODS, requested);
            if let Some(requested) = headers.get(ACCESS_CONTROL_REQUEST_HEADERS) {
                out.insert(ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
            }
            out.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(CORS_MAX_AGE));
            Ok::<_, Rejection>(response)
        })
}

/// `POST /predict`
pub fn predict(ctx: Arc<ServiceContext>) -> impl Filter<Extract = (Response,), Error = Rejection> + Clone {
    warp::path("predict")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::json())
        .and(with_context(ctx))
        .map(handle_predict)
}

fn with_context(ctx: Arc<ServiceContext>) -> impl Filter<Extract = (Arc<ServiceContext>,), Error = Infallible> + Clone {
    warp::any().map(move || Arc::clone(&ctx))
}

/// Allow the calling origin (or any, without an `Origin` header) with credentials
fn with_cors(mut response: Response, request: &HeaderMap) -> Response {
    let origin = request
        .get(ORIGIN)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));
    let out = response.headers_mut();
    out.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    out.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    out.append(VARY, HeaderValue::from_static("origin"));
    response
}

fn handle_predict(record: InputRecord, ctx: Arc<ServiceContext>) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("predict", %request_id, crop = %record.crop_type);
    let _enter = span.enter();

    match inference::predict(&ctx, &record) {
        Ok(result) => {
            tracing::info!(
                fertilizer = %result.fertilizer_type,
                quantity = result.quantity_kg_per_acre,
                "Prediction served"
            );
            warp::reply::json(&result).into_response()
        }
        Err(e) => {
            tracing::error!(stage = e.stage(), "Prediction failed: {}", e);
            error_reply(e.status(), e.to_string())
        }
    }
}

/// JSON `{"detail": ..}` response
#[must_use]
pub fn error_reply(status: StatusCode, detail: impl Into<String>) -> Response {
    warp::reply::with_status(warp::reply::json(&ErrorBody::new(detail)), status).into_response()
}

/// Turn warp rejections into `{"detail": ..}` bodies
///
/// # Errors
/// Never; the error type only satisfies `recover`
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, detail) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported Media Type".to_string())
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large".to_string())
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        (StatusCode::LENGTH_REQUIRED, "Length Required".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
    };
    Ok(error_reply(status, detail))
}
