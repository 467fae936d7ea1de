mod book;
mod order;

pub use self::{book::*, order::*};

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::AppModule;

pub fn build(module: AppModule) -> Router {
    Router::new()
        .route_book()
        .route_order()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(module)
}

/// Renders the wrapped response with `201 Created`.
pub struct Created<R>(pub R);

impl<R: IntoResponse> IntoResponse for Created<R> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::CREATED, self.0).into_response()
    }
}

/// Reads a JSON number as an integer. Integral floats such as `5.0` are accepted.
pub(crate) fn integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|float| float.fract() == 0.0)
            .filter(|float| *float >= i64::MIN as f64 && *float < i64::MAX as f64)
            .map(|float| float as i64)
    })
}
