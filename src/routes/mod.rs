use std::time::Duration;

use axum::{
    Router,
    http::{HeaderName, Request, Response, StatusCode, Uri},
    routing::get,
};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::{error::AppError, response::ApiResponse, state::AppState};

pub mod categories;
pub mod doc;
pub mod health;
pub mod links;
pub mod orders;
pub mod params;
pub mod pricing;
pub mod products;
pub mod reports;
pub mod suppliers;
pub mod users;

const REQUEST_ID_HEADER: &str = "x-request-id";

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/usuarios", users::router())
        .nest("/fornecedores", suppliers::router())
        .nest("/produtos", products::router())
        .nest("/categorias", categories::router())
        .nest("/vinculos", links::router())
        .nest("/pedidos", orders::router())
        .nest("/relatorios", reports::router())
        .nest("/precos-avaliacoes", pricing::router())
}

/// Full application: API under `/api`, health, docs and the tower layers.
pub fn create_app(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(ConcurrencyLimitLayer::new(100))
        .with_state(state)
}

async fn not_found(uri: Uri) -> ApiResponse<()> {
    ApiResponse::failure(
        StatusCode::NOT_FOUND,
        format!("Rota não encontrada: {}", uri.path()),
        None,
    )
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
