use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::pricing::{
        PriceComparison, PriceHistory, PriceOffer, PriceRequest, ReviewRequest, ReviewTrend,
        SupplierRankingList,
    },
    error::AppResult,
    extract::{AppJson, AppQuery, IdPath},
    middleware::auth::AuthUser,
    models::{SupplierPrice, SupplierReview},
    response::ApiResponse,
    routes::params::{BestPriceQuery, PriceHistoryQuery, RankingQuery, TrendQuery},
    services::pricing_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/precos", post(create_price))
        .route("/avaliacoes", post(create_review))
        .route("/comparativo/{id}", get(comparison))
        .route("/melhor-preco/{id}", get(best_price))
        .route("/ranking", get(ranking))
        .route("/historico/{id}", get(price_history))
        .route("/tendencia/{id}", get(review_trend))
}

#[utoipa::path(
    post,
    path = "/api/precos-avaliacoes/precos",
    request_body = PriceRequest,
    responses(
        (status = 201, description = "Price registered", body = ApiResponse<SupplierPrice>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the supplier's store"),
        (status = 409, description = "Overlapping validity window")
    ),
    tag = "Precos"
)]
pub async fn create_price(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<PriceRequest>,
) -> AppResult<ApiResponse<SupplierPrice>> {
    pricing_service::create_price(&state, &user, payload).await
}

#[utoipa::path(
    post,
    path = "/api/precos-avaliacoes/avaliacoes",
    request_body = ReviewRequest,
    responses(
        (status = 201, description = "Review registered", body = ApiResponse<SupplierReview>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Supplier or product not found")
    ),
    tag = "Precos"
)]
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ReviewRequest>,
) -> AppResult<ApiResponse<SupplierReview>> {
    pricing_service::create_review(&state, &user, payload).await
}

#[utoipa::path(
    get,
    path = "/api/precos-avaliacoes/comparativo/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Current offers ranked by price", body = ApiResponse<PriceComparison>),
        (status = 404, description = "Product not found")
    ),
    tag = "Precos"
)]
pub async fn comparison(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<PriceComparison>> {
    pricing_service::comparison(&state, id).await
}

#[utoipa::path(
    get,
    path = "/api/precos-avaliacoes/melhor-preco/{id}",
    params(("id" = i32, Path, description = "Product id"), BestPriceQuery),
    responses(
        (status = 200, description = "Cheapest current offer", body = ApiResponse<PriceOffer>),
        (status = 404, description = "No price for this product")
    ),
    tag = "Precos"
)]
pub async fn best_price(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    AppQuery(query): AppQuery<BestPriceQuery>,
) -> AppResult<ApiResponse<PriceOffer>> {
    pricing_service::best_price(&state, id, query).await
}

#[utoipa::path(
    get,
    path = "/api/precos-avaliacoes/ranking",
    params(RankingQuery),
    responses((status = 200, description = "Suppliers ranked by review score", body = ApiResponse<SupplierRankingList>)),
    tag = "Precos"
)]
pub async fn ranking(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<RankingQuery>,
) -> AppResult<ApiResponse<SupplierRankingList>> {
    pricing_service::ranking(&state, query).await
}

#[utoipa::path(
    get,
    path = "/api/precos-avaliacoes/historico/{id}",
    params(("id" = i32, Path, description = "Product id"), PriceHistoryQuery),
    responses(
        (status = 200, description = "Latest prices of the product", body = ApiResponse<PriceHistory>),
        (status = 404, description = "Product not found")
    ),
    tag = "Precos"
)]
pub async fn price_history(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    AppQuery(query): AppQuery<PriceHistoryQuery>,
) -> AppResult<ApiResponse<PriceHistory>> {
    pricing_service::price_history(&state, id, query).await
}

#[utoipa::path(
    get,
    path = "/api/precos-avaliacoes/tendencia/{id}",
    params(("id" = i32, Path, description = "Supplier id"), TrendQuery),
    responses(
        (status = 200, description = "Monthly review averages", body = ApiResponse<ReviewTrend>),
        (status = 404, description = "Supplier not found")
    ),
    tag = "Precos"
)]
pub async fn review_trend(
    State(state): State<AppState>,
    IdPath(id): IdPath,
    AppQuery(query): AppQuery<TrendQuery>,
) -> AppResult<ApiResponse<ReviewTrend>> {
    pricing_service::review_trend(&state, id, query).await
}
