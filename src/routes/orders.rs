use axum::{
    Router,
    extract::State,
    routing::{get, put},
};

use crate::{
    dto::orders::{
        CreateOrderRequest, OrderList, OrderStatistics, OrderWithItems, UpdateOrderStatusRequest,
    },
    error::AppResult,
    extract::{AppJson, AppQuery, IdPath},
    middleware::auth::AuthUser,
    models::Order,
    response::ApiResponse,
    routes::params::{OrderListQuery, OrderStatisticsQuery},
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_orders).post(create_order))
        .route("/meus", get(my_orders))
        .route("/recebidos", get(received_orders))
        .route("/estatisticas", get(statistics))
        .route("/{id}", get(get_order).delete(delete_order))
        .route("/{id}/status", put(update_status).post(update_status))
        .route("/{id}/cancelar", put(cancel_order))
}

#[utoipa::path(
    post,
    path = "/api/pedidos",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created with its items", body = ApiResponse<OrderWithItems>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Supplier or product not found")
    ),
    tag = "Pedidos"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> AppResult<ApiResponse<OrderWithItems>> {
    order_service::create_order(&state, &user, payload).await
}

#[utoipa::path(
    get,
    path = "/api/pedidos/meus",
    params(OrderListQuery),
    responses((status = 200, description = "Orders placed by the caller", body = ApiResponse<OrderList>)),
    tag = "Pedidos"
)]
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<OrderListQuery>,
) -> AppResult<ApiResponse<OrderList>> {
    order_service::my_orders(&state, &user, query).await
}

#[utoipa::path(
    get,
    path = "/api/pedidos/recebidos",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Orders received by the caller's store", body = ApiResponse<OrderList>),
        (status = 403, description = "Caller has no store")
    ),
    tag = "Pedidos"
)]
pub async fn received_orders(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<OrderListQuery>,
) -> AppResult<ApiResponse<OrderList>> {
    order_service::received_orders(&state, &user, query).await
}

#[utoipa::path(
    get,
    path = "/api/pedidos",
    params(OrderListQuery),
    responses(
        (status = 200, description = "All orders", body = ApiResponse<OrderList>),
        (status = 403, description = "Executives only")
    ),
    tag = "Pedidos"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<OrderListQuery>,
) -> AppResult<ApiResponse<OrderList>> {
    order_service::list_all_orders(&state, &user, query).await
}

#[utoipa::path(
    get,
    path = "/api/pedidos/estatisticas",
    params(OrderStatisticsQuery),
    responses((status = 200, description = "Order counts and value per status", body = ApiResponse<OrderStatistics>)),
    tag = "Pedidos"
)]
pub async fn statistics(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<OrderStatisticsQuery>,
) -> AppResult<ApiResponse<OrderStatistics>> {
    order_service::statistics(&state, &user, query).await
}

#[utoipa::path(
    get,
    path = "/api/pedidos/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderWithItems>),
        (status = 403, description = "Not a party to the order"),
        (status = 404, description = "Not found")
    ),
    tag = "Pedidos"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<OrderWithItems>> {
    order_service::get_order(&state, &user, id).await
}

#[utoipa::path(
    put,
    path = "/api/pedidos/{id}/status",
    params(("id" = i32, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<Order>),
        (status = 400, description = "Missing, unknown or disallowed status")
    ),
    tag = "Pedidos"
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(payload): AppJson<UpdateOrderStatusRequest>,
) -> AppResult<ApiResponse<Order>> {
    order_service::update_status(&state, &user, id, payload).await
}

#[utoipa::path(
    put,
    path = "/api/pedidos/{id}/cancelar",
    params(("id" = i32, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order cancelled", body = ApiResponse<Order>),
        (status = 400, description = "Order is no longer pending"),
        (status = 403, description = "Only the buyer may cancel")
    ),
    tag = "Pedidos"
)]
pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Order>> {
    order_service::cancel_order(&state, &user, id).await
}

#[utoipa::path(
    delete,
    path = "/api/pedidos/{id}",
    params(("id" = i32, Path, description = "Order id")),
    responses((status = 400, description = "Orders are cancelled, never deleted")),
    tag = "Pedidos"
)]
pub async fn delete_order(_user: AuthUser, IdPath(_id): IdPath) -> AppResult<ApiResponse<()>> {
    order_service::reject_delete()
}
