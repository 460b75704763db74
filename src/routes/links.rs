use axum::{
    Router,
    extract::State,
    routing::{delete, get, post, put},
};

use crate::{
    dto::links::{
        BulkCreateResult, BulkDeleteResult, CreateLinkRequest, CreateMultipleLinksRequest,
        DeleteMultipleLinksRequest, LinkList, LinkPair, LinkReport,
    },
    error::AppResult,
    extract::{AppJson, AppQuery, IdPairPath, IdPath},
    middleware::auth::AuthUser,
    models::Link,
    response::ApiResponse,
    routes::params::{LinkHistoryQuery, LinkQuery},
    services::link_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_links).post(create_link).delete(delete_link_by_body),
        )
        .route("/historico", get(history))
        .route("/relatorios", get(report))
        .route("/multiplos", post(create_multiple).delete(delete_multiple))
        .route(
            "/produto/{id}",
            get(suppliers_for_product).delete(delete_all_for_product),
        )
        .route("/fornecedor/{id}", get(products_for_supplier))
        .route("/{produto_id}/{fornecedor_id}", delete(delete_link))
        .route(
            "/{produto_id}/{fornecedor_id}/principal",
            put(set_principal),
        )
}

#[utoipa::path(
    get,
    path = "/api/vinculos",
    params(LinkQuery),
    responses((status = 200, description = "Links with product and supplier names", body = ApiResponse<LinkList>)),
    tag = "Vinculos"
)]
pub async fn list_links(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<LinkQuery>,
) -> AppResult<ApiResponse<LinkList>> {
    link_service::list_links(&state, query).await
}

#[utoipa::path(
    post,
    path = "/api/vinculos",
    request_body = CreateLinkRequest,
    responses(
        (status = 201, description = "Link created", body = ApiResponse<Link>),
        (status = 403, description = "Supplier inactive or not managed by the caller"),
        (status = 404, description = "Product or supplier not found"),
        (status = 409, description = "Link already exists")
    ),
    tag = "Vinculos"
)]
pub async fn create_link(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateLinkRequest>,
) -> AppResult<ApiResponse<Link>> {
    link_service::create_link(&state, &user, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/vinculos",
    request_body = LinkPair,
    responses(
        (status = 200, description = "Link removed"),
        (status = 404, description = "Link not found")
    ),
    tag = "Vinculos"
)]
pub async fn delete_link_by_body(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(pair): AppJson<LinkPair>,
) -> AppResult<ApiResponse<()>> {
    link_service::delete_link(&state, &user, pair).await
}

#[utoipa::path(
    delete,
    path = "/api/vinculos/{produto_id}/{fornecedor_id}",
    params(
        ("produto_id" = i32, Path, description = "Product id"),
        ("fornecedor_id" = i32, Path, description = "Supplier id")
    ),
    responses(
        (status = 200, description = "Link removed"),
        (status = 404, description = "Link not found")
    ),
    tag = "Vinculos"
)]
pub async fn delete_link(
    State(state): State<AppState>,
    user: AuthUser,
    IdPairPath(produto_id, fornecedor_id): IdPairPath,
) -> AppResult<ApiResponse<()>> {
    let pair = LinkPair {
        produto_id,
        fornecedor_id,
    };
    link_service::delete_link(&state, &user, pair).await
}

#[utoipa::path(
    put,
    path = "/api/vinculos/{produto_id}/{fornecedor_id}/principal",
    params(
        ("produto_id" = i32, Path, description = "Product id"),
        ("fornecedor_id" = i32, Path, description = "Supplier id")
    ),
    responses(
        (status = 200, description = "Link marked as principal", body = ApiResponse<Link>),
        (status = 404, description = "Link not found")
    ),
    tag = "Vinculos"
)]
pub async fn set_principal(
    State(state): State<AppState>,
    user: AuthUser,
    IdPairPath(produto_id, fornecedor_id): IdPairPath,
) -> AppResult<ApiResponse<Link>> {
    link_service::set_principal(&state, &user, produto_id, fornecedor_id).await
}

#[utoipa::path(
    post,
    path = "/api/vinculos/multiplos",
    request_body = CreateMultipleLinksRequest,
    responses((status = 200, description = "Bulk link result", body = ApiResponse<BulkCreateResult>)),
    tag = "Vinculos"
)]
pub async fn create_multiple(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateMultipleLinksRequest>,
) -> AppResult<ApiResponse<BulkCreateResult>> {
    link_service::create_multiple(&state, &user, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/vinculos/multiplos",
    request_body = DeleteMultipleLinksRequest,
    responses((status = 200, description = "Links removed", body = ApiResponse<BulkDeleteResult>)),
    tag = "Vinculos"
)]
pub async fn delete_multiple(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<DeleteMultipleLinksRequest>,
) -> AppResult<ApiResponse<BulkDeleteResult>> {
    link_service::delete_multiple(&state, &user, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/vinculos/produto/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses((status = 200, description = "All links of the product removed", body = ApiResponse<BulkDeleteResult>)),
    tag = "Vinculos"
)]
pub async fn delete_all_for_product(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<BulkDeleteResult>> {
    link_service::delete_all_for_product(&state, &user, id).await
}

#[utoipa::path(
    get,
    path = "/api/vinculos/historico",
    params(LinkHistoryQuery),
    responses((status = 200, description = "Links, newest first", body = ApiResponse<LinkList>)),
    tag = "Vinculos"
)]
pub async fn history(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<LinkHistoryQuery>,
) -> AppResult<ApiResponse<LinkList>> {
    link_service::history(&state, query).await
}

#[utoipa::path(
    get,
    path = "/api/vinculos/produto/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses((status = 200, description = "Suppliers of the product", body = ApiResponse<LinkList>)),
    tag = "Vinculos"
)]
pub async fn suppliers_for_product(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<LinkList>> {
    link_service::suppliers_for_product(&state, id).await
}

#[utoipa::path(
    get,
    path = "/api/vinculos/fornecedor/{id}",
    params(("id" = i32, Path, description = "Supplier id")),
    responses((status = 200, description = "Products of the supplier", body = ApiResponse<LinkList>)),
    tag = "Vinculos"
)]
pub async fn products_for_supplier(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<LinkList>> {
    link_service::products_for_supplier(&state, id).await
}

#[utoipa::path(
    get,
    path = "/api/vinculos/relatorios",
    responses(
        (status = 200, description = "Link statistics", body = ApiResponse<LinkReport>),
        (status = 403, description = "Executives only")
    ),
    tag = "Vinculos"
)]
pub async fn report(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<LinkReport>> {
    link_service::report(&state, &user).await
}
