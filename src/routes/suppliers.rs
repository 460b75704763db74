use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::suppliers::{
        MyStoreResponse, StatusRequest, SupplierList, SupplierRequest, UpdateSupplierRequest,
    },
    error::AppResult,
    extract::{AppJson, AppQuery, IdPath},
    middleware::auth::AuthUser,
    models::Supplier,
    response::ApiResponse,
    routes::params::SupplierQuery,
    services::supplier_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_suppliers).post(create_supplier))
        .route("/ativos", get(list_active))
        .route("/minha-loja", get(my_store).post(create_my_store))
        .route(
            "/{id}",
            get(get_supplier).put(update_supplier).delete(delete_supplier),
        )
        .route("/{id}/status", post(set_status).put(set_status))
}

#[utoipa::path(
    get,
    path = "/api/fornecedores",
    params(SupplierQuery),
    responses((status = 200, description = "List suppliers", body = ApiResponse<SupplierList>)),
    tag = "Fornecedores"
)]
pub async fn list_suppliers(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SupplierQuery>,
) -> AppResult<ApiResponse<SupplierList>> {
    supplier_service::list_suppliers(&state, query).await
}

#[utoipa::path(
    get,
    path = "/api/fornecedores/ativos",
    responses((status = 200, description = "Active suppliers", body = ApiResponse<SupplierList>)),
    tag = "Fornecedores"
)]
pub async fn list_active(State(state): State<AppState>) -> AppResult<ApiResponse<SupplierList>> {
    supplier_service::list_active(&state).await
}

#[utoipa::path(
    get,
    path = "/api/fornecedores/{id}",
    params(("id" = i32, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier", body = ApiResponse<Supplier>),
        (status = 404, description = "Not found")
    ),
    tag = "Fornecedores"
)]
pub async fn get_supplier(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Supplier>> {
    supplier_service::get_supplier(&state, id).await
}

#[utoipa::path(
    post,
    path = "/api/fornecedores",
    request_body = SupplierRequest,
    responses(
        (status = 201, description = "Supplier created", body = ApiResponse<Supplier>),
        (status = 409, description = "CNPJ or email already registered")
    ),
    tag = "Fornecedores"
)]
pub async fn create_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<SupplierRequest>,
) -> AppResult<ApiResponse<Supplier>> {
    supplier_service::create_supplier(&state, &user, payload).await
}

#[utoipa::path(
    put,
    path = "/api/fornecedores/{id}",
    params(("id" = i32, Path, description = "Supplier id")),
    request_body = UpdateSupplierRequest,
    responses((status = 200, description = "Supplier updated", body = ApiResponse<Supplier>)),
    tag = "Fornecedores"
)]
pub async fn update_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(payload): AppJson<UpdateSupplierRequest>,
) -> AppResult<ApiResponse<Supplier>> {
    supplier_service::update_supplier(&state, &user, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/fornecedores/{id}",
    params(("id" = i32, Path, description = "Supplier id")),
    responses(
        (status = 200, description = "Supplier deleted"),
        (status = 409, description = "Supplier still linked to products or orders")
    ),
    tag = "Fornecedores"
)]
pub async fn delete_supplier(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<()>> {
    supplier_service::delete_supplier(&state, &user, id).await
}

#[utoipa::path(
    put,
    path = "/api/fornecedores/{id}/status",
    params(("id" = i32, Path, description = "Supplier id")),
    request_body = StatusRequest,
    responses((status = 200, description = "Status changed", body = ApiResponse<Supplier>)),
    tag = "Fornecedores"
)]
pub async fn set_status(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(payload): AppJson<StatusRequest>,
) -> AppResult<ApiResponse<Supplier>> {
    supplier_service::set_status(&state, &user, id, payload).await
}

#[utoipa::path(
    get,
    path = "/api/fornecedores/minha-loja",
    responses(
        (status = 200, description = "Caller's store", body = ApiResponse<Supplier>),
        (status = 404, description = "No store yet")
    ),
    tag = "Fornecedores"
)]
pub async fn my_store(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<Supplier>> {
    supplier_service::my_store(&state, &user).await
}

#[utoipa::path(
    post,
    path = "/api/fornecedores/minha-loja",
    request_body = SupplierRequest,
    responses(
        (status = 201, description = "Store created, fresh token issued", body = ApiResponse<MyStoreResponse>)
    ),
    tag = "Fornecedores"
)]
pub async fn create_my_store(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<SupplierRequest>,
) -> AppResult<ApiResponse<MyStoreResponse>> {
    supplier_service::create_my_store(&state, &user, payload).await
}
