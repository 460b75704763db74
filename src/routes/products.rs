use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{
        products::{
            ProductList, ProductRequest, ProductWithSuppliers, ProductWithSuppliersList,
            UpdateProductRequest,
        },
        suppliers::StatusRequest,
    },
    error::AppResult,
    extract::{AppJson, AppQuery, IdPath},
    middleware::auth::AuthUser,
    models::Product,
    response::ApiResponse,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/ativos", get(list_active))
        .route("/disponiveis", get(available))
        .route("/com-fornecedores", get(with_suppliers))
        .route("/com-fornecedores/{id}", get(with_suppliers_by_id))
        .route("/sem-fornecedores", get(without_suppliers))
        .route("/minha-empresa", get(my_company))
        .route("/minha-loja", post(create_for_my_store))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{id}/status", post(set_status).put(set_status))
}

#[utoipa::path(
    get,
    path = "/api/produtos",
    params(ProductQuery),
    responses((status = 200, description = "List products", body = ApiResponse<ProductList>)),
    tag = "Produtos"
)]
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductQuery>,
) -> AppResult<ApiResponse<ProductList>> {
    product_service::list_products(&state, query).await
}

#[utoipa::path(
    get,
    path = "/api/produtos/ativos",
    responses((status = 200, description = "Active products", body = ApiResponse<ProductList>)),
    tag = "Produtos"
)]
pub async fn list_active(State(state): State<AppState>) -> AppResult<ApiResponse<ProductList>> {
    product_service::list_active(&state).await
}

#[utoipa::path(
    get,
    path = "/api/produtos/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product", body = ApiResponse<Product>),
        (status = 404, description = "Not found")
    ),
    tag = "Produtos"
)]
pub async fn get_product(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Product>> {
    product_service::get_product(&state, id).await
}

#[utoipa::path(
    post,
    path = "/api/produtos",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<Product>),
        (status = 409, description = "Internal code already in use")
    ),
    tag = "Produtos"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ProductRequest>,
) -> AppResult<ApiResponse<Product>> {
    product_service::create_product(&state, &user, payload).await
}

#[utoipa::path(
    put,
    path = "/api/produtos/{id}",
    params(("id" = i32, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses((status = 200, description = "Product updated", body = ApiResponse<Product>)),
    tag = "Produtos"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(payload): AppJson<UpdateProductRequest>,
) -> AppResult<ApiResponse<Product>> {
    product_service::update_product(&state, &user, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/produtos/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 409, description = "Product still linked to suppliers or orders")
    ),
    tag = "Produtos"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<()>> {
    product_service::delete_product(&state, &user, id).await
}

#[utoipa::path(
    put,
    path = "/api/produtos/{id}/status",
    params(("id" = i32, Path, description = "Product id")),
    request_body = StatusRequest,
    responses((status = 200, description = "Status changed", body = ApiResponse<Product>)),
    tag = "Produtos"
)]
pub async fn set_status(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(payload): AppJson<StatusRequest>,
) -> AppResult<ApiResponse<Product>> {
    product_service::set_status(&state, &user, id, payload).await
}

#[utoipa::path(
    get,
    path = "/api/produtos/disponiveis",
    responses((status = 200, description = "Active products the caller's store can still link", body = ApiResponse<ProductList>)),
    tag = "Produtos"
)]
pub async fn available(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<ProductList>> {
    product_service::available_for_supplier(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/produtos/com-fornecedores",
    responses((status = 200, description = "Products with their suppliers", body = ApiResponse<ProductWithSuppliersList>)),
    tag = "Produtos"
)]
pub async fn with_suppliers(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProductWithSuppliersList>> {
    product_service::with_suppliers(&state).await
}

#[utoipa::path(
    get,
    path = "/api/produtos/com-fornecedores/{id}",
    params(("id" = i32, Path, description = "Product id")),
    responses((status = 200, description = "Product with its suppliers", body = ApiResponse<ProductWithSuppliers>)),
    tag = "Produtos"
)]
pub async fn with_suppliers_by_id(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<ProductWithSuppliers>> {
    product_service::with_suppliers_by_id(&state, id).await
}

#[utoipa::path(
    get,
    path = "/api/produtos/sem-fornecedores",
    responses((status = 200, description = "Products without any supplier link", body = ApiResponse<ProductList>)),
    tag = "Produtos"
)]
pub async fn without_suppliers(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ProductList>> {
    product_service::without_suppliers(&state).await
}

#[utoipa::path(
    get,
    path = "/api/produtos/minha-empresa",
    responses((status = 200, description = "Products owned or linked by the caller's store", body = ApiResponse<ProductList>)),
    tag = "Produtos"
)]
pub async fn my_company(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<ProductList>> {
    product_service::my_company_products(&state, &user).await
}

#[utoipa::path(
    post,
    path = "/api/produtos/minha-loja",
    request_body = ProductRequest,
    responses((status = 201, description = "Product created and linked as principal", body = ApiResponse<Product>)),
    tag = "Produtos"
)]
pub async fn create_for_my_store(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<ProductRequest>,
) -> AppResult<ApiResponse<Product>> {
    product_service::create_for_my_store(&state, &user, payload).await
}
