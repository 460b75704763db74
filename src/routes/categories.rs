use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::{
        categories::{CategoryList, CategoryRequest, UpdateCategoryRequest},
        suppliers::StatusRequest,
    },
    error::AppResult,
    extract::{AppJson, AppQuery, IdPath},
    middleware::auth::AuthUser,
    models::Category,
    response::ApiResponse,
    routes::params::CategoryQuery,
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/ativas", get(list_active))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
        .route("/{id}/status", post(set_status).put(set_status))
}

#[utoipa::path(
    get,
    path = "/api/categorias",
    params(CategoryQuery),
    responses((status = 200, description = "List categories", body = ApiResponse<CategoryList>)),
    tag = "Categorias"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<CategoryQuery>,
) -> AppResult<ApiResponse<CategoryList>> {
    category_service::list_categories(&state, query).await
}

#[utoipa::path(
    get,
    path = "/api/categorias/ativas",
    responses((status = 200, description = "Active categories", body = ApiResponse<CategoryList>)),
    tag = "Categorias"
)]
pub async fn list_active(State(state): State<AppState>) -> AppResult<ApiResponse<CategoryList>> {
    category_service::list_active(&state).await
}

#[utoipa::path(
    get,
    path = "/api/categorias/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category", body = ApiResponse<Category>),
        (status = 404, description = "Not found")
    ),
    tag = "Categorias"
)]
pub async fn get_category(
    State(state): State<AppState>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<Category>> {
    category_service::get_category(&state, id).await
}

#[utoipa::path(
    post,
    path = "/api/categorias",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 409, description = "Name already in use")
    ),
    tag = "Categorias"
)]
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CategoryRequest>,
) -> AppResult<ApiResponse<Category>> {
    category_service::create_category(&state, &user, payload).await
}

#[utoipa::path(
    put,
    path = "/api/categorias/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses((status = 200, description = "Category updated", body = ApiResponse<Category>)),
    tag = "Categorias"
)]
pub async fn update_category(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> AppResult<ApiResponse<Category>> {
    category_service::update_category(&state, &user, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/categorias/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 409, description = "Category still referenced by products")
    ),
    tag = "Categorias"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<()>> {
    category_service::delete_category(&state, &user, id).await
}

#[utoipa::path(
    put,
    path = "/api/categorias/{id}/status",
    params(("id" = i32, Path, description = "Category id")),
    request_body = StatusRequest,
    responses((status = 200, description = "Status changed", body = ApiResponse<Category>)),
    tag = "Categorias"
)]
pub async fn set_status(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(payload): AppJson<StatusRequest>,
) -> AppResult<ApiResponse<Category>> {
    category_service::set_status(&state, &user, id, payload).await
}
