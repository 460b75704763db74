use axum::{
    Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    dto::users::{
        LoginRequest, LoginResponse, Profile, RegisterRequest, TokenInfo, UpdateUserRequest,
        UserList,
    },
    error::AppResult,
    extract::{AppJson, AppQuery, IdPath},
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::params::UserQuery,
    services::{auth_service, user_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register).get(list_users))
        .route("/login", post(login))
        .route("/validar-token", post(validate_token))
        .route("/perfil", get(profile))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
}

#[utoipa::path(
    post,
    path = "/api/usuarios",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = ApiResponse<User>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "Usuarios"
)]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<ApiResponse<User>> {
    user_service::register(&state, payload).await
}

#[utoipa::path(
    post,
    path = "/api/usuarios/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Usuarios"
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    auth_service::login(&state, payload).await
}

#[utoipa::path(
    post,
    path = "/api/usuarios/validar-token",
    responses(
        (status = 200, description = "Token is valid", body = ApiResponse<TokenInfo>),
        (status = 401, description = "Missing, expired or tampered token")
    ),
    tag = "Usuarios"
)]
pub async fn validate_token(user: AuthUser) -> ApiResponse<TokenInfo> {
    auth_service::validate_token(&user)
}

#[utoipa::path(
    get,
    path = "/api/usuarios/perfil",
    responses((status = 200, description = "Current user", body = ApiResponse<Profile>)),
    tag = "Usuarios"
)]
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<Profile>> {
    user_service::profile(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/usuarios",
    params(UserQuery),
    responses(
        (status = 200, description = "List users", body = ApiResponse<UserList>),
        (status = 403, description = "Executives only")
    ),
    tag = "Usuarios"
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(query): AppQuery<UserQuery>,
) -> AppResult<ApiResponse<UserList>> {
    user_service::list_users(&state, &user, query).await
}

#[utoipa::path(
    get,
    path = "/api/usuarios/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = ApiResponse<User>),
        (status = 404, description = "Not found")
    ),
    tag = "Usuarios"
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<User>> {
    user_service::get_user(&state, &user, id).await
}

#[utoipa::path(
    put,
    path = "/api/usuarios/{id}",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses((status = 200, description = "User updated", body = ApiResponse<User>)),
    tag = "Usuarios"
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> AppResult<ApiResponse<User>> {
    user_service::update_user(&state, &user, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/usuarios/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "Last executive cannot be removed")
    ),
    tag = "Usuarios"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<()>> {
    user_service::delete_user(&state, &user, id).await
}
