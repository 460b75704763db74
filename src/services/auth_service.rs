use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use password_hash::rand_core::OsRng;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use crate::{
    audit,
    config::AppConfig,
    dto::users::{LoginRequest, LoginResponse, TokenInfo},
    entity::{
        enums::RecordStatus,
        suppliers::Entity as Suppliers,
        users::{Column as UserCol, Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, Claims},
    models::{supplier_from_entity, user_from_entity},
    response::ApiResponse,
    state::AppState,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            tracing::warn!(error = %err, "stored password hash is malformed");
            false
        }
    }
}

pub fn encode_claims(secret: &str, claims: &Claims) -> AppResult<String> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

pub fn issue_token(config: &AppConfig, user: &UserModel) -> AppResult<String> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user.id.to_string(),
        id: user.id,
        email: user.email.clone(),
        nivel: user.role,
        fornecedor_id: user.supplier_id,
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };
    encode_claims(&config.jwt_secret, &claims)
}

pub async fn login(state: &AppState, payload: LoginRequest) -> AppResult<ApiResponse<LoginResponse>> {
    let LoginRequest { email, senha } = payload;
    let user = Users::find()
        .filter(UserCol::Email.eq(email.trim().to_lowercase()))
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Email ou senha inválidos".into()))?;

    if user.status != RecordStatus::Ativo {
        return Err(AppError::Unauthorized("Usuário inativo".into()));
    }

    if !verify_password(&senha, &user.password_hash) {
        return Err(AppError::Unauthorized("Email ou senha inválidos".into()));
    }

    let token = issue_token(&state.config, &user)?;

    let loja = match user.supplier_id {
        Some(supplier_id) => Suppliers::find_by_id(supplier_id)
            .one(&state.orm)
            .await?
            .map(supplier_from_entity),
        None => None,
    };

    audit::record(
        &state.orm,
        Some(user.id),
        "user_login",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Login realizado com sucesso",
        LoginResponse {
            usuario: user_from_entity(user),
            loja,
            token,
        },
        None,
    ))
}

pub fn validate_token(user: &AuthUser) -> ApiResponse<TokenInfo> {
    ApiResponse::success(
        "Token válido",
        TokenInfo {
            id: user.user_id,
            email: user.email.clone(),
            nivel: user.role,
            fornecedor_id: user.supplier_id,
        },
        None,
    )
}
