use axum::{
    extract::{FromRequestParts, Query},
    http::{header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::enums::Role,
    error::{AppError, AppResult},
    state::AppState,
};

/// Signed token payload (HS256).
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    pub sub: String,
    pub id: i32,
    pub email: String,
    pub nivel: Role,
    pub fornecedor_id: Option<i32>,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub email: String,
    pub role: Role,
    pub supplier_id: Option<i32>,
}

impl AuthUser {
    pub fn require_role(&self, roles: &[Role]) -> AppResult<()> {
        if !roles.contains(&self.role) {
            return Err(AppError::Forbidden(
                "Acesso negado: nível de usuário insuficiente".into(),
            ));
        }
        Ok(())
    }

    pub fn is_executive(&self) -> bool {
        self.role == Role::Executivo
    }

    /// Executives manage every store; suppliers only their own.
    pub fn can_manage_supplier(&self, supplier_id: i32) -> bool {
        self.is_executive()
            || (self.role == Role::Fornecedor && self.supplier_id == Some(supplier_id))
    }

    pub fn ensure_manages_supplier(&self, supplier_id: i32) -> AppResult<()> {
        if !self.can_manage_supplier(supplier_id) {
            return Err(AppError::forbidden());
        }
        Ok(())
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            email: claims.email,
            role: claims.nivel,
            supplier_id: claims.fornecedor_id,
        }
    }
}

/// Verifies signature and expiry.
pub fn decode_token(secret: &str, token: &str) -> AppResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| {
        tracing::debug!(error = %err, "token rejected");
        AppError::Unauthorized("Token inválido ou expirado".into())
    })
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn token_from_parts(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty());

    from_header.or_else(|| {
        Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.token)
            .filter(|token| !token.is_empty())
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)
            .ok_or_else(|| AppError::Unauthorized("Token de autenticação não fornecido".into()))?;
        let claims = decode_token(&state.config.jwt_secret, &token)?;
        Ok(AuthUser::from(claims))
    }
}
