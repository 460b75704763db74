use std::{
    borrow::Cow,
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::response::ApiResponse;

static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(true);

/// Controls whether 500 responses echo the underlying error. Disabled in production.
pub fn expose_internal_errors(enabled: bool) {
    EXPOSE_INTERNAL_ERRORS.store(enabled, Ordering::Relaxed);
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Dados inválidos")]
    Validation(#[from] ValidationErrors),

    #[error("Dados inválidos")]
    Invalid(BTreeMap<String, String>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Método não permitido")]
    MethodNotAllowed,

    #[error("ORM error: {0}")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &str) -> Self {
        AppError::NotFound(format!("{entity} não encontrado"))
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden("Acesso negado".into())
    }

    /// Single-field validation failure.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.into());
        AppError::Invalid(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::Invalid(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::OrmError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(errors) => {
                let mut fields = BTreeMap::new();
                flatten_validation_errors("", &errors, &mut fields);
                ApiResponse::<()>::failure(status, "Dados inválidos", Some(fields))
            }
            AppError::Invalid(fields) => {
                ApiResponse::<()>::failure(status, "Dados inválidos", Some(fields))
            }
            err @ (AppError::OrmError(_) | AppError::Internal(_)) => {
                tracing::error!(error = %err, "request failed");
                let message = if EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed) {
                    format!("Erro interno do servidor: {err}")
                } else {
                    "Erro interno do servidor".to_string()
                };
                ApiResponse::<()>::failure(status, message, None)
            }
            other => ApiResponse::<()>::failure(status, other.to_string(), None),
        };

        body.into_response()
    }
}

/// Nested and list errors are keyed by path, e.g. `itens[0].quantidade`.
fn flatten_validation_errors(
    prefix: &str,
    errors: &ValidationErrors,
    out: &mut BTreeMap<String, String>,
) {
    for (field, kind) in errors.errors() {
        let key = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(first) = list.first() {
                    let message = first
                        .message
                        .clone()
                        .unwrap_or_else(|| Cow::Owned(format!("Valor inválido ({})", first.code)));
                    out.insert(key, message.into_owned());
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_validation_errors(&key, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten_validation_errors(&format!("{key}[{index}]"), inner, out);
                }
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
