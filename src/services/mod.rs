use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};

use crate::{
    entity::enums::RecordStatus,
    error::{AppError, AppResult},
};

pub mod auth_service;
pub mod category_service;
pub mod link_service;
pub mod order_service;
pub mod pricing_service;
pub mod product_service;
pub mod report_service;
pub mod supplier_service;
pub mod user_service;

/// Case-insensitive `LIKE '%term%'` that behaves the same on PostgreSQL and SQLite.
pub(crate) fn contains_ci<C: IntoColumnRef>(column: C, term: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(format!("%{}%", term.trim().to_lowercase()))
}

/// Optional request status; missing means `Ativo`.
pub(crate) fn parse_record_status(value: Option<&str>) -> AppResult<RecordStatus> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(RecordStatus::Ativo),
        Some(raw) => RecordStatus::from_label(raw)
            .ok_or_else(|| AppError::invalid_field("status", "Status deve ser Ativo ou Inativo")),
    }
}

/// Trimmed text, with blanks treated as absent.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
