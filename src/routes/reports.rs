use axum::{Router, extract::State, routing::get};

use crate::{
    dto::{
        links::LinkList,
        reports::{
            CategoryReportEntry, Dashboard, FinancialReport, ProductReportEntry, ReportIndex,
            ReportList, SupplierReportEntry,
        },
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/dashboard", get(dashboard))
        .route("/fornecedores", get(suppliers_report))
        .route("/produtos", get(products_report))
        .route("/categorias", get(categories_report))
        .route("/vinculos", get(links_report))
        .route("/financeiro", get(financial_report))
}

#[utoipa::path(
    get,
    path = "/api/relatorios",
    responses(
        (status = 200, description = "Available reports", body = ApiResponse<ReportIndex>),
        (status = 403, description = "Executives only")
    ),
    tag = "Relatorios"
)]
pub async fn index(user: AuthUser) -> AppResult<ApiResponse<ReportIndex>> {
    report_service::index(&user)
}

#[utoipa::path(
    get,
    path = "/api/relatorios/dashboard",
    responses(
        (status = 200, description = "Marketplace overview", body = ApiResponse<Dashboard>),
        (status = 403, description = "Executives only")
    ),
    tag = "Relatorios"
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<Dashboard>> {
    report_service::dashboard(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/relatorios/fornecedores",
    responses(
        (status = 200, description = "Suppliers with product counts and review averages", body = ApiResponse<ReportList<SupplierReportEntry>>),
        (status = 403, description = "Executives only")
    ),
    tag = "Relatorios"
)]
pub async fn suppliers_report(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<ReportList<SupplierReportEntry>>> {
    report_service::suppliers_report(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/relatorios/produtos",
    responses(
        (status = 200, description = "Products with category, supplier count and prices", body = ApiResponse<ReportList<ProductReportEntry>>),
        (status = 403, description = "Executives only")
    ),
    tag = "Relatorios"
)]
pub async fn products_report(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<ReportList<ProductReportEntry>>> {
    report_service::products_report(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/relatorios/categorias",
    responses(
        (status = 200, description = "Categories with product counts and base price statistics", body = ApiResponse<ReportList<CategoryReportEntry>>),
        (status = 403, description = "Executives only")
    ),
    tag = "Relatorios"
)]
pub async fn categories_report(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<ReportList<CategoryReportEntry>>> {
    report_service::categories_report(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/relatorios/vinculos",
    responses(
        (status = 200, description = "Every product-supplier link with names", body = ApiResponse<LinkList>),
        (status = 403, description = "Executives only")
    ),
    tag = "Relatorios"
)]
pub async fn links_report(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<LinkList>> {
    report_service::links_report(&state, &user).await
}

#[utoipa::path(
    get,
    path = "/api/relatorios/financeiro",
    responses(
        (status = 200, description = "Multi-supplier products and saving opportunities", body = ApiResponse<FinancialReport>),
        (status = 403, description = "Executives only")
    ),
    tag = "Relatorios"
)]
pub async fn financial_report(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<ApiResponse<FinancialReport>> {
    report_service::financial_report(&state, &user).await
}
