use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Category, Product, Supplier};

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub total_fornecedores: u64,
    pub total_produtos: u64,
    pub total_categorias: u64,
    pub total_pedidos: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: String,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryCount {
    pub categoria_id: Option<i32>,
    pub categoria: String,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierRanking {
    pub fornecedor_id: i32,
    pub fornecedor: String,
    pub total_produtos: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub resumo: DashboardSummary,
    pub fornecedores_status: Vec<StatusCount>,
    pub produtos_por_categoria: Vec<CategoryCount>,
    pub top_fornecedores: Vec<SupplierRanking>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportIndex {
    pub relatorios_disponiveis: BTreeMap<String, String>,
    pub uso: String,
    pub exemplo: String,
}

/// Minimum, maximum and mean over a set of prices.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PriceStats {
    pub preco_minimo: f64,
    pub preco_maximo: f64,
    pub preco_medio: f64,
    pub amostras: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewSummary {
    pub total: u64,
    pub media_qualidade: Option<f64>,
    pub media_preco: Option<f64>,
    pub media_prazo: Option<f64>,
    pub media_atendimento: Option<f64>,
    pub media_geral: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierReportEntry {
    #[serde(flatten)]
    pub fornecedor: Supplier,
    pub total_produtos: i64,
    pub avaliacoes: Option<ReviewSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductReportEntry {
    #[serde(flatten)]
    pub produto: Product,
    pub categoria_nome: String,
    pub total_fornecedores: i64,
    pub possui_fornecedores: bool,
    /// Current supplier prices, when any exist.
    pub analise_precos: Option<PriceStats>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryReportEntry {
    #[serde(flatten)]
    pub categoria: Category,
    pub total_produtos: i64,
    /// Over the positive base prices of the category's products.
    pub estatisticas_preco: Option<PriceStats>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FinancialSummary {
    pub total_produtos: u64,
    pub total_fornecedores: u64,
    pub total_vinculos: u64,
    pub produtos_multiplos_fornecedores: u64,
    pub produtos_analisados: u64,
    pub fornecedores_unicos: u64,
    pub economia_potencial: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MultiSupplierProduct {
    pub produto_id: i32,
    pub produto: String,
    pub fornecedores: i64,
    pub preco_base: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SavingOpportunity {
    pub produto_id: i32,
    pub produto_nome: String,
    pub melhor_preco: f64,
    pub segundo_preco: f64,
    pub economia: f64,
    pub percentual_economia: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FinancialReport {
    pub resumo: FinancialSummary,
    pub produtos_com_multiplos_fornecedores: Vec<MultiSupplierProduct>,
    /// Largest savings first.
    pub oportunidades_economia: Vec<SavingOpportunity>,
    pub total_oportunidades: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportList<T> {
    pub items: Vec<T>,
}
