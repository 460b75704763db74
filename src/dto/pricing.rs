use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::SupplierPrice;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PriceRequest {
    #[serde(alias = "id_produto")]
    #[validate(range(min = 1, message = "ID do produto é obrigatório"))]
    pub produto_id: i32,
    #[serde(alias = "id_fornecedor")]
    #[validate(range(min = 1, message = "ID do fornecedor é obrigatório"))]
    pub fornecedor_id: i32,
    #[validate(range(
        exclusive_min = 0.0,
        message = "Preço unitário deve ser maior que zero"
    ))]
    pub preco_unitario: f64,
    #[validate(range(min = 1, message = "Quantidade mínima deve ser maior que zero"))]
    pub quantidade_minima: Option<i32>,
    #[validate(range(min = 0, message = "Prazo de entrega não pode ser negativo"))]
    pub prazo_entrega_dias: Option<i32>,
    pub data_vigencia_inicio: NaiveDate,
    pub data_vigencia_fim: Option<NaiveDate>,
}

/// Scores go from 1 to 5; at least one of them is required.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReviewRequest {
    #[serde(alias = "id_fornecedor")]
    #[validate(range(min = 1, message = "ID do fornecedor é obrigatório"))]
    pub fornecedor_id: i32,
    #[serde(alias = "id_produto")]
    pub produto_id: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Nota deve estar entre 1 e 5"))]
    pub nota_qualidade: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Nota deve estar entre 1 e 5"))]
    pub nota_preco: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Nota deve estar entre 1 e 5"))]
    pub nota_prazo: Option<i32>,
    #[validate(range(min = 1, max = 5, message = "Nota deve estar entre 1 e 5"))]
    pub nota_atendimento: Option<i32>,
    pub comentarios: Option<String>,
    /// Defaults to today.
    pub data_avaliacao: Option<NaiveDate>,
}

impl ReviewRequest {
    pub fn scores(&self) -> Vec<i32> {
        [
            self.nota_qualidade,
            self.nota_preco,
            self.nota_prazo,
            self.nota_atendimento,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    #[default]
    Geral,
    Qualidade,
    Preco,
    Prazo,
    Atendimento,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    MelhorPreco,
    BoaAvaliacao,
    Padrao,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PriceOffer {
    pub preco_id: i32,
    pub fornecedor_id: i32,
    pub fornecedor_nome: String,
    pub cnpj: String,
    pub preco_unitario: f64,
    pub quantidade_minima: i32,
    pub prazo_entrega_dias: Option<i32>,
    pub data_vigencia_inicio: NaiveDate,
    pub data_vigencia_fim: Option<NaiveDate>,
    pub media_avaliacao: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RankedOffer {
    #[serde(flatten)]
    pub oferta: PriceOffer,
    /// Equal prices share a rank; the next rank skips accordingly.
    pub ranking_preco: u32,
    pub recomendacao: Recommendation,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PriceComparison {
    pub produto_id: i32,
    pub produto_nome: String,
    pub codigo_interno: Option<String>,
    pub ofertas: Vec<RankedOffer>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PriceHistoryEntry {
    #[serde(flatten)]
    pub preco: SupplierPrice,
    pub produto_nome: String,
    pub fornecedor_nome: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PriceHistory {
    pub items: Vec<PriceHistoryEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierScore {
    pub fornecedor_id: i32,
    pub fornecedor_nome: String,
    pub cnpj: String,
    pub total_avaliacoes: i64,
    pub media_nota: Option<f64>,
    pub media_geral: f64,
    pub ultima_avaliacao: NaiveDate,
    pub produtos_avaliados: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierRankingList {
    pub tipo: ScoreKind,
    pub items: Vec<SupplierScore>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MonthlyScores {
    /// `YYYY-MM`.
    pub mes: String,
    pub total_avaliacoes: i64,
    pub media_geral: f64,
    pub media_qualidade: Option<f64>,
    pub media_preco: Option<f64>,
    pub media_prazo: Option<f64>,
    pub media_atendimento: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewTrend {
    pub fornecedor_id: i32,
    pub meses: u32,
    pub items: Vec<MonthlyScores>,
}
