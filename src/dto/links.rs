use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{LinkDetail, Product, Supplier};

/// Accepts both `produto_id` and the older `id_produto` spelling (same for supplier).
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateLinkRequest {
    #[serde(alias = "id_produto")]
    #[validate(range(min = 1, message = "ID do produto inválido"))]
    pub produto_id: i32,
    #[serde(alias = "id_fornecedor")]
    #[validate(range(min = 1, message = "ID do fornecedor inválido"))]
    pub fornecedor_id: i32,
    #[validate(range(min = 0.0, message = "Preço não pode ser negativo"))]
    pub preco_fornecedor: Option<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Validate, ToSchema)]
pub struct LinkPair {
    #[serde(alias = "id_produto")]
    #[validate(range(min = 1, message = "ID do produto inválido"))]
    pub produto_id: i32,
    #[serde(alias = "id_fornecedor")]
    #[validate(range(min = 1, message = "ID do fornecedor inválido"))]
    pub fornecedor_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMultipleLinksRequest {
    #[serde(alias = "id_produto")]
    #[validate(range(min = 1, message = "ID do produto inválido"))]
    pub produto_id: i32,
    pub fornecedores: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteMultipleLinksRequest {
    #[validate(nested)]
    pub vinculos: Vec<LinkPair>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkCreateResult {
    pub criados: u64,
    pub existentes: u64,
    /// Supplier ids that are invalid, unknown or inactive.
    pub ignorados: Vec<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkDeleteResult {
    pub removidos: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LinkList {
    pub items: Vec<LinkDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LinkStatistics {
    pub total_vinculos: u64,
    pub vinculos_principais: u64,
    pub produtos_com_fornecedor: u64,
    pub fornecedores_com_produto: u64,
    pub produtos_sem_fornecedor: u64,
    pub fornecedores_sem_produto: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LinkReport {
    pub estatisticas: LinkStatistics,
    pub produtos_sem_fornecedores: Vec<Product>,
    pub fornecedores_sem_produtos: Vec<Supplier>,
}
