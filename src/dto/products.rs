use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{LinkDetail, Product};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ProductRequest {
    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub nome: String,
    pub descricao: Option<String>,
    #[validate(length(min = 3, message = "Código interno deve ter pelo menos 3 caracteres"))]
    pub codigo_interno: Option<String>,
    #[validate(range(min = 1, message = "Categoria inválida"))]
    pub categoria_id: Option<i32>,
    #[validate(range(min = 0.0, message = "Preço não pode ser negativo"))]
    pub preco_base: Option<f64>,
    /// Ignored for supplier users: their own store is used.
    #[validate(range(min = 1, message = "Fornecedor inválido"))]
    pub fornecedor_id: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub nome: Option<String>,
    pub descricao: Option<String>,
    #[validate(length(min = 3, message = "Código interno deve ter pelo menos 3 caracteres"))]
    pub codigo_interno: Option<String>,
    #[validate(range(min = 1, message = "Categoria inválida"))]
    pub categoria_id: Option<i32>,
    #[validate(range(min = 0.0, message = "Preço não pode ser negativo"))]
    pub preco_base: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithSuppliers {
    pub produto: Product,
    pub fornecedores: Vec<LinkDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductWithSuppliersList {
    pub items: Vec<ProductWithSuppliers>,
}
