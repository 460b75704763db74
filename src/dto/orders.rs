use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Order, OrderItem};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(range(min = 1, message = "Fornecedor é obrigatório"))]
    pub fornecedor_id: i32,
    /// Object or JSON-encoded string with `rua`/`logradouro`, `cidade` and `cep`.
    pub endereco_entrega: Value,
    pub observacoes: Option<String>,
    #[validate(nested)]
    pub itens: Vec<OrderItemRequest>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OrderItemRequest {
    #[validate(range(min = 1, message = "Produto inválido"))]
    pub produto_id: i32,
    #[validate(range(min = 1, message = "Quantidade deve ser maior que zero"))]
    pub quantidade: i32,
    #[validate(range(min = 0.0, message = "Preço unitário não pode ser negativo"))]
    pub preco_unitario: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub pedido: Order,
    pub itens: Vec<OrderItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderStatistics {
    pub total_pedidos: i64,
    pub valor_total: f64,
    /// Every known status, zero-filled.
    pub por_status: BTreeMap<String, i64>,
}
