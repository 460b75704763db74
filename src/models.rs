use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::entity::{
    categories::Model as CategoryModel,
    enums::{OrderStatus, RecordStatus, Role},
    order_items::Model as OrderItemModel,
    orders::Model as OrderModel,
    product_suppliers::Model as LinkModel,
    products::Model as ProductModel,
    supplier_prices::Model as PriceModel,
    supplier_reviews::Model as ReviewModel,
    suppliers::Model as SupplierModel,
    users::Model as UserModel,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i32,
    pub nome: String,
    pub email: String,
    pub nivel: Role,
    pub fornecedor_id: Option<i32>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Supplier {
    pub id: i32,
    pub nome: String,
    pub email: String,
    pub cnpj: String,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub nome: String,
    pub descricao: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub nome: String,
    pub descricao: Option<String>,
    pub codigo_interno: Option<String>,
    pub categoria_id: Option<i32>,
    pub preco_base: Option<f64>,
    pub fornecedor_id: Option<i32>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Link {
    pub id: i32,
    pub produto_id: i32,
    pub fornecedor_id: i32,
    pub is_principal: bool,
    pub preco_fornecedor: Option<f64>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

/// Link enriched with the names and statuses of both sides.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LinkDetail {
    pub id: i32,
    pub produto_id: i32,
    pub produto_nome: String,
    pub produto_status: RecordStatus,
    pub fornecedor_id: i32,
    pub fornecedor_nome: String,
    pub fornecedor_status: RecordStatus,
    pub is_principal: bool,
    pub preco_fornecedor: Option<f64>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    pub id: i32,
    pub usuario_id: i32,
    pub fornecedor_id: i32,
    pub endereco_entrega: Value,
    pub observacoes: Option<String>,
    pub status: OrderStatus,
    pub valor_total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub id: i32,
    pub pedido_id: i32,
    pub produto_id: i32,
    pub quantidade: i32,
    pub preco_unitario: f64,
    pub subtotal: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierPrice {
    pub id: i32,
    pub produto_id: i32,
    pub fornecedor_id: i32,
    pub preco_unitario: f64,
    pub quantidade_minima: i32,
    pub prazo_entrega_dias: Option<i32>,
    pub data_vigencia_inicio: NaiveDate,
    pub data_vigencia_fim: Option<NaiveDate>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SupplierReview {
    pub id: i32,
    pub fornecedor_id: i32,
    pub produto_id: Option<i32>,
    pub nota_qualidade: Option<i32>,
    pub nota_preco: Option<i32>,
    pub nota_prazo: Option<i32>,
    pub nota_atendimento: Option<i32>,
    pub nota_geral: f64,
    pub comentarios: Option<String>,
    pub avaliado_por: Option<i32>,
    pub data_avaliacao: NaiveDate,
    pub created_at: DateTime<Utc>,
}

pub fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        nome: model.name,
        email: model.email,
        nivel: model.role,
        fornecedor_id: model.supplier_id,
        status: model.status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn supplier_from_entity(model: SupplierModel) -> Supplier {
    Supplier {
        id: model.id,
        nome: model.name,
        email: model.email,
        cnpj: model.cnpj,
        telefone: model.phone,
        endereco: model.address,
        status: model.status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        nome: model.name,
        descricao: model.description,
        status: model.status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        nome: model.name,
        descricao: model.description,
        codigo_interno: model.internal_code,
        categoria_id: model.category_id,
        preco_base: model.base_price,
        fornecedor_id: model.supplier_id,
        status: model.status,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn link_from_entity(model: LinkModel) -> Link {
    Link {
        id: model.id,
        produto_id: model.product_id,
        fornecedor_id: model.supplier_id,
        is_principal: model.is_principal,
        preco_fornecedor: model.supplier_price,
        status: model.status,
        created_at: model.created_at,
    }
}

pub fn order_from_entity(model: OrderModel) -> Order {
    let endereco_entrega = serde_json::from_str(&model.delivery_address)
        .unwrap_or(Value::String(model.delivery_address));
    Order {
        id: model.id,
        usuario_id: model.user_id,
        fornecedor_id: model.supplier_id,
        endereco_entrega,
        observacoes: model.notes,
        status: model.status,
        valor_total: model.total_value,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        pedido_id: model.order_id,
        produto_id: model.product_id,
        quantidade: model.quantity,
        preco_unitario: model.unit_price,
        subtotal: model.subtotal,
    }
}

pub fn price_from_entity(model: PriceModel) -> SupplierPrice {
    SupplierPrice {
        id: model.id,
        produto_id: model.product_id,
        fornecedor_id: model.supplier_id,
        preco_unitario: model.unit_price,
        quantidade_minima: model.min_quantity,
        prazo_entrega_dias: model.delivery_days,
        data_vigencia_inicio: model.valid_from,
        data_vigencia_fim: model.valid_until,
        status: model.status,
        created_at: model.created_at,
    }
}

pub fn review_from_entity(model: ReviewModel) -> SupplierReview {
    SupplierReview {
        id: model.id,
        fornecedor_id: model.supplier_id,
        produto_id: model.product_id,
        nota_qualidade: model.quality_score,
        nota_preco: model.price_score,
        nota_prazo: model.delivery_score,
        nota_atendimento: model.service_score,
        nota_geral: model.overall_score,
        comentarios: model.comments,
        avaliado_por: model.reviewed_by,
        data_avaliacao: model.reviewed_on,
        created_at: model.created_at,
    }
}
