use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Active/inactive flag shared by suppliers, products, categories, links and users.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum RecordStatus {
    #[sea_orm(string_value = "Ativo")]
    Ativo,
    #[sea_orm(string_value = "Inativo")]
    Inativo,
}

impl RecordStatus {
    /// Case-insensitive parse of "Ativo"/"Inativo".
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ativo" => Some(Self::Ativo),
            "inativo" => Some(Self::Inativo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ativo => "Ativo",
            Self::Inativo => "Inativo",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "comum")]
    Comum,
    #[sea_orm(string_value = "fornecedor")]
    Fornecedor,
    #[sea_orm(string_value = "executivo")]
    Executivo,
}

impl Role {
    pub fn from_label(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "comum" => Some(Self::Comum),
            "fornecedor" => Some(Self::Fornecedor),
            "executivo" => Some(Self::Executivo),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Comum => "comum",
            Self::Fornecedor => "fornecedor",
            Self::Executivo => "executivo",
        }
    }
}

/// Order lifecycle. `Cancelado` is only reachable from `Pendente` and is terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pendente")]
    Pendente,
    #[sea_orm(string_value = "confirmado")]
    Confirmado,
    #[sea_orm(string_value = "em_separacao")]
    EmSeparacao,
    #[sea_orm(string_value = "em_transito")]
    EmTransito,
    #[sea_orm(string_value = "enviado")]
    Enviado,
    #[sea_orm(string_value = "entregue")]
    Entregue,
    #[sea_orm(string_value = "cancelado")]
    Cancelado,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        Self::Pendente,
        Self::Confirmado,
        Self::EmSeparacao,
        Self::EmTransito,
        Self::Enviado,
        Self::Entregue,
        Self::Cancelado,
    ];

    pub fn from_label(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendente => "pendente",
            Self::Confirmado => "confirmado",
            Self::EmSeparacao => "em_separacao",
            Self::EmTransito => "em_transito",
            Self::Enviado => "enviado",
            Self::Entregue => "entregue",
            Self::Cancelado => "cancelado",
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        match (self, next) {
            (Self::Cancelado, _) => false,
            (Self::Pendente, Self::Cancelado) => true,
            (_, Self::Cancelado) => false,
            _ => true,
        }
    }
}

