use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::models::Supplier;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SupplierRequest {
    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub nome: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(custom(function = "validate_cnpj"))]
    pub cnpj: String,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub nome: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(custom(function = "validate_cnpj"))]
    pub cnpj: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierList {
    pub items: Vec<Supplier>,
}

/// Store created by a supplier user, with a token that carries the new store id.
#[derive(Debug, Serialize, ToSchema)]
pub struct MyStoreResponse {
    pub fornecedor: Supplier,
    pub token: String,
}

/// Digits only, e.g. "12.345.678/0001-90" -> "12345678000190".
pub fn normalize_cnpj(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

fn validate_cnpj(cnpj: &str) -> Result<(), ValidationError> {
    if normalize_cnpj(cnpj).len() != 14 {
        return Err(ValidationError::new("cnpj").with_message("CNPJ deve ter 14 dígitos".into()));
    }
    Ok(())
}
