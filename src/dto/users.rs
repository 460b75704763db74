use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Supplier, User};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub nome: String,
    #[validate(email(message = "Email inválido"))]
    pub email: String,
    #[validate(length(min = 6, message = "Senha deve ter pelo menos 6 caracteres"))]
    pub senha: String,
    /// `comum` (default) or `fornecedor`.
    pub nivel: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email é obrigatório"))]
    pub email: String,
    #[validate(length(min = 1, message = "Senha é obrigatória"))]
    pub senha: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub usuario: User,
    pub loja: Option<Supplier>,
    pub token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, message = "Nome deve ter pelo menos 2 caracteres"))]
    pub nome: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "Senha deve ter pelo menos 6 caracteres"))]
    pub senha: Option<String>,
    pub nivel: Option<String>,
    #[validate(range(min = 1, message = "Fornecedor inválido"))]
    pub fornecedor_id: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Profile {
    pub usuario: User,
    pub loja: Option<Supplier>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenInfo {
    pub id: i32,
    pub email: String,
    pub nivel: crate::entity::enums::Role,
    pub fornecedor_id: Option<i32>,
}
