use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use validator::Validate;

use crate::{
    audit,
    dto::users::{Profile, RegisterRequest, UpdateUserRequest, UserList},
    entity::{
        enums::{RecordStatus, Role},
        orders::{Column as OrderCol, Entity as Orders},
        suppliers::Entity as Suppliers,
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{User, supplier_from_entity, user_from_entity},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, UserQuery},
    services::{auth_service::hash_password, contains_ci},
    state::AppState,
};

pub async fn email_exists<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    exclude_id: Option<i32>,
) -> AppResult<bool> {
    let mut condition = Condition::all().add(UserCol::Email.eq(email.trim().to_lowercase()));
    if let Some(id) = exclude_id {
        condition = condition.add(UserCol::Id.ne(id));
    }
    Ok(Users::find().filter(condition).count(conn).await? > 0)
}

pub async fn register(state: &AppState, payload: RegisterRequest) -> AppResult<ApiResponse<User>> {
    payload.validate()?;

    let role = match payload.nivel.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Role::Comum,
        Some(raw) => match Role::from_label(raw) {
            Some(role @ (Role::Comum | Role::Fornecedor)) => role,
            Some(Role::Executivo) => {
                return Err(AppError::invalid_field(
                    "nivel",
                    "Cadastro público não permite o nível executivo",
                ));
            }
            None => return Err(AppError::invalid_field("nivel", "Nível de usuário inválido")),
        },
    };

    let email = payload.email.trim().to_lowercase();
    if email_exists(&state.orm, &email, None).await? {
        return Err(AppError::Conflict("Email já está em uso".into()));
    }

    let now = Utc::now();
    let user = UserActive {
        id: NotSet,
        name: Set(payload.nome.trim().to_string()),
        email: Set(email),
        password_hash: Set(hash_password(&payload.senha)?),
        role: Set(role),
        supplier_id: Set(None),
        status: Set(RecordStatus::Ativo),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.id),
        "user_register",
        "users",
        serde_json::json!({ "user_id": user.id }),
    )
    .await;

    Ok(ApiResponse::created(
        "Usuário criado com sucesso",
        user_from_entity(user),
    ))
}

pub async fn profile(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Profile>> {
    let found = Users::find_by_id(user.user_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Usuário"))?;

    let loja = match found.supplier_id {
        Some(id) => Suppliers::find_by_id(id)
            .one(&state.orm)
            .await?
            .map(supplier_from_entity),
        None => None,
    };

    Ok(ApiResponse::success(
        "Perfil do usuário",
        Profile {
            usuario: user_from_entity(found),
            loja,
        },
        None,
    ))
}

pub async fn list_users(
    state: &AppState,
    user: &AuthUser,
    query: UserQuery,
) -> AppResult<ApiResponse<UserList>> {
    user.require_role(&[Role::Executivo])?;
    let (page, limit, offset) = Pagination::new(query.page, query.per_page).normalize();

    let mut condition = Condition::all();
    if let Some(nome) = query.nome.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(contains_ci((Users, UserCol::Name), nome));
    }
    if let Some(raw) = query.nivel.as_ref().filter(|s| !s.trim().is_empty()) {
        let role = Role::from_label(raw)
            .ok_or_else(|| AppError::invalid_field("nivel", "Nível de usuário inválido"))?;
        condition = condition.add(UserCol::Role.eq(role));
    }

    let finder = Users::find().filter(condition).order_by_asc(UserCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Usuários",
        UserList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn get_user(state: &AppState, user: &AuthUser, id: i32) -> AppResult<ApiResponse<User>> {
    if user.user_id != id && !user.is_executive() {
        return Err(AppError::forbidden());
    }
    let found = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Usuário"))?;
    Ok(ApiResponse::success("Usuário", user_from_entity(found), None))
}

pub async fn update_user(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateUserRequest,
) -> AppResult<ApiResponse<User>> {
    if user.user_id != id && !user.is_executive() {
        return Err(AppError::forbidden());
    }
    payload.validate()?;

    let privileged =
        payload.nivel.is_some() || payload.fornecedor_id.is_some() || payload.status.is_some();
    if privileged && !user.is_executive() {
        return Err(AppError::Forbidden(
            "Apenas executivos podem alterar nível, loja ou status".into(),
        ));
    }

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Usuário"))?;

    let mut active: UserActive = existing.into();
    if let Some(nome) = payload.nome {
        active.name = Set(nome.trim().to_string());
    }
    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        if email_exists(&state.orm, &email, Some(id)).await? {
            return Err(AppError::Conflict("Email já está em uso".into()));
        }
        active.email = Set(email);
    }
    if let Some(senha) = payload.senha {
        active.password_hash = Set(hash_password(&senha)?);
    }
    if let Some(raw) = payload.nivel {
        let role = Role::from_label(&raw)
            .ok_or_else(|| AppError::invalid_field("nivel", "Nível de usuário inválido"))?;
        active.role = Set(role);
    }
    if let Some(supplier_id) = payload.fornecedor_id {
        if Suppliers::find_by_id(supplier_id).one(&state.orm).await?.is_none() {
            return Err(AppError::not_found("Fornecedor"));
        }
        active.supplier_id = Set(Some(supplier_id));
    }
    if let Some(raw) = payload.status {
        let status = RecordStatus::from_label(&raw)
            .ok_or_else(|| AppError::invalid_field("status", "Status deve ser Ativo ou Inativo"))?;
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "user_update",
        "users",
        serde_json::json!({ "user_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Usuário atualizado com sucesso",
        user_from_entity(updated),
        None,
    ))
}

pub async fn delete_user(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<()>> {
    user.require_role(&[Role::Executivo])?;

    let existing = Users::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Usuário"))?;

    if existing.role == Role::Executivo {
        let executives = Users::find()
            .filter(UserCol::Role.eq(Role::Executivo))
            .count(&state.orm)
            .await?;
        if executives <= 1 {
            return Err(AppError::BadRequest(
                "Não é possível excluir o último usuário executivo".into(),
            ));
        }
    }

    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(id))
        .count(&state.orm)
        .await?;
    if orders > 0 {
        return Err(AppError::Conflict(format!(
            "Não é possível excluir. Usuário possui {orders} pedido(s)"
        )));
    }

    Users::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "user_delete",
        "users",
        serde_json::json!({ "user_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Usuário excluído com sucesso"))
}
