use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use validator::Validate;

use crate::{
    audit,
    dto::{
        categories::{CategoryList, CategoryRequest, UpdateCategoryRequest},
        suppliers::StatusRequest,
    },
    entity::{
        categories::{ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories},
        enums::{RecordStatus, Role},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Category, category_from_entity},
    response::{ApiResponse, Meta},
    routes::params::CategoryQuery,
    services::{contains_ci, non_blank, parse_record_status},
    state::AppState,
};

async fn name_taken(state: &AppState, name: &str, exclude_id: Option<i32>) -> AppResult<bool> {
    let mut condition = Condition::all().add(CategoryCol::Name.eq(name));
    if let Some(id) = exclude_id {
        condition = condition.add(CategoryCol::Id.ne(id));
    }
    Ok(Categories::find().filter(condition).count(&state.orm).await? > 0)
}

pub async fn list_categories(
    state: &AppState,
    query: CategoryQuery,
) -> AppResult<ApiResponse<CategoryList>> {
    let mut condition = Condition::all();
    if let Some(nome) = query.nome.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(contains_ci((Categories, CategoryCol::Name), nome));
    }
    if let Some(raw) = query.status.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(CategoryCol::Status.eq(parse_record_status(Some(raw))?));
    }

    let items: Vec<Category> = Categories::find()
        .filter(condition)
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Categorias",
        CategoryList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn list_active(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    list_categories(
        state,
        CategoryQuery {
            nome: None,
            status: Some(RecordStatus::Ativo.as_str().to_string()),
        },
    )
    .await
}

pub async fn get_category(state: &AppState, id: i32) -> AppResult<ApiResponse<Category>> {
    let category = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Categoria não encontrada".into()))?;
    Ok(ApiResponse::success(
        "Categoria",
        category_from_entity(category),
        None,
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    user.require_role(&[Role::Executivo])?;
    payload.validate()?;

    let name = payload.nome.trim().to_string();
    if name_taken(state, &name, None).await? {
        return Err(AppError::Conflict("Categoria já existe".into()));
    }

    let now = Utc::now();
    let category = CategoryActive {
        id: NotSet,
        name: Set(name),
        description: Set(non_blank(payload.descricao)),
        status: Set(parse_record_status(payload.status.as_deref())?),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::created(
        "Categoria criada com sucesso",
        category_from_entity(category),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    user.require_role(&[Role::Executivo])?;
    payload.validate()?;

    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::NotFound("Categoria não encontrada".into()))?;

    let mut active: CategoryActive = existing.into();
    if let Some(nome) = payload.nome {
        let name = nome.trim().to_string();
        if name_taken(state, &name, Some(id)).await? {
            return Err(AppError::Conflict("Categoria já existe".into()));
        }
        active.name = Set(name);
    }
    if payload.descricao.is_some() {
        active.description = Set(non_blank(payload.descricao));
    }
    if payload.status.is_some() {
        active.status = Set(parse_record_status(payload.status.as_deref())?);
    }
    active.updated_at = Set(Utc::now());
    let category = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_update",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Categoria atualizada com sucesso",
        category_from_entity(category),
        None,
    ))
}

pub async fn set_status(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: StatusRequest,
) -> AppResult<ApiResponse<Category>> {
    let status = RecordStatus::from_label(&payload.status)
        .ok_or_else(|| AppError::invalid_field("status", "Status deve ser Ativo ou Inativo"))?;
    update_category(
        state,
        user,
        id,
        UpdateCategoryRequest {
            nome: None,
            descricao: None,
            status: Some(status.as_str().to_string()),
        },
    )
    .await
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<()>> {
    user.require_role(&[Role::Executivo])?;

    if Categories::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::NotFound("Categoria não encontrada".into()));
    }

    let products = Products::find()
        .filter(ProdCol::CategoryId.eq(id))
        .count(&state.orm)
        .await?;
    if products > 0 {
        return Err(AppError::Conflict(format!(
            "Não é possível excluir. Categoria possui {products} produto(s)"
        )));
    }

    Categories::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Categoria excluída com sucesso"))
}
