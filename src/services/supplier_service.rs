use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use validator::Validate;

use crate::{
    audit,
    dto::suppliers::{
        MyStoreResponse, StatusRequest, SupplierList, SupplierRequest, UpdateSupplierRequest,
        normalize_cnpj,
    },
    entity::{
        enums::{RecordStatus, Role},
        orders::{Column as OrderCol, Entity as Orders},
        product_suppliers::{Column as LinkCol, Entity as ProductSuppliers},
        suppliers::{ActiveModel as SupplierActive, Column as SupplierCol, Entity as Suppliers},
        users::{ActiveModel as UserActive, Entity as Users},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Supplier, supplier_from_entity},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, SupplierQuery},
    services::{auth_service::issue_token, contains_ci, non_blank, parse_record_status},
    state::AppState,
};

pub async fn cnpj_exists<C: ConnectionTrait>(
    conn: &C,
    cnpj: &str,
    exclude_id: Option<i32>,
) -> AppResult<bool> {
    let mut condition = Condition::all().add(SupplierCol::Cnpj.eq(normalize_cnpj(cnpj)));
    if let Some(id) = exclude_id {
        condition = condition.add(SupplierCol::Id.ne(id));
    }
    Ok(Suppliers::find().filter(condition).count(conn).await? > 0)
}

pub async fn email_exists<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    exclude_id: Option<i32>,
) -> AppResult<bool> {
    let mut condition = Condition::all().add(SupplierCol::Email.eq(email.trim().to_lowercase()));
    if let Some(id) = exclude_id {
        condition = condition.add(SupplierCol::Id.ne(id));
    }
    Ok(Suppliers::find().filter(condition).count(conn).await? > 0)
}

async fn ensure_unique<C: ConnectionTrait>(
    conn: &C,
    cnpj: Option<&str>,
    email: Option<&str>,
    exclude_id: Option<i32>,
) -> AppResult<()> {
    if let Some(cnpj) = cnpj {
        if cnpj_exists(conn, cnpj, exclude_id).await? {
            return Err(AppError::Conflict("CNPJ já cadastrado".into()));
        }
    }
    if let Some(email) = email {
        if email_exists(conn, email, exclude_id).await? {
            return Err(AppError::Conflict("Email já cadastrado".into()));
        }
    }
    Ok(())
}

fn new_supplier(payload: SupplierRequest) -> AppResult<SupplierActive> {
    let status = parse_record_status(payload.status.as_deref())?;
    let now = Utc::now();
    Ok(SupplierActive {
        id: NotSet,
        name: Set(payload.nome.trim().to_string()),
        email: Set(payload.email.trim().to_lowercase()),
        cnpj: Set(normalize_cnpj(&payload.cnpj)),
        phone: Set(non_blank(payload.telefone)),
        address: Set(non_blank(payload.endereco)),
        status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
    })
}

pub async fn list_suppliers(
    state: &AppState,
    query: SupplierQuery,
) -> AppResult<ApiResponse<SupplierList>> {
    let (page, limit, offset) = Pagination::new(query.page, query.per_page).normalize();
    let mut condition = Condition::all();

    if let Some(nome) = query.nome.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(contains_ci((Suppliers, SupplierCol::Name), nome));
    }
    if let Some(raw) = query.status.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(SupplierCol::Status.eq(parse_record_status(Some(raw))?));
    }
    let cnpj = query.cnpj.as_deref().map(normalize_cnpj);
    if let Some(cnpj) = cnpj.filter(|c| !c.is_empty()) {
        condition = condition.add(SupplierCol::Cnpj.contains(cnpj));
    }

    let finder = Suppliers::find().filter(condition).order_by_asc(SupplierCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(supplier_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Fornecedores",
        SupplierList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_active(state: &AppState) -> AppResult<ApiResponse<SupplierList>> {
    let items: Vec<Supplier> = Suppliers::find()
        .filter(SupplierCol::Status.eq(RecordStatus::Ativo))
        .order_by_asc(SupplierCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(supplier_from_entity)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Fornecedores ativos",
        SupplierList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn get_supplier(state: &AppState, id: i32) -> AppResult<ApiResponse<Supplier>> {
    let supplier = Suppliers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Fornecedor"))?;
    Ok(ApiResponse::success(
        "Fornecedor",
        supplier_from_entity(supplier),
        None,
    ))
}

pub async fn create_supplier(
    state: &AppState,
    user: &AuthUser,
    payload: SupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    user.require_role(&[Role::Executivo])?;
    payload.validate()?;
    ensure_unique(&state.orm, Some(&payload.cnpj), Some(&payload.email), None).await?;

    let supplier = new_supplier(payload)?.insert(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "supplier_create",
        "suppliers",
        serde_json::json!({ "supplier_id": supplier.id }),
    )
    .await;

    Ok(ApiResponse::created(
        "Fornecedor criado com sucesso",
        supplier_from_entity(supplier),
    ))
}

pub async fn update_supplier(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateSupplierRequest,
) -> AppResult<ApiResponse<Supplier>> {
    user.ensure_manages_supplier(id)?;
    payload.validate()?;

    let existing = Suppliers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Fornecedor"))?;

    ensure_unique(
        &state.orm,
        payload.cnpj.as_deref(),
        payload.email.as_deref(),
        Some(id),
    )
    .await?;

    let mut active: SupplierActive = existing.into();
    if let Some(nome) = payload.nome {
        active.name = Set(nome.trim().to_string());
    }
    if let Some(email) = payload.email {
        active.email = Set(email.trim().to_lowercase());
    }
    if let Some(cnpj) = payload.cnpj {
        active.cnpj = Set(normalize_cnpj(&cnpj));
    }
    if payload.telefone.is_some() {
        active.phone = Set(non_blank(payload.telefone));
    }
    if payload.endereco.is_some() {
        active.address = Set(non_blank(payload.endereco));
    }
    if payload.status.is_some() {
        active.status = Set(parse_record_status(payload.status.as_deref())?);
    }
    active.updated_at = Set(Utc::now());
    let supplier = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "supplier_update",
        "suppliers",
        serde_json::json!({ "supplier_id": supplier.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Fornecedor atualizado com sucesso",
        supplier_from_entity(supplier),
        None,
    ))
}

pub async fn delete_supplier(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<()>> {
    user.require_role(&[Role::Executivo])?;

    if Suppliers::find_by_id(id).one(&state.orm).await?.is_none() {
        return Err(AppError::not_found("Fornecedor"));
    }

    let links = ProductSuppliers::find()
        .filter(LinkCol::SupplierId.eq(id))
        .count(&state.orm)
        .await?;
    if links > 0 {
        return Err(AppError::Conflict(format!(
            "Não é possível excluir. Fornecedor está vinculado a {links} produto(s)"
        )));
    }

    let orders = Orders::find()
        .filter(OrderCol::SupplierId.eq(id))
        .count(&state.orm)
        .await?;
    if orders > 0 {
        return Err(AppError::Conflict(format!(
            "Não é possível excluir. Fornecedor possui {orders} pedido(s)"
        )));
    }

    Suppliers::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "supplier_delete",
        "suppliers",
        serde_json::json!({ "supplier_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Fornecedor excluído com sucesso"))
}

pub async fn set_status(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: StatusRequest,
) -> AppResult<ApiResponse<Supplier>> {
    user.ensure_manages_supplier(id)?;
    let status = RecordStatus::from_label(&payload.status)
        .ok_or_else(|| AppError::invalid_field("status", "Status deve ser Ativo ou Inativo"))?;

    let existing = Suppliers::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Fornecedor"))?;

    let mut active: SupplierActive = existing.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    let supplier = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "supplier_status",
        "suppliers",
        serde_json::json!({ "supplier_id": id, "status": status.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Status do fornecedor atualizado",
        supplier_from_entity(supplier),
        None,
    ))
}

pub async fn my_store(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Supplier>> {
    user.require_role(&[Role::Fornecedor])?;
    let supplier_id = user
        .supplier_id
        .ok_or_else(|| AppError::not_found("Loja"))?;
    get_supplier(state, supplier_id).await
}

/// Creates the store of a supplier user and attaches it to that user.
pub async fn create_my_store(
    state: &AppState,
    user: &AuthUser,
    payload: SupplierRequest,
) -> AppResult<ApiResponse<MyStoreResponse>> {
    user.require_role(&[Role::Fornecedor])?;
    payload.validate()?;

    let txn = state.orm.begin().await?;

    let owner = Users::find_by_id(user.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Usuário"))?;
    if owner.supplier_id.is_some() {
        return Err(AppError::Conflict("Usuário já possui uma loja".into()));
    }

    ensure_unique(&txn, Some(&payload.cnpj), Some(&payload.email), None).await?;
    let supplier = new_supplier(payload)?.insert(&txn).await?;

    let mut owner_active: UserActive = owner.into();
    owner_active.supplier_id = Set(Some(supplier.id));
    owner_active.updated_at = Set(Utc::now());
    let owner = owner_active.update(&txn).await?;

    txn.commit().await?;

    let token = issue_token(&state.config, &owner)?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "store_create",
        "suppliers",
        serde_json::json!({ "supplier_id": supplier.id }),
    )
    .await;

    Ok(ApiResponse::created(
        "Loja criada com sucesso",
        MyStoreResponse {
            fornecedor: supplier_from_entity(supplier),
            token,
        },
    ))
}
