use std::collections::HashMap;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Query, SelectStatement};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use validator::Validate;

use crate::{
    audit,
    dto::{
        products::{
            ProductList, ProductRequest, ProductWithSuppliers, ProductWithSuppliersList,
            UpdateProductRequest,
        },
        suppliers::StatusRequest,
    },
    entity::{
        categories::Entity as Categories,
        enums::{RecordStatus, Role},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        product_suppliers::{
            ActiveModel as LinkActive, Column as LinkCol, Entity as ProductSuppliers,
        },
        products::{
            ActiveModel as ProductActive, Column as ProdCol, Entity as Products,
            Model as ProductModel,
        },
        suppliers::Entity as Suppliers,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Product, product_from_entity},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, ProductQuery},
    services::{contains_ci, link_service, non_blank, parse_record_status},
    state::AppState,
};

pub async fn internal_code_exists<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    exclude_id: Option<i32>,
) -> AppResult<bool> {
    let mut condition = Condition::all().add(ProdCol::InternalCode.eq(code.trim()));
    if let Some(id) = exclude_id {
        condition = condition.add(ProdCol::Id.ne(id));
    }
    Ok(Products::find().filter(condition).count(conn).await? > 0)
}

fn ensure_can_edit(user: &AuthUser, product: &ProductModel) -> AppResult<()> {
    if user.is_executive() {
        return Ok(());
    }
    match product.supplier_id {
        Some(owner) if user.can_manage_supplier(owner) => Ok(()),
        _ => Err(AppError::Forbidden(
            "Apenas o fornecedor dono do produto pode alterá-lo".into(),
        )),
    }
}

async fn ensure_category_exists<C: ConnectionTrait>(
    conn: &C,
    category_id: Option<i32>,
) -> AppResult<()> {
    if let Some(id) = category_id {
        if Categories::find_by_id(id).one(conn).await?.is_none() {
            return Err(AppError::NotFound("Categoria não encontrada".into()));
        }
    }
    Ok(())
}

fn linked_product_ids(supplier_id: i32, active_links_only: bool) -> SelectStatement {
    let mut linked = Query::select();
    linked
        .column(LinkCol::ProductId)
        .from(ProductSuppliers)
        .and_where(LinkCol::SupplierId.eq(supplier_id));
    if active_links_only {
        linked.and_where(LinkCol::Status.eq(RecordStatus::Ativo));
    }
    linked.to_owned()
}

/// Products owned by the supplier or linked to it.
fn supplier_products_condition(supplier_id: i32, active_links_only: bool) -> Condition {
    Condition::any()
        .add(ProdCol::SupplierId.eq(supplier_id))
        .add(ProdCol::Id.in_subquery(linked_product_ids(supplier_id, active_links_only)))
}

async fn insert_product<C: ConnectionTrait>(
    conn: &C,
    payload: ProductRequest,
    owner: Option<i32>,
) -> AppResult<ProductModel> {
    let code = non_blank(payload.codigo_interno);
    if let Some(code) = code.as_deref() {
        if internal_code_exists(conn, code, None).await? {
            return Err(AppError::Conflict("Código interno já cadastrado".into()));
        }
    }
    ensure_category_exists(conn, payload.categoria_id).await?;

    let now = Utc::now();
    let product = ProductActive {
        id: NotSet,
        name: Set(payload.nome.trim().to_string()),
        description: Set(non_blank(payload.descricao)),
        internal_code: Set(code),
        category_id: Set(payload.categoria_id),
        base_price: Set(payload.preco_base),
        supplier_id: Set(owner),
        status: Set(parse_record_status(payload.status.as_deref())?),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;
    Ok(product)
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = Pagination::new(query.page, query.per_page).normalize();
    let mut condition = Condition::all();

    if let Some(nome) = query.nome.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(contains_ci((Products, ProdCol::Name), nome));
    }
    if let Some(descricao) = query.descricao.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(contains_ci((Products, ProdCol::Description), descricao));
    }
    if let Some(code) = query.codigo_interno.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(contains_ci((Products, ProdCol::InternalCode), code));
    }
    if let Some(raw) = query.status.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(ProdCol::Status.eq(parse_record_status(Some(raw))?));
    }
    if let Some(category_id) = query.categoria_id {
        condition = condition.add(ProdCol::CategoryId.eq(category_id));
    }
    if let Some(supplier_id) = query.fornecedor_id {
        condition = condition.add(supplier_products_condition(supplier_id, false));
    }

    let finder = Products::find().filter(condition).order_by_asc(ProdCol::Name);
    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Produtos",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn list_active(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let items: Vec<Product> = Products::find()
        .filter(ProdCol::Status.eq(RecordStatus::Ativo))
        .order_by_asc(ProdCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Produtos ativos",
        ProductList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn get_product(state: &AppState, id: i32) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Produto"))?;
    Ok(ApiResponse::success("Produto", product_from_entity(product), None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    user.require_role(&[Role::Fornecedor, Role::Executivo])?;
    payload.validate()?;

    let owner = if user.is_executive() {
        match payload.fornecedor_id {
            Some(id) => {
                if Suppliers::find_by_id(id).one(&state.orm).await?.is_none() {
                    return Err(AppError::not_found("Fornecedor"));
                }
                Some(id)
            }
            None => None,
        }
    } else {
        Some(user.supplier_id.ok_or_else(|| {
            AppError::Forbidden("Cadastre sua loja antes de criar produtos".into())
        })?)
    };

    let product = insert_product(&state.orm, payload, owner).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::created(
        "Produto criado com sucesso",
        product_from_entity(product),
    ))
}

/// Creates a product owned by the caller's store and links it as principal supplier.
pub async fn create_for_my_store(
    state: &AppState,
    user: &AuthUser,
    payload: ProductRequest,
) -> AppResult<ApiResponse<Product>> {
    user.require_role(&[Role::Fornecedor])?;
    payload.validate()?;
    let supplier_id = user
        .supplier_id
        .ok_or_else(|| AppError::Forbidden("Cadastre sua loja antes de criar produtos".into()))?;

    let txn = state.orm.begin().await?;
    let supplier_price = payload.preco_base;
    let product = insert_product(&txn, payload, Some(supplier_id)).await?;
    LinkActive {
        id: NotSet,
        product_id: Set(product.id),
        supplier_id: Set(supplier_id),
        is_principal: Set(true),
        supplier_price: Set(supplier_price),
        status: Set(RecordStatus::Ativo),
        created_at: Set(Utc::now()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_create_store",
        "products",
        serde_json::json!({ "product_id": product.id, "supplier_id": supplier_id }),
    )
    .await;

    Ok(ApiResponse::created(
        "Produto criado e vinculado à sua loja",
        product_from_entity(product),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    user.require_role(&[Role::Fornecedor, Role::Executivo])?;
    payload.validate()?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Produto"))?;
    ensure_can_edit(user, &existing)?;

    let mut active: ProductActive = existing.into();
    if let Some(nome) = payload.nome {
        active.name = Set(nome.trim().to_string());
    }
    if payload.descricao.is_some() {
        active.description = Set(non_blank(payload.descricao));
    }
    if payload.codigo_interno.is_some() {
        let code = non_blank(payload.codigo_interno);
        if let Some(code) = code.as_deref() {
            if internal_code_exists(&state.orm, code, Some(id)).await? {
                return Err(AppError::Conflict("Código interno já cadastrado".into()));
            }
        }
        active.internal_code = Set(code);
    }
    if payload.categoria_id.is_some() {
        ensure_category_exists(&state.orm, payload.categoria_id).await?;
        active.category_id = Set(payload.categoria_id);
    }
    if payload.preco_base.is_some() {
        active.base_price = Set(payload.preco_base);
    }
    if payload.status.is_some() {
        active.status = Set(parse_record_status(payload.status.as_deref())?);
    }
    active.updated_at = Set(Utc::now());
    let product = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Produto atualizado com sucesso",
        product_from_entity(product),
        None,
    ))
}

pub async fn set_status(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: StatusRequest,
) -> AppResult<ApiResponse<Product>> {
    let status = RecordStatus::from_label(&payload.status)
        .ok_or_else(|| AppError::invalid_field("status", "Status deve ser Ativo ou Inativo"))?;
    update_product(
        state,
        user,
        id,
        UpdateProductRequest {
            nome: None,
            descricao: None,
            codigo_interno: None,
            categoria_id: None,
            preco_base: None,
            status: Some(status.as_str().to_string()),
        },
    )
    .await
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<()>> {
    user.require_role(&[Role::Fornecedor, Role::Executivo])?;

    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Produto"))?;
    ensure_can_edit(user, &existing)?;

    let links = ProductSuppliers::find()
        .filter(LinkCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if links > 0 {
        return Err(AppError::Conflict(format!(
            "Não é possível excluir. Produto está vinculado a {links} fornecedor(es)"
        )));
    }

    let ordered = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(id))
        .count(&state.orm)
        .await?;
    if ordered > 0 {
        return Err(AppError::Conflict(format!(
            "Não é possível excluir. Produto consta em {ordered} item(ns) de pedido"
        )));
    }

    Products::delete_by_id(id).exec(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::message("Produto excluído com sucesso"))
}

/// Active products the caller's store neither owns nor is linked to.
pub async fn available_for_supplier(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProductList>> {
    user.require_role(&[Role::Fornecedor])?;
    let supplier_id = user
        .supplier_id
        .ok_or_else(|| AppError::not_found("Loja"))?;

    let items: Vec<Product> = Products::find()
        .filter(ProdCol::Status.eq(RecordStatus::Ativo))
        .filter(
            Condition::any()
                .add(ProdCol::SupplierId.is_null())
                .add(ProdCol::SupplierId.ne(supplier_id)),
        )
        .filter(ProdCol::Id.not_in_subquery(linked_product_ids(supplier_id, false)))
        .order_by_asc(ProdCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Produtos disponíveis",
        ProductList { items },
        Some(Meta::total(total)),
    ))
}

/// Products owned by the caller's store plus those actively linked to it.
pub async fn my_company_products(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ProductList>> {
    user.require_role(&[Role::Fornecedor])?;
    let supplier_id = user
        .supplier_id
        .ok_or_else(|| AppError::not_found("Loja"))?;

    let items: Vec<Product> = Products::find()
        .filter(supplier_products_condition(supplier_id, true))
        .order_by_asc(ProdCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Produtos da empresa",
        ProductList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn with_suppliers(
    state: &AppState,
) -> AppResult<ApiResponse<ProductWithSuppliersList>> {
    let links = ProductSuppliers::find()
        .order_by_desc(LinkCol::IsPrincipal)
        .order_by_asc(LinkCol::Id)
        .all(&state.orm)
        .await?;
    let details = link_service::link_details(&state.orm, links).await?;

    let mut grouped: HashMap<i32, Vec<_>> = HashMap::new();
    for detail in details {
        grouped.entry(detail.produto_id).or_default().push(detail);
    }
    if grouped.is_empty() {
        return Ok(ApiResponse::success(
            "Produtos com fornecedores",
            ProductWithSuppliersList { items: Vec::new() },
            Some(Meta::total(0)),
        ));
    }

    let items: Vec<ProductWithSuppliers> = Products::find()
        .filter(ProdCol::Id.is_in(grouped.keys().copied().collect::<Vec<_>>()))
        .order_by_asc(ProdCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|product| ProductWithSuppliers {
            fornecedores: grouped.remove(&product.id).unwrap_or_default(),
            produto: product_from_entity(product),
        })
        .collect();
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Produtos com fornecedores",
        ProductWithSuppliersList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn with_suppliers_by_id(
    state: &AppState,
    id: i32,
) -> AppResult<ApiResponse<ProductWithSuppliers>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Produto"))?;

    let links = ProductSuppliers::find()
        .filter(LinkCol::ProductId.eq(id))
        .order_by_desc(LinkCol::IsPrincipal)
        .order_by_asc(LinkCol::Id)
        .all(&state.orm)
        .await?;
    let fornecedores = link_service::link_details(&state.orm, links).await?;

    Ok(ApiResponse::success(
        "Produto com fornecedores",
        ProductWithSuppliers {
            produto: product_from_entity(product),
            fornecedores,
        },
        None,
    ))
}

pub async fn without_suppliers(state: &AppState) -> AppResult<ApiResponse<ProductList>> {
    let items = link_service::products_without_suppliers(&state.orm).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Produtos sem fornecedores",
        ProductList { items },
        Some(Meta::total(total)),
    ))
}
