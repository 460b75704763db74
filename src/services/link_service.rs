use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr,
    TransactionTrait,
};
use validator::Validate;

use crate::{
    audit,
    dto::links::{
        BulkCreateResult, BulkDeleteResult, CreateLinkRequest, CreateMultipleLinksRequest,
        DeleteMultipleLinksRequest, LinkList, LinkPair, LinkReport, LinkStatistics,
    },
    entity::{
        enums::{RecordStatus, Role},
        product_suppliers::{
            ActiveModel as LinkActive, Column as LinkCol, Entity as ProductSuppliers,
            Model as LinkModel, Relation as LinkRel,
        },
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        suppliers::{Column as SupplierCol, Entity as Suppliers, Model as SupplierModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{
        Link, LinkDetail, Product, Supplier, link_from_entity, product_from_entity,
        supplier_from_entity,
    },
    response::{ApiResponse, Meta},
    routes::params::{LinkHistoryQuery, LinkQuery},
    services::{contains_ci, parse_record_status},
    state::AppState,
};

const LINK_MANAGERS: [Role; 2] = [Role::Fornecedor, Role::Executivo];

fn pair_condition(product_id: i32, supplier_id: i32) -> Condition {
    Condition::all()
        .add(LinkCol::ProductId.eq(product_id))
        .add(LinkCol::SupplierId.eq(supplier_id))
}

pub async fn find_link<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    supplier_id: i32,
) -> AppResult<Option<LinkModel>> {
    Ok(ProductSuppliers::find()
        .filter(pair_condition(product_id, supplier_id))
        .one(conn)
        .await?)
}

pub async fn link_exists<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    supplier_id: i32,
) -> AppResult<bool> {
    let count = ProductSuppliers::find()
        .filter(pair_condition(product_id, supplier_id))
        .count(conn)
        .await?;
    Ok(count > 0)
}

fn duplicate_as_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Vínculo já existe".into())
        }
        _ => AppError::OrmError(err),
    }
}

async fn insert_link<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    supplier_id: i32,
    supplier_price: Option<f64>,
) -> AppResult<LinkModel> {
    LinkActive {
        id: NotSet,
        product_id: Set(product_id),
        supplier_id: Set(supplier_id),
        is_principal: Set(false),
        supplier_price: Set(supplier_price),
        status: Set(RecordStatus::Ativo),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await
    .map_err(duplicate_as_conflict)
}

/// Attaches product and supplier names to each link, preserving order.
pub(crate) async fn link_details<C: ConnectionTrait>(
    conn: &C,
    links: Vec<LinkModel>,
) -> AppResult<Vec<LinkDetail>> {
    if links.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: HashSet<i32> = links.iter().map(|l| l.product_id).collect();
    let supplier_ids: HashSet<i32> = links.iter().map(|l| l.supplier_id).collect();

    let products: HashMap<i32, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    let suppliers: HashMap<i32, SupplierModel> = Suppliers::find()
        .filter(SupplierCol::Id.is_in(supplier_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    Ok(links
        .into_iter()
        .filter_map(|link| {
            let product = products.get(&link.product_id)?;
            let supplier = suppliers.get(&link.supplier_id)?;
            Some(LinkDetail {
                id: link.id,
                produto_id: link.product_id,
                produto_nome: product.name.clone(),
                produto_status: product.status,
                fornecedor_id: link.supplier_id,
                fornecedor_nome: supplier.name.clone(),
                fornecedor_status: supplier.status,
                is_principal: link.is_principal,
                preco_fornecedor: link.supplier_price,
                status: link.status,
                created_at: link.created_at,
            })
        })
        .collect())
}

pub async fn create_link(
    state: &AppState,
    user: &AuthUser,
    payload: CreateLinkRequest,
) -> AppResult<ApiResponse<Link>> {
    user.require_role(&LINK_MANAGERS)?;
    payload.validate()?;
    user.ensure_manages_supplier(payload.fornecedor_id)?;

    let supplier = Suppliers::find_by_id(payload.fornecedor_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Fornecedor"))?;
    if supplier.status != RecordStatus::Ativo {
        return Err(AppError::Forbidden(
            "Fornecedor inativo não pode ser vinculado".into(),
        ));
    }

    if Products::find_by_id(payload.produto_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Produto"));
    }

    if link_exists(&state.orm, payload.produto_id, payload.fornecedor_id).await? {
        return Err(AppError::Conflict("Vínculo já existe".into()));
    }

    let link = insert_link(
        &state.orm,
        payload.produto_id,
        payload.fornecedor_id,
        payload.preco_fornecedor,
    )
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "link_create",
        "product_suppliers",
        serde_json::json!({ "product_id": link.product_id, "supplier_id": link.supplier_id }),
    )
    .await;

    Ok(ApiResponse::created(
        "Vínculo criado com sucesso",
        link_from_entity(link),
    ))
}

/// Makes the pair the product's only principal link (reset-then-set in one transaction).
pub async fn set_principal(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
    supplier_id: i32,
) -> AppResult<ApiResponse<Link>> {
    user.require_role(&LINK_MANAGERS)?;
    user.ensure_manages_supplier(supplier_id)?;

    let txn = state.orm.begin().await?;

    let link = find_link(&txn, product_id, supplier_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Vínculo não encontrado".into()))?;

    let supplier = Suppliers::find_by_id(supplier_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found("Fornecedor"))?;
    if supplier.status != RecordStatus::Ativo {
        return Err(AppError::Forbidden(
            "Fornecedor inativo não pode ser principal".into(),
        ));
    }

    ProductSuppliers::update_many()
        .col_expr(LinkCol::IsPrincipal, Expr::value(false))
        .filter(LinkCol::ProductId.eq(product_id))
        .exec(&txn)
        .await?;

    let mut active: LinkActive = link.into();
    active.is_principal = Set(true);
    let link = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "link_set_principal",
        "product_suppliers",
        serde_json::json!({ "product_id": product_id, "supplier_id": supplier_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Fornecedor principal definido com sucesso",
        link_from_entity(link),
        None,
    ))
}

/// Links one product to many suppliers. Existing pairs are counted, never duplicated.
pub async fn create_multiple(
    state: &AppState,
    user: &AuthUser,
    payload: CreateMultipleLinksRequest,
) -> AppResult<ApiResponse<BulkCreateResult>> {
    user.require_role(&LINK_MANAGERS)?;
    payload.validate()?;
    if payload.fornecedores.is_empty() {
        return Err(AppError::invalid_field(
            "fornecedores",
            "Informe ao menos um fornecedor",
        ));
    }

    let product_id = payload.produto_id;
    if Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Produto"));
    }

    let mut result = BulkCreateResult {
        criados: 0,
        existentes: 0,
        ignorados: Vec::new(),
    };
    let mut seen = HashSet::new();

    let txn = state.orm.begin().await?;
    for supplier_id in payload.fornecedores {
        if !seen.insert(supplier_id) {
            continue;
        }
        if supplier_id <= 0 || !user.can_manage_supplier(supplier_id) {
            result.ignorados.push(supplier_id);
            continue;
        }
        let active = Suppliers::find_by_id(supplier_id)
            .one(&txn)
            .await?
            .is_some_and(|s| s.status == RecordStatus::Ativo);
        if !active {
            result.ignorados.push(supplier_id);
            continue;
        }
        if link_exists(&txn, product_id, supplier_id).await? {
            result.existentes += 1;
            continue;
        }
        insert_link(&txn, product_id, supplier_id, None).await?;
        result.criados += 1;
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "link_create_multiple",
        "product_suppliers",
        serde_json::json!({
            "product_id": product_id,
            "created": result.criados,
            "existing": result.existentes,
        }),
    )
    .await;

    let message = format!(
        "{} vínculo(s) criado(s), {} já existente(s)",
        result.criados, result.existentes
    );
    if result.criados > 0 {
        Ok(ApiResponse::created(message, result))
    } else {
        Ok(ApiResponse::success(message, result, None))
    }
}

/// Removes every listed pair in one transaction; missing pairs are skipped.
pub async fn delete_multiple(
    state: &AppState,
    user: &AuthUser,
    payload: DeleteMultipleLinksRequest,
) -> AppResult<ApiResponse<BulkDeleteResult>> {
    user.require_role(&LINK_MANAGERS)?;
    payload.validate()?;
    if payload.vinculos.is_empty() {
        return Err(AppError::invalid_field(
            "vinculos",
            "Informe ao menos um vínculo",
        ));
    }
    for pair in &payload.vinculos {
        user.ensure_manages_supplier(pair.fornecedor_id)?;
    }

    let txn = state.orm.begin().await?;
    let mut removidos = 0;
    for LinkPair {
        produto_id,
        fornecedor_id,
    } in &payload.vinculos
    {
        removidos += ProductSuppliers::delete_many()
            .filter(pair_condition(*produto_id, *fornecedor_id))
            .exec(&txn)
            .await?
            .rows_affected;
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "link_delete_multiple",
        "product_suppliers",
        serde_json::json!({ "removed": removidos }),
    )
    .await;

    Ok(ApiResponse::success(
        format!("{removidos} vínculo(s) removido(s)"),
        BulkDeleteResult { removidos },
        None,
    ))
}

pub async fn delete_link(
    state: &AppState,
    user: &AuthUser,
    pair: LinkPair,
) -> AppResult<ApiResponse<()>> {
    user.require_role(&LINK_MANAGERS)?;
    pair.validate()?;
    user.ensure_manages_supplier(pair.fornecedor_id)?;

    let result = ProductSuppliers::delete_many()
        .filter(pair_condition(pair.produto_id, pair.fornecedor_id))
        .exec(&state.orm)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Vínculo não encontrado".into()));
    }

    audit::record(
        &state.orm,
        Some(user.user_id),
        "link_delete",
        "product_suppliers",
        serde_json::json!({ "product_id": pair.produto_id, "supplier_id": pair.fornecedor_id }),
    )
    .await;

    Ok(ApiResponse::message("Vínculo removido com sucesso"))
}

/// Drops every link of a product. Executives and the owning supplier only.
pub async fn delete_all_for_product(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
) -> AppResult<ApiResponse<BulkDeleteResult>> {
    user.require_role(&LINK_MANAGERS)?;
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Produto"))?;
    match product.supplier_id {
        Some(owner) => user.ensure_manages_supplier(owner)?,
        None if user.is_executive() => {}
        None => return Err(AppError::forbidden()),
    }

    let removidos = ProductSuppliers::delete_many()
        .filter(LinkCol::ProductId.eq(product_id))
        .exec(&state.orm)
        .await?
        .rows_affected;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "link_delete_all",
        "product_suppliers",
        serde_json::json!({ "product_id": product_id, "removed": removidos }),
    )
    .await;

    Ok(ApiResponse::success(
        format!("{removidos} vínculo(s) removido(s)"),
        BulkDeleteResult { removidos },
        None,
    ))
}

pub async fn list_links(state: &AppState, query: LinkQuery) -> AppResult<ApiResponse<LinkList>> {
    let mut condition = Condition::all();
    if let Some(nome) = query.produto_nome.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(contains_ci((Products, ProdCol::Name), nome));
    }
    if let Some(nome) = query.fornecedor_nome.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(contains_ci((Suppliers, SupplierCol::Name), nome));
    }
    if let Some(raw) = query.produto_status.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(ProdCol::Status.eq(parse_record_status(Some(raw))?));
    }
    if let Some(raw) = query.fornecedor_status.as_ref().filter(|s| !s.trim().is_empty()) {
        condition = condition.add(SupplierCol::Status.eq(parse_record_status(Some(raw))?));
    }

    let links = ProductSuppliers::find()
        .join(JoinType::InnerJoin, LinkRel::Products.def())
        .join(JoinType::InnerJoin, LinkRel::Suppliers.def())
        .filter(condition)
        .order_by_desc(LinkCol::CreatedAt)
        .order_by_desc(LinkCol::Id)
        .all(&state.orm)
        .await?;

    let items = link_details(&state.orm, links).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Vínculos",
        LinkList { items },
        Some(Meta::total(total)),
    ))
}

/// Newest links first, optionally for a single product.
pub async fn history(
    state: &AppState,
    query: LinkHistoryQuery,
) -> AppResult<ApiResponse<LinkList>> {
    let mut finder = ProductSuppliers::find();
    if let Some(product_id) = query.produto_id {
        if product_id <= 0 {
            return Err(AppError::BadRequest("ID inválido".into()));
        }
        finder = finder.filter(LinkCol::ProductId.eq(product_id));
    }
    let links = finder
        .order_by_desc(LinkCol::CreatedAt)
        .order_by_desc(LinkCol::Id)
        .all(&state.orm)
        .await?;

    let items = link_details(&state.orm, links).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Histórico de vínculos",
        LinkList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn suppliers_for_product(
    state: &AppState,
    product_id: i32,
) -> AppResult<ApiResponse<LinkList>> {
    if Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Produto"));
    }

    let links = ProductSuppliers::find()
        .filter(LinkCol::ProductId.eq(product_id))
        .order_by_desc(LinkCol::IsPrincipal)
        .order_by_asc(LinkCol::Id)
        .all(&state.orm)
        .await?;

    let items = link_details(&state.orm, links).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Fornecedores do produto",
        LinkList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn products_for_supplier(
    state: &AppState,
    supplier_id: i32,
) -> AppResult<ApiResponse<LinkList>> {
    if Suppliers::find_by_id(supplier_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Fornecedor"));
    }

    let links = ProductSuppliers::find()
        .filter(LinkCol::SupplierId.eq(supplier_id))
        .order_by_asc(LinkCol::Id)
        .all(&state.orm)
        .await?;

    let items = link_details(&state.orm, links).await?;
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Produtos do fornecedor",
        LinkList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn products_without_suppliers<C: ConnectionTrait>(conn: &C) -> AppResult<Vec<Product>> {
    let linked = Query::select()
        .column(LinkCol::ProductId)
        .from(ProductSuppliers)
        .to_owned();
    Ok(Products::find()
        .filter(ProdCol::Id.not_in_subquery(linked))
        .order_by_asc(ProdCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect())
}

pub async fn suppliers_without_products<C: ConnectionTrait>(
    conn: &C,
) -> AppResult<Vec<Supplier>> {
    let linked = Query::select()
        .column(LinkCol::SupplierId)
        .from(ProductSuppliers)
        .to_owned();
    Ok(Suppliers::find()
        .filter(SupplierCol::Id.not_in_subquery(linked))
        .order_by_asc(SupplierCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(supplier_from_entity)
        .collect())
}

pub async fn report(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<LinkReport>> {
    user.require_role(&[Role::Executivo])?;

    let total_vinculos = ProductSuppliers::find().count(&state.orm).await?;
    let vinculos_principais = ProductSuppliers::find()
        .filter(LinkCol::IsPrincipal.eq(true))
        .count(&state.orm)
        .await?;
    let total_produtos = Products::find().count(&state.orm).await?;
    let total_fornecedores = Suppliers::find().count(&state.orm).await?;

    let produtos_sem_fornecedores = products_without_suppliers(&state.orm).await?;
    let fornecedores_sem_produtos = suppliers_without_products(&state.orm).await?;

    let produtos_sem_fornecedor = produtos_sem_fornecedores.len() as u64;
    let fornecedores_sem_produto = fornecedores_sem_produtos.len() as u64;

    Ok(ApiResponse::success(
        "Relatório de vínculos",
        LinkReport {
            estatisticas: LinkStatistics {
                total_vinculos,
                vinculos_principais,
                produtos_com_fornecedor: total_produtos.saturating_sub(produtos_sem_fornecedor),
                fornecedores_com_produto: total_fornecedores
                    .saturating_sub(fornecedores_sem_produto),
                produtos_sem_fornecedor,
                fornecedores_sem_produto,
            },
            produtos_sem_fornecedores,
            fornecedores_sem_produtos,
        },
        None,
    ))
}
