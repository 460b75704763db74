use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde_json::{Map, Value};
use validator::Validate;

use crate::{
    audit,
    dto::orders::{
        CreateOrderRequest, OrderList, OrderStatistics, OrderWithItems, UpdateOrderStatusRequest,
    },
    entity::{
        enums::{OrderStatus, Role},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products},
        suppliers::Entity as Suppliers,
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, order_from_entity, order_item_from_entity},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, OrderStatisticsQuery, Pagination, SortOrder},
    state::AppState,
};

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn has_text(address: &Map<String, Value>, key: &str) -> bool {
    match address.get(key) {
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    }
}

/// Accepts an object or a JSON-encoded string; street (`rua` or `logradouro`), `cidade` and `cep` are required.
pub fn normalize_address(raw: &Value) -> Result<Map<String, Value>, String> {
    let parsed = match raw {
        Value::String(text) => serde_json::from_str::<Value>(text)
            .map_err(|_| "Endereço de entrega deve ser um objeto JSON válido".to_string())?,
        other => other.clone(),
    };
    let Value::Object(address) = parsed else {
        return Err("Endereço de entrega é obrigatório".to_string());
    };

    let has_street = has_text(&address, "rua") || has_text(&address, "logradouro");
    if !has_street || !has_text(&address, "cidade") || !has_text(&address, "cep") {
        return Err("Endereço deve conter rua (ou logradouro), cidade e CEP".to_string());
    }
    Ok(address)
}

async fn with_items<C: ConnectionTrait>(
    conn: &C,
    orders: Vec<OrderModel>,
) -> AppResult<Vec<OrderWithItems>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    let mut grouped: HashMap<i32, Vec<OrderItemModel>> = HashMap::new();
    for item in OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(ids))
        .order_by_asc(OrderItemCol::Id)
        .all(conn)
        .await?
    {
        grouped.entry(item.order_id).or_default().push(item);
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderWithItems {
            itens: grouped
                .remove(&order.id)
                .unwrap_or_default()
                .into_iter()
                .map(order_item_from_entity)
                .collect(),
            pedido: order_from_entity(order),
        })
        .collect())
}

async fn list_orders(
    state: &AppState,
    mut condition: Condition,
    query: OrderListQuery,
    message: &str,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = Pagination::new(query.page, query.per_page).normalize();
    if let Some(raw) = query.status.as_ref().filter(|s| !s.trim().is_empty()) {
        let status = OrderStatus::from_label(raw)
            .ok_or_else(|| AppError::invalid_field("status", "Status inválido"))?;
        condition = condition.add(OrderCol::Status.eq(status));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt).order_by_asc(OrderCol::Id),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt).order_by_desc(OrderCol::Id),
    };

    let total = finder.clone().count(&state.orm).await? as i64;
    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;
    let items = with_items(&state.orm, orders).await?;

    Ok(ApiResponse::success(
        message,
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

/// Inserts the order and all of its items atomically; nothing is kept on failure.
pub async fn create_order(
    state: &AppState,
    user: &AuthUser,
    payload: CreateOrderRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    payload.validate()?;
    if payload.itens.is_empty() {
        return Err(AppError::invalid_field(
            "itens",
            "Pedido deve conter pelo menos um item",
        ));
    }
    let address = normalize_address(&payload.endereco_entrega)
        .map_err(|message| AppError::invalid_field("endereco_entrega", message))?;

    let lines: Vec<(i32, i32, f64, f64)> = payload
        .itens
        .iter()
        .map(|item| {
            let subtotal = round_cents(item.quantidade as f64 * item.preco_unitario);
            (item.produto_id, item.quantidade, item.preco_unitario, subtotal)
        })
        .collect();
    let total = round_cents(lines.iter().map(|(_, _, _, subtotal)| subtotal).sum());

    let txn = state.orm.begin().await?;

    if Users::find_by_id(user.user_id).one(&txn).await?.is_none() {
        return Err(AppError::not_found("Usuário"));
    }
    if Suppliers::find_by_id(payload.fornecedor_id)
        .one(&txn)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Fornecedor"));
    }

    let product_ids: HashSet<i32> = lines.iter().map(|(id, ..)| *id).collect();
    let found: HashSet<i32> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids.iter().copied()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();
    if let Some((missing, ..)) = lines.iter().find(|(id, ..)| !found.contains(id)) {
        return Err(AppError::NotFound(format!("Produto {missing} não encontrado")));
    }

    let now = Utc::now();
    let order = OrderActive {
        id: NotSet,
        user_id: Set(user.user_id),
        supplier_id: Set(payload.fornecedor_id),
        delivery_address: Set(Value::Object(address).to_string()),
        notes: Set(payload.observacoes.filter(|o| !o.trim().is_empty())),
        status: Set(OrderStatus::Pendente),
        total_value: Set(total),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(lines.len());
    for (product_id, quantity, unit_price, subtotal) in lines {
        let item = OrderItemActive {
            id: NotSet,
            order_id: Set(order.id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            unit_price: Set(unit_price),
            subtotal: Set(subtotal),
        }
        .insert(&txn)
        .await?;
        items.push(order_item_from_entity(item));
    }

    txn.commit().await?;

    tracing::info!(order_id = order.id, user_id = user.user_id, total, "order created");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "total": total }),
    )
    .await;

    Ok(ApiResponse::created(
        "Pedido criado com sucesso",
        OrderWithItems {
            pedido: order_from_entity(order),
            itens: items,
        },
    ))
}

pub async fn my_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    list_orders(state, condition, query, "Meus pedidos").await
}

pub async fn received_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    user.require_role(&[Role::Fornecedor, Role::Executivo])?;
    let supplier_id = user.supplier_id.ok_or_else(|| {
        AppError::Forbidden("Usuário não está vinculado a um fornecedor".into())
    })?;
    let condition = Condition::all().add(OrderCol::SupplierId.eq(supplier_id));
    list_orders(state, condition, query, "Pedidos recebidos").await
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    user.require_role(&[Role::Executivo])?;
    list_orders(state, Condition::all(), query, "Pedidos").await
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Pedido"))?;

    let visible = order.user_id == user.user_id
        || user.supplier_id == Some(order.supplier_id)
        || user.is_executive();
    if !visible {
        return Err(AppError::forbidden());
    }

    let mut found = with_items(&state.orm, vec![order]).await?;
    let data = found
        .pop()
        .ok_or_else(|| AppError::not_found("Pedido"))?;
    Ok(ApiResponse::success("Pedido", data, None))
}

pub async fn update_status(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    user.require_role(&[Role::Fornecedor, Role::Executivo])?;
    if payload.status.trim().is_empty() {
        return Err(AppError::invalid_field("status", "Status é obrigatório"));
    }
    let next = OrderStatus::from_label(&payload.status)
        .ok_or_else(|| AppError::invalid_field("status", "Status inválido"))?;

    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Pedido"))?;
    if !user.is_executive() && user.supplier_id != Some(order.supplier_id) {
        return Err(AppError::Forbidden(
            "Apenas o fornecedor do pedido pode alterar o status".into(),
        ));
    }

    let current = order.status;
    if !current.can_transition_to(next) {
        let message = if current == OrderStatus::Cancelado {
            "Pedido cancelado não pode ter o status alterado"
        } else {
            "Apenas pedidos pendentes podem ser cancelados"
        };
        return Err(AppError::BadRequest(message.into()));
    }

    let mut active: OrderActive = order.into();
    active.status = Set(next);
    active.updated_at = Set(Utc::now());
    let order = active.update(&state.orm).await?;

    tracing::info!(order_id = id, from = current.as_str(), to = next.as_str(), "order status changed");
    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_status",
        "orders",
        serde_json::json!({ "order_id": id, "from": current.as_str(), "to": next.as_str() }),
    )
    .await;

    Ok(ApiResponse::success(
        "Status do pedido atualizado com sucesso",
        order_from_entity(order),
        None,
    ))
}

pub async fn cancel_order(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<Order>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Pedido"))?;
    if order.user_id != user.user_id {
        return Err(AppError::Forbidden(
            "Apenas o comprador pode cancelar o pedido".into(),
        ));
    }
    if order.status != OrderStatus::Pendente {
        return Err(AppError::BadRequest(
            "Apenas pedidos pendentes podem ser cancelados".into(),
        ));
    }

    let mut active: OrderActive = order.into();
    active.status = Set(OrderStatus::Cancelado);
    active.updated_at = Set(Utc::now());
    let order = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "order_cancel",
        "orders",
        serde_json::json!({ "order_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Pedido cancelado com sucesso",
        order_from_entity(order),
        None,
    ))
}

#[derive(Debug, FromQueryResult)]
struct StatusTotals {
    status: OrderStatus,
    total: i64,
    valor: Option<f64>,
}

/// Count and value per status, scoped to the caller's store (executives may see everything).
pub async fn statistics(
    state: &AppState,
    user: &AuthUser,
    query: OrderStatisticsQuery,
) -> AppResult<ApiResponse<OrderStatistics>> {
    user.require_role(&[Role::Fornecedor, Role::Executivo])?;
    let scope = if user.is_executive() {
        query.fornecedor_id.or(user.supplier_id)
    } else {
        Some(user.supplier_id.ok_or_else(|| {
            AppError::Forbidden("Usuário não está vinculado a um fornecedor".into())
        })?)
    };

    let mut select = Orders::find()
        .select_only()
        .column(OrderCol::Status)
        .column_as(Expr::col((Orders, OrderCol::Id)).count(), "total")
        .column_as(Expr::col((Orders, OrderCol::TotalValue)).sum(), "valor")
        .group_by(OrderCol::Status);
    if let Some(supplier_id) = scope {
        select = select.filter(OrderCol::SupplierId.eq(supplier_id));
    }
    let rows = select.into_model::<StatusTotals>().all(&state.orm).await?;

    let mut por_status: BTreeMap<String, i64> = OrderStatus::ALL
        .iter()
        .map(|status| (status.as_str().to_string(), 0))
        .collect();
    let mut total_pedidos = 0;
    let mut valor_total = 0.0;
    for row in rows {
        total_pedidos += row.total;
        valor_total += row.valor.unwrap_or_default();
        por_status.insert(row.status.as_str().to_string(), row.total);
    }

    Ok(ApiResponse::success(
        "Estatísticas de pedidos",
        OrderStatistics {
            total_pedidos,
            valor_total: round_cents(valor_total),
            por_status,
        },
        None,
    ))
}

pub fn reject_delete() -> AppResult<ApiResponse<()>> {
    Err(AppError::BadRequest(
        "Pedidos não podem ser deletados, apenas cancelados".into(),
    ))
}
