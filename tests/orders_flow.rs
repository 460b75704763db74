mod common;

use marketplace_api::{
    dto::orders::{CreateOrderRequest, OrderItemRequest, UpdateOrderStatusRequest},
    entity::{
        Orders,
        enums::{OrderStatus, RecordStatus, Role},
    },
    error::AppError,
    routes::params::{OrderListQuery, OrderStatisticsQuery},
    services::order_service,
};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use common::{create_product, create_supplier, create_user, setup_state};

fn order_request(supplier_id: i32, product_id: i32) -> CreateOrderRequest {
    CreateOrderRequest {
        fornecedor_id: supplier_id,
        endereco_entrega: json!({ "rua": "Rua A, 10", "cidade": "Recife", "cep": "50000-000" }),
        observacoes: None,
        itens: vec![OrderItemRequest {
            produto_id: product_id,
            quantidade: 2,
            preco_unitario: 10.0,
        }],
    }
}

#[tokio::test]
async fn create_order_computes_total_and_subtotals() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let supplier_id = create_supplier(&state, "Loja", "11111111000111", RecordStatus::Ativo).await?;
    let product_id = create_product(&state, "Café", Some(supplier_id)).await?;
    let buyer = create_user(&state, "comprador@example.com", Role::Comum, None).await?;

    let resp = order_service::create_order(&state, &buyer, order_request(supplier_id, product_id)).await?;
    assert_eq!(resp.code, 201);

    let data = resp.data.expect("order data");
    assert_eq!(data.pedido.valor_total, 20.0);
    assert_eq!(data.pedido.status, OrderStatus::Pendente);
    assert_eq!(data.pedido.usuario_id, buyer.user_id);
    assert_eq!(data.itens.len(), 1);
    assert_eq!(data.itens[0].subtotal, 20.0);
    assert_eq!(data.pedido.endereco_entrega["cidade"], "Recife");

    let mine = order_service::my_orders(&state, &buyer, OrderListQuery::default()).await?;
    let mine = mine.data.expect("orders");
    assert_eq!(mine.items.len(), 1);
    assert_eq!(mine.items[0].itens.len(), 1);
    Ok(())
}

#[tokio::test]
async fn address_may_be_a_json_string_but_needs_city() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let supplier_id = create_supplier(&state, "Loja", "22222222000122", RecordStatus::Ativo).await?;
    let product_id = create_product(&state, "Chá", Some(supplier_id)).await?;
    let buyer = create_user(&state, "cliente@example.com", Role::Comum, None).await?;

    let mut payload = order_request(supplier_id, product_id);
    payload.endereco_entrega =
        json!(r#"{"logradouro":"Av. Boa Viagem","cidade":"Recife","cep":"51000-000"}"#);
    let resp = order_service::create_order(&state, &buyer, payload).await?;
    assert_eq!(resp.code, 201);

    let mut payload = order_request(supplier_id, product_id);
    payload.endereco_entrega = json!({ "rua": "Rua B", "cep": "51000-000" });
    match order_service::create_order(&state, &buyer, payload).await {
        Err(AppError::Invalid(errors)) => assert!(errors.contains_key("endereco_entrega")),
        other => panic!("expected invalid address, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn missing_product_leaves_no_order_behind() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let supplier_id = create_supplier(&state, "Loja", "33333333000133", RecordStatus::Ativo).await?;
    let product_id = create_product(&state, "Açúcar", Some(supplier_id)).await?;
    let buyer = create_user(&state, "buyer@example.com", Role::Comum, None).await?;

    let mut payload = order_request(supplier_id, product_id);
    payload.itens.push(OrderItemRequest {
        produto_id: 9999,
        quantidade: 1,
        preco_unitario: 5.0,
    });

    let result = order_service::create_order(&state, &buyer, payload).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn cancelling_follows_the_workflow() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let supplier_id = create_supplier(&state, "Loja", "44444444000144", RecordStatus::Ativo).await?;
    let product_id = create_product(&state, "Leite", Some(supplier_id)).await?;
    let buyer = create_user(&state, "b@example.com", Role::Comum, None).await?;
    let seller = create_user(&state, "s@example.com", Role::Fornecedor, Some(supplier_id)).await?;

    let first = order_service::create_order(&state, &buyer, order_request(supplier_id, product_id))
        .await?
        .data
        .expect("order")
        .pedido;
    let cancelled = order_service::cancel_order(&state, &buyer, first.id).await?;
    assert_eq!(cancelled.data.expect("order").status, OrderStatus::Cancelado);

    let reopen = order_service::update_status(
        &state,
        &seller,
        first.id,
        UpdateOrderStatusRequest {
            status: "confirmado".into(),
        },
    )
    .await;
    assert!(matches!(reopen, Err(AppError::BadRequest(_))));

    let second = order_service::create_order(&state, &buyer, order_request(supplier_id, product_id))
        .await?
        .data
        .expect("order")
        .pedido;
    let confirmed = order_service::update_status(
        &state,
        &seller,
        second.id,
        UpdateOrderStatusRequest {
            status: "confirmado".into(),
        },
    )
    .await?;
    assert_eq!(confirmed.data.expect("order").status, OrderStatus::Confirmado);

    let late_cancel = order_service::cancel_order(&state, &buyer, second.id).await;
    assert!(matches!(late_cancel, Err(AppError::BadRequest(_))));

    let stranger = create_user(&state, "x@example.com", Role::Comum, None).await?;
    let not_buyer = order_service::cancel_order(&state, &stranger, second.id).await;
    assert!(matches!(not_buyer, Err(AppError::Forbidden(_))));
    Ok(())
}

#[tokio::test]
async fn status_update_rejects_empty_and_unknown_values() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let supplier_id = create_supplier(&state, "Loja", "55555555000155", RecordStatus::Ativo).await?;
    let other_id = create_supplier(&state, "Outra", "66666666000166", RecordStatus::Ativo).await?;
    let product_id = create_product(&state, "Pão", Some(supplier_id)).await?;
    let buyer = create_user(&state, "c@example.com", Role::Comum, None).await?;
    let seller = create_user(&state, "v@example.com", Role::Fornecedor, Some(supplier_id)).await?;
    let rival = create_user(&state, "r@example.com", Role::Fornecedor, Some(other_id)).await?;

    let order = order_service::create_order(&state, &buyer, order_request(supplier_id, product_id))
        .await?
        .data
        .expect("order")
        .pedido;

    for status in ["", "voando"] {
        let result = order_service::update_status(
            &state,
            &seller,
            order.id,
            UpdateOrderStatusRequest {
                status: status.into(),
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Invalid(_))), "status {status:?}");
    }

    let foreign = order_service::update_status(
        &state,
        &rival,
        order.id,
        UpdateOrderStatusRequest {
            status: "enviado".into(),
        },
    )
    .await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));

    let by_buyer = order_service::update_status(
        &state,
        &buyer,
        order.id,
        UpdateOrderStatusRequest {
            status: "enviado".into(),
        },
    )
    .await;
    assert!(matches!(by_buyer, Err(AppError::Forbidden(_))));
    Ok(())
}

#[tokio::test]
async fn statistics_are_zero_filled_per_supplier() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let supplier_id = create_supplier(&state, "Loja", "77777777000177", RecordStatus::Ativo).await?;
    let other_id = create_supplier(&state, "Outra", "88888888000188", RecordStatus::Ativo).await?;
    let product_id = create_product(&state, "Sal", Some(supplier_id)).await?;
    let buyer = create_user(&state, "d@example.com", Role::Comum, None).await?;
    let seller = create_user(&state, "e@example.com", Role::Fornecedor, Some(supplier_id)).await?;

    order_service::create_order(&state, &buyer, order_request(supplier_id, product_id)).await?;
    order_service::create_order(&state, &buyer, order_request(supplier_id, product_id)).await?;
    order_service::create_order(&state, &buyer, order_request(other_id, product_id)).await?;

    let stats = order_service::statistics(&state, &seller, OrderStatisticsQuery::default())
        .await?
        .data
        .expect("statistics");
    assert_eq!(stats.total_pedidos, 2);
    assert_eq!(stats.valor_total, 40.0);
    assert_eq!(stats.por_status.len(), OrderStatus::ALL.len());
    assert_eq!(stats.por_status["pendente"], 2);
    assert_eq!(stats.por_status["entregue"], 0);

    let received = order_service::received_orders(&state, &seller, OrderListQuery::default())
        .await?
        .data
        .expect("orders");
    assert_eq!(received.items.len(), 2);

    let denied = order_service::statistics(&state, &buyer, OrderStatisticsQuery::default()).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    Ok(())
}

#[tokio::test]
async fn orders_are_visible_only_to_their_parties() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let supplier_id = create_supplier(&state, "Loja", "99999999000199", RecordStatus::Ativo).await?;
    let product_id = create_product(&state, "Óleo", Some(supplier_id)).await?;
    let buyer = create_user(&state, "f@example.com", Role::Comum, None).await?;
    let stranger = create_user(&state, "g@example.com", Role::Comum, None).await?;
    let exec = create_user(&state, "h@example.com", Role::Executivo, None).await?;

    let order = order_service::create_order(&state, &buyer, order_request(supplier_id, product_id))
        .await?
        .data
        .expect("order")
        .pedido;

    assert!(order_service::get_order(&state, &buyer, order.id).await.is_ok());
    assert!(order_service::get_order(&state, &exec, order.id).await.is_ok());
    assert!(matches!(
        order_service::get_order(&state, &stranger, order.id).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(
        order_service::get_order(&state, &buyer, order.id + 100).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        order_service::reject_delete(),
        Err(AppError::BadRequest(_))
    ));
    Ok(())
}
