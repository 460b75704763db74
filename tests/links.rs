mod common;

use marketplace_api::{
    dto::links::{CreateLinkRequest, CreateMultipleLinksRequest, DeleteMultipleLinksRequest, LinkPair},
    entity::{
        ProductSuppliers,
        enums::{RecordStatus, Role},
        product_suppliers::Column as LinkCol,
    },
    error::AppError,
    routes::params::LinkQuery,
    services::link_service,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::{create_product, create_supplier, create_user, setup_state};

fn link_request(product_id: i32, supplier_id: i32) -> CreateLinkRequest {
    CreateLinkRequest {
        produto_id: product_id,
        fornecedor_id: supplier_id,
        preco_fornecedor: Some(9.5),
    }
}

#[tokio::test]
async fn duplicate_link_is_a_conflict() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let supplier_id = create_supplier(&state, "Loja", "10000000000101", RecordStatus::Ativo).await?;
    let product_id = create_product(&state, "Arroz", None).await?;

    let created = link_service::create_link(&state, &exec, link_request(product_id, supplier_id)).await?;
    assert_eq!(created.code, 201);
    assert!(link_service::link_exists(&state.orm, product_id, supplier_id).await?);

    let again = link_service::create_link(&state, &exec, link_request(product_id, supplier_id)).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn link_creation_checks_supplier_and_product() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let inactive = create_supplier(&state, "Parada", "10000000000202", RecordStatus::Inativo).await?;
    let active = create_supplier(&state, "Ativa", "10000000000303", RecordStatus::Ativo).await?;
    let product_id = create_product(&state, "Feijão", None).await?;

    let result = link_service::create_link(&state, &exec, link_request(product_id, inactive)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let result = link_service::create_link(&state, &exec, link_request(product_id, 4040)).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = link_service::create_link(&state, &exec, link_request(4040, active)).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    let result = link_service::create_link(&state, &exec, link_request(0, active)).await;
    assert!(matches!(result, Err(AppError::Validation(_))));

    let seller = create_user(&state, "loja@example.com", Role::Fornecedor, Some(inactive)).await?;
    let result = link_service::create_link(&state, &seller, link_request(product_id, active)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));

    let buyer = create_user(&state, "cliente@example.com", Role::Comum, None).await?;
    let result = link_service::create_link(&state, &buyer, link_request(product_id, active)).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    Ok(())
}

#[tokio::test]
async fn set_principal_keeps_a_single_principal() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let first = create_supplier(&state, "Primeira", "10000000000404", RecordStatus::Ativo).await?;
    let second = create_supplier(&state, "Segunda", "10000000000505", RecordStatus::Ativo).await?;
    let product_id = create_product(&state, "Milho", None).await?;

    link_service::create_link(&state, &exec, link_request(product_id, first)).await?;
    link_service::create_link(&state, &exec, link_request(product_id, second)).await?;

    link_service::set_principal(&state, &exec, product_id, first).await?;
    link_service::set_principal(&state, &exec, product_id, second).await?;

    let principals = ProductSuppliers::find()
        .filter(LinkCol::ProductId.eq(product_id))
        .filter(LinkCol::IsPrincipal.eq(true))
        .all(&state.orm)
        .await?;
    assert_eq!(principals.len(), 1);
    assert_eq!(principals[0].supplier_id, second);

    let missing = link_service::set_principal(&state, &exec, product_id + 1, first).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn bulk_create_counts_existing_and_skips_inactive() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let a = create_supplier(&state, "A", "10000000000606", RecordStatus::Ativo).await?;
    let b = create_supplier(&state, "B", "10000000000707", RecordStatus::Ativo).await?;
    let off = create_supplier(&state, "C", "10000000000808", RecordStatus::Inativo).await?;
    let product_id = create_product(&state, "Trigo", None).await?;

    link_service::create_link(&state, &exec, link_request(product_id, a)).await?;

    let result = link_service::create_multiple(
        &state,
        &exec,
        CreateMultipleLinksRequest {
            produto_id: product_id,
            fornecedores: vec![a, b, off, 999, b],
        },
    )
    .await?
    .data
    .expect("bulk result");
    assert_eq!(result.criados, 1);
    assert_eq!(result.existentes, 1);
    assert_eq!(result.ignorados, vec![off, 999]);

    let removed = link_service::delete_multiple(
        &state,
        &exec,
        DeleteMultipleLinksRequest {
            vinculos: vec![
                LinkPair { produto_id: product_id, fornecedor_id: a },
                LinkPair { produto_id: product_id, fornecedor_id: b },
            ],
        },
    )
    .await?
    .data
    .expect("delete result");
    assert_eq!(removed.removidos, 2);
    assert_eq!(
        ProductSuppliers::find()
            .filter(LinkCol::ProductId.eq(product_id))
            .count(&state.orm)
            .await?,
        0
    );
    Ok(())
}

#[tokio::test]
async fn deleting_an_absent_link_is_not_found() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let supplier_id = create_supplier(&state, "Loja", "10000000000909", RecordStatus::Ativo).await?;
    let product_id = create_product(&state, "Soja", None).await?;

    let pair = LinkPair {
        produto_id: product_id,
        fornecedor_id: supplier_id,
    };
    let result = link_service::delete_link(&state, &exec, pair).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));

    link_service::create_link(&state, &exec, link_request(product_id, supplier_id)).await?;
    link_service::delete_link(&state, &exec, pair).await?;
    assert!(!link_service::link_exists(&state.orm, product_id, supplier_id).await?);
    Ok(())
}

#[tokio::test]
async fn listing_filters_by_names_and_reports_orphans() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let supplier_id = create_supplier(&state, "Mercearia Boa", "10000000001010", RecordStatus::Ativo).await?;
    let lonely_supplier = create_supplier(&state, "Sozinho", "10000000001111", RecordStatus::Ativo).await?;
    let coffee = create_product(&state, "Café Torrado", None).await?;
    let tea = create_product(&state, "Chá Verde", None).await?;
    let orphan = create_product(&state, "Produto Órfão", None).await?;

    link_service::create_link(&state, &exec, link_request(coffee, supplier_id)).await?;
    link_service::create_link(&state, &exec, link_request(tea, supplier_id)).await?;

    let found = link_service::list_links(
        &state,
        LinkQuery {
            produto_nome: Some("torrado".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("links");
    assert_eq!(found.items.len(), 1);
    assert_eq!(found.items[0].produto_id, coffee);
    assert_eq!(found.items[0].fornecedor_nome, "Mercearia Boa");

    let report = link_service::report(&state, &exec).await?.data.expect("report");
    assert_eq!(report.estatisticas.total_vinculos, 2);
    assert!(report.produtos_sem_fornecedores.iter().any(|p| p.id == orphan));
    assert!(report.fornecedores_sem_produtos.iter().any(|s| s.id == lonely_supplier));
    Ok(())
}
