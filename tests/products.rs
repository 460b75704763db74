mod common;

use marketplace_api::{
    dto::{
        links::CreateLinkRequest,
        products::{ProductRequest, UpdateProductRequest},
        suppliers::StatusRequest,
    },
    entity::{
        ProductSuppliers,
        enums::{RecordStatus, Role},
        product_suppliers::Column as LinkCol,
    },
    error::AppError,
    services::{link_service, product_service},
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use common::{create_product, create_supplier, create_user, setup_state};

fn product_request(name: &str, code: Option<&str>) -> ProductRequest {
    ProductRequest {
        nome: name.into(),
        descricao: None,
        codigo_interno: code.map(str::to_string),
        categoria_id: None,
        preco_base: Some(12.5),
        fornecedor_id: None,
        status: None,
    }
}

fn code_update(code: &str) -> UpdateProductRequest {
    UpdateProductRequest {
        nome: None,
        descricao: None,
        codigo_interno: Some(code.into()),
        categoria_id: None,
        preco_base: None,
        status: None,
    }
}

#[tokio::test]
async fn internal_codes_are_unique() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;

    let first = product_service::create_product(&state, &exec, product_request("Óleo", Some("COD-1")))
        .await?
        .data
        .expect("product");
    let duplicate =
        product_service::create_product(&state, &exec, product_request("Azeite", Some("COD-1")))
            .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));

    let second = product_service::create_product(&state, &exec, product_request("Azeite", Some("COD-2")))
        .await?
        .data
        .expect("product");

    // Saving a product with its own code is not a clash.
    let same = product_service::update_product(&state, &exec, first.id, code_update("COD-1")).await?;
    assert_eq!(same.data.expect("product").codigo_interno.as_deref(), Some("COD-1"));

    let taken = product_service::update_product(&state, &exec, second.id, code_update("COD-1")).await;
    assert!(matches!(taken, Err(AppError::Conflict(_))));

    assert!(product_service::internal_code_exists(&state.orm, "COD-2", None).await?);
    assert!(!product_service::internal_code_exists(&state.orm, "COD-2", Some(second.id)).await?);
    Ok(())
}

#[tokio::test]
async fn store_products_are_linked_as_principal() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let store = create_supplier(&state, "Minha Loja", "40000000000101", RecordStatus::Ativo).await?;
    let seller = create_user(&state, "loja@example.com", Role::Fornecedor, Some(store)).await?;
    let homeless = create_user(&state, "semloja@example.com", Role::Fornecedor, None).await?;
    let buyer = create_user(&state, "comum@example.com", Role::Comum, None).await?;

    let created =
        product_service::create_for_my_store(&state, &seller, product_request("Mel", Some("MEL-1")))
            .await?;
    assert_eq!(created.code, 201);
    let product = created.data.expect("product");
    assert_eq!(product.fornecedor_id, Some(store));

    let links = ProductSuppliers::find()
        .filter(LinkCol::ProductId.eq(product.id))
        .all(&state.orm)
        .await?;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].supplier_id, store);
    assert!(links[0].is_principal);
    assert_eq!(links[0].supplier_price, Some(12.5));
    assert_eq!(links[0].status, RecordStatus::Ativo);

    let without_store =
        product_service::create_for_my_store(&state, &homeless, product_request("Geleia", None)).await;
    assert!(matches!(without_store, Err(AppError::Forbidden(_))));

    let not_a_seller =
        product_service::create_for_my_store(&state, &buyer, product_request("Geleia", None)).await;
    assert!(matches!(not_a_seller, Err(AppError::Forbidden(_))));
    Ok(())
}

#[tokio::test]
async fn available_and_company_lists_are_scoped_to_the_store() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let store = create_supplier(&state, "Loja", "41000000000101", RecordStatus::Ativo).await?;
    let other = create_supplier(&state, "Outra", "41000000000202", RecordStatus::Ativo).await?;
    let seller = create_user(&state, "loja@example.com", Role::Fornecedor, Some(store)).await?;

    create_product(&state, "Própria", Some(store)).await?;
    let linked = create_product(&state, "Vinculada", Some(other)).await?;
    create_product(&state, "Livre", None).await?;
    create_product(&state, "Alheia", Some(other)).await?;
    let retired = create_product(&state, "Retirada", None).await?;
    product_service::set_status(
        &state,
        &exec,
        retired,
        StatusRequest {
            status: "Inativo".into(),
        },
    )
    .await?;
    link_service::create_link(
        &state,
        &exec,
        CreateLinkRequest {
            produto_id: linked,
            fornecedor_id: store,
            preco_fornecedor: None,
        },
    )
    .await?;

    let available = product_service::available_for_supplier(&state, &seller)
        .await?
        .data
        .expect("available");
    let names: Vec<&str> = available.items.iter().map(|p| p.nome.as_str()).collect();
    assert_eq!(names, vec!["Alheia", "Livre"]);

    let company = product_service::my_company_products(&state, &seller)
        .await?
        .data
        .expect("company");
    let names: Vec<&str> = company.items.iter().map(|p| p.nome.as_str()).collect();
    assert_eq!(names, vec!["Própria", "Vinculada"]);

    let homeless = create_user(&state, "semloja@example.com", Role::Fornecedor, None).await?;
    assert!(matches!(
        product_service::available_for_supplier(&state, &homeless).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        product_service::my_company_products(&state, &exec).await,
        Err(AppError::Forbidden(_))
    ));
    Ok(())
}
