mod common;

use marketplace_api::{
    dto::{categories::CategoryRequest, products::UpdateProductRequest},
    entity::enums::Role,
    error::AppError,
    services::{category_service, product_service},
};

use common::{create_product, create_user, setup_state};

#[tokio::test]
async fn categories_in_use_cannot_be_deleted() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let request = |name: &str| CategoryRequest {
        nome: name.into(),
        descricao: Some("Alimentos".into()),
        status: None,
    };

    let used = category_service::create_category(&state, &exec, request("Mercearia"))
        .await?
        .data
        .expect("category");
    let spare = category_service::create_category(&state, &exec, request("Sobras"))
        .await?
        .data
        .expect("category");

    let product_id = create_product(&state, "Macarrão", None).await?;
    product_service::update_product(
        &state,
        &exec,
        product_id,
        UpdateProductRequest {
            nome: None,
            descricao: None,
            codigo_interno: None,
            categoria_id: Some(used.id),
            preco_base: None,
            status: None,
        },
    )
    .await?;

    match category_service::delete_category(&state, &exec, used.id).await {
        Err(AppError::Conflict(message)) => assert!(message.contains("1 produto(s)"), "{message}"),
        other => panic!("expected conflict, got {other:?}"),
    }

    category_service::delete_category(&state, &exec, spare.id).await?;
    assert!(matches!(
        category_service::get_category(&state, spare.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        category_service::delete_category(&state, &exec, spare.id).await,
        Err(AppError::NotFound(_))
    ));

    let duplicate = category_service::create_category(&state, &exec, request("Mercearia")).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    Ok(())
}
