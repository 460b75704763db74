mod common;

use chrono::NaiveDate;
use marketplace_api::{
    dto::{
        categories::CategoryRequest, links::CreateLinkRequest, pricing::PriceRequest,
        products::ProductRequest,
    },
    entity::enums::{RecordStatus, Role},
    error::AppError,
    middleware::auth::AuthUser,
    services::{category_service, link_service, pricing_service, product_service, report_service},
    state::AppState,
};

use common::{create_product, create_supplier, create_user, setup_state};

async fn category(state: &AppState, exec: &AuthUser, name: &str) -> anyhow::Result<i32> {
    let resp = category_service::create_category(
        state,
        exec,
        CategoryRequest {
            nome: name.into(),
            descricao: None,
            status: None,
        },
    )
    .await?;
    Ok(resp.data.expect("category").id)
}

async fn categorized_product(
    state: &AppState,
    exec: &AuthUser,
    name: &str,
    category_id: i32,
    base_price: f64,
) -> anyhow::Result<i32> {
    let resp = product_service::create_product(
        state,
        exec,
        ProductRequest {
            nome: name.into(),
            descricao: None,
            codigo_interno: None,
            categoria_id: Some(category_id),
            preco_base: Some(base_price),
            fornecedor_id: None,
            status: None,
        },
    )
    .await?;
    Ok(resp.data.expect("product").id)
}

async fn link(
    state: &AppState,
    exec: &AuthUser,
    product_id: i32,
    supplier_id: i32,
) -> anyhow::Result<()> {
    link_service::create_link(
        state,
        exec,
        CreateLinkRequest {
            produto_id: product_id,
            fornecedor_id: supplier_id,
            preco_fornecedor: None,
        },
    )
    .await?;
    Ok(())
}

async fn offer(
    state: &AppState,
    exec: &AuthUser,
    product_id: i32,
    supplier_id: i32,
    unit: f64,
) -> anyhow::Result<()> {
    pricing_service::create_price(
        state,
        exec,
        PriceRequest {
            produto_id: product_id,
            fornecedor_id: supplier_id,
            preco_unitario: unit,
            quantidade_minima: None,
            prazo_entrega_dias: None,
            data_vigencia_inicio: NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"),
            data_vigencia_fim: None,
        },
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn reports_are_for_executives() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let buyer = create_user(&state, "comum@example.com", Role::Comum, None).await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;

    assert!(matches!(report_service::index(&buyer), Err(AppError::Forbidden(_))));
    assert!(matches!(
        report_service::financial_report(&state, &buyer).await,
        Err(AppError::Forbidden(_))
    ));

    let index = report_service::index(&exec)?.data.expect("index");
    for name in ["dashboard", "fornecedores", "produtos", "categorias", "vinculos", "financeiro"] {
        assert!(index.relatorios_disponiveis.contains_key(name), "{name}");
    }
    Ok(())
}

#[tokio::test]
async fn dashboard_lists_empty_categories_and_unlinked_suppliers() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;

    let drinks = category(&state, &exec, "Bebidas").await?;
    let empty = category(&state, &exec, "Vazia").await?;
    let juice = categorized_product(&state, &exec, "Suco", drinks, 6.0).await?;
    categorized_product(&state, &exec, "Água", drinks, 2.0).await?;
    create_product(&state, "Avulso", None).await?;

    let linked = create_supplier(&state, "Zeta", "30000000000101", RecordStatus::Ativo).await?;
    let unlinked = create_supplier(&state, "Alfa", "30000000000202", RecordStatus::Inativo).await?;
    link(&state, &exec, juice, linked).await?;

    let dashboard = report_service::dashboard(&state, &exec)
        .await?
        .data
        .expect("dashboard");
    assert_eq!(dashboard.resumo.total_produtos, 3);
    assert_eq!(dashboard.resumo.total_categorias, 2);
    assert_eq!(dashboard.resumo.total_fornecedores, 2);

    let per_category: Vec<(Option<i32>, &str, i64)> = dashboard
        .produtos_por_categoria
        .iter()
        .map(|c| (c.categoria_id, c.categoria.as_str(), c.total))
        .collect();
    assert_eq!(
        per_category,
        vec![
            (Some(drinks), "Bebidas", 2),
            (None, "Sem categoria", 1),
            (Some(empty), "Vazia", 0),
        ]
    );

    let top: Vec<(i32, i64)> = dashboard
        .top_fornecedores
        .iter()
        .map(|s| (s.fornecedor_id, s.total_produtos))
        .collect();
    assert_eq!(top, vec![(linked, 1), (unlinked, 0)]);

    let statuses: Vec<(&str, i64)> = dashboard
        .fornecedores_status
        .iter()
        .map(|s| (s.status.as_str(), s.total))
        .collect();
    assert!(statuses.contains(&("Ativo", 1)));
    assert!(statuses.contains(&("Inativo", 1)));
    Ok(())
}

#[tokio::test]
async fn financial_report_finds_savings_between_the_two_best_offers() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let cheap = create_supplier(&state, "Barata", "31000000000101", RecordStatus::Ativo).await?;
    let pricey = create_supplier(&state, "Cara", "31000000000202", RecordStatus::Ativo).await?;

    let rice = create_product(&state, "Arroz", None).await?;
    let beans = create_product(&state, "Feijão", None).await?;
    let salt = create_product(&state, "Sal", None).await?;
    link(&state, &exec, rice, cheap).await?;
    link(&state, &exec, rice, pricey).await?;
    link(&state, &exec, beans, cheap).await?;

    offer(&state, &exec, rice, cheap, 10.0).await?;
    offer(&state, &exec, rice, pricey, 12.0).await?;
    offer(&state, &exec, beans, cheap, 5.0).await?;
    offer(&state, &exec, salt, cheap, 7.0).await?;
    offer(&state, &exec, salt, pricey, 7.0).await?;

    let report = report_service::financial_report(&state, &exec)
        .await?
        .data
        .expect("report");

    let multi: Vec<i32> = report
        .produtos_com_multiplos_fornecedores
        .iter()
        .map(|p| p.produto_id)
        .collect();
    assert_eq!(multi, vec![rice]);
    assert_eq!(report.produtos_com_multiplos_fornecedores[0].fornecedores, 2);

    assert_eq!(report.total_oportunidades, 1);
    let saving = &report.oportunidades_economia[0];
    assert_eq!(saving.produto_id, rice);
    assert_eq!(saving.produto_nome, "Arroz");
    assert_eq!(saving.melhor_preco, 10.0);
    assert_eq!(saving.segundo_preco, 12.0);
    assert_eq!(saving.economia, 2.0);
    assert_eq!(saving.percentual_economia, 16.67);

    assert_eq!(report.resumo.total_produtos, 3);
    assert_eq!(report.resumo.total_vinculos, 3);
    assert_eq!(report.resumo.produtos_multiplos_fornecedores, 1);
    assert_eq!(report.resumo.produtos_analisados, 3);
    assert_eq!(report.resumo.fornecedores_unicos, 2);
    assert_eq!(report.resumo.economia_potencial, 2.0);
    Ok(())
}

#[tokio::test]
async fn category_and_product_reports_carry_statistics() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let supplier = create_supplier(&state, "Loja", "32000000000101", RecordStatus::Ativo).await?;
    let other = create_supplier(&state, "Outra", "32000000000202", RecordStatus::Ativo).await?;

    let grains = category(&state, &exec, "Grãos").await?;
    let empty = category(&state, &exec, "Vazia").await?;
    let rice = categorized_product(&state, &exec, "Arroz", grains, 10.0).await?;
    categorized_product(&state, &exec, "Milho", grains, 20.0).await?;
    categorized_product(&state, &exec, "Brinde", grains, 0.0).await?;
    let loose = create_product(&state, "Avulso", None).await?;

    link(&state, &exec, rice, supplier).await?;
    offer(&state, &exec, rice, supplier, 9.0).await?;
    offer(&state, &exec, rice, other, 11.0).await?;

    let categories = report_service::categories_report(&state, &exec)
        .await?
        .data
        .expect("categories")
        .items;
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].categoria.id, grains);
    assert_eq!(categories[0].total_produtos, 3);
    let stats = categories[0].estatisticas_preco.clone().expect("stats");
    assert_eq!(stats.amostras, 2);
    assert_eq!(stats.preco_minimo, 10.0);
    assert_eq!(stats.preco_maximo, 20.0);
    assert_eq!(stats.preco_medio, 15.0);
    assert_eq!(categories[1].categoria.id, empty);
    assert_eq!(categories[1].total_produtos, 0);
    assert!(categories[1].estatisticas_preco.is_none());

    let products = report_service::products_report(&state, &exec)
        .await?
        .data
        .expect("products")
        .items;
    let rice_entry = products
        .iter()
        .find(|p| p.produto.id == rice)
        .expect("rice entry");
    assert_eq!(rice_entry.categoria_nome, "Grãos");
    assert_eq!(rice_entry.total_fornecedores, 1);
    assert!(rice_entry.possui_fornecedores);
    let prices = rice_entry.analise_precos.clone().expect("prices");
    assert_eq!(
        (prices.preco_minimo, prices.preco_maximo, prices.preco_medio),
        (9.0, 11.0, 10.0)
    );

    let loose_entry = products
        .iter()
        .find(|p| p.produto.id == loose)
        .expect("loose entry");
    assert_eq!(loose_entry.categoria_nome, "Sem categoria");
    assert!(!loose_entry.possui_fornecedores);
    assert!(loose_entry.analise_precos.is_none());

    let links = report_service::links_report(&state, &exec)
        .await?
        .data
        .expect("links");
    assert_eq!(links.items.len(), 1);
    Ok(())
}
