mod common;

use chrono::{Datelike, NaiveDate, Utc};
use marketplace_api::{
    dto::pricing::{PriceRequest, Recommendation, ReviewRequest, ScoreKind},
    entity::enums::{RecordStatus, Role},
    error::AppError,
    routes::params::{BestPriceQuery, PriceHistoryQuery, RankingQuery, TrendQuery},
    services::pricing_service,
    state::AppState,
};

use common::{create_product, create_supplier, create_user, setup_state};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn price(product_id: i32, supplier_id: i32, unit: f64) -> PriceRequest {
    PriceRequest {
        produto_id: product_id,
        fornecedor_id: supplier_id,
        preco_unitario: unit,
        quantidade_minima: None,
        prazo_entrega_dias: Some(5),
        data_vigencia_inicio: date(2024, 1, 1),
        data_vigencia_fim: None,
    }
}

fn review(supplier_id: i32, product_id: Option<i32>, scores: [Option<i32>; 4]) -> ReviewRequest {
    ReviewRequest {
        fornecedor_id: supplier_id,
        produto_id: product_id,
        nota_qualidade: scores[0],
        nota_preco: scores[1],
        nota_prazo: scores[2],
        nota_atendimento: scores[3],
        comentarios: None,
        data_avaliacao: None,
    }
}

async fn supplier(state: &AppState, name: &str, cnpj: &str) -> anyhow::Result<i32> {
    create_supplier(state, name, cnpj, RecordStatus::Ativo).await
}

#[tokio::test]
async fn comparison_shares_ranks_and_recommends() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let buyer = create_user(&state, "comprador@example.com", Role::Comum, None).await?;
    let product_id = create_product(&state, "Café", None).await?;

    let first = supplier(&state, "Alfa", "20000000000101").await?;
    let second = supplier(&state, "Beta", "20000000000202").await?;
    let rated = supplier(&state, "Gama", "20000000000303").await?;
    let plain = supplier(&state, "Delta", "20000000000404").await?;
    for (supplier_id, unit) in [(first, 10.0), (second, 10.0), (rated, 15.0), (plain, 20.0)] {
        pricing_service::create_price(&state, &exec, price(product_id, supplier_id, unit)).await?;
    }
    pricing_service::create_review(
        &state,
        &buyer,
        review(rated, Some(product_id), [Some(5), Some(4), None, None]),
    )
    .await?;

    let resp = pricing_service::comparison(&state, product_id).await?;
    let data = resp.data.expect("comparison");
    assert_eq!(data.produto_nome, "Café");

    let ranks: Vec<u32> = data.ofertas.iter().map(|o| o.ranking_preco).collect();
    assert_eq!(ranks, vec![1, 1, 3, 4]);
    let recommendations: Vec<Recommendation> =
        data.ofertas.iter().map(|o| o.recomendacao).collect();
    assert_eq!(
        recommendations,
        vec![
            Recommendation::MelhorPreco,
            Recommendation::MelhorPreco,
            Recommendation::BoaAvaliacao,
            Recommendation::Padrao,
        ]
    );
    assert_eq!(data.ofertas[0].oferta.fornecedor_id, first);
    assert_eq!(data.ofertas[2].oferta.media_avaliacao, Some(4.5));

    assert!(matches!(
        pricing_service::comparison(&state, 4040).await,
        Err(AppError::NotFound(_))
    ));
    Ok(())
}

#[tokio::test]
async fn best_price_honors_quantity_and_validity() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let exec = create_user(&state, "exec@example.com", Role::Executivo, None).await?;
    let product_id = create_product(&state, "Açúcar", None).await?;
    let unpriced = create_product(&state, "Sal", None).await?;

    let wholesale = supplier(&state, "Atacado", "21000000000101").await?;
    let retail = supplier(&state, "Varejo", "21000000000202").await?;
    let expired = supplier(&state, "Antiga", "21000000000303").await?;
    let closed =
        create_supplier(&state, "Fechada", "21000000000404", RecordStatus::Inativo).await?;

    let mut bulk = price(product_id, wholesale, 8.0);
    bulk.quantidade_minima = Some(10);
    pricing_service::create_price(&state, &exec, bulk).await?;
    pricing_service::create_price(&state, &exec, price(product_id, retail, 9.0)).await?;
    let mut old = price(product_id, expired, 1.0);
    old.data_vigencia_inicio = date(2020, 1, 1);
    old.data_vigencia_fim = Some(date(2020, 12, 31));
    pricing_service::create_price(&state, &exec, old).await?;
    pricing_service::create_price(&state, &exec, price(product_id, closed, 2.0)).await?;

    let single = pricing_service::best_price(&state, product_id, BestPriceQuery::default())
        .await?
        .data
        .expect("offer");
    assert_eq!(single.fornecedor_id, retail);
    assert_eq!(single.preco_unitario, 9.0);

    let query = BestPriceQuery {
        quantidade: Some(10),
    };
    let bulk = pricing_service::best_price(&state, product_id, query)
        .await?
        .data
        .expect("offer");
    assert_eq!(bulk.fornecedor_id, wholesale);

    let zero = BestPriceQuery {
        quantidade: Some(0),
    };
    match pricing_service::best_price(&state, product_id, zero).await {
        Err(AppError::Invalid(errors)) => assert!(errors.contains_key("quantidade")),
        other => panic!("expected invalid quantity, got {other:?}"),
    }

    match pricing_service::best_price(&state, unpriced, BestPriceQuery::default()).await {
        Err(AppError::NotFound(message)) => {
            assert_eq!(message, "Nenhum preço encontrado para este produto")
        }
        other => panic!("expected not found, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn overlapping_price_windows_conflict() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let store = supplier(&state, "Minha Loja", "22000000000101").await?;
    let other = supplier(&state, "Concorrente", "22000000000202").await?;
    let seller = create_user(&state, "loja@example.com", Role::Fornecedor, Some(store)).await?;
    let product_id = create_product(&state, "Farinha", Some(store)).await?;

    let mut first = price(product_id, store, 5.0);
    first.data_vigencia_fim = Some(date(2024, 6, 30));
    let created = pricing_service::create_price(&state, &seller, first).await?;
    assert_eq!(created.code, 201);
    assert_eq!(created.data.expect("price").quantidade_minima, 1);

    let mut open_ended = price(product_id, store, 5.5);
    open_ended.data_vigencia_inicio = date(2024, 6, 1);
    assert!(matches!(
        pricing_service::create_price(&state, &seller, open_ended).await,
        Err(AppError::Conflict(_))
    ));

    let mut next = price(product_id, store, 5.5);
    next.data_vigencia_inicio = date(2024, 7, 1);
    next.data_vigencia_fim = Some(date(2024, 12, 31));
    pricing_service::create_price(&state, &seller, next).await?;

    let mut backwards = price(product_id, store, 6.0);
    backwards.data_vigencia_inicio = date(2025, 3, 1);
    backwards.data_vigencia_fim = Some(date(2025, 2, 1));
    match pricing_service::create_price(&state, &seller, backwards).await {
        Err(AppError::Invalid(errors)) => assert!(errors.contains_key("data_vigencia_fim")),
        other => panic!("expected invalid window, got {other:?}"),
    }

    let foreign = pricing_service::create_price(&state, &seller, price(product_id, other, 4.0)).await;
    assert!(matches!(foreign, Err(AppError::Forbidden(_))));

    let free = pricing_service::create_price(&state, &seller, price(product_id, store, 0.0)).await;
    assert!(matches!(free, Err(AppError::Validation(_))));

    let history = pricing_service::price_history(
        &state,
        product_id,
        PriceHistoryQuery {
            fornecedor_id: Some(store),
        },
    )
    .await?
    .data
    .expect("history");
    let starts: Vec<NaiveDate> = history
        .items
        .iter()
        .map(|entry| entry.preco.data_vigencia_inicio)
        .collect();
    assert_eq!(starts, vec![date(2024, 7, 1), date(2024, 1, 1)]);
    assert_eq!(history.items[0].fornecedor_nome, "Minha Loja");
    Ok(())
}

#[tokio::test]
async fn reviews_need_a_score_and_a_foreign_store() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let store = supplier(&state, "Loja", "23000000000101").await?;
    let seller = create_user(&state, "loja@example.com", Role::Fornecedor, Some(store)).await?;
    let buyer = create_user(&state, "comprador@example.com", Role::Comum, None).await?;

    match pricing_service::create_review(&state, &buyer, review(store, None, [None; 4])).await {
        Err(AppError::Invalid(errors)) => assert!(errors.contains_key("notas")),
        other => panic!("expected missing scores, got {other:?}"),
    }

    let out_of_range = review(store, None, [Some(6), None, None, None]);
    assert!(matches!(
        pricing_service::create_review(&state, &buyer, out_of_range).await,
        Err(AppError::Validation(_))
    ));

    let own = review(store, None, [Some(5), None, None, None]);
    assert!(matches!(
        pricing_service::create_review(&state, &seller, own).await,
        Err(AppError::Forbidden(_))
    ));

    let missing = review(4040, None, [Some(3), None, None, None]);
    assert!(matches!(
        pricing_service::create_review(&state, &buyer, missing).await,
        Err(AppError::NotFound(_))
    ));

    let created = pricing_service::create_review(
        &state,
        &buyer,
        review(store, None, [Some(5), Some(4), Some(3), None]),
    )
    .await?;
    assert_eq!(created.code, 201);
    let data = created.data.expect("review");
    assert_eq!(data.nota_geral, 4.0);
    assert_eq!(data.avaliado_por, Some(buyer.user_id));
    assert_eq!(data.data_avaliacao, Utc::now().date_naive());
    Ok(())
}

#[tokio::test]
async fn ranking_orders_by_requested_score() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let buyer = create_user(&state, "comprador@example.com", Role::Comum, None).await?;
    let steady = supplier(&state, "Constante", "24000000000101").await?;
    let fast = supplier(&state, "Rápida", "24000000000202").await?;
    supplier(&state, "Sem Avaliação", "24000000000303").await?;
    let closed =
        create_supplier(&state, "Fechada", "24000000000404", RecordStatus::Inativo).await?;

    for scores in [[Some(4), None, Some(2), None], [Some(4), None, Some(2), None]] {
        pricing_service::create_review(&state, &buyer, review(steady, None, scores)).await?;
    }
    pricing_service::create_review(
        &state,
        &buyer,
        review(fast, None, [Some(2), None, Some(5), None]),
    )
    .await?;
    pricing_service::create_review(
        &state,
        &buyer,
        review(closed, None, [Some(5), Some(5), Some(5), Some(5)]),
    )
    .await?;

    let overall = pricing_service::ranking(&state, RankingQuery::default())
        .await?
        .data
        .expect("ranking");
    assert_eq!(overall.tipo, ScoreKind::Geral);
    let ids: Vec<i32> = overall.items.iter().map(|s| s.fornecedor_id).collect();
    assert_eq!(ids, vec![fast, steady]);
    assert_eq!(overall.items[1].total_avaliacoes, 2);

    let query = RankingQuery {
        limite: Some(1),
        tipo: Some(ScoreKind::Qualidade),
    };
    let quality = pricing_service::ranking(&state, query)
        .await?
        .data
        .expect("ranking");
    assert_eq!(quality.items.len(), 1);
    assert_eq!(quality.items[0].fornecedor_id, steady);
    assert_eq!(quality.items[0].media_nota, Some(4.0));
    Ok(())
}

#[tokio::test]
async fn review_trend_groups_by_month() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let buyer = create_user(&state, "comprador@example.com", Role::Comum, None).await?;
    let store = supplier(&state, "Loja", "25000000000101").await?;

    let today = Utc::now().date_naive();
    let mut recent = review(store, None, [Some(4), None, None, None]);
    recent.data_avaliacao = Some(today);
    pricing_service::create_review(&state, &buyer, recent).await?;
    let mut ancient = review(store, None, [Some(1), None, None, None]);
    ancient.data_avaliacao = Some(date(2000, 1, 1));
    pricing_service::create_review(&state, &buyer, ancient).await?;

    let trend = pricing_service::review_trend(&state, store, TrendQuery::default())
        .await?
        .data
        .expect("trend");
    assert_eq!(trend.meses, 6);
    assert_eq!(trend.items.len(), 1);
    assert_eq!(
        trend.items[0].mes,
        format!("{:04}-{:02}", today.year(), today.month())
    );
    assert_eq!(trend.items[0].media_qualidade, Some(4.0));

    assert!(matches!(
        pricing_service::review_trend(&state, 4040, TrendQuery::default()).await,
        Err(AppError::NotFound(_))
    ));
    Ok(())
}
