use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Months, NaiveDate, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use validator::Validate;

use crate::{
    audit,
    dto::pricing::{
        MonthlyScores, PriceComparison, PriceHistory, PriceHistoryEntry, PriceOffer,
        PriceRequest, RankedOffer, Recommendation, ReviewRequest, ReviewTrend, ScoreKind,
        SupplierRankingList, SupplierScore,
    },
    entity::{
        enums::{RecordStatus, Role},
        products::Entity as Products,
        supplier_prices::{
            ActiveModel as PriceActive, Column as PriceCol, Entity as SupplierPrices,
            Model as PriceModel,
        },
        supplier_reviews::{
            ActiveModel as ReviewActive, Column as ReviewCol, Entity as SupplierReviews,
            Model as ReviewModel,
        },
        suppliers::{Column as SupplierCol, Entity as Suppliers, Model as SupplierModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{SupplierPrice, SupplierReview, price_from_entity, review_from_entity},
    response::{ApiResponse, Meta},
    routes::params::{BestPriceQuery, PriceHistoryQuery, RankingQuery, TrendQuery},
    state::AppState,
};

const HISTORY_LIMIT: u64 = 20;
const DEFAULT_RANKING_LIMIT: u64 = 10;
const MAX_RANKING_LIMIT: u64 = 100;
const DEFAULT_TREND_MONTHS: u32 = 6;
const MAX_TREND_MONTHS: u32 = 60;
const GOOD_RATING: f64 = 4.0;

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounded mean, `None` for an empty input.
pub(crate) fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0u32), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| round2(sum / f64::from(count)))
}

/// Active prices whose validity window has not ended.
pub(crate) fn current_price_condition(today: NaiveDate) -> Condition {
    Condition::all()
        .add(PriceCol::Status.eq(RecordStatus::Ativo))
        .add(
            Condition::any()
                .add(PriceCol::ValidUntil.is_null())
                .add(PriceCol::ValidUntil.gte(today)),
        )
}

/// Current prices offered by active suppliers, cheapest first.
pub(crate) async fn current_prices<C: ConnectionTrait>(
    conn: &C,
    product_id: Option<i32>,
) -> AppResult<Vec<(PriceModel, SupplierModel)>> {
    let mut condition = current_price_condition(Utc::now().date_naive())
        .add(SupplierCol::Status.eq(RecordStatus::Ativo));
    if let Some(product_id) = product_id {
        condition = condition.add(PriceCol::ProductId.eq(product_id));
    }
    Ok(SupplierPrices::find()
        .find_also_related(Suppliers)
        .filter(condition)
        .order_by_asc(PriceCol::UnitPrice)
        .order_by_asc(PriceCol::Id)
        .all(conn)
        .await?
        .into_iter()
        .filter_map(|(price, supplier)| supplier.map(|s| (price, s)))
        .collect())
}

/// Half-open windows are treated as running forever.
fn windows_overlap(
    a_from: NaiveDate,
    a_until: Option<NaiveDate>,
    b_from: NaiveDate,
    b_until: Option<NaiveDate>,
) -> bool {
    b_until.is_none_or(|end| a_from <= end) && a_until.is_none_or(|end| b_from <= end)
}

fn score_of(kind: ScoreKind, review: &ReviewModel) -> Option<f64> {
    let score = match kind {
        ScoreKind::Geral => return Some(review.overall_score),
        ScoreKind::Qualidade => review.quality_score,
        ScoreKind::Preco => review.price_score,
        ScoreKind::Prazo => review.delivery_score,
        ScoreKind::Atendimento => review.service_score,
    };
    score.map(f64::from)
}

/// Mean overall score per supplier, optionally limited to reviews of one product.
async fn average_ratings<C: ConnectionTrait>(
    conn: &C,
    supplier_ids: Vec<i32>,
    product_id: Option<i32>,
) -> AppResult<HashMap<i32, f64>> {
    if supplier_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let mut finder = SupplierReviews::find().filter(ReviewCol::SupplierId.is_in(supplier_ids));
    if let Some(product_id) = product_id {
        finder = finder.filter(ReviewCol::ProductId.eq(product_id));
    }

    let mut grouped: HashMap<i32, Vec<f64>> = HashMap::new();
    for review in finder.all(conn).await? {
        grouped
            .entry(review.supplier_id)
            .or_default()
            .push(review.overall_score);
    }
    Ok(grouped
        .into_iter()
        .filter_map(|(id, scores)| mean(scores).map(|avg| (id, avg)))
        .collect())
}

async fn current_offers<C: ConnectionTrait>(
    conn: &C,
    product_id: i32,
    quantity: Option<i32>,
    ratings_for_product: bool,
) -> AppResult<Vec<PriceOffer>> {
    let prices: Vec<_> = current_prices(conn, Some(product_id))
        .await?
        .into_iter()
        .filter(|(price, _)| quantity.is_none_or(|q| price.min_quantity <= q))
        .collect();

    let supplier_ids: HashSet<i32> = prices.iter().map(|(p, _)| p.supplier_id).collect();
    let ratings = average_ratings(
        conn,
        supplier_ids.into_iter().collect(),
        ratings_for_product.then_some(product_id),
    )
    .await?;

    Ok(prices
        .into_iter()
        .map(|(price, supplier)| PriceOffer {
            preco_id: price.id,
            fornecedor_id: supplier.id,
            media_avaliacao: ratings.get(&supplier.id).copied(),
            fornecedor_nome: supplier.name,
            cnpj: supplier.cnpj,
            preco_unitario: price.unit_price,
            quantidade_minima: price.min_quantity,
            prazo_entrega_dias: price.delivery_days,
            data_vigencia_inicio: price.valid_from,
            data_vigencia_fim: price.valid_until,
        })
        .collect())
}

/// Ranks offers already sorted by price. Ties share a rank.
fn rank_offers(offers: Vec<PriceOffer>) -> Vec<RankedOffer> {
    let best = offers.first().map(|o| o.preco_unitario);
    let mut ranked: Vec<RankedOffer> = Vec::with_capacity(offers.len());
    for (index, oferta) in offers.into_iter().enumerate() {
        let ranking_preco = match ranked.last() {
            Some(prev) if prev.oferta.preco_unitario == oferta.preco_unitario => {
                prev.ranking_preco
            }
            _ => index as u32 + 1,
        };
        let recomendacao = if Some(oferta.preco_unitario) == best {
            Recommendation::MelhorPreco
        } else if oferta.media_avaliacao.is_some_and(|m| m >= GOOD_RATING) {
            Recommendation::BoaAvaliacao
        } else {
            Recommendation::Padrao
        };
        ranked.push(RankedOffer {
            oferta,
            ranking_preco,
            recomendacao,
        });
    }
    ranked
}

pub async fn create_price(
    state: &AppState,
    user: &AuthUser,
    payload: PriceRequest,
) -> AppResult<ApiResponse<SupplierPrice>> {
    user.require_role(&[Role::Fornecedor, Role::Executivo])?;
    payload.validate()?;
    if payload
        .data_vigencia_fim
        .is_some_and(|end| end <= payload.data_vigencia_inicio)
    {
        return Err(AppError::invalid_field(
            "data_vigencia_fim",
            "Data de fim deve ser posterior à data de início",
        ));
    }
    user.ensure_manages_supplier(payload.fornecedor_id)?;

    if Suppliers::find_by_id(payload.fornecedor_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Fornecedor"));
    }
    if Products::find_by_id(payload.produto_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Produto"));
    }

    let active = SupplierPrices::find()
        .filter(PriceCol::ProductId.eq(payload.produto_id))
        .filter(PriceCol::SupplierId.eq(payload.fornecedor_id))
        .filter(PriceCol::Status.eq(RecordStatus::Ativo))
        .all(&state.orm)
        .await?;
    let conflict = active.iter().any(|existing| {
        windows_overlap(
            existing.valid_from,
            existing.valid_until,
            payload.data_vigencia_inicio,
            payload.data_vigencia_fim,
        )
    });
    if conflict {
        return Err(AppError::Conflict(
            "Já existe um preço vigente para este período".into(),
        ));
    }

    let price = PriceActive {
        id: NotSet,
        product_id: Set(payload.produto_id),
        supplier_id: Set(payload.fornecedor_id),
        unit_price: Set(round2(payload.preco_unitario)),
        min_quantity: Set(payload.quantidade_minima.unwrap_or(1)),
        delivery_days: Set(payload.prazo_entrega_dias),
        valid_from: Set(payload.data_vigencia_inicio),
        valid_until: Set(payload.data_vigencia_fim),
        status: Set(RecordStatus::Ativo),
        created_at: Set(Utc::now()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "price_create",
        "supplier_prices",
        serde_json::json!({ "price_id": price.id, "supplier_id": price.supplier_id }),
    )
    .await;

    Ok(ApiResponse::created(
        "Preço cadastrado com sucesso",
        price_from_entity(price),
    ))
}

pub async fn create_review(
    state: &AppState,
    user: &AuthUser,
    payload: ReviewRequest,
) -> AppResult<ApiResponse<SupplierReview>> {
    payload.validate()?;
    let overall = mean(payload.scores().into_iter().map(f64::from)).ok_or_else(|| {
        AppError::invalid_field("notas", "Pelo menos uma nota deve ser informada")
    })?;
    if user.supplier_id == Some(payload.fornecedor_id) {
        return Err(AppError::Forbidden(
            "Fornecedor não pode avaliar a própria loja".into(),
        ));
    }

    if Suppliers::find_by_id(payload.fornecedor_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Fornecedor"));
    }
    if let Some(product_id) = payload.produto_id {
        if Products::find_by_id(product_id).one(&state.orm).await?.is_none() {
            return Err(AppError::not_found("Produto"));
        }
    }

    let review = ReviewActive {
        id: NotSet,
        supplier_id: Set(payload.fornecedor_id),
        product_id: Set(payload.produto_id),
        quality_score: Set(payload.nota_qualidade),
        price_score: Set(payload.nota_preco),
        delivery_score: Set(payload.nota_prazo),
        service_score: Set(payload.nota_atendimento),
        overall_score: Set(overall),
        comments: Set(payload
            .comentarios
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())),
        reviewed_by: Set(Some(user.user_id)),
        reviewed_on: Set(payload
            .data_avaliacao
            .unwrap_or_else(|| Utc::now().date_naive())),
        created_at: Set(Utc::now()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        Some(user.user_id),
        "review_create",
        "supplier_reviews",
        serde_json::json!({ "review_id": review.id, "supplier_id": review.supplier_id }),
    )
    .await;

    Ok(ApiResponse::created(
        "Avaliação registrada com sucesso",
        review_from_entity(review),
    ))
}

/// Current offers for a product, cheapest first, with rank and recommendation.
pub async fn comparison(
    state: &AppState,
    product_id: i32,
) -> AppResult<ApiResponse<PriceComparison>> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Produto"))?;

    let offers = current_offers(&state.orm, product_id, None, true).await?;
    let ofertas = rank_offers(offers);
    let total = ofertas.len() as i64;

    Ok(ApiResponse::success(
        "Comparativo de preços gerado",
        PriceComparison {
            produto_id: product.id,
            produto_nome: product.name,
            codigo_interno: product.internal_code,
            ofertas,
        },
        Some(Meta::total(total)),
    ))
}

pub async fn best_price(
    state: &AppState,
    product_id: i32,
    query: BestPriceQuery,
) -> AppResult<ApiResponse<PriceOffer>> {
    let quantity = query.quantidade.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::invalid_field(
            "quantidade",
            "Quantidade deve ser maior que zero",
        ));
    }
    if Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Produto"));
    }

    let best = current_offers(&state.orm, product_id, Some(quantity), false)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            AppError::NotFound("Nenhum preço encontrado para este produto".into())
        })?;

    Ok(ApiResponse::success("Melhor preço encontrado", best, None))
}

/// Active suppliers with at least one review, best average first.
pub async fn ranking(
    state: &AppState,
    query: RankingQuery,
) -> AppResult<ApiResponse<SupplierRankingList>> {
    let limit = query
        .limite
        .unwrap_or(DEFAULT_RANKING_LIMIT)
        .clamp(1, MAX_RANKING_LIMIT) as usize;
    let kind = query.tipo.unwrap_or_default();

    let suppliers: HashMap<i32, SupplierModel> = Suppliers::find()
        .filter(SupplierCol::Status.eq(RecordStatus::Ativo))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    if suppliers.is_empty() {
        return Ok(ApiResponse::success(
            "Ranking de fornecedores gerado",
            SupplierRankingList {
                tipo: kind,
                items: Vec::new(),
            },
            Some(Meta::total(0)),
        ));
    }

    let mut grouped: HashMap<i32, Vec<ReviewModel>> = HashMap::new();
    for review in SupplierReviews::find()
        .filter(ReviewCol::SupplierId.is_in(suppliers.keys().copied().collect::<Vec<_>>()))
        .all(&state.orm)
        .await?
    {
        grouped.entry(review.supplier_id).or_default().push(review);
    }

    let mut items: Vec<SupplierScore> = grouped
        .into_iter()
        .filter_map(|(supplier_id, reviews)| {
            let supplier = suppliers.get(&supplier_id)?;
            let ultima_avaliacao = reviews.iter().map(|r| r.reviewed_on).max()?;
            let produtos: HashSet<i32> = reviews.iter().filter_map(|r| r.product_id).collect();
            Some(SupplierScore {
                fornecedor_id: supplier_id,
                fornecedor_nome: supplier.name.clone(),
                cnpj: supplier.cnpj.clone(),
                total_avaliacoes: reviews.len() as i64,
                media_nota: mean(reviews.iter().filter_map(|r| score_of(kind, r))),
                media_geral: mean(reviews.iter().map(|r| r.overall_score)).unwrap_or_default(),
                ultima_avaliacao,
                produtos_avaliados: produtos.len() as i64,
            })
        })
        .collect();

    items.sort_by(|a, b| {
        b.media_nota
            .unwrap_or(f64::MIN)
            .total_cmp(&a.media_nota.unwrap_or(f64::MIN))
            .then(b.total_avaliacoes.cmp(&a.total_avaliacoes))
            .then_with(|| a.fornecedor_nome.cmp(&b.fornecedor_nome))
    });
    items.truncate(limit);
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Ranking de fornecedores gerado",
        SupplierRankingList { tipo: kind, items },
        Some(Meta::total(total)),
    ))
}

/// Latest prices of a product, newest validity first.
pub async fn price_history(
    state: &AppState,
    product_id: i32,
    query: PriceHistoryQuery,
) -> AppResult<ApiResponse<PriceHistory>> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::not_found("Produto"))?;

    let mut finder = SupplierPrices::find()
        .find_also_related(Suppliers)
        .filter(PriceCol::ProductId.eq(product_id));
    if let Some(supplier_id) = query.fornecedor_id {
        finder = finder.filter(PriceCol::SupplierId.eq(supplier_id));
    }
    let items: Vec<PriceHistoryEntry> = finder
        .order_by_desc(PriceCol::ValidFrom)
        .order_by_desc(PriceCol::Id)
        .limit(HISTORY_LIMIT)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(price, supplier)| PriceHistoryEntry {
            produto_nome: product.name.clone(),
            fornecedor_nome: supplier.map(|s| s.name).unwrap_or_default(),
            preco: price_from_entity(price),
        })
        .collect();
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Histórico de preços",
        PriceHistory { items },
        Some(Meta::total(total)),
    ))
}

/// Monthly review averages of a supplier over the last `meses` months, newest first.
pub async fn review_trend(
    state: &AppState,
    supplier_id: i32,
    query: TrendQuery,
) -> AppResult<ApiResponse<ReviewTrend>> {
    if Suppliers::find_by_id(supplier_id)
        .one(&state.orm)
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Fornecedor"));
    }

    let months = query
        .meses
        .unwrap_or(DEFAULT_TREND_MONTHS)
        .clamp(1, MAX_TREND_MONTHS);
    let since = Utc::now()
        .date_naive()
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);

    let mut by_month: BTreeMap<String, Vec<ReviewModel>> = BTreeMap::new();
    for review in SupplierReviews::find()
        .filter(ReviewCol::SupplierId.eq(supplier_id))
        .filter(ReviewCol::ReviewedOn.gte(since))
        .all(&state.orm)
        .await?
    {
        by_month
            .entry(review.reviewed_on.format("%Y-%m").to_string())
            .or_default()
            .push(review);
    }

    let items = by_month
        .into_iter()
        .rev()
        .map(|(mes, reviews)| {
            let average = |kind| mean(reviews.iter().filter_map(|r| score_of(kind, r)));
            MonthlyScores {
                total_avaliacoes: reviews.len() as i64,
                media_geral: average(ScoreKind::Geral).unwrap_or_default(),
                media_qualidade: average(ScoreKind::Qualidade),
                media_preco: average(ScoreKind::Preco),
                media_prazo: average(ScoreKind::Prazo),
                media_atendimento: average(ScoreKind::Atendimento),
                mes,
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "Análise de tendência gerada",
        ReviewTrend {
            fornecedor_id: supplier_id,
            meses: months,
            items,
        },
        None,
    ))
}
