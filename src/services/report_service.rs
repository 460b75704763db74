use std::collections::{BTreeMap, HashMap, HashSet};

use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

use crate::{
    dto::{
        links::LinkList,
        reports::{
            CategoryCount, CategoryReportEntry, Dashboard, DashboardSummary, FinancialReport,
            FinancialSummary, MultiSupplierProduct, PriceStats, ProductReportEntry, ReportIndex,
            ReportList, ReviewSummary, SavingOpportunity, StatusCount, SupplierRanking,
            SupplierReportEntry,
        },
    },
    entity::{
        Categories, Orders, Products, SupplierReviews,
        categories::Column as CategoryCol,
        enums::{RecordStatus, Role},
        product_suppliers::{Column as LinkCol, Entity as ProductSuppliers},
        products::Column as ProdCol,
        supplier_reviews::Model as ReviewModel,
        suppliers::{Column as SupplierCol, Entity as Suppliers},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{category_from_entity, product_from_entity, supplier_from_entity},
    response::{ApiResponse, Meta},
    services::{
        link_service,
        pricing_service::{current_prices, mean, round2},
    },
    state::AppState,
};

const TOP_SUPPLIERS: usize = 5;
const TOP_SAVINGS: usize = 10;
const UNCATEGORIZED: &str = "Sem categoria";

#[derive(Debug, FromQueryResult)]
struct StatusRow {
    status: RecordStatus,
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct CategoryRow {
    category_id: Option<i32>,
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct GroupCount {
    group_id: i32,
    total: i64,
}

/// Number of links per value of `column` (product or supplier id).
async fn link_counts<C: ConnectionTrait>(
    conn: &C,
    column: LinkCol,
) -> AppResult<HashMap<i32, i64>> {
    Ok(ProductSuppliers::find()
        .select_only()
        .column_as(column, "group_id")
        .column_as(Expr::col((ProductSuppliers, LinkCol::Id)).count(), "total")
        .group_by(column)
        .into_model::<GroupCount>()
        .all(conn)
        .await?
        .into_iter()
        .map(|row| (row.group_id, row.total))
        .collect())
}

/// Product count per category id; `None` holds the uncategorized products.
async fn products_per_category<C: ConnectionTrait>(
    conn: &C,
) -> AppResult<HashMap<Option<i32>, i64>> {
    Ok(Products::find()
        .select_only()
        .column(ProdCol::CategoryId)
        .column_as(Expr::col((Products, ProdCol::Id)).count(), "total")
        .group_by(ProdCol::CategoryId)
        .into_model::<CategoryRow>()
        .all(conn)
        .await?
        .into_iter()
        .map(|row| (row.category_id, row.total))
        .collect())
}

pub(crate) fn price_stats(prices: &[f64]) -> Option<PriceStats> {
    let preco_medio = mean(prices.iter().copied())?;
    Some(PriceStats {
        preco_minimo: prices.iter().copied().fold(f64::INFINITY, f64::min),
        preco_maximo: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        preco_medio,
        amostras: prices.len() as u64,
    })
}

fn review_summary(reviews: &[ReviewModel]) -> Option<ReviewSummary> {
    let media_geral = mean(reviews.iter().map(|r| r.overall_score))?;
    let average = |pick: fn(&ReviewModel) -> Option<i32>| {
        mean(reviews.iter().filter_map(pick).map(f64::from))
    };
    Some(ReviewSummary {
        total: reviews.len() as u64,
        media_qualidade: average(|r| r.quality_score),
        media_preco: average(|r| r.price_score),
        media_prazo: average(|r| r.delivery_score),
        media_atendimento: average(|r| r.service_score),
        media_geral,
    })
}

pub fn index(user: &AuthUser) -> AppResult<ApiResponse<ReportIndex>> {
    user.require_role(&[Role::Executivo])?;
    let relatorios_disponiveis = [
        ("dashboard", "Visão geral do sistema com os principais indicadores"),
        ("fornecedores", "Fornecedores com total de produtos e avaliações"),
        ("produtos", "Produtos com categoria, fornecedores e análise de preços"),
        ("categorias", "Categorias com total de produtos e estatísticas de preço"),
        ("vinculos", "Vínculos produto-fornecedor com nomes e status"),
        ("financeiro", "Produtos com múltiplos fornecedores e oportunidades de economia"),
    ]
    .into_iter()
    .map(|(name, description)| (name.to_string(), description.to_string()))
    .collect();

    Ok(ApiResponse::success(
        "Relatórios disponíveis",
        ReportIndex {
            relatorios_disponiveis,
            uso: "GET /api/relatorios/{tipo}".into(),
            exemplo: "/api/relatorios/dashboard".into(),
        },
        None,
    ))
}

pub async fn dashboard(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Dashboard>> {
    user.require_role(&[Role::Executivo])?;
    let conn = &state.orm;

    let resumo = DashboardSummary {
        total_fornecedores: Suppliers::find().count(conn).await?,
        total_produtos: Products::find().count(conn).await?,
        total_categorias: Categories::find().count(conn).await?,
        total_pedidos: Orders::find().count(conn).await?,
    };

    let fornecedores_status = Suppliers::find()
        .select_only()
        .column(SupplierCol::Status)
        .column_as(Expr::col((Suppliers, SupplierCol::Id)).count(), "total")
        .group_by(SupplierCol::Status)
        .order_by_asc(SupplierCol::Status)
        .into_model::<StatusRow>()
        .all(conn)
        .await?
        .into_iter()
        .map(|row| StatusCount {
            status: row.status.as_str().to_string(),
            total: row.total,
        })
        .collect();

    // Every category is listed, empty ones included.
    let mut per_category = products_per_category(conn).await?;
    let mut produtos_por_categoria: Vec<CategoryCount> = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(|category| CategoryCount {
            total: per_category.remove(&Some(category.id)).unwrap_or(0),
            categoria_id: Some(category.id),
            categoria: category.name,
        })
        .collect();
    if let Some(total) = per_category.remove(&None).filter(|total| *total > 0) {
        produtos_por_categoria.push(CategoryCount {
            categoria_id: None,
            categoria: UNCATEGORIZED.to_string(),
            total,
        });
    }
    produtos_por_categoria.sort_by(|a, b| b.total.cmp(&a.total));

    // Suppliers without links still compete for the top positions.
    let per_supplier = link_counts(conn, LinkCol::SupplierId).await?;
    let mut top_fornecedores: Vec<SupplierRanking> = Suppliers::find()
        .order_by_asc(SupplierCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(|supplier| SupplierRanking {
            total_produtos: per_supplier.get(&supplier.id).copied().unwrap_or(0),
            fornecedor_id: supplier.id,
            fornecedor: supplier.name,
        })
        .collect();
    top_fornecedores.sort_by(|a, b| b.total_produtos.cmp(&a.total_produtos));
    top_fornecedores.truncate(TOP_SUPPLIERS);

    Ok(ApiResponse::success(
        "Dashboard",
        Dashboard {
            resumo,
            fornecedores_status,
            produtos_por_categoria,
            top_fornecedores,
        },
        None,
    ))
}

pub async fn suppliers_report(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ReportList<SupplierReportEntry>>> {
    user.require_role(&[Role::Executivo])?;
    let conn = &state.orm;

    let per_supplier = link_counts(conn, LinkCol::SupplierId).await?;
    let mut reviews: HashMap<i32, Vec<ReviewModel>> = HashMap::new();
    for review in SupplierReviews::find().all(conn).await? {
        reviews.entry(review.supplier_id).or_default().push(review);
    }

    let items: Vec<SupplierReportEntry> = Suppliers::find()
        .order_by_asc(SupplierCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(|supplier| SupplierReportEntry {
            total_produtos: per_supplier.get(&supplier.id).copied().unwrap_or(0),
            avaliacoes: reviews
                .get(&supplier.id)
                .and_then(|list| review_summary(list)),
            fornecedor: supplier_from_entity(supplier),
        })
        .collect();
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Relatório de fornecedores",
        ReportList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn products_report(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ReportList<ProductReportEntry>>> {
    user.require_role(&[Role::Executivo])?;
    let conn = &state.orm;

    let categories: HashMap<i32, String> = Categories::find()
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let per_product = link_counts(conn, LinkCol::ProductId).await?;
    let mut offered: HashMap<i32, Vec<f64>> = HashMap::new();
    for (price, _) in current_prices(conn, None).await? {
        offered
            .entry(price.product_id)
            .or_default()
            .push(price.unit_price);
    }

    let items: Vec<ProductReportEntry> = Products::find()
        .order_by_asc(ProdCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(|product| {
            let categoria_nome = match product.category_id {
                Some(id) => categories
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| "Categoria não encontrada".to_string()),
                None => UNCATEGORIZED.to_string(),
            };
            let total_fornecedores = per_product.get(&product.id).copied().unwrap_or(0);
            ProductReportEntry {
                categoria_nome,
                total_fornecedores,
                possui_fornecedores: total_fornecedores > 0,
                analise_precos: offered.get(&product.id).and_then(|p| price_stats(p)),
                produto: product_from_entity(product),
            }
        })
        .collect();
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Relatório de produtos",
        ReportList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn categories_report(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<ReportList<CategoryReportEntry>>> {
    user.require_role(&[Role::Executivo])?;
    let conn = &state.orm;

    let mut counts: HashMap<i32, i64> = HashMap::new();
    let mut base_prices: HashMap<i32, Vec<f64>> = HashMap::new();
    for product in Products::find()
        .filter(ProdCol::CategoryId.is_not_null())
        .all(conn)
        .await?
    {
        let Some(category_id) = product.category_id else {
            continue;
        };
        *counts.entry(category_id).or_default() += 1;
        if let Some(price) = product.base_price.filter(|p| *p > 0.0) {
            base_prices.entry(category_id).or_default().push(price);
        }
    }

    let mut items: Vec<CategoryReportEntry> = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(|category| CategoryReportEntry {
            total_produtos: counts.get(&category.id).copied().unwrap_or(0),
            estatisticas_preco: base_prices.get(&category.id).and_then(|p| price_stats(p)),
            categoria: category_from_entity(category),
        })
        .collect();
    items.sort_by(|a, b| b.total_produtos.cmp(&a.total_produtos));
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Relatório de categorias",
        ReportList { items },
        Some(Meta::total(total)),
    ))
}

pub async fn links_report(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<LinkList>> {
    user.require_role(&[Role::Executivo])?;
    let links = ProductSuppliers::find()
        .order_by_desc(LinkCol::CreatedAt)
        .order_by_desc(LinkCol::Id)
        .all(&state.orm)
        .await?;
    let items = link_service::link_details(&state.orm, links).await?;
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Relatório de vínculos",
        LinkList { items },
        Some(Meta::total(total)),
    ))
}

/// Products sold by several suppliers, and the saving of the cheapest current
/// offer over the runner-up for each product.
pub async fn financial_report(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<FinancialReport>> {
    user.require_role(&[Role::Executivo])?;
    let conn = &state.orm;

    let products = Products::find()
        .order_by_asc(ProdCol::Name)
        .all(conn)
        .await?;
    let per_product = link_counts(conn, LinkCol::ProductId).await?;

    let produtos_com_multiplos_fornecedores: Vec<MultiSupplierProduct> = products
        .iter()
        .filter_map(|product| {
            let fornecedores = per_product.get(&product.id).copied().unwrap_or(0);
            (fornecedores >= 2).then(|| MultiSupplierProduct {
                produto_id: product.id,
                produto: product.name.clone(),
                fornecedores,
                preco_base: product.base_price.unwrap_or(0.0),
            })
        })
        .collect();

    // Cheapest current price of each supplier, per product. Prices arrive sorted,
    // so the first one seen for a supplier is its best.
    let mut best_by_product: BTreeMap<i32, Vec<(i32, f64)>> = BTreeMap::new();
    for (price, supplier) in current_prices(conn, None).await? {
        let offers = best_by_product.entry(price.product_id).or_default();
        if !offers.iter().any(|(id, _)| *id == supplier.id) {
            offers.push((supplier.id, price.unit_price));
        }
    }

    let names: HashMap<i32, &str> = products.iter().map(|p| (p.id, p.name.as_str())).collect();
    let mut fornecedores_unicos: HashSet<i32> = HashSet::new();
    let mut oportunidades: Vec<SavingOpportunity> = Vec::new();
    for (product_id, offers) in &best_by_product {
        let [(_, melhor_preco), (_, segundo_preco), ..] = offers.as_slice() else {
            continue;
        };
        fornecedores_unicos.extend(offers.iter().map(|(id, _)| *id));
        let economia = segundo_preco - melhor_preco;
        if economia <= 0.0 {
            continue;
        }
        oportunidades.push(SavingOpportunity {
            produto_id: *product_id,
            produto_nome: names.get(product_id).copied().unwrap_or_default().to_string(),
            melhor_preco: *melhor_preco,
            segundo_preco: *segundo_preco,
            economia: round2(economia),
            percentual_economia: round2(economia / segundo_preco * 100.0),
        });
    }
    oportunidades.sort_by(|a, b| b.economia.total_cmp(&a.economia));
    let total_oportunidades = oportunidades.len() as u64;
    let economia_potencial = round2(oportunidades.iter().map(|o| o.economia).sum());
    oportunidades.truncate(TOP_SAVINGS);

    let resumo = FinancialSummary {
        total_produtos: products.len() as u64,
        total_fornecedores: Suppliers::find().count(conn).await?,
        total_vinculos: ProductSuppliers::find().count(conn).await?,
        produtos_multiplos_fornecedores: produtos_com_multiplos_fornecedores.len() as u64,
        produtos_analisados: best_by_product.len() as u64,
        fornecedores_unicos: fornecedores_unicos.len() as u64,
        economia_potencial,
    };

    Ok(ApiResponse::success(
        "Relatório financeiro",
        FinancialReport {
            resumo,
            produtos_com_multiplos_fornecedores,
            oportunidades_economia: oportunidades,
            total_oportunidades,
        },
        None,
    ))
}
