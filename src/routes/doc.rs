use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        categories::{CategoryList, CategoryRequest, UpdateCategoryRequest},
        links::{
            BulkCreateResult, BulkDeleteResult, CreateLinkRequest, CreateMultipleLinksRequest,
            DeleteMultipleLinksRequest, LinkList, LinkPair, LinkReport, LinkStatistics,
        },
        orders::{
            CreateOrderRequest, OrderItemRequest, OrderList, OrderStatistics, OrderWithItems,
            UpdateOrderStatusRequest,
        },
        products::{
            ProductList, ProductRequest, ProductWithSuppliers, ProductWithSuppliersList,
            UpdateProductRequest,
        },
        pricing::{
            MonthlyScores, PriceComparison, PriceHistory, PriceHistoryEntry, PriceOffer,
            PriceRequest, RankedOffer, Recommendation, ReviewRequest, ReviewTrend, ScoreKind,
            SupplierRankingList, SupplierScore,
        },
        reports::{
            CategoryCount, CategoryReportEntry, Dashboard, DashboardSummary, FinancialReport,
            FinancialSummary, MultiSupplierProduct, PriceStats, ProductReportEntry, ReportIndex,
            ReportList, ReviewSummary, SavingOpportunity, StatusCount, SupplierRanking,
            SupplierReportEntry,
        },
        suppliers::{
            MyStoreResponse, StatusRequest, SupplierList, SupplierRequest, UpdateSupplierRequest,
        },
        users::{
            LoginRequest, LoginResponse, Profile, RegisterRequest, TokenInfo, UpdateUserRequest,
            UserList,
        },
    },
    entity::enums::{OrderStatus, RecordStatus, Role},
    models::{
        Category, Link, LinkDetail, Order, OrderItem, Product, Supplier, SupplierPrice,
        SupplierReview, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        categories, health, links, orders, pricing, products, reports, suppliers, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        users::register,
        users::login,
        users::validate_token,
        users::profile,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        suppliers::list_suppliers,
        suppliers::list_active,
        suppliers::get_supplier,
        suppliers::create_supplier,
        suppliers::update_supplier,
        suppliers::delete_supplier,
        suppliers::set_status,
        suppliers::my_store,
        suppliers::create_my_store,
        products::list_products,
        products::list_active,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::set_status,
        products::available,
        products::with_suppliers,
        products::with_suppliers_by_id,
        products::without_suppliers,
        products::my_company,
        products::create_for_my_store,
        categories::list_categories,
        categories::list_active,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        categories::set_status,
        links::list_links,
        links::create_link,
        links::delete_link_by_body,
        links::delete_link,
        links::set_principal,
        links::create_multiple,
        links::delete_multiple,
        links::delete_all_for_product,
        links::history,
        links::suppliers_for_product,
        links::products_for_supplier,
        links::report,
        orders::create_order,
        orders::my_orders,
        orders::received_orders,
        orders::list_all_orders,
        orders::statistics,
        orders::get_order,
        orders::update_status,
        orders::cancel_order,
        orders::delete_order,
        reports::index,
        reports::dashboard,
        reports::suppliers_report,
        reports::products_report,
        reports::categories_report,
        reports::links_report,
        reports::financial_report,
        pricing::create_price,
        pricing::create_review,
        pricing::comparison,
        pricing::best_price,
        pricing::ranking,
        pricing::price_history,
        pricing::review_trend
    ),
    components(
        schemas(
            User,
            Supplier,
            Category,
            Product,
            Link,
            LinkDetail,
            Order,
            OrderItem,
            RecordStatus,
            Role,
            OrderStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            UpdateUserRequest,
            UserList,
            Profile,
            TokenInfo,
            SupplierRequest,
            UpdateSupplierRequest,
            StatusRequest,
            SupplierList,
            MyStoreResponse,
            CategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            ProductRequest,
            UpdateProductRequest,
            ProductList,
            ProductWithSuppliers,
            ProductWithSuppliersList,
            CreateLinkRequest,
            LinkPair,
            CreateMultipleLinksRequest,
            DeleteMultipleLinksRequest,
            BulkCreateResult,
            BulkDeleteResult,
            LinkList,
            LinkStatistics,
            LinkReport,
            CreateOrderRequest,
            OrderItemRequest,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            OrderStatistics,
            DashboardSummary,
            StatusCount,
            CategoryCount,
            SupplierRanking,
            Dashboard,
            ReportIndex,
            PriceStats,
            ReviewSummary,
            SupplierReportEntry,
            ProductReportEntry,
            CategoryReportEntry,
            FinancialSummary,
            MultiSupplierProduct,
            SavingOpportunity,
            FinancialReport,
            ReportList<SupplierReportEntry>,
            ReportList<ProductReportEntry>,
            ReportList<CategoryReportEntry>,
            SupplierPrice,
            SupplierReview,
            PriceRequest,
            ReviewRequest,
            ScoreKind,
            Recommendation,
            PriceOffer,
            RankedOffer,
            PriceComparison,
            PriceHistoryEntry,
            PriceHistory,
            SupplierScore,
            SupplierRankingList,
            MonthlyScores,
            ReviewTrend,
            Meta,
            health::HealthData,
            ApiResponse<User>,
            ApiResponse<Supplier>,
            ApiResponse<Product>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Usuarios", description = "Users and authentication"),
        (name = "Fornecedores", description = "Supplier endpoints"),
        (name = "Produtos", description = "Product endpoints"),
        (name = "Categorias", description = "Category endpoints"),
        (name = "Vinculos", description = "Product-supplier links"),
        (name = "Pedidos", description = "Order workflow"),
        (name = "Relatorios", description = "Executive reports"),
        (name = "Precos", description = "Supplier prices and reviews"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
