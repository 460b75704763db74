use chrono::Utc;
use marketplace_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    dto::suppliers::normalize_cnpj,
    entity::{
        Categories, ProductSuppliers, Products, Suppliers, Users, categories,
        enums::{RecordStatus, Role},
        product_suppliers, products, suppliers, users,
    },
    services::auth_service::hash_password,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let store_id = ensure_supplier(
        &orm,
        "Distribuidora Central",
        "contato@distribuidoracentral.com.br",
        "12.345.678/0001-95",
    )
    .await?;

    let exec_id = ensure_user(
        &orm,
        "Executivo",
        "executivo@marketplace.com",
        "exec123",
        Role::Executivo,
        None,
    )
    .await?;
    let supplier_user_id = ensure_user(
        &orm,
        "Fornecedor Central",
        "fornecedor@distribuidoracentral.com.br",
        "forn123",
        Role::Fornecedor,
        Some(store_id),
    )
    .await?;
    let buyer_id = ensure_user(
        &orm,
        "Cliente",
        "cliente@marketplace.com",
        "cliente123",
        Role::Comum,
        None,
    )
    .await?;

    let food = ensure_category(&orm, "Alimentos").await?;
    let cleaning = ensure_category(&orm, "Limpeza").await?;

    let products = [
        ("Arroz 5kg", "ARR-005", food, 27.9),
        ("Feijão 1kg", "FEI-001", food, 8.5),
        ("Detergente 500ml", "DET-500", cleaning, 2.99),
    ];
    for (name, code, category_id, price) in products {
        let product_id = ensure_product(&orm, name, code, category_id, price, store_id).await?;
        ensure_link(&orm, product_id, store_id).await?;
    }

    println!(
        "Seed completed. Executive ID: {exec_id}, supplier user ID: {supplier_user_id}, buyer ID: {buyer_id}, store ID: {store_id}"
    );
    Ok(())
}

async fn ensure_supplier(
    orm: &DatabaseConnection,
    name: &str,
    email: &str,
    cnpj: &str,
) -> anyhow::Result<i32> {
    let cnpj = normalize_cnpj(cnpj);
    if let Some(existing) = Suppliers::find()
        .filter(suppliers::Column::Cnpj.eq(cnpj.as_str()))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let now = Utc::now();
    let supplier = suppliers::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        cnpj: Set(cnpj),
        phone: Set(Some("(11) 4000-1000".to_string())),
        address: Set(Some("Rua das Flores, 100 - São Paulo/SP".to_string())),
        status: Set(RecordStatus::Ativo),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(orm)
    .await?;
    println!("Ensured supplier {name}");
    Ok(supplier.id)
}

async fn ensure_user(
    orm: &DatabaseConnection,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
    supplier_id: Option<i32>,
) -> anyhow::Result<i32> {
    if let Some(existing) = Users::find()
        .filter(users::Column::Email.eq(email))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let now = Utc::now();
    let user = users::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role),
        supplier_id: Set(supplier_id),
        status: Set(RecordStatus::Ativo),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(orm)
    .await?;
    println!("Ensured user {email} (nivel={})", role.as_str());
    Ok(user.id)
}

async fn ensure_category(orm: &DatabaseConnection, name: &str) -> anyhow::Result<i32> {
    if let Some(existing) = Categories::find()
        .filter(categories::Column::Name.eq(name))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let now = Utc::now();
    let category = categories::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        description: Set(None),
        status: Set(RecordStatus::Ativo),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(orm)
    .await?;
    Ok(category.id)
}

async fn ensure_product(
    orm: &DatabaseConnection,
    name: &str,
    code: &str,
    category_id: i32,
    price: f64,
    supplier_id: i32,
) -> anyhow::Result<i32> {
    if let Some(existing) = Products::find()
        .filter(products::Column::InternalCode.eq(code))
        .one(orm)
        .await?
    {
        return Ok(existing.id);
    }

    let now = Utc::now();
    let product = products::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        description: Set(None),
        internal_code: Set(Some(code.to_string())),
        category_id: Set(Some(category_id)),
        base_price: Set(Some(price)),
        supplier_id: Set(Some(supplier_id)),
        status: Set(RecordStatus::Ativo),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(orm)
    .await?;
    println!("Seeded product {name}");
    Ok(product.id)
}

async fn ensure_link(
    orm: &DatabaseConnection,
    product_id: i32,
    supplier_id: i32,
) -> anyhow::Result<()> {
    let exists = ProductSuppliers::find()
        .filter(product_suppliers::Column::ProductId.eq(product_id))
        .filter(product_suppliers::Column::SupplierId.eq(supplier_id))
        .one(orm)
        .await?
        .is_some();
    if exists {
        return Ok(());
    }

    product_suppliers::ActiveModel {
        id: NotSet,
        product_id: Set(product_id),
        supplier_id: Set(supplier_id),
        is_principal: Set(true),
        supplier_price: Set(None),
        status: Set(RecordStatus::Ativo),
        created_at: Set(Utc::now()),
    }
    .insert(orm)
    .await?;
    Ok(())
}
