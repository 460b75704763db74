#![allow(dead_code)]

use chrono::Utc;
use marketplace_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        enums::{RecordStatus, Role},
        products, suppliers, users,
    },
    middleware::auth::AuthUser,
    state::AppState,
};
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: TEST_SECRET.into(),
        jwt_ttl_hours: 1,
        environment: "test".into(),
    }
}

/// Fresh in-memory database with every migration applied.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let config = test_config();
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm, config))
}

pub async fn create_user(
    state: &AppState,
    email: &str,
    role: Role,
    supplier_id: Option<i32>,
) -> anyhow::Result<AuthUser> {
    let now = Utc::now();
    let user = users::ActiveModel {
        id: NotSet,
        name: Set(format!("Usuário {email}")),
        email: Set(email.to_string()),
        password_hash: Set("not-a-real-hash".into()),
        role: Set(role),
        supplier_id: Set(supplier_id),
        status: Set(RecordStatus::Ativo),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.orm)
    .await?;

    Ok(AuthUser {
        user_id: user.id,
        email: user.email,
        role: user.role,
        supplier_id: user.supplier_id,
    })
}

pub async fn create_supplier(
    state: &AppState,
    name: &str,
    cnpj: &str,
    status: RecordStatus,
) -> anyhow::Result<i32> {
    let now = Utc::now();
    let supplier = suppliers::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        email: Set(format!("{cnpj}@fornecedor.com")),
        cnpj: Set(cnpj.to_string()),
        phone: Set(None),
        address: Set(None),
        status: Set(status),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.orm)
    .await?;
    Ok(supplier.id)
}

pub async fn create_product(
    state: &AppState,
    name: &str,
    supplier_id: Option<i32>,
) -> anyhow::Result<i32> {
    let now = Utc::now();
    let product = products::ActiveModel {
        id: NotSet,
        name: Set(name.to_string()),
        description: Set(None),
        internal_code: Set(None),
        category_id: Set(None),
        base_price: Set(Some(10.0)),
        supplier_id: Set(supplier_id),
        status: Set(RecordStatus::Ativo),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.orm)
    .await?;
    Ok(product.id)
}
