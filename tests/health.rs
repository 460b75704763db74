mod common;

use axum::extract::State;
use marketplace_api::routes::health::health_check;

use common::setup_state;

#[tokio::test]
async fn health_check_returns_ok() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let response = health_check(State(state)).await;
    assert_eq!(response.message, "Health check");

    let data = response.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "ok");
    Ok(())
}
