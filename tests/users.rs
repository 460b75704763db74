mod common;

use marketplace_api::{entity::enums::Role, error::AppError, services::user_service};

use common::{create_user, setup_state};

#[tokio::test]
async fn the_last_executive_is_kept() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let boss = create_user(&state, "chefe@example.com", Role::Executivo, None).await?;
    let buyer = create_user(&state, "comum@example.com", Role::Comum, None).await?;

    match user_service::delete_user(&state, &boss, boss.user_id).await {
        Err(AppError::BadRequest(message)) => {
            assert_eq!(message, "Não é possível excluir o último usuário executivo")
        }
        other => panic!("expected bad request, got {other:?}"),
    }

    assert!(matches!(
        user_service::delete_user(&state, &buyer, boss.user_id).await,
        Err(AppError::Forbidden(_))
    ));

    let deputy = create_user(&state, "vice@example.com", Role::Executivo, None).await?;
    user_service::delete_user(&state, &deputy, boss.user_id).await?;
    assert!(matches!(
        user_service::get_user(&state, &deputy, boss.user_id).await,
        Err(AppError::NotFound(_))
    ));

    assert!(matches!(
        user_service::delete_user(&state, &deputy, deputy.user_id).await,
        Err(AppError::BadRequest(_))
    ));
    user_service::delete_user(&state, &deputy, buyer.user_id).await?;
    Ok(())
}
