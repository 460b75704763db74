mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use marketplace_api::routes::{create_app, params::Pagination};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::{create_product, setup_state};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn unknown_routes_and_methods_use_the_envelope() -> anyhow::Result<()> {
    let app = create_app(setup_state().await?);

    let (status, body) = send(&app, get("/api/nao-existe")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 404);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/health")
        .body(Body::empty())?;
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], 405);
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_token() -> anyhow::Result<()> {
    let app = create_app(setup_state().await?);

    let (status, body) = send(&app, get("/api/pedidos/meus")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Token de autenticação não fornecido");

    let request = Request::builder()
        .uri("/api/usuarios/perfil")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())?;
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn non_numeric_ids_are_bad_requests() -> anyhow::Result<()> {
    let app = create_app(setup_state().await?);

    let (status, body) = send(&app, get("/api/produtos/abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "ID inválido");
    Ok(())
}

#[tokio::test]
async fn register_login_and_read_profile() -> anyhow::Result<()> {
    let app = create_app(setup_state().await?);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/usuarios",
            json!({ "nome": "Maria", "email": "maria@example.com", "senha": "segredo1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["nivel"], "comum");

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/usuarios",
            json!({ "nome": "Chefe", "email": "chefe@example.com", "senha": "segredo1", "nivel": "executivo" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["nivel"].is_string());

    let (status, _) = send(
        &app,
        json_request(
            Method::POST,
            "/api/usuarios/login",
            json!({ "email": "maria@example.com", "senha": "errada" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/usuarios/login",
            json!({ "email": "maria@example.com", "senha": "segredo1" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().expect("token").to_string();

    let request = Request::builder()
        .uri("/api/usuarios/perfil")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["usuario"]["email"], "maria@example.com");

    let (status, body) = send(&app, get(&format!("/api/pedidos/meus?token={token}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([]));
    Ok(())
}

#[tokio::test]
async fn order_validation_errors_are_field_keyed() -> anyhow::Result<()> {
    let app = create_app(setup_state().await?);

    send(
        &app,
        json_request(
            Method::POST,
            "/api/usuarios",
            json!({ "nome": "Joao", "email": "joao@example.com", "senha": "segredo1" }),
        ),
    )
    .await;
    let (_, body) = send(
        &app,
        json_request(
            Method::POST,
            "/api/usuarios/login",
            json!({ "email": "joao@example.com", "senha": "segredo1" }),
        ),
    )
    .await;
    let token = body["data"]["token"].as_str().expect("token").to_string();

    let mut request = json_request(
        Method::POST,
        "/api/pedidos",
        json!({
            "fornecedor_id": 1,
            "endereco_entrega": { "rua": "Rua X", "cidade": "Natal", "cep": "59000-000" },
            "itens": [{ "produto_id": 1, "quantidade": 0, "preco_unitario": 10.0 }]
        }),
    );
    request
        .headers_mut()
        .insert(header::AUTHORIZATION, format!("Bearer {token}").parse()?);
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["itens[0].quantidade"].is_string(), "{body}");
    Ok(())
}

#[tokio::test]
async fn huge_page_numbers_return_an_empty_page() -> anyhow::Result<()> {
    let state = setup_state().await?;
    create_product(&state, "Arroz", None).await?;
    let app = create_app(state);

    let (status, body) =
        send(&app, get("/api/produtos?page=9223372036854775807&per_page=100")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["meta"]["page"], json!(i64::MAX));
    assert_eq!(body["meta"]["total"], 1);
    Ok(())
}

#[tokio::test]
async fn malformed_query_strings_use_the_envelope() -> anyhow::Result<()> {
    let app = create_app(setup_state().await?);

    let (status, body) = send(&app, get("/api/produtos?page=abc")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 400);
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("Parâmetros inválidos"), "{message}");

    let (status, body) = send(&app, get("/api/precos-avaliacoes/ranking?tipo=sabor")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    Ok(())
}

#[test]
fn pagination_offset_saturates() {
    assert_eq!(Pagination::new(None, None).normalize(), (1, 20, 0));
    assert_eq!(Pagination::new(Some(3), Some(500)).normalize(), (3, 100, 200));
    assert_eq!(Pagination::new(Some(-4), Some(0)).normalize(), (1, 1, 0));
    assert_eq!(
        Pagination::new(Some(i64::MAX), Some(50)).normalize(),
        (i64::MAX, 50, i64::MAX)
    );
}
