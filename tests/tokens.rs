use chrono::{Duration, Utc};
use marketplace_api::{
    entity::enums::Role,
    error::AppError,
    middleware::auth::{Claims, decode_token},
    services::auth_service::{encode_claims, hash_password, verify_password},
};

const SECRET: &str = "token-secret";

fn claims(expires_in: Duration) -> Claims {
    let now = Utc::now();
    Claims {
        sub: "7".into(),
        id: 7,
        email: "loja@example.com".into(),
        nivel: Role::Fornecedor,
        fornecedor_id: Some(3),
        iat: now.timestamp() as usize,
        exp: (now + expires_in).timestamp() as usize,
    }
}

#[test]
fn valid_token_round_trips_the_claims() {
    let token = encode_claims(SECRET, &claims(Duration::hours(1))).expect("encode");
    let decoded = decode_token(SECRET, &token).expect("decode");
    assert_eq!(decoded.id, 7);
    assert_eq!(decoded.nivel, Role::Fornecedor);
    assert_eq!(decoded.fornecedor_id, Some(3));
}

#[test]
fn expired_token_is_rejected() {
    let token = encode_claims(SECRET, &claims(Duration::hours(-1))).expect("encode");
    assert!(matches!(
        decode_token(SECRET, &token),
        Err(AppError::Unauthorized(_))
    ));
}

#[test]
fn tampered_token_is_rejected() {
    let token = encode_claims(SECRET, &claims(Duration::hours(1))).expect("encode");
    assert!(decode_token("another-secret", &token).is_err());

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let signature = parts[2].clone();
    let flipped = if signature.starts_with('A') { "B" } else { "A" };
    parts[2] = format!("{flipped}{}", &signature[1..]);
    assert!(decode_token(SECRET, &parts.join(".")).is_err());
}

#[test]
fn passwords_are_hashed_with_argon2() {
    let hash = hash_password("segredo123").expect("hash");
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("segredo123", &hash));
    assert!(!verify_password("errada", &hash));
}
