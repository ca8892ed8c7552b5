use super::*;

/// Assemble an unsigned JWT with the given payload JSON.
fn jwt_with_payload(payload: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
    format!("{header}.{body}.signature")
}

// =============================================================================
// is_expired_at
// =============================================================================

#[test]
fn future_exp_is_not_expired() {
    let token = jwt_with_payload(r#"{"exp":2000}"#);
    assert!(!is_expired_at(&token, 1000));
}

#[test]
fn past_exp_is_expired() {
    let token = jwt_with_payload(r#"{"exp":1000}"#);
    assert!(is_expired_at(&token, 2000));
}

#[test]
fn exp_exactly_now_is_expired() {
    let token = jwt_with_payload(r#"{"exp":1000}"#);
    assert!(is_expired_at(&token, 1000));
}

#[test]
fn missing_exp_claim_is_expired() {
    let token = jwt_with_payload(r#"{"sub":"u-1"}"#);
    assert!(is_expired_at(&token, 0));
}

#[test]
fn garbage_token_is_expired() {
    assert!(is_expired_at("not-a-jwt", 0));
}

#[test]
fn token_without_three_segments_is_expired() {
    assert!(is_expired_at("onlyonesegment", 0));
}

#[test]
fn non_base64_payload_is_expired() {
    assert!(is_expired_at("head.p@y!load.sig", 0));
}

#[test]
fn empty_token_is_expired() {
    assert!(is_expired_at("", 0));
}
