use super::*;

fn sample_user() -> User {
    User {
        id: "u-1".into(),
        name: "Ada".into(),
        username: "ada".into(),
        email: "ada@example.com".into(),
        profile_picture: None,
    }
}

fn sample_session() -> Session {
    Session {
        user: sample_user(),
        access_token: "access-1".into(),
        refresh_token: "refresh-1".into(),
    }
}

// =============================================================================
// User
// =============================================================================

#[test]
fn user_deserializes_camel_case() {
    let user: User = serde_json::from_str(
        r#"{"id":"u-9","name":"Grace","username":"grace","email":"g@example.com","profilePicture":"pic.png"}"#,
    )
    .unwrap();
    assert_eq!(user.id, "u-9");
    assert_eq!(user.profile_picture.as_deref(), Some("pic.png"));
}

#[test]
fn user_accepts_mongo_style_id_alias() {
    let user: User = serde_json::from_str(
        r#"{"_id":"64ab","name":"Grace","username":"grace","email":"g@example.com"}"#,
    )
    .unwrap();
    assert_eq!(user.id, "64ab");
}

#[test]
fn user_missing_profile_picture_defaults_to_none() {
    let user: User = serde_json::from_str(
        r#"{"id":"u-9","name":"Grace","username":"grace","email":"g@example.com"}"#,
    )
    .unwrap();
    assert!(user.profile_picture.is_none());
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn session_serde_round_trip() {
    let session = sample_session();
    let json = serde_json::to_string(&session).unwrap();
    let restored: Session = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, session);
}

#[test]
fn session_serializes_camel_case_keys() {
    let json = serde_json::to_string(&sample_session()).unwrap();
    assert!(json.contains("\"accessToken\""));
    assert!(json.contains("\"refreshToken\""));
}

#[test]
fn session_rejects_missing_refresh_token() {
    let result: Result<Session, _> = serde_json::from_str(
        r#"{"user":{"id":"u","name":"n","username":"u","email":"e"},"accessToken":"a"}"#,
    );
    assert!(result.is_err());
}

#[test]
fn with_access_token_preserves_user_and_refresh_token() {
    let updated = sample_session().with_access_token("access-2".into());
    assert_eq!(updated.access_token, "access-2");
    assert_eq!(updated.user, sample_user());
    assert_eq!(updated.refresh_token, "refresh-1");
}
