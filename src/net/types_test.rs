use super::*;

#[test]
fn user_deserializes_server_shape() {
    let user: User =
        serde_json::from_str(r#"{"id":1,"username":"a","email":"a@a.com","is_active":true}"#).unwrap();
    assert_eq!(user, User { id: 1, username: "a".to_owned(), email: "a@a.com".to_owned(), is_active: true });
}

#[test]
fn token_response_defaults_token_type() {
    let token: TokenResponse = serde_json::from_str(r#"{"access_token":"abc"}"#).unwrap();
    assert_eq!(token.access_token, "abc");
    assert_eq!(token.token_type, "bearer");
}

#[test]
fn profile_update_omits_unset_fields() {
    let update = ProfileUpdate { email: Some("new@cats.test".to_owned()), ..ProfileUpdate::default() };
    assert_eq!(serde_json::to_string(&update).unwrap(), r#"{"email":"new@cats.test"}"#);
}

#[test]
fn registration_serializes_all_fields() {
    let reg = Registration::new("tom", "tom@cats.test", "whiskers1");
    let value = serde_json::to_value(&reg).unwrap();
    assert_eq!(value, serde_json::json!({"username":"tom","email":"tom@cats.test","password":"whiskers1"}));
}

#[test]
fn debug_output_redacts_secrets() {
    let creds = format!("{:?}", Credentials::new("tom", "hunter22"));
    let reg = format!("{:?}", Registration::new("tom", "tom@cats.test", "hunter22"));
    let change = format!("{:?}", PasswordChange::new("hunter22", "hunter23"));
    let token: TokenResponse = serde_json::from_str(r#"{"access_token":"sekrit","token_type":"bearer"}"#).unwrap();
    let token = format!("{token:?}");

    for rendered in [creds, reg, change, token] {
        assert!(!rendered.contains("hunter2"), "{rendered}");
        assert!(!rendered.contains("sekrit"), "{rendered}");
    }
}
