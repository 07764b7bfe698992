use std::cell::Cell;

use futures::executor::block_on;
use serde_json::json;

use super::*;
use crate::net::error::ErrorKind;
use crate::net::fake::FakeTransport;
use crate::net::transport::{CONTENT_TYPE_FORM, TransportError};
use crate::storage::memory::MemoryArea;

struct Harness {
    fake: FakeTransport,
    current: MemoryArea,
    api: ApiClient<FakeTransport, MemoryArea>,
}

fn harness(current: MemoryArea) -> Harness {
    let fake = FakeTransport::new();
    let config = ClientConfig::default();
    let tokens = Rc::new(TokenStore::new(current.clone(), MemoryArea::new(), &config));
    let api = ApiClient::new(fake.clone(), tokens, config);
    Harness { fake, current, api }
}

// =============================================================
// Request building
// =============================================================

#[test]
fn attaches_bearer_when_token_stored() {
    let h = harness(MemoryArea::with_entry("token", "abc"));
    h.fake.reply(200, json!({"id":1,"username":"a","email":"a@a.com","is_active":true}));

    block_on(h.api.current_user()).unwrap();

    let req = &h.fake.requests()[0];
    assert_eq!(req.url, "/api/auth/me");
    assert_eq!(req.method, Method::Get);
    assert_eq!(req.authorization().as_deref(), Some("Bearer abc"));
    assert_eq!(req.timeout_ms, 10_000);
}

#[test]
fn sends_unauthenticated_without_token() {
    let h = harness(MemoryArea::new());
    h.fake.reply(200, json!({"enabled": true}));

    let status = block_on(h.api.registration_status()).unwrap();

    assert!(status.enabled);
    assert_eq!(h.fake.requests()[0].bearer, None);
}

#[test]
fn login_posts_form_encoded_credentials() {
    let h = harness(MemoryArea::new());
    h.fake.reply(200, json!({"access_token":"tok","token_type":"bearer"}));

    let token = block_on(h.api.login_token(&Credentials::new("tom", "p@ss word"))).unwrap();

    assert_eq!(token.access_token, "tok");
    let req = &h.fake.requests()[0];
    assert_eq!(req.url, "/api/auth/login");
    assert_eq!(req.method, Method::Post);
    assert_eq!(req.body.content_type(), Some(CONTENT_TYPE_FORM));
    assert_eq!(req.body.payload(), Some("username=tom&password=p%40ss%20word"));
}

#[test]
fn register_posts_json() {
    let h = harness(MemoryArea::new());
    h.fake.reply(201, json!({"id":7,"username":"tom","email":"tom@cats.test","is_active":true}));

    let user = block_on(h.api.register(&Registration::new("tom", "tom@cats.test", "whiskers1"))).unwrap();

    assert_eq!(user.id, 7);
    let req = &h.fake.requests()[0];
    assert_eq!(req.url, "/api/auth/register");
    let sent: serde_json::Value = serde_json::from_str(req.body.payload().unwrap()).unwrap();
    assert_eq!(sent, json!({"username":"tom","email":"tom@cats.test","password":"whiskers1"}));
}

#[test]
fn change_password_ignores_response_body() {
    let h = harness(MemoryArea::with_entry("token", "abc"));
    h.fake.reply_raw(204, "");

    block_on(h.api.change_password(&PasswordChange::new("old-password", "new-password"))).unwrap();

    let req = &h.fake.requests()[0];
    assert_eq!(req.method, Method::Put);
    assert_eq!(req.url, "/api/auth/me/password");
}

// =============================================================
// Error mapping
// =============================================================

#[test]
fn transport_failure_maps_to_network_error() {
    let h = harness(MemoryArea::new());
    h.fake.fail(TransportError::failed("connection refused"));

    let err = block_on(h.api.registration_status()).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Network);
    assert_eq!(err.status, None);
}

#[test]
fn server_detail_is_preferred() {
    let h = harness(MemoryArea::new());
    h.fake.reply(409, json!({"detail": "Username already registered"}));

    let err = block_on(h.api.register(&Registration::new("tom", "tom@cats.test", "whiskers1"))).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(err.message, "Username already registered");
}

#[test]
fn malformed_success_body_is_unknown_error() {
    let h = harness(MemoryArea::new());
    h.fake.reply(200, json!({"unexpected": true}));

    let err = block_on(h.api.registration_status()).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unknown);
    assert_eq!(err.status, Some(200));
}

// =============================================================
// 401 invalidation
// =============================================================

#[test]
fn unauthorized_clears_token_and_fires_hook() {
    let h = harness(MemoryArea::with_entry("token", "expired"));
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    h.api.set_unauthorized_hook(move || counter.set(counter.get() + 1));
    h.fake.reply(401, json!({"detail": "Could not validate credentials"}));

    let err = block_on(h.api.send(Method::Get, "/cats/1", RequestBody::Empty)).unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.message, "Could not validate credentials");
    assert_eq!(fired.get(), 1);
    assert_eq!(h.current.get("token").unwrap(), None);
}

#[test]
fn unauthorized_without_bearer_does_not_fire_hook() {
    let h = harness(MemoryArea::new());
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    h.api.set_unauthorized_hook(move || flag.set(true));
    h.fake.reply(401, json!({"detail": "Incorrect username or password"}));

    let err = block_on(h.api.login_token(&Credentials::new("tom", "wrong"))).unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!fired.get());
}

#[test]
fn unauthorized_for_replaced_token_keeps_new_token() {
    let h = harness(MemoryArea::with_entry("token", "old"));
    let gate = h.fake.gate();

    let pending = h.api.send(Method::Get, "/auth/me", RequestBody::Empty);
    let release = async {
        h.api.tokens().save("new");
        let _ = gate.send(HttpResponse::new(401, "{}"));
    };
    let (result, ()) = block_on(futures::future::join(pending, release));

    assert!(result.unwrap_err().is_unauthorized());
    assert_eq!(h.current.get("token").unwrap().as_deref(), Some("new"));
}

#[test]
fn rejected_login_keeps_existing_token() {
    let h = harness(MemoryArea::with_entry("token", "live"));
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    h.api.set_unauthorized_hook(move || flag.set(true));
    h.fake.reply(401, json!({"detail": "Incorrect username or password"}));

    let err = block_on(h.api.login_token(&Credentials::new("tom", "wrong"))).unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(h.fake.requests()[0].bearer, None);
    assert!(!fired.get());
    assert_eq!(h.current.get("token").unwrap().as_deref(), Some("live"));
}

#[test]
fn register_never_sends_bearer() {
    let h = harness(MemoryArea::with_entry("token", "live"));
    h.fake.reply(201, json!({"id":7,"username":"tom","email":"tom@cats.test","is_active":true}));

    block_on(h.api.register(&Registration::new("tom", "tom@cats.test", "whiskers1"))).unwrap();

    assert_eq!(h.fake.requests()[0].authorization(), None);
}
