use super::*;

// =============================================================
// Status mapping
// =============================================================

#[test]
fn from_status_maps_known_codes() {
    let cases = [
        (400, ErrorKind::BadRequest),
        (401, ErrorKind::Unauthorized),
        (403, ErrorKind::Forbidden),
        (404, ErrorKind::NotFound),
        (409, ErrorKind::Conflict),
        (422, ErrorKind::UnprocessableEntity),
        (429, ErrorKind::RateLimited),
        (500, ErrorKind::ServerError),
        (503, ErrorKind::ServerError),
        (418, ErrorKind::Unknown),
        (302, ErrorKind::Unknown),
    ];
    for (status, kind) in cases {
        assert_eq!(ErrorKind::from_status(status), kind, "status {status}");
    }
}

#[test]
fn retryable_only_for_transient_kinds() {
    assert!(ErrorKind::RateLimited.retryable());
    assert!(ErrorKind::ServerError.retryable());
    assert!(ErrorKind::Network.retryable());
    assert!(!ErrorKind::Unauthorized.retryable());
    assert!(!ErrorKind::Validation.retryable());
    assert!(!ErrorKind::Superseded.retryable());
}

#[test]
fn codes_are_unique() {
    let kinds = [
        ErrorKind::Validation,
        ErrorKind::BadRequest,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::UnprocessableEntity,
        ErrorKind::RateLimited,
        ErrorKind::ServerError,
        ErrorKind::Network,
        ErrorKind::Unknown,
        ErrorKind::Superseded,
    ];
    let codes: std::collections::HashSet<_> = kinds.iter().map(|k| k.code()).collect();
    assert_eq!(codes.len(), kinds.len());
}

// =============================================================
// Message extraction
// =============================================================

#[test]
fn detail_string_wins() {
    let err = ApiError::from_response(401, r#"{"detail":"Incorrect username or password"}"#);
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.status, Some(401));
    assert_eq!(err.to_string(), "Incorrect username or password");
}

#[test]
fn detail_list_of_validation_items_is_joined() {
    let body = r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address"},{"msg":"field required"}]}"#;
    let err = ApiError::from_response(422, body);
    assert_eq!(err.kind, ErrorKind::UnprocessableEntity);
    assert_eq!(err.message, "value is not a valid email address, field required");
}

#[test]
fn errors_list_used_when_detail_missing() {
    let err = ApiError::from_response(400, r#"{"errors":["name too long","weight must be positive"]}"#);
    assert_eq!(err.message, "name too long, weight must be positive");
}

#[test]
fn default_message_when_body_unstructured() {
    assert_eq!(ApiError::from_response(409, "").message, "A conflict occurred. The resource may already exist.");
    assert_eq!(ApiError::from_response(502, "<html>bad gateway</html>").message, "Server error. Please try again later.");
    assert_eq!(ApiError::from_response(403, r#"{"detail":""}"#).message, "You do not have permission to perform this action.");
    assert_eq!(ApiError::from_response(429, r#"{"detail":[]}"#).message, "Too many requests. Please try again later.");
}

#[test]
fn server_message_ignores_non_object_json() {
    assert_eq!(server_message("[1,2,3]"), None);
    assert_eq!(server_message(r#""plain""#), None);
}

// =============================================================
// Local constructors
// =============================================================

#[test]
fn network_error_distinguishes_timeout() {
    let timeout = ApiError::network(&TransportError::timed_out(10));
    let refused = ApiError::network(&TransportError::failed("connection refused"));
    assert_eq!(timeout.kind, ErrorKind::Network);
    assert_eq!(refused.kind, ErrorKind::Network);
    assert_ne!(timeout.message, refused.message);
    assert_eq!(timeout.status, None);
}

#[test]
fn decode_error_keeps_status() {
    let serde_err = serde_json::from_str::<u8>("nope").unwrap_err();
    let err = ApiError::decode(200, &serde_err);
    assert_eq!(err.kind, ErrorKind::Unknown);
    assert_eq!(err.status, Some(200));
}
