use super::*;

#[test]
fn missing_directory_reads_as_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let area = FileArea::new(tmp.path().join("not-created-yet"));
    assert_eq!(area.get("token").unwrap(), None);
}

#[test]
fn set_creates_directory_and_persists_value() {
    let tmp = tempfile::tempdir().unwrap();
    let area = FileArea::new(tmp.path().join("session"));
    area.set("token", "abc123").unwrap();

    assert_eq!(area.get("token").unwrap().as_deref(), Some("abc123"));
    let reopened = FileArea::new(tmp.path().join("session"));
    assert_eq!(reopened.get("token").unwrap().as_deref(), Some("abc123"));
}

#[test]
fn get_ignores_trailing_newline_from_hand_edited_files() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("token"), "abc123\n").unwrap();
    let area = FileArea::new(tmp.path());
    assert_eq!(area.get("token").unwrap().as_deref(), Some("abc123"));
}

#[test]
fn remove_missing_key_is_ok() {
    let tmp = tempfile::tempdir().unwrap();
    let area = FileArea::new(tmp.path());
    area.remove("token").unwrap();
    area.set("token", "t").unwrap();
    area.remove("token").unwrap();
    assert_eq!(area.get("token").unwrap(), None);
}

#[test]
fn keys_with_path_separators_are_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let area = FileArea::new(tmp.path());
    for key in ["", "..", "../escape", "a/b", "a\\b"] {
        assert!(matches!(area.set(key, "x"), Err(StorageError::Backend(_))), "{key:?}");
    }
}

#[cfg(unix)]
#[test]
fn written_token_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::tempdir().unwrap();
    let area = FileArea::new(tmp.path());
    area.set("token", "secret").unwrap();
    let mode = std::fs::metadata(tmp.path().join("token")).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
