use serde_json::json;
use std::fs::{read_to_string, write};
use tempfile::tempdir;
use tunnel_link_core::manifest::{self, APP_URL_KEY};
use tunnel_link_core::update::UpdateError;

#[test]
fn missing_file_loads_as_empty_object() {
    let dir = tempdir().unwrap();
    let m = manifest::load(&dir.path().join("manifest.json")).expect("empty manifest");
    assert!(m.is_empty());
}

#[test]
fn set_app_url_keeps_other_keys_and_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("manifest.json");
    write(
        &path,
        r#"{"name": "Vendas", "short_name": "Vendas ç", "icons": [{"src": "a.png"}], "app_url": "https://old.trycloudflare.com"}"#,
    )
    .unwrap();

    let original = manifest::load(&path).unwrap();
    let mut updated = original.clone();
    manifest::set_app_url(&mut updated, "https://new.trycloudflare.com");

    for (key, value) in &original {
        if key != APP_URL_KEY {
            assert_eq!(updated.get(key), Some(value), "key {key} changed");
        }
    }
    assert_eq!(updated[APP_URL_KEY], json!("https://new.trycloudflare.com"));

    manifest::save(&path, &updated).unwrap();
    assert_eq!(manifest::load(&path).unwrap(), updated);
}

#[test]
fn save_writes_two_space_indent_and_keeps_non_ascii() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("manifest.json");
    let mut m = manifest::Manifest::new();
    m.insert("name".into(), json!("Sistema de Vendas ção"));
    manifest::set_app_url(&mut m, "https://x.trycloudflare.com");

    let written = manifest::save(&path, &m).unwrap();
    let text = read_to_string(&path).unwrap();
    assert_eq!(text.as_bytes(), written.as_slice());
    assert_eq!(
        text,
        "{\n  \"name\": \"Sistema de Vendas ção\",\n  \"app_url\": \"https://x.trycloudflare.com\"\n}"
    );
}

#[test]
fn invalid_json_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("manifest.json");
    write(&path, "{ not json").unwrap();
    assert!(matches!(
        manifest::load(&path),
        Err(UpdateError::InvalidLocalManifestJson(_))
    ));
}

#[test]
fn non_object_json_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("manifest.json");
    write(&path, "[1, 2, 3]").unwrap();
    let err = manifest::load(&path).unwrap_err();
    assert!(err.to_string().contains("an array"), "got: {err}");
}

#[test]
fn large_numbers_pass_through_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("manifest.json");
    write(
        &path,
        r#"{"v": 123456789012345678901234567890, "ratio": 0.1000000000000000055511151231257827}"#,
    )
    .unwrap();

    let mut m = manifest::load(&path).unwrap();
    manifest::set_app_url(&mut m, "https://n.trycloudflare.com");
    manifest::save(&path, &m).unwrap();

    let text = read_to_string(&path).unwrap();
    assert!(text.contains("\"v\": 123456789012345678901234567890"), "got: {text}");
    assert!(text.contains("\"ratio\": 0.1000000000000000055511151231257827"), "got: {text}");
}

#[test]
fn pretty_bytes_match_what_save_writes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("manifest.json");
    assert_eq!(manifest::to_pretty_bytes(&manifest::Manifest::new()).unwrap(), b"{}");

    let mut m = manifest::Manifest::new();
    manifest::set_app_url(&mut m, "https://b.trycloudflare.com");
    let expected = manifest::to_pretty_bytes(&m).expect("serialises");
    assert_eq!(manifest::save(&path, &m).unwrap(), expected);
    assert_eq!(std::fs::read(&path).unwrap(), expected);
}
