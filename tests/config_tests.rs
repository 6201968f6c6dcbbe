// tests/config_tests.rs

use question_wizard_admin::config::{EDITOR_ROLES, parse_origins};

#[test]
fn wildcard_or_empty_origin_allows_any() {
    assert!(parse_origins("*").is_empty());
    assert!(parse_origins(" * ").is_empty());
    assert!(parse_origins("").is_empty());
}

#[test]
fn origin_list_is_split_and_trimmed() {
    assert_eq!(
        parse_origins("https://admin.example.com, http://localhost:5173,,"),
        vec![
            "https://admin.example.com".to_string(),
            "http://localhost:5173".to_string()
        ]
    );
}

#[test]
fn editors_are_admins_and_teachers() {
    assert!(EDITOR_ROLES.contains(&"admin"));
    assert!(EDITOR_ROLES.contains(&"ogretmen"));
    assert!(!EDITOR_ROLES.contains(&"ogrenci"));
}
