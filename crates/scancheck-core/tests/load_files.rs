//! 文件加载与配置文件测试
use scancheck_core::{load_catalog_file, load_policy, AdvancePolicy, ConfigError, LoadError};
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn loads_list_from_disk() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("picklist.csv");
    std::fs::write(&path, "Order,ESN,Model,Capacity,Color,Location\n100,356938035643809,iPhone 12,64GB,White,A-01\n101,,iPhone 12,64GB,White,A-02\n").unwrap();

    let (catalog, summary) = load_catalog_file(&path).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get(0).unwrap().identifier, "356938035643809");
    assert_eq!(summary.missing_identifier_rows, 1);
}

#[test]
fn load_error_survives_context() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("bad.csv");
    std::fs::write(&path, "Order,Serial\n1,X\n").unwrap();

    let err = load_catalog_file(&path).unwrap_err();
    assert_eq!(
        err.downcast_ref::<LoadError>(),
        Some(&LoadError::MissingRequiredColumns { missing: vec!["esn"] })
    );
}

#[test]
fn missing_list_file_is_an_error() {
    let dir = tempdir().expect("create temp dir");
    assert!(load_catalog_file(&dir.path().join("absent.csv")).is_err());
}

#[test]
fn loads_policy_from_disk() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("scancheck.toml");
    std::fs::write(&path, "[policy]\nadvance = \"pass-skipped\"\nundo_grace_secs = 30\n").unwrap();

    let policy = load_policy(&path).unwrap();
    assert_eq!(policy.advance, AdvancePolicy::PassSkipped);
    assert_eq!(policy.undo_grace, Some(Duration::from_secs(30)));

    assert!(matches!(load_policy(&dir.path().join("absent.toml")), Err(ConfigError::Io(_))));
}
