// ==========================================
// 配置读取集成测试
// ==========================================
// 测试目标: config_kv 覆写 → ImportSettings
// ==========================================


use statement_registry::config::{config_keys, ConfigManager, ImportConfigReader, ImportSettings};
use test_helpers::{create_test_db, insert_test_config};

#[tokio::test]
async fn test_defaults_when_nothing_configured() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let manager = ConfigManager::new(&db_path).unwrap();

    let settings = manager.import_settings().await.unwrap();

    assert_eq!(settings, ImportSettings::default());
}

#[tokio::test]
async fn test_overrides_read_from_config_kv() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::CSV_DELIMITER, "|").unwrap();
    insert_test_config(&db_path, config_keys::REGISTRATION_BRANCH, "HYE").unwrap();
    insert_test_config(&db_path, config_keys::REPORT_LOCALE, "zh-CN").unwrap();

    let manager = ConfigManager::new(&db_path).unwrap();
    let settings = manager.import_settings().await.unwrap();

    assert_eq!(settings.csv_delimiter, b'|');
    assert_eq!(settings.registration_branch, "HYE");
    assert_eq!(settings.registration_issued_by, "default-issuer");
    assert_eq!(settings.report_locale, "zh-CN");
}

#[tokio::test]
async fn test_invalid_delimiter_falls_back_to_comma() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::CSV_DELIMITER, ";;").unwrap();

    let manager = ConfigManager::new(&db_path).unwrap();

    assert_eq!(manager.get_csv_delimiter().await.unwrap(), b',');
}

#[tokio::test]
async fn test_empty_value_treated_as_unset() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    insert_test_config(&db_path, config_keys::REGISTRATION_ISSUED_BY, "").unwrap();

    let manager = ConfigManager::new(&db_path).unwrap();

    assert_eq!(
        manager.get_registration_issued_by().await.unwrap(),
        "default-issuer"
    );
}
