// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证配置读取、默认值与 API 写入
// ==========================================

mod helpers;

use helpers::test_data_builder::{presence, roster, ProgramBuilder};
use training_ledger::api::{ApiError, ConfigApi};
use training_ledger::app::AppState;
use training_ledger::config::{config_keys, ConfigManager, LedgerConfigReader};
use training_ledger::domain::types::MissingRollPolicy;
use training_ledger::engine::{AttendanceLedger, LedgerSettings};
use training_ledger::repository::InMemoryRosterStore;
use std::sync::Arc;
use test_helpers::{create_test_db, insert_test_config, open_test_connection};

#[tokio::test]
async fn test_defaults_when_config_absent() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).unwrap();

    assert_eq!(config_manager.get_irregular_threshold().await.unwrap(), 25.0);
    assert_eq!(
        config_manager.get_missing_roll_policy().await.unwrap(),
        MissingRollPolicy::Reject
    );
    assert_eq!(config_manager.get_max_conflict_retries().await.unwrap(), 3);
}

#[tokio::test]
async fn test_values_read_from_config_kv() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn, config_keys::IRREGULAR_THRESHOLD, "40").unwrap();
    insert_test_config(&conn, config_keys::MISSING_ROLL_POLICY, "MARK_ABSENT").unwrap();
    insert_test_config(&conn, config_keys::MAX_CONFLICT_RETRIES, "7").unwrap();

    let config_manager = ConfigManager::new(&db_path).unwrap();
    assert_eq!(config_manager.get_irregular_threshold().await.unwrap(), 40.0);

    let settings = LedgerSettings::load(&config_manager).await.unwrap();
    assert_eq!(settings.missing_roll_policy, MissingRollPolicy::MarkAbsent);
    assert_eq!(settings.max_conflict_retries, 7);
}

#[tokio::test]
async fn test_out_of_range_threshold_is_an_error() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_test_config(&conn, config_keys::IRREGULAR_THRESHOLD, "150").unwrap();

    let config_manager = ConfigManager::new(&db_path).unwrap();
    assert!(config_manager.get_irregular_threshold().await.is_err());
}

#[tokio::test]
async fn test_config_api_update_and_list() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = Arc::new(ConfigManager::new(&db_path).unwrap());
    let api = ConfigApi::new(config_manager.clone());

    api.update_config(config_keys::IRREGULAR_THRESHOLD, " 30 ").unwrap();
    assert!(matches!(
        api.update_config(config_keys::MISSING_ROLL_POLICY, "IGNORE"),
        Err(ApiError::InvalidInput(_))
    ));

    let items = api.list_configs().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].value, "30");
    assert_eq!(config_manager.get_irregular_threshold().await.unwrap(), 30.0);
    assert!(api.get_config(config_keys::MAX_CONFLICT_RETRIES).unwrap().is_none());
}

#[tokio::test]
async fn test_policy_update_applies_to_next_submission() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).await.unwrap();

    let program = state
        .training_api
        .create_training(ProgramBuilder::new("Live Config").build(), roster(&["A", "B"]))
        .await
        .unwrap();
    let partial = presence(&[("A", true)]);

    // 默认 REJECT
    assert!(matches!(
        state
            .attendance_api
            .submit_session(&program.training_id, "3/1/2024", &partial)
            .await,
        Err(ApiError::InvalidInput(_))
    ));

    state
        .config_api
        .update_config(config_keys::MISSING_ROLL_POLICY, "MARK_ABSENT")
        .unwrap();
    let after = state
        .attendance_api
        .submit_session(&program.training_id, "3/1/2024", &partial)
        .await
        .unwrap();
    let b = after.find_student("B").unwrap();
    assert!(!b.attendance_history()[0].is_present);
    assert_eq!(b.attendance_percentage(), 0.0);

    state
        .config_api
        .update_config(config_keys::MISSING_ROLL_POLICY, "REJECT")
        .unwrap();
    assert!(matches!(
        state
            .attendance_api
            .submit_session(&program.training_id, "3/2/2024", &partial)
            .await,
        Err(ApiError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_ledger_settings_follow_config_updates() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = Arc::new(ConfigManager::new(&db_path).unwrap());
    let ledger = AttendanceLedger::new(Arc::new(InMemoryRosterStore::new()), config_manager.clone());
    let api = ConfigApi::new(config_manager);

    assert_eq!(ledger.settings().await.unwrap(), LedgerSettings::default());

    api.update_config(config_keys::MAX_CONFLICT_RETRIES, "9").unwrap();
    api.update_config(config_keys::MISSING_ROLL_POLICY, "MARK_ABSENT").unwrap();
    let settings = ledger.settings().await.unwrap();
    assert_eq!(settings.max_conflict_retries, 9);
    assert_eq!(settings.missing_roll_policy, MissingRollPolicy::MarkAbsent);
}
