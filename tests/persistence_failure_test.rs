// ==========================================
// 持久化失败与规则切换集成测试
// ==========================================
// 测试目标: 写入失败时内存状态回滚; 旧规则数据块按当前规则补齐
// ==========================================


use std::sync::{Arc, Mutex};

use ffcs_timetable::api::{ApiError, TimetableApi};
use ffcs_timetable::config::config_manager::DEFAULT_STORAGE_KEY;
use ffcs_timetable::db::open_sqlite_connection;
use ffcs_timetable::engine::{default_palette, EquivalenceTable, InteractionState};
use ffcs_timetable::repository::TimetableRepository;
use rusqlite::Connection;
use test_helpers::{create_test_db, form};

fn open_shared(db_path: &str, table: EquivalenceTable) -> (Arc<Mutex<Connection>>, TimetableApi) {
    let conn = Arc::new(Mutex::new(open_sqlite_connection(db_path).unwrap()));
    let repo = Arc::new(TimetableRepository::from_connection(conn.clone()).unwrap());
    let api = TimetableApi::with_parts(repo, table, default_palette(), DEFAULT_STORAGE_KEY).unwrap();
    (conn, api)
}

fn break_storage(conn: &Arc<Mutex<Connection>>) {
    conn.lock().unwrap().execute_batch("DROP TABLE app_kv").unwrap();
}

fn assert_db_error<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    assert!(
        matches!(result, Err(ApiError::DatabaseError(_))),
        "unexpected result: {:?}",
        result
    );
}

#[test]
fn test_failed_assign_rolls_back() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let (conn, api) = open_shared(&db_path, EquivalenceTable::prefix_v2());
    api.assign_slot("C1", &form("MAT1011")).unwrap();
    let before = api.export_data().unwrap();

    break_storage(&conn);

    assert_db_error(api.assign_slot("D1", &form("PHY1001")));
    assert!(api.get_assignment("D1").unwrap().is_none());
    assert_db_error(api.assign_slot("C1", &form("CHY1002")));
    assert_eq!(api.get_assignment("C1").unwrap().unwrap().course_code, "MAT1011");

    // 调色板计数器同样回滚
    assert_eq!(api.export_data().unwrap(), before);
}

#[test]
fn test_failed_clear_and_preference_roll_back() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let (conn, api) = open_shared(&db_path, EquivalenceTable::prefix_v2());
    api.assign_slot("C1", &form("MAT1011")).unwrap();
    api.assign_slot("L1+L2", &form("MAT1011P")).unwrap();
    let before = api.export_data().unwrap();

    break_storage(&conn);

    assert_db_error(api.clear_slot("C1"));
    assert_db_error(api.clear_all());
    assert_db_error(api.set_slot_preference("A1/SE2", "SE2"));

    assert!(api.get_assignment("C1").unwrap().is_some());
    assert_eq!(api.list_courses().unwrap().len(), 2);
    assert_eq!(api.resolve_display("A1/SE2").unwrap(), "A1/SE2");
    assert_eq!(api.export_data().unwrap(), before);
}

#[test]
fn test_failed_submit_keeps_pending_form() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let (conn, api) = open_shared(&db_path, EquivalenceTable::prefix_v2());
    api.click_slot("D1", ffcs_timetable::SlotKind::Theory).unwrap();
    api.choose_combination(0).unwrap();
    let pending = api.interaction_state().unwrap();
    assert!(matches!(pending, InteractionState::AwaitingFormSubmit { .. }));

    break_storage(&conn);

    assert_db_error(api.submit_form(&form("PHY1001")));
    assert!(api.list_assigned_codes().unwrap().is_empty());
    assert_eq!(api.interaction_state().unwrap(), pending);
}

#[test]
fn test_failed_import_keeps_prior_state() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let (conn, api) = open_shared(&db_path, EquivalenceTable::prefix_v2());
    api.assign_slot("C1", &form("MAT1011")).unwrap();
    let blob = api.export_data().unwrap();
    api.clear_all().unwrap();
    api.assign_slot("E1", &form("ENG1001")).unwrap();
    let before = api.export_data().unwrap();

    break_storage(&conn);

    assert_db_error(api.import_data(&blob));
    assert!(api.get_assignment("C1").unwrap().is_none());
    assert!(api.get_assignment("E1").unwrap().is_some());
    assert_eq!(api.export_data().unwrap(), before);
}

#[test]
fn test_blob_saved_under_other_rule_is_normalized() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    {
        let (_conn, api) = open_shared(&db_path, EquivalenceTable::independent_v3());
        api.assign_slot("A1", &form("CSE1001")).unwrap();
        assert!(api.get_assignment("TA1").unwrap().is_none());
    }

    let (_conn, api) = open_shared(&db_path, EquivalenceTable::prefix_v2());
    let a1 = api.get_assignment("A1").unwrap().unwrap();
    assert_eq!(api.get_assignment("TA1").unwrap(), Some(a1.clone()));
    assert_eq!(api.get_assignment("SA1").unwrap(), Some(a1));

    let cleared = api.clear_slot("TA1").unwrap();
    assert!(cleared.slots.contains(&"A1".to_string()));
    assert!(api.list_assigned_codes().unwrap().is_empty());
    assert!(api.list_courses().unwrap().is_empty());
}

#[test]
fn test_import_from_other_rule_is_normalized() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let (_conn, v3) = open_shared(&db_path, EquivalenceTable::independent_v3());
    v3.assign_slot("B1", &form("CSE1002")).unwrap();
    let blob = v3.export_data().unwrap();

    let (_tmp2, other_path) = create_test_db().expect("Failed to create test db");
    let (_conn2, api) = open_shared(&other_path, EquivalenceTable::prefix_v2());
    assert!(api.import_data(&blob).unwrap().success);
    assert!(api.get_assignment("TB1").unwrap().is_some());
    assert!(api.get_assignment("SB1").unwrap().is_some());

    let stored = TimetableRepository::new(&other_path)
        .unwrap()
        .load(DEFAULT_STORAGE_KEY)
        .unwrap()
        .unwrap();
    assert!(stored.assignments.contains_key("TB1"));
}
