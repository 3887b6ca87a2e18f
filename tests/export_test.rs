// ==========================================
// 网格导出集成测试
// ==========================================
// 测试目标: 网格模型、CSV 文件与纯文本导出
// ==========================================


use ffcs_timetable::domain::{Day, SlotKind};
use test_helpers::{create_test_db, form, open_api};

#[test]
fn test_grid_marks_assignments_and_clashes() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let api = open_api(&db_path).expect("Failed to open api");
    api.assign_slot("L61+L62", &form("CSE1001P")).unwrap();

    let grid = api.export_grid().unwrap();
    assert_eq!(grid.rows.len(), 12);
    assert_eq!(grid.assigned_cell_count(), 1);
    assert_eq!(grid.legend.len(), 1);

    let mon_theory = grid
        .rows
        .iter()
        .find(|r| r.day == Day::Mon && r.kind == SlotKind::Theory)
        .unwrap();
    let ta1 = mon_theory
        .cells
        .iter()
        .find(|c| c.code.as_deref() == Some("TA1"))
        .unwrap();
    assert!(ta1.disabled);

    let mon_lab = grid
        .rows
        .iter()
        .find(|r| r.day == Day::Mon && r.kind == SlotKind::Lab)
        .unwrap();
    assert_eq!(mon_lab.cells[0].text(), "L61+L62 - CSE1001P");
    assert!(!mon_lab.cells[0].disabled);
}

#[test]
fn test_csv_file_export() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let dir = tempfile::tempdir().unwrap();
    let api = open_api(&db_path).expect("Failed to open api");
    api.assign_slot("C1", &form("MAT1011")).unwrap();

    let path = api.export_grid_to_file(dir.path()).unwrap();
    assert_eq!(path, dir.path().join("ffcs-timetable.csv"));

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, api.export_grid_csv().unwrap());
    assert!(written.contains("C1 - MAT1011"));
    assert!(written.contains("COURSE,NAME,PROFESSOR,COLOR,SLOTS"));
    assert!(written.lines().next().unwrap().contains("LUNCH"));
}

#[test]
fn test_text_export() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let api = open_api(&db_path).expect("Failed to open api");
    api.assign_slot("L1+L2", &form("PHY1001P")).unwrap();

    let text = api.export_grid_text().unwrap();
    assert!(text.contains("[THEORY]"));
    assert!(text.contains("[LAB]"));
    assert!(text.contains("L1+L2 - PHY1001P"));
    assert!(text.contains("PHY1001P Course"));
}
