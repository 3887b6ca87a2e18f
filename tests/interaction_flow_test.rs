// ==========================================
// 交互流程集成测试
// ==========================================
// 测试目标: 点击 → 选择 → 提交 / 清除 / 取消 经 API 执行
// ==========================================


use ffcs_timetable::api::{ApiError, AssignForm};
use ffcs_timetable::domain::SlotKind;
use ffcs_timetable::engine::InteractionState;
use test_helpers::{create_test_db, form, open_api};

#[test]
fn test_alternative_choice_is_persisted() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    {
        let api = open_api(&db_path).expect("Failed to open api");
        let state = api.click_slot("A1/SE2", SlotKind::Theory).unwrap();
        assert!(matches!(state, InteractionState::AwaitingAlternativeChoice { .. }));

        let state = api.choose_alternative("SE2").unwrap();
        assert!(matches!(
            state,
            InteractionState::AwaitingFormSubmit { ref slot, .. } if slot == "SE2"
        ));
        api.cancel_interaction().unwrap();
    }

    // 偏好在重新打开后仍生效,点击直接进入后续步骤
    let api = open_api(&db_path).expect("Failed to reopen api");
    let state = api.click_slot("A1/SE2", SlotKind::Theory).unwrap();
    assert!(!matches!(state, InteractionState::AwaitingAlternativeChoice { .. }));
}

#[test]
fn test_combination_submit_assigns_all_codes() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let api = open_api(&db_path).expect("Failed to open api");

    let state = api.click_slot("D1", SlotKind::Theory).unwrap();
    let combinations = match state {
        InteractionState::AwaitingCombinationChoice { combinations, .. } => combinations,
        other => panic!("unexpected state: {:?}", other),
    };
    assert!(combinations.len() > 1);

    let state = api.choose_combination(1).unwrap();
    assert_eq!(state.name(), "AwaitingFormSubmit");

    let response = api.submit_form(&form("CSE1003")).unwrap();
    assert!(response.slots.contains(&"D1".to_string()));
    assert!(response.slots.contains(&"TDD1".to_string()));
    assert!(api.interaction_state().unwrap().is_idle());
    assert_eq!(api.list_courses().unwrap().len(), 1);
}

#[test]
fn test_invalid_form_keeps_pending_state() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let api = open_api(&db_path).expect("Failed to open api");

    api.click_slot("L1+L2", SlotKind::Lab).unwrap();
    let result = api.submit_form(&AssignForm::new("PHY1001P", " ", ""));
    assert!(matches!(result, Err(ApiError::ValidationError(_))));
    assert_eq!(api.interaction_state().unwrap().name(), "AwaitingFormSubmit");
    assert!(api.list_assigned_codes().unwrap().is_empty());

    api.submit_form(&form("PHY1001P")).unwrap();
    assert_eq!(api.list_assigned_codes().unwrap(), vec!["L1+L2"]);
}

#[test]
fn test_clear_selected_existing_assignment() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let api = open_api(&db_path).expect("Failed to open api");
    api.assign_slot("L1+L2", &form("PHY1001P")).unwrap();

    match api.click_slot("L1+L2", SlotKind::Lab).unwrap() {
        InteractionState::AwaitingFormSubmit { existing, .. } => {
            assert_eq!(existing.unwrap().course_code, "PHY1001P");
        }
        other => panic!("unexpected state: {:?}", other),
    }

    let response = api.clear_selected().unwrap();
    assert_eq!(response.slots, vec!["L1+L2"]);
    assert!(api.list_assigned_codes().unwrap().is_empty());
    assert!(api.interaction_state().unwrap().is_idle());
}

#[test]
fn test_out_of_order_steps_rejected() {
    let (_tmp, db_path) = create_test_db().expect("Failed to create test db");
    let api = open_api(&db_path).expect("Failed to open api");

    assert!(matches!(
        api.submit_form(&form("CSE1001")),
        Err(ApiError::InvalidStateTransition { .. })
    ));
    assert!(matches!(
        api.choose_combination(0),
        Err(ApiError::InvalidStateTransition { .. })
    ));
    assert!(api.interaction_state().unwrap().is_idle());

    api.click_slot("D1", SlotKind::Theory).unwrap();
    assert!(matches!(api.choose_combination(99), Err(ApiError::InvalidInput(_))));
}
