mod common;

use assert_matches::assert_matches;
use common::{date, TestApp};
use rust_decimal_macros::dec;
use shopfloor::{
    errors::ServiceError,
    services::{
        holidays::NewHoliday,
        roster::{EmployeeUpdate, NewEmployee, NewWorkArea, PositionUpdate, ReorderItem},
    },
};

#[tokio::test]
async fn duplicate_names_conflict() {
    let app = TestApp::new().await;
    app.work_area("Assembly", 0, 7).await;
    app.position("Operator", dec!(8)).await;

    let area = app
        .services()
        .roster
        .create_work_area(NewWorkArea {
            work_area_name: "Assembly".into(),
            reporting_week_start_offset_days: 0,
            contributing_duration_days: 7,
            display_order: None,
        })
        .await;
    assert_matches!(area, Err(ServiceError::Conflict(_)));

    let holidays = &app.services().holidays;
    let new_year = NewHoliday {
        holiday_date: date(2024, 1, 1),
        description: Some("New Year".into()),
    };
    holidays.add(new_year.clone()).await.unwrap();
    assert_matches!(holidays.add(new_year).await, Err(ServiceError::Conflict(_)));
}

#[tokio::test]
async fn invalid_master_data_is_rejected() {
    let app = TestApp::new().await;
    let area = app.work_area("Assembly", 0, 7).await;
    let operator = app.position("Operator", dec!(8)).await;
    let roster = &app.services().roster;

    let zero_duration = roster
        .create_work_area(NewWorkArea {
            work_area_name: "Kitting".into(),
            reporting_week_start_offset_days: 0,
            contributing_duration_days: 0,
            display_order: None,
        })
        .await;
    assert_matches!(zero_duration, Err(ServiceError::ValidationError(_)));

    let negative_hours = roster
        .update_position(
            operator.position_id,
            PositionUpdate {
                default_hours: Some(dec!(-1)),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(negative_hours, Err(ServiceError::ValidationError(_)));

    let ends_before_start = roster
        .create_employee(NewEmployee {
            first_name: "Ray".into(),
            last_initial: "P".into(),
            position_id: operator.position_id,
            primary_work_area_id: area.work_area_id,
            employment_start_date: date(2024, 3, 1),
            employment_end_date: Some(date(2024, 2, 1)),
            display_order: None,
        })
        .await;
    assert_matches!(ends_before_start, Err(ServiceError::ValidationError(_)));

    let unknown_position = roster
        .create_employee(NewEmployee {
            first_name: "Ray".into(),
            last_initial: "P".into(),
            position_id: 4_242,
            primary_work_area_id: area.work_area_id,
            employment_start_date: date(2024, 3, 1),
            employment_end_date: None,
            display_order: None,
        })
        .await;
    assert_matches!(unknown_position, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn referenced_records_cannot_be_deleted() {
    let app = TestApp::new().await;
    let area = app.work_area("Assembly", 0, 7).await;
    let operator = app.position("Operator", dec!(8)).await;
    let employee = app
        .employee("Sam", &operator, &area, date(2020, 1, 1), None)
        .await;
    let roster = &app.services().roster;

    assert_matches!(
        roster.delete_work_area(area.work_area_id).await,
        Err(ServiceError::IntegrityGuard(_))
    );
    assert_matches!(
        roster.delete_position(operator.position_id).await,
        Err(ServiceError::IntegrityGuard(_))
    );

    app.services()
        .forecast
        .generate_week(date(2024, 1, 8))
        .await
        .unwrap();
    assert_matches!(
        roster.delete_employee(employee.employee_id).await,
        Err(ServiceError::IntegrityGuard(_))
    );
    assert_eq!(roster.list_employees().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unreferenced_records_delete_cleanly() {
    let app = TestApp::new().await;
    let area = app.work_area("Assembly", 0, 7).await;
    let spare = app.work_area("Spare", 0, 7).await;
    let operator = app.position("Operator", dec!(8)).await;
    let employee = app
        .employee("Sam", &operator, &area, date(2020, 1, 1), None)
        .await;
    let roster = &app.services().roster;

    roster.delete_work_area(spare.work_area_id).await.unwrap();
    roster.delete_employee(employee.employee_id).await.unwrap();
    roster.delete_position(operator.position_id).await.unwrap();

    assert_matches!(
        roster.get_employee(employee.employee_id).await,
        Err(ServiceError::NotFound(_))
    );
    assert_eq!(roster.list_work_areas().await.unwrap().len(), 1);
    assert!(roster.list_positions().await.unwrap().is_empty());
}

#[tokio::test]
async fn reorder_skips_unknown_ids() {
    let app = TestApp::new().await;
    let first = app.work_area("First", 0, 7).await;
    let second = app.work_area("Second", 0, 7).await;
    let roster = &app.services().roster;

    let updated = roster
        .reorder_work_areas(vec![
            ReorderItem {
                id: second.work_area_id,
                order: 1,
            },
            ReorderItem {
                id: first.work_area_id,
                order: 2,
            },
            ReorderItem { id: 9_999, order: 3 },
        ])
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let names: Vec<_> = roster
        .list_work_areas()
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.work_area_name)
        .collect();
    assert_eq!(names, vec!["Second", "First"]);
}

#[tokio::test]
async fn employment_end_can_be_set_and_cleared() {
    let app = TestApp::new().await;
    let area = app.work_area("Assembly", 0, 7).await;
    let operator = app.position("Operator", dec!(8)).await;
    let employee = app
        .employee("Sam", &operator, &area, date(2020, 1, 1), None)
        .await;
    let roster = &app.services().roster;

    let ended = roster
        .update_employee(
            employee.employee_id,
            EmployeeUpdate {
                employment_end_date: Some(Some(date(2024, 6, 30))),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(ended.employment_end_date, Some(date(2024, 6, 30)));

    let renamed = roster
        .update_employee(
            employee.employee_id,
            EmployeeUpdate {
                first_name: Some("Samuel".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // Untouched when the field is absent.
    assert_eq!(renamed.employment_end_date, Some(date(2024, 6, 30)));

    let cleared = roster
        .update_employee(
            employee.employee_id,
            EmployeeUpdate {
                employment_end_date: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.employment_end_date, None);
    assert_eq!(cleared.first_name, "Samuel");
}
