//! Week generation against a migrated in-memory database.

mod common;

use assert_matches::assert_matches;
use common::{date, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, EntityTrait, PaginatorTrait};
use shopfloor::{
    entities::{work_area, DailyEmployeeHours, ProductionWeek},
    errors::ServiceError,
    services::{holidays::NewHoliday, roster::NewWorkArea},
};

#[tokio::test]
async fn shifted_window_with_midweek_holiday() {
    let app = TestApp::new().await;
    let area = app.work_area("Finishing", -1, 7).await;
    let operator = app.position("Operator", dec!(8)).await;
    let employee = app
        .employee("Lee", &operator, &area, date(2023, 6, 1), None)
        .await;
    app.services()
        .holidays
        .add(NewHoliday {
            holiday_date: date(2024, 1, 10),
            description: Some("Plant shutdown".into()),
        })
        .await
        .unwrap();

    let generated = app
        .services()
        .forecast
        .generate_week(date(2024, 1, 8))
        .await
        .unwrap();

    assert_eq!(generated.rows_created, 7);
    assert_eq!(generated.week.reporting_week_end_date, date(2024, 1, 14));
    assert_eq!(
        generated.week.forecasted_total_production_hours,
        Some(dec!(32))
    );

    let rows = app
        .services()
        .production_weeks
        .daily_hours_for_week(generated.week.production_week_id)
        .await
        .unwrap();
    let by_day: Vec<_> = rows
        .iter()
        .map(|r| (r.work_date, r.forecasted_hours, r.actual_hours))
        .collect();
    assert_eq!(
        by_day,
        vec![
            (date(2024, 1, 7), dec!(0), None),
            (date(2024, 1, 8), dec!(8), None),
            (date(2024, 1, 9), dec!(8), None),
            (date(2024, 1, 10), dec!(0), None),
            (date(2024, 1, 11), dec!(8), None),
            (date(2024, 1, 12), dec!(8), None),
            (date(2024, 1, 13), dec!(0), None),
        ]
    );
    assert!(rows.iter().all(|r| r.employee_id == employee.employee_id));
    assert!(rows.iter().all(|r| r.work_area_id == area.work_area_id));
}

#[tokio::test]
async fn employment_end_zeroes_the_rest_of_the_window() {
    let app = TestApp::new().await;
    let area = app.work_area("Assembly", 0, 7).await;
    let operator = app.position("Operator", dec!(7.5)).await;
    app.employee(
        "Kim",
        &operator,
        &area,
        date(2022, 1, 1),
        Some(date(2024, 1, 10)),
    )
    .await;

    let generated = app
        .services()
        .forecast
        .generate_week(date(2024, 1, 8))
        .await
        .unwrap();

    // Monday through Wednesday only.
    assert_eq!(
        generated.week.forecasted_total_production_hours,
        Some(dec!(22.5))
    );
    let rows = app
        .services()
        .production_weeks
        .daily_hours_for_week(generated.week.production_week_id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 7);
    assert!(rows
        .iter()
        .filter(|r| r.work_date > date(2024, 1, 10))
        .all(|r| r.forecasted_hours.is_zero()));
}

#[tokio::test]
async fn stored_total_matches_sum_of_rows() {
    let app = TestApp::new().await;
    let assembly = app.work_area("Assembly", 0, 7).await;
    let kitting = app.work_area("Kitting", 2, 3).await;
    let leader = app.position("Team Leader", dec!(7.75)).await;
    let operator = app.position("Operator", dec!(7.5)).await;
    app.employee("Ana", &leader, &assembly, date(2020, 1, 1), None)
        .await;
    app.employee("Bo", &operator, &assembly, date(2024, 1, 9), None)
        .await;
    app.employee("Cy", &operator, &kitting, date(2020, 1, 1), None)
        .await;

    let generated = app
        .services()
        .forecast
        .generate_week(date(2024, 1, 8))
        .await
        .unwrap();

    let rows = app
        .services()
        .production_weeks
        .daily_hours_for_week(generated.week.production_week_id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 7 + 7 + 3);

    let sum: Decimal = rows.iter().map(|r| r.forecasted_hours).sum();
    assert_eq!(
        generated.week.forecasted_total_production_hours,
        Some(sum.round_dp(2))
    );
    // 5 * 7.75 + 4 * 7.5 + (Wed, Thu, Fri) * 7.5
    assert_eq!(sum, dec!(91.25));
}

#[tokio::test]
async fn generating_twice_is_a_conflict_and_writes_nothing() {
    let app = TestApp::new().await;
    let area = app.work_area("Assembly", 0, 7).await;
    let operator = app.position("Operator", dec!(8)).await;
    app.employee("Dee", &operator, &area, date(2020, 1, 1), None)
        .await;

    let forecast = &app.services().forecast;
    forecast.generate_week(date(2024, 1, 8)).await.unwrap();
    let before = DailyEmployeeHours::find().count(app.db()).await.unwrap();

    let second = forecast.generate_week(date(2024, 1, 8)).await;
    assert_matches!(second, Err(ServiceError::Conflict(_)));

    let after = DailyEmployeeHours::find().count(app.db()).await.unwrap();
    assert_eq!(before, after);
    assert_eq!(
        app.services().production_weeks.list_weeks().await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn concurrent_generators_produce_one_week() {
    let app = TestApp::new().await;
    let area = app.work_area("Assembly", 0, 7).await;
    let operator = app.position("Operator", dec!(8)).await;
    app.employee("Eve", &operator, &area, date(2020, 1, 1), None)
        .await;

    let forecast = &app.services().forecast;
    let (a, b) = futures::join!(
        forecast.generate_week(date(2024, 2, 5)),
        forecast.generate_week(date(2024, 2, 5))
    );

    let conflicts = [&a, &b]
        .iter()
        .filter(|r| matches!(r, Err(ServiceError::Conflict(_))))
        .count();
    assert_eq!(conflicts, 1);
    assert!(a.is_ok() || b.is_ok());
    assert_eq!(
        DailyEmployeeHours::find().count(app.db()).await.unwrap(),
        7
    );
}

#[tokio::test]
async fn non_monday_anchor_is_rejected() {
    let app = TestApp::new().await;
    let result = app
        .services()
        .forecast
        .generate_week(date(2024, 1, 9))
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));

    let parsed = app
        .services()
        .forecast
        .generate_week_from_str("2024/01/08")
        .await;
    assert_matches!(parsed, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn week_with_no_employees_has_zero_forecast() {
    let app = TestApp::new().await;
    let generated = app
        .services()
        .forecast
        .generate_week(date(2024, 3, 4))
        .await
        .unwrap();
    assert_eq!(generated.rows_created, 0);
    assert_eq!(
        generated.week.forecasted_total_production_hours,
        Some(Decimal::ZERO)
    );
    assert_eq!(generated.week.forecasted_dollars_per_hour, None);
}

#[tokio::test]
async fn out_of_calendar_work_area_fails_without_partial_week() {
    let app = TestApp::new().await;
    let rejected = app
        .services()
        .roster
        .create_work_area(NewWorkArea {
            work_area_name: "Drift".into(),
            reporting_week_start_offset_days: i32::MAX,
            contributing_duration_days: 7,
            display_order: None,
        })
        .await;
    assert_matches!(rejected, Err(ServiceError::ValidationError(_)));

    // A row written before offsets were bounded.
    let legacy = work_area::ActiveModel {
        work_area_id: NotSet,
        work_area_name: Set("Legacy".into()),
        reporting_week_start_offset_days: Set(i32::MAX),
        contributing_duration_days: Set(7),
        display_order: Set(None),
    }
    .insert(app.db())
    .await
    .unwrap();
    let operator = app.position("Operator", dec!(8)).await;
    app.employee("Lee", &operator, &legacy, date(2023, 6, 1), None)
        .await;

    let result = app
        .services()
        .forecast
        .generate_week(date(2024, 1, 8))
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
    assert_eq!(ProductionWeek::find().count(app.db()).await.unwrap(), 0);
    assert_eq!(DailyEmployeeHours::find().count(app.db()).await.unwrap(), 0);
}
