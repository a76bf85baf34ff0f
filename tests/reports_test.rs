mod common;

use common::{date, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use shopfloor::{
    reports::{ReportPeriod, RollupGroupBy, RollupQuery, RollupSortKey, SortDirection},
    services::{
        production_weeks::{EntryStatus, WeekTargetsUpdate},
        reconciliation::DailyHoursEntry,
    },
};

/// Two employees in two areas, one generated week in January 2024, and a
/// handful of recorded actuals.
async fn january_with_actuals() -> (TestApp, i64) {
    let app = TestApp::new().await;
    let assembly = app.work_area("Assembly", 0, 7).await;
    let kitting = app.work_area("Kitting", 0, 7).await;
    let operator = app.position("Operator", dec!(8)).await;
    app.employee("Ana", &operator, &assembly, date(2020, 1, 1), None)
        .await;
    app.employee("Bo", &operator, &kitting, date(2020, 1, 1), None)
        .await;

    let week = app
        .services()
        .forecast
        .generate_week(date(2024, 1, 8))
        .await
        .unwrap()
        .week;
    let rows = app
        .services()
        .production_weeks
        .daily_hours_for_week(week.production_week_id)
        .await
        .unwrap();

    // Ana works 10 hours on Monday; Bo records nothing.
    let ana_monday = rows
        .iter()
        .find(|r| r.work_area_id == assembly.work_area_id && r.work_date == date(2024, 1, 8))
        .unwrap();
    app.services()
        .reconciliation
        .apply_daily_update(
            "supervisor",
            vec![DailyHoursEntry {
                daily_hour_id: Some(ana_monday.daily_hour_id),
                employee_id: ana_monday.employee_id,
                work_date: ana_monday.work_date,
                work_area_id: ana_monday.work_area_id,
                production_week_id: Some(week.production_week_id),
                actual_hours: Some(dec!(10)),
            }],
        )
        .await
        .unwrap();

    (app, week.production_week_id)
}

#[tokio::test]
async fn rollup_by_work_area_reports_zero_when_nothing_recorded() {
    let (app, _) = january_with_actuals().await;
    let rows = app
        .services()
        .reports
        .monthly_rollup(RollupQuery::new(
            RollupGroupBy::WorkArea,
            ReportPeriod::Year(2024),
        ))
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    let names: Vec<_> = rows.iter().map(|r| r.group_name.as_str()).collect();
    assert_eq!(names, vec!["Assembly", "Kitting"]);
    assert_eq!(rows[0].forecasted_hours, dec!(40));
    assert_eq!(rows[0].actual_hours, dec!(10));
    assert_eq!(rows[1].actual_hours, Decimal::ZERO);
    assert!(rows.iter().all(|r| r.variance.is_none()));
    assert!(rows.iter().all(|r| (r.year, r.month) == (2024, 1)));
}

#[tokio::test]
async fn rollup_by_employee_sorts_by_variance_pct() {
    let (app, _) = january_with_actuals().await;
    let rows = app
        .services()
        .reports
        .monthly_rollup(
            RollupQuery::new(RollupGroupBy::Employee, ReportPeriod::Year(2024))
                .sorted_by(RollupSortKey::VariancePct, SortDirection::Desc),
        )
        .await
        .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].group_name, "Ana T");
    assert_eq!(rows[0].variance, Some(dec!(-30)));
    assert_eq!(rows[0].variance_pct, Some(dec!(-75)));
    assert_eq!(rows[1].group_name, "Bo T");
    assert_eq!(rows[1].variance_pct, Some(dec!(-100)));
}

#[tokio::test]
async fn rollup_splits_a_week_across_months() {
    let app = TestApp::new().await;
    let assembly = app.work_area("Assembly", 0, 7).await;
    let operator = app.position("Operator", dec!(7.5)).await;
    app.employee("Ana", &operator, &assembly, date(2020, 1, 1), None)
        .await;
    app.employee("Bo", &operator, &assembly, date(2020, 1, 1), None)
        .await;

    // Jan 29-31 are weekdays; Feb 1-2 are weekdays and Feb 3-4 the weekend.
    let week = app
        .services()
        .forecast
        .generate_week(date(2024, 1, 29))
        .await
        .unwrap()
        .week;
    assert_eq!(week.forecasted_total_production_hours, Some(dec!(75)));

    let rows = app
        .services()
        .reports
        .monthly_rollup(RollupQuery::new(
            RollupGroupBy::WorkArea,
            ReportPeriod::AllTime,
        ))
        .await
        .unwrap();
    let summary: Vec<_> = rows
        .iter()
        .map(|r| (r.year, r.month, r.forecasted_hours, r.actual_hours))
        .collect();
    assert_eq!(
        summary,
        vec![
            (2024, 1, dec!(45), Decimal::ZERO),
            (2024, 2, dec!(30), Decimal::ZERO),
        ]
    );

    let by_employee = app
        .services()
        .reports
        .monthly_rollup(RollupQuery::new(
            RollupGroupBy::Employee,
            ReportPeriod::TrailingTwelveMonths {
                as_of: date(2024, 3, 15),
            },
        ))
        .await
        .unwrap();
    assert_eq!(by_employee.len(), 4);
    assert!(by_employee
        .iter()
        .all(|r| r.forecasted_hours == dec!(22.5) || r.forecasted_hours == dec!(15)));
}

#[tokio::test]
async fn rollup_outside_the_period_is_empty() {
    let (app, _) = january_with_actuals().await;
    let rows = app
        .services()
        .reports
        .monthly_rollup(RollupQuery::new(
            RollupGroupBy::WorkArea,
            ReportPeriod::Year(2023),
        ))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn weekly_overview_reflects_targets() {
    let (app, week_id) = january_with_actuals().await;
    app.services()
        .production_weeks
        .update_targets(
            week_id,
            WeekTargetsUpdate {
                forecasted_product_value: Some(dec!(4000)),
                actual_product_value: Some(dec!(500)),
                forecasted_boxes_built: Some(100),
                actual_boxes_built: Some(90),
            },
        )
        .await
        .unwrap();

    let overview = app.services().reports.weekly_overview().await.unwrap();
    assert_eq!(overview.len(), 1);
    let row = &overview[0];
    assert_eq!(row.total_hours.forecasted, dec!(80));
    assert_eq!(row.total_hours.actual, dec!(10));
    assert_eq!(row.total_hours.variance, dec!(-70));
    assert_eq!(row.boxes_built.variance, dec!(-10));
    assert_eq!(row.boxes_built.variance_pct, dec!(-10));
    assert_eq!(row.dollars_per_hour.forecasted, dec!(50));
    assert_eq!(row.dollars_per_hour.actual, dec!(50));
}

#[tokio::test]
async fn company_actuals_group_by_start_month() {
    let (app, week_id) = january_with_actuals().await;
    app.services()
        .production_weeks
        .update_targets(
            week_id,
            WeekTargetsUpdate {
                actual_product_value: Some(dec!(1000)),
                actual_boxes_built: Some(25),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let rows = app
        .services()
        .reports
        .monthly_company_actuals(ReportPeriod::AllTime)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!((rows[0].year, rows[0].month), (2024, 1));
    assert_eq!(rows[0].total_actual_hours, dec!(10));
    assert_eq!(rows[0].total_actual_boxes, 25);
    assert_eq!(rows[0].actual_dollars_per_hour, dec!(100));
}

#[tokio::test]
async fn entry_sheet_without_a_week_explains_why() {
    let app = TestApp::new().await;
    app.work_area("Assembly", 0, 7).await;

    let sheet = app
        .services()
        .production_weeks
        .entry_sheet(date(2024, 2, 5))
        .await
        .unwrap();
    assert_eq!(sheet.production_week_id, None);
    assert!(sheet.employees.is_empty());
    assert_eq!(sheet.work_areas.len(), 1);
    assert!(sheet.message.is_some());
}

#[tokio::test]
async fn entry_sheet_covers_the_calendar_week() {
    let (app, week_id) = january_with_actuals().await;
    let sheet = app
        .services()
        .production_weeks
        .entry_sheet(date(2024, 1, 8))
        .await
        .unwrap();

    assert_eq!(sheet.production_week_id, Some(week_id));
    assert_eq!(sheet.employees.len(), 2);
    let ana = &sheet.employees[0];
    assert_eq!(ana.first_name, "Ana");
    assert_eq!(ana.primary_work_area_name.as_deref(), Some("Assembly"));
    assert_eq!(ana.position_title.as_deref(), Some("Operator"));
    assert_eq!(ana.days.len(), 7);

    // Sunday precedes the generated window.
    let sunday = &ana.days[0];
    assert_eq!(sunday.day_of_week, "Sunday");
    assert_eq!(sunday.status, EntryStatus::NewPotential);
    assert_eq!(sunday.forecasted_hours, Decimal::ZERO);

    let monday = &ana.days[1];
    assert_eq!(monday.status, EntryStatus::Existing);
    assert_eq!(monday.actual_hours, Some(dec!(10)));
    assert!(ana.days[1..].iter().all(|d| d.status == EntryStatus::Existing));
}

#[tokio::test]
async fn entry_sheet_for_any_day_finds_its_calendar_week() {
    let (app, week_id) = january_with_actuals().await;
    let weeks = &app.services().production_weeks;

    // Sunday the 7th opens the week anchored on Monday the 8th; Saturday the 13th closes it.
    for day in [date(2024, 1, 7), date(2024, 1, 10), date(2024, 1, 13)] {
        let sheet = weeks.entry_sheet_for_date(day).await.unwrap();
        assert_eq!(sheet.reporting_week_start_date, date(2024, 1, 8));
        assert_eq!(sheet.production_week_id, Some(week_id));
    }

    let following = weeks.entry_sheet_for_date(date(2024, 1, 14)).await.unwrap();
    assert_eq!(following.reporting_week_start_date, date(2024, 1, 15));
    assert_eq!(following.production_week_id, None);
}
