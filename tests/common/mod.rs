#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shopfloor::{
    config::AppConfig,
    db,
    entities::{employee, position, work_area},
    notifications::{ChannelNotificationSink, NotificationSink, WeekUpdateNotice},
    services::{
        roster::{NewEmployee, NewPosition, NewWorkArea},
        ServiceContainer,
    },
    AppContext,
};
use tokio::{sync::mpsc, time::timeout};

/// Helper harness backed by a fresh in-memory SQLite database.
pub struct TestApp {
    pub context: AppContext,
    pub notices: mpsc::Receiver<WeekUpdateNotice>,
}

impl TestApp {
    pub async fn new() -> Self {
        let (sink, notices) = ChannelNotificationSink::channel(64);
        let mut app = Self::with_sink(Arc::new(sink)).await;
        app.notices = notices;
        app
    }

    /// Harness whose notices go to `sink`; `notices` then stays empty.
    pub async fn with_sink(sink: Arc<dyn NotificationSink>) -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:".to_string(), "test".to_string());
        // Every connection to sqlite::memory: is its own database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let (_closed, notices) = mpsc::channel(1);
        let context = AppContext::with_pool(cfg, Arc::new(pool), sink);
        Self { context, notices }
    }

    pub fn services(&self) -> &ServiceContainer {
        &self.context.services
    }

    pub fn db(&self) -> &db::DbPool {
        &self.context.db
    }

    /// Waits briefly for the next notice delivered in the background.
    pub async fn next_notice(&mut self) -> Option<WeekUpdateNotice> {
        timeout(Duration::from_secs(1), self.notices.recv())
            .await
            .ok()
            .flatten()
    }

    /// Notices delivered so far.
    pub fn drain_notices(&mut self) -> Vec<WeekUpdateNotice> {
        let mut out = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            out.push(notice);
        }
        out
    }

    pub async fn work_area(&self, name: &str, offset: i32, duration: i32) -> work_area::Model {
        self.services()
            .roster
            .create_work_area(NewWorkArea {
                work_area_name: name.to_string(),
                reporting_week_start_offset_days: offset,
                contributing_duration_days: duration,
                display_order: None,
            })
            .await
            .expect("failed to seed work area")
    }

    pub async fn position(&self, title: &str, hours: Decimal) -> position::Model {
        self.services()
            .roster
            .create_position(NewPosition {
                title: title.to_string(),
                default_hours: hours,
                display_order: None,
            })
            .await
            .expect("failed to seed position")
    }

    pub async fn employee(
        &self,
        first_name: &str,
        position: &position::Model,
        area: &work_area::Model,
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> employee::Model {
        self.services()
            .roster
            .create_employee(NewEmployee {
                first_name: first_name.to_string(),
                last_initial: "T".to_string(),
                position_id: position.position_id,
                primary_work_area_id: area.work_area_id,
                employment_start_date: start,
                employment_end_date: end,
                display_order: None,
            })
            .await
            .expect("failed to seed employee")
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
