//! Shopfloor
//!
//! Workforce scheduling and production tracking: weekly forecast
//! generation, reconciliation of recorded hours and the reports built on
//! top of them.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod notifications;
pub mod reports;
pub mod repositories;
pub mod scheduling;
pub mod services;

use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use crate::notifications::{LogNotificationSink, NoopNotificationSink, NotificationSink};
use crate::services::{ServiceContainer, ServiceFactory};

/// Everything a front end needs: configuration, the pool and the services.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub db: Arc<db::DbPool>,
    pub services: ServiceContainer,
}

impl AppContext {
    /// Connects to the database, applies migrations when `auto_migrate` is
    /// set and wires the services.
    pub async fn bootstrap(config: AppConfig) -> Result<Self, ServiceError> {
        let pool = db::establish_connection_from_app_config(&config).await?;
        if config.auto_migrate {
            db::run_migrations(&pool).await?;
        }

        let notifier: Arc<dyn NotificationSink> = if config.notifications_enabled {
            Arc::new(LogNotificationSink)
        } else {
            Arc::new(NoopNotificationSink)
        };

        Ok(Self::with_pool(config, Arc::new(pool), notifier))
    }

    /// Wires services around an existing pool and notification sink.
    pub fn with_pool(
        config: AppConfig,
        db: Arc<db::DbPool>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        let factory = ServiceFactory::new(db.clone(), notifier);
        let services = ServiceContainer::new(&factory);
        info!(environment = %config.environment, "Application context ready");
        Self {
            config,
            db,
            services,
        }
    }
}
