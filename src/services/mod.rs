//! Business logic services

pub mod auth;
pub mod billing;
pub mod bookings;
pub mod buildings;
pub mod emergency;
pub mod notifications;
pub mod requests;

use std::sync::Arc;

use chrono::Local;

use crate::{config::AppConfig, error::AppResult, repository::{seed, Repository}};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub bookings: bookings::BookingsService,
    pub requests: requests::RequestsService,
    pub buildings: buildings::BuildingsService,
    pub notifications: notifications::NotificationsService,
    pub emergency: emergency::EmergencyService,
    pub billing: billing::BillingService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        let notifications = notifications::NotificationsService::new(repository.clone());
        let sink: Arc<dyn notifications::NotificationSink> = Arc::new(notifications.clone());

        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            bookings: bookings::BookingsService::new(repository.clone(), &config.bookings, sink.clone()),
            requests: requests::RequestsService::new(repository.clone(), config.requests.clone(), sink.clone()),
            emergency: emergency::EmergencyService::new(repository.clone(), sink.clone()),
            billing: billing::BillingService::new(repository.clone(), &config.billing, sink),
            buildings: buildings::BuildingsService::new(repository),
            notifications,
        }
    }

    /// Build the services and load the demo data when enabled
    pub fn bootstrap(config: &AppConfig) -> AppResult<Self> {
        let repository = Repository::new();
        let services = Self::new(repository.clone(), config);
        if config.seed.enabled {
            let hash = services.auth.hash_password(seed::DEMO_PASSWORD)?;
            seed::load(&repository, &hash, Local::now().date_naive())?;
        }
        Ok(services)
    }
}
