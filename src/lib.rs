pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use crate::services::{
    BookingService, CatalogService, LockManager, SeatInventory, SettlementAdapter,
};

/// Shared state for the whole application. Every service receives its store
/// handle at construction, so tests can wire doubles and no component
/// reaches for a hidden global client.
#[derive(Clone)]
pub struct AppState {
    pub config: config::Config,
    pub db: database::Database,
    pub catalog: CatalogService,
    pub inventory: SeatInventory,
    pub locks: LockManager,
    pub bookings: BookingService,
    pub settlement: SettlementAdapter,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;

        db.run_migrations().await?;

        let catalog = CatalogService::new(db.clone());
        let inventory = SeatInventory::new(db.clone());
        let locks = LockManager::new(db.clone());
        let bookings = BookingService::new(db.clone());
        let settlement = SettlementAdapter::new(db.clone(), config.settlement.mock_mode);

        Ok(Arc::new(Self {
            config,
            db,
            catalog,
            inventory,
            locks,
            bookings,
            settlement,
        }))
    }
}
