pub mod booking;
pub mod catalog;
pub mod cleanup;
pub mod inventory;
pub mod locks;
pub mod settlement;

pub use booking::BookingService;
pub use catalog::CatalogService;
pub use cleanup::LockReaper;
pub use inventory::SeatInventory;
pub use locks::LockManager;
pub use settlement::SettlementAdapter;
