//! Background reaper for expired seat locks. Correctness never depends on
//! it (every conditional update discounts expired locks on its own), it
//! just keeps the seat rows tidy between reads.

use std::time::Duration;
use tracing::{error, info};

use crate::services::inventory::SeatInventory;

pub const SWEEP_INTERVAL_SECS: u64 = 60;

pub struct LockReaper {
    inventory: SeatInventory,
}

impl LockReaper {
    pub fn new(inventory: SeatInventory) -> Self {
        Self { inventory }
    }

    pub async fn run(self) {
        let mut ticker = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            match self.inventory.release_expired_locks().await {
                Ok(0) => {}
                Ok(released) => info!("lock sweep released {} expired locks", released),
                Err(e) => error!("lock sweep failed: {:?}", e),
            }
        }
    }
}
