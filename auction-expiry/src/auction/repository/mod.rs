use {
    super::entities,
    std::collections::HashMap,
    tokio::sync::Mutex,
};

mod add_auction;
mod conclude_auction;
mod get_auction;
mod get_expired_auctions;
mod get_or_create_in_memory_auction_lock;
#[cfg(test)]
mod in_memory_db;
mod models;
mod remove_in_memory_auction_lock;
mod update_auction_status;

#[cfg(test)]
pub use in_memory_db::InMemoryDatabase;
pub use {
    get_expired_auctions::expiry_cutoff,
    models::*,
};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub auction_lock: Mutex<HashMap<entities::AuctionId, entities::AuctionLock>>,
}

#[derive(Debug)]
pub struct Repository {
    pub in_memory_store: InMemoryStore,
    pub db:              Box<dyn Database>,
}

impl Repository {
    pub fn new(db: impl Database) -> Self {
        Self {
            in_memory_store: InMemoryStore::default(),
            db:              Box::new(db),
        }
    }
}
