use {
    super::{
        entities::ClosingStrategy,
        repository::{
            Database,
            Repository,
        },
    },
    std::{
        sync::Arc,
        time::Duration,
    },
    tokio_util::task::TaskTracker,
};

pub mod add_auction;
pub mod close_auction;
pub mod close_expired_auctions;
pub mod get_auction;
pub mod schedule_auction_expiry;
pub mod workers;

#[derive(Debug, Clone)]
pub struct SweeperConfig {
    pub enabled:    bool,
    pub interval:   Duration,
    pub batch_size: usize,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Time between the creation of an auction and its closure.
    pub expiration_delay: Duration,
    pub closing_strategy: ClosingStrategy,
    pub sweeper:          SweeperConfig,
}

pub struct ServiceInner {
    config:       Config,
    repo:         Arc<Repository>,
    task_tracker: TaskTracker,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(db: impl Database, config: Config, task_tracker: TaskTracker) -> Self {
        if config.closing_strategy == ClosingStrategy::KeyedLock {
            tracing::warn!(
                closing_strategy = %config.closing_strategy,
                "Auction closing is only guarded by an in-process lock, run a single instance per database"
            );
        }
        Self(Arc::new(ServiceInner {
            config,
            repo: Arc::new(Repository::new(db)),
            task_tracker,
        }))
    }
}
