use {
    serde::{
        Deserialize,
        Serialize,
    },
    std::sync::Arc,
    strum::Display,
    time::OffsetDateTime,
    tokio::sync::Mutex,
    uuid::Uuid,
};

pub type AuctionId = String;
pub type AuctionLock = Arc<Mutex<()>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AuctionStatus {
    Active,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Auction {
    pub id:            AuctionId,
    pub status:        AuctionStatus,
    pub creation_time: OffsetDateTime,
}

impl Auction {
    pub fn new(id: Option<AuctionId>) -> Self {
        Self {
            id:            id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            status:        AuctionStatus::Active,
            creation_time: OffsetDateTime::now_utc(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AuctionStatus::Active
    }
}

/// Result of a single attempt to close an auction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum CloseOutcome {
    /// This call moved the auction from active to completed.
    Transitioned,
    /// Nothing matched: the auction was already completed or never existed.
    AlreadyClosed,
}

/// How the closer guards the active to completed transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClosingStrategy {
    /// A single conditional update in the store. Safe across any number of instances.
    #[default]
    ConditionalUpdate,
    /// A lock keyed by auction id around a read followed by a write.
    /// Only protects against racing closers inside the same process.
    KeyedLock,
}
