use {
    super::Database,
    crate::auction::entities,
    async_trait::async_trait,
    std::{
        collections::HashMap,
        sync::{
            Mutex,
            MutexGuard,
        },
    },
    time::OffsetDateTime,
};

type Auctions = HashMap<entities::AuctionId, entities::Auction>;

/// Store used by tests. Every operation runs under one mutex, so `conclude_auction`
/// behaves like the atomic conditional update of the real store.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    auctions: Mutex<Auctions>,
}

impl InMemoryDatabase {
    fn auctions(&self) -> MutexGuard<'_, Auctions> {
        self.auctions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn add_auction(&self, auction: &entities::Auction) -> anyhow::Result<()> {
        let mut auctions = self.auctions();
        if auctions.contains_key(&auction.id) {
            return Err(anyhow::anyhow!("Duplicate auction id: {}", auction.id));
        }
        auctions.insert(auction.id.clone(), auction.clone());
        Ok(())
    }

    async fn get_auction(
        &self,
        auction_id: &entities::AuctionId,
    ) -> anyhow::Result<Option<entities::Auction>> {
        Ok(self.auctions().get(auction_id).cloned())
    }

    async fn conclude_auction(&self, auction_id: &entities::AuctionId) -> anyhow::Result<bool> {
        match self.auctions().get_mut(auction_id) {
            Some(auction) if auction.is_active() => {
                auction.status = entities::AuctionStatus::Completed;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn update_auction_status(
        &self,
        auction_id: &entities::AuctionId,
        status: entities::AuctionStatus,
    ) -> anyhow::Result<()> {
        if let Some(auction) = self.auctions().get_mut(auction_id) {
            auction.status = status;
        }
        Ok(())
    }

    async fn get_expired_auctions(
        &self,
        created_before: OffsetDateTime,
        limit: i64,
    ) -> anyhow::Result<Vec<entities::Auction>> {
        let mut auctions: Vec<entities::Auction> = self
            .auctions()
            .values()
            .filter(|auction| auction.is_active() && auction.creation_time <= created_before)
            .cloned()
            .collect();
        auctions.sort_by_key(|auction| auction.creation_time);
        auctions.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(auctions)
    }
}
