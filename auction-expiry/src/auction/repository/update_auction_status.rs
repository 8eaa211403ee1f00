use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    // NOTE: Only safe while holding the lock returned by `get_or_create_in_memory_auction_lock`.
    pub async fn update_auction_status(
        &self,
        auction_id: &entities::AuctionId,
        status: entities::AuctionStatus,
    ) -> anyhow::Result<()> {
        self.db.update_auction_status(auction_id, status).await
    }
}
