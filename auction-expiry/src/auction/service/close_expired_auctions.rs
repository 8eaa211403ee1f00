use super::{
    close_auction::CloseAuctionInput,
    Service,
};

impl Service {
    /// Arms an immediate closure for every active auction whose expiry has already passed.
    /// Covers closures whose in-memory timer was lost, e.g. across a restart.
    /// The closures run on the task tracker and are not awaited here, so a slow store
    /// never holds up the sweeper. Returns the number of closures spawned.
    pub async fn close_expired_auctions(&self) -> anyhow::Result<usize> {
        let auctions = self
            .repo
            .get_expired_auctions(
                self.config.expiration_delay,
                self.config.sweeper.batch_size,
            )
            .await?;
        if auctions.is_empty() {
            return Ok(0);
        }
        tracing::info!(count = auctions.len(), "Closing expired auctions...");

        let count = auctions.len();
        for auction in auctions {
            self.task_tracker.spawn({
                let service = self.clone();
                async move {
                    // Failures are logged by `close_auction`. The next sweep retries.
                    let _ = service
                        .close_auction(CloseAuctionInput {
                            auction_id: auction.id,
                        })
                        .await;
                }
            });
        }
        Ok(count)
    }
}
