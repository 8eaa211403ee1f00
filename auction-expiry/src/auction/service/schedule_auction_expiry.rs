use {
    super::{
        close_auction::CloseAuctionInput,
        Service,
    },
    crate::auction::entities,
    anyhow::anyhow,
    std::time::Duration,
    tokio::runtime::Handle,
};

pub struct ScheduleAuctionExpiryInput {
    pub auction_id: entities::AuctionId,
    pub delay:      Duration,
}

impl Service {
    /// Arms a one-shot task that closes the auction once `delay` has elapsed.
    /// Returns as soon as the task is spawned. The outcome of the closure is only logged.
    /// There is no retry and no way to cancel an armed closure.
    pub fn schedule_auction_expiry(&self, input: ScheduleAuctionExpiryInput) -> anyhow::Result<()> {
        let ScheduleAuctionExpiryInput { auction_id, delay } = input;
        if self.task_tracker.is_closed() {
            return Err(anyhow!(
                "Cannot schedule expiry of auction {auction_id}: service is shutting down"
            ));
        }
        let handle = Handle::try_current()
            .map_err(|e| anyhow!("Cannot schedule expiry of auction {auction_id}: {e}"))?;

        tracing::info!(auction_id = %auction_id, delay = ?delay, "Scheduling auction expiry");
        self.task_tracker.spawn_on(
            {
                let service = self.clone();
                async move {
                    tokio::time::sleep(delay).await;
                    let result = service
                        .close_auction(CloseAuctionInput {
                            auction_id: auction_id.clone(),
                        })
                        .await;
                    if let Err(err) = result {
                        tracing::warn!(
                            error = ?err,
                            auction_id = %auction_id,
                            "Scheduled auction expiry failed",
                        );
                    }
                }
            },
            &handle,
        );
        Ok(())
    }
}
