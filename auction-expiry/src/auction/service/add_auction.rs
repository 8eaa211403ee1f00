use {
    super::{
        schedule_auction_expiry::ScheduleAuctionExpiryInput,
        Service,
    },
    crate::auction::entities,
};

pub struct AddAuctionInput {
    /// Generated when not provided.
    pub auction_id: Option<entities::AuctionId>,
}

impl Service {
    /// Inserts an active auction and arms its expiry.
    /// Fails only if the insert or the arming fails, never because of the later closure.
    #[tracing::instrument(skip_all, fields(auction_id))]
    pub async fn add_auction(&self, input: AddAuctionInput) -> anyhow::Result<entities::Auction> {
        let auction = self
            .repo
            .add_auction(entities::Auction::new(input.auction_id))
            .await
            .inspect_err(|err| tracing::error!(error = ?err, "Failed to insert auction"))?;
        tracing::Span::current().record("auction_id", auction.id.as_str());

        // If arming fails the auction is left active, the sweeper picks it up once it is due.
        self.schedule_auction_expiry(ScheduleAuctionExpiryInput {
            auction_id: auction.id.clone(),
            delay:      self.config.expiration_delay,
        })?;
        Ok(auction)
    }
}
