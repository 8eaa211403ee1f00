use {
    super::Service,
    crate::auction::entities,
};

pub struct GetAuctionInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    pub async fn get_auction(
        &self,
        input: GetAuctionInput,
    ) -> anyhow::Result<Option<entities::Auction>> {
        self.repo.get_auction(&input.auction_id).await
    }
}
