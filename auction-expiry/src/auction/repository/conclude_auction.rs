use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    #[tracing::instrument(skip_all, name = "conclude_auction_repo", fields(auction_id))]
    pub async fn conclude_auction(
        &self,
        auction_id: &entities::AuctionId,
    ) -> anyhow::Result<entities::CloseOutcome> {
        tracing::Span::current().record("auction_id", auction_id.as_str());
        match self.db.conclude_auction(auction_id).await? {
            true => Ok(entities::CloseOutcome::Transitioned),
            false => Ok(entities::CloseOutcome::AlreadyClosed),
        }
    }
}
