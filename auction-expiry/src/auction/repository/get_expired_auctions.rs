use {
    super::Repository,
    crate::auction::entities,
    std::time::Duration,
    time::OffsetDateTime,
};

/// Creation time at or before which an auction is overdue.
/// `None` when the delay reaches past the earliest representable date.
pub fn expiry_cutoff(now: OffsetDateTime, expiration_delay: Duration) -> Option<OffsetDateTime> {
    let expiration_delay = time::Duration::try_from(expiration_delay).ok()?;
    now.checked_sub(expiration_delay)
}

impl Repository {
    /// Active auctions created at least `expiration_delay` ago, oldest first.
    pub async fn get_expired_auctions(
        &self,
        expiration_delay: Duration,
        limit: usize,
    ) -> anyhow::Result<Vec<entities::Auction>> {
        let Some(created_before) = expiry_cutoff(OffsetDateTime::now_utc(), expiration_delay)
        else {
            return Ok(vec![]);
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.db.get_expired_auctions(created_before, limit).await
    }
}
