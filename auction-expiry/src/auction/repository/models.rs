#[cfg(test)]
use mockall::automock;
use {
    crate::{
        auction::entities,
        kernel::db::DB,
    },
    async_trait::async_trait,
    sqlx::FromRow,
    std::fmt::Debug,
    time::{
        OffsetDateTime,
        PrimitiveDateTime,
        UtcOffset,
    },
    tracing::instrument,
};

#[derive(Clone, Copy, Debug, PartialEq, sqlx::Type)]
#[sqlx(type_name = "auction_status", rename_all = "lowercase")]
pub enum AuctionStatus {
    Active,
    Completed,
}

impl From<AuctionStatus> for entities::AuctionStatus {
    fn from(status: AuctionStatus) -> Self {
        match status {
            AuctionStatus::Active => entities::AuctionStatus::Active,
            AuctionStatus::Completed => entities::AuctionStatus::Completed,
        }
    }
}

impl From<entities::AuctionStatus> for AuctionStatus {
    fn from(status: entities::AuctionStatus) -> Self {
        match status {
            entities::AuctionStatus::Active => AuctionStatus::Active,
            entities::AuctionStatus::Completed => AuctionStatus::Completed,
        }
    }
}

#[derive(Clone, FromRow, Debug)]
#[allow(dead_code)]
pub struct Auction {
    pub id:              entities::AuctionId,
    pub status:          AuctionStatus,
    pub creation_time:   PrimitiveDateTime,
    pub conclusion_time: Option<PrimitiveDateTime>,
}

impl From<Auction> for entities::Auction {
    fn from(auction: Auction) -> Self {
        Self {
            id:            auction.id,
            status:        auction.status.into(),
            creation_time: auction.creation_time.assume_offset(UtcOffset::UTC),
        }
    }
}

fn to_primitive(time: OffsetDateTime) -> PrimitiveDateTime {
    let time = time.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(time.date(), time.time())
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Debug + Send + Sync + 'static {
    async fn add_auction(&self, auction: &entities::Auction) -> anyhow::Result<()>;
    async fn get_auction(
        &self,
        auction_id: &entities::AuctionId,
    ) -> anyhow::Result<Option<entities::Auction>>;
    /// Atomically moves an active auction to completed.
    /// Returns false when no active auction with this id exists.
    async fn conclude_auction(&self, auction_id: &entities::AuctionId) -> anyhow::Result<bool>;
    /// Unconditional status write. Callers must hold the auction lock.
    async fn update_auction_status(
        &self,
        auction_id: &entities::AuctionId,
        status: entities::AuctionStatus,
    ) -> anyhow::Result<()>;
    async fn get_expired_auctions(
        &self,
        created_before: OffsetDateTime,
        limit: i64,
    ) -> anyhow::Result<Vec<entities::Auction>>;
}

#[async_trait]
impl Database for DB {
    #[instrument(
        target = "metrics",
        name = "db_add_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_auction(&self, auction: &entities::Auction) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO auction (id, status, creation_time) VALUES ($1, $2, $3)")
            .bind(&auction.id)
            .bind(AuctionStatus::from(auction.status))
            .bind(to_primitive(auction.creation_time))
            .execute(self)
            .await
            .inspect_err(|_| {
                tracing::Span::current().record("result", "error");
            })?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_auction(
        &self,
        auction_id: &entities::AuctionId,
    ) -> anyhow::Result<Option<entities::Auction>> {
        let auction: Option<Auction> = sqlx::query_as("SELECT * FROM auction WHERE id = $1")
            .bind(auction_id)
            .fetch_optional(self)
            .await
            .inspect_err(|_| {
                tracing::Span::current().record("result", "error");
            })?;
        Ok(auction.map(Into::into))
    }

    #[instrument(
        target = "metrics",
        name = "db_conclude_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "conclude_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn conclude_auction(&self, auction_id: &entities::AuctionId) -> anyhow::Result<bool> {
        // The status filter is what makes concurrent closers safe.
        // Never split this into a read followed by a write.
        let result = sqlx::query(
            "UPDATE auction SET status = $1, conclusion_time = $2 WHERE id = $3 AND status = $4",
        )
        .bind(AuctionStatus::Completed)
        .bind(to_primitive(OffsetDateTime::now_utc()))
        .bind(auction_id)
        .bind(AuctionStatus::Active)
        .execute(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(
        target = "metrics",
        name = "db_update_auction_status",
        fields(
            category = "db_queries",
            result = "success",
            name = "update_auction_status",
            tracing_enabled
        ),
        skip_all
    )]
    async fn update_auction_status(
        &self,
        auction_id: &entities::AuctionId,
        status: entities::AuctionStatus,
    ) -> anyhow::Result<()> {
        let conclusion_time = match status {
            entities::AuctionStatus::Active => None,
            entities::AuctionStatus::Completed => {
                Some(to_primitive(OffsetDateTime::now_utc()))
            }
        };
        sqlx::query("UPDATE auction SET status = $1, conclusion_time = $2 WHERE id = $3")
            .bind(AuctionStatus::from(status))
            .bind(conclusion_time)
            .bind(auction_id)
            .execute(self)
            .await
            .inspect_err(|_| {
                tracing::Span::current().record("result", "error");
            })?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_expired_auctions",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_expired_auctions",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_expired_auctions(
        &self,
        created_before: OffsetDateTime,
        limit: i64,
    ) -> anyhow::Result<Vec<entities::Auction>> {
        let auctions: Vec<Auction> = sqlx::query_as(
            "SELECT * FROM auction WHERE status = $1 AND creation_time <= $2 ORDER BY creation_time ASC LIMIT $3",
        )
        .bind(AuctionStatus::Active)
        .bind(to_primitive(created_before))
        .bind(limit)
        .fetch_all(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })?;
        Ok(auctions.into_iter().map(Into::into).collect())
    }
}
