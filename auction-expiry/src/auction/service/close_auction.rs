use {
    super::Service,
    crate::auction::entities::{
        self,
        ClosingStrategy,
    },
};

pub struct CloseAuctionInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    /// Moves the auction from active to completed. Safe to call any number of times,
    /// concurrently or not: exactly one call observes `Transitioned`, every other call
    /// (including calls for unknown ids) observes `AlreadyClosed`.
    /// Store failures are returned as errors and are never retried here.
    #[tracing::instrument(skip_all, fields(auction_id, outcome))]
    pub async fn close_auction(
        &self,
        input: CloseAuctionInput,
    ) -> anyhow::Result<entities::CloseOutcome> {
        let auction_id = input.auction_id;
        tracing::Span::current().record("auction_id", auction_id.as_str());
        tracing::info!(strategy = %self.config.closing_strategy, "Closing auction");

        let result = match self.config.closing_strategy {
            ClosingStrategy::ConditionalUpdate => self.repo.conclude_auction(&auction_id).await,
            ClosingStrategy::KeyedLock => self.close_auction_with_lock(&auction_id).await,
        };
        match &result {
            Ok(outcome) => {
                tracing::Span::current().record("outcome", tracing::field::display(outcome));
                match outcome {
                    entities::CloseOutcome::Transitioned => tracing::info!("Auction completed"),
                    entities::CloseOutcome::AlreadyClosed => {
                        tracing::info!("Auction already closed or not found")
                    }
                }
            }
            Err(err) => tracing::error!(error = ?err, "Failed to close auction"),
        }
        result
    }

    async fn close_auction_with_lock(
        &self,
        auction_id: &entities::AuctionId,
    ) -> anyhow::Result<entities::CloseOutcome> {
        let lock = self
            .repo
            .get_or_create_in_memory_auction_lock(auction_id)
            .await;
        let result = {
            let _guard = lock.lock().await;
            self.close_auction_for_lock(auction_id).await
        };
        drop(lock);
        self.repo.remove_in_memory_auction_lock(auction_id).await;
        result
    }

    // NOTE: The caller must hold the auction lock for `auction_id`.
    async fn close_auction_for_lock(
        &self,
        auction_id: &entities::AuctionId,
    ) -> anyhow::Result<entities::CloseOutcome> {
        match self.repo.get_auction(auction_id).await? {
            Some(auction) if auction.is_active() => {
                self.repo
                    .update_auction_status(auction_id, entities::AuctionStatus::Completed)
                    .await?;
                Ok(entities::CloseOutcome::Transitioned)
            }
            _ => Ok(entities::CloseOutcome::AlreadyClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::repository::MockDatabase,
        futures::future::join_all,
        std::collections::HashMap,
    };

    const CLOSERS_PER_AUCTION: usize = 5;

    async fn close(service: &Service, auction_id: &str) -> anyhow::Result<entities::CloseOutcome> {
        service
            .close_auction(CloseAuctionInput {
                auction_id: auction_id.to_string(),
            })
            .await
    }

    async fn assert_single_winner_per_auction(closing_strategy: ClosingStrategy) {
        let service = Service::new_in_memory(closing_strategy);
        let auction_ids: Vec<String> = (0..10).map(|i| format!("auction_{i}")).collect();
        for auction_id in auction_ids.iter() {
            service.insert_active_auction(auction_id).await;
        }

        let handles = auction_ids
            .iter()
            .flat_map(|auction_id| std::iter::repeat(auction_id.clone()).take(CLOSERS_PER_AUCTION))
            .map(|auction_id| {
                let service = service.clone();
                tokio::spawn(async move {
                    let outcome = close(&service, &auction_id).await;
                    (auction_id, outcome)
                })
            });
        let results = join_all(handles).await;

        let mut transitions: HashMap<String, usize> = HashMap::new();
        for result in results {
            let (auction_id, outcome) = result.unwrap();
            let counter = transitions.entry(auction_id).or_default();
            match outcome.unwrap() {
                entities::CloseOutcome::Transitioned => *counter += 1,
                entities::CloseOutcome::AlreadyClosed => {}
            }
        }

        for auction_id in auction_ids.iter() {
            assert_eq!(transitions[auction_id], 1, "auction {auction_id}");
            assert_eq!(
                service.get_status(auction_id).await,
                Some(entities::AuctionStatus::Completed)
            );
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_close_has_single_winner() {
        assert_single_winner_per_auction(ClosingStrategy::ConditionalUpdate).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_close_has_single_winner_with_keyed_lock() {
        assert_single_winner_per_auction(ClosingStrategy::KeyedLock).await;
    }

    #[tokio::test]
    async fn test_close_twice() {
        for closing_strategy in [ClosingStrategy::ConditionalUpdate, ClosingStrategy::KeyedLock] {
            let service = Service::new_in_memory(closing_strategy);
            service.insert_active_auction("A1").await;

            assert_eq!(
                close(&service, "A1").await.unwrap(),
                entities::CloseOutcome::Transitioned
            );
            for _ in 0..3 {
                assert_eq!(
                    close(&service, "A1").await.unwrap(),
                    entities::CloseOutcome::AlreadyClosed
                );
                assert_eq!(
                    service.get_status("A1").await,
                    Some(entities::AuctionStatus::Completed)
                );
            }
        }
    }

    #[tokio::test]
    async fn test_close_unknown_auction() {
        for closing_strategy in [ClosingStrategy::ConditionalUpdate, ClosingStrategy::KeyedLock] {
            let service = Service::new_in_memory(closing_strategy);
            assert_eq!(
                close(&service, "nonexistent").await.unwrap(),
                entities::CloseOutcome::AlreadyClosed
            );
            assert_eq!(service.get_status("nonexistent").await, None);
        }
    }

    #[tokio::test]
    async fn test_close_releases_keyed_lock() {
        let service = Service::new_in_memory(ClosingStrategy::KeyedLock);
        service.insert_active_auction("A1").await;
        close(&service, "A1").await.unwrap();
        assert!(service
            .repo
            .in_memory_store
            .auction_lock
            .lock()
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_close_store_error() {
        let mut db = MockDatabase::new();
        db.expect_conclude_auction()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("connection refused")));
        let service = Service::new_with_mocks(db, ClosingStrategy::ConditionalUpdate);

        let err = close(&service, "A1").await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_close_store_error_with_keyed_lock() {
        let mut db = MockDatabase::new();
        db.expect_get_auction().times(1).returning(|auction_id| {
            Ok(Some(entities::Auction::new(Some(auction_id.clone()))))
        });
        db.expect_update_auction_status()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("connection reset")));
        let service = Service::new_with_mocks(db, ClosingStrategy::KeyedLock);

        assert!(close(&service, "A1").await.is_err());
        assert!(service
            .repo
            .in_memory_store
            .auction_lock
            .lock()
            .await
            .is_empty());
    }
}
