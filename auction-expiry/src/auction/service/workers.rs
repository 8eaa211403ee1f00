use {
    super::Service,
    crate::server::{
        EXIT_CHECK_INTERVAL,
        SHOULD_EXIT,
    },
    std::sync::atomic::Ordering,
};

impl Service {
    /// Periodically closes overdue active auctions. The first sweep runs right away,
    /// which recovers the closures armed by a previous process.
    pub async fn run_expiry_sweeper(&self) -> anyhow::Result<()> {
        let mut exit_check_interval = tokio::time::interval(EXIT_CHECK_INTERVAL);
        if !self.config.sweeper.enabled {
            tracing::info!("Skipping expired auction sweeper, waiting for shutdown...");
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                exit_check_interval.tick().await;
            }
            return Ok(());
        }
        tracing::info!(
            interval = ?self.config.sweeper.interval,
            expiration_delay = ?self.config.expiration_delay,
            "Starting expired auction sweeper..."
        );
        let mut sweep_interval = tokio::time::interval(self.config.sweeper.interval);

        while !SHOULD_EXIT.load(Ordering::Acquire) {
            tokio::select! {
                _ = sweep_interval.tick() => {
                    match self.close_expired_auctions().await {
                        Ok(0) => {}
                        Ok(scheduled) => {
                            tracing::info!(scheduled, "Scheduled expired auctions for closing")
                        }
                        Err(err) => {
                            tracing::error!(error = ?err, "Failed to close expired auctions")
                        }
                    }
                }
                _ = exit_check_interval.tick() => {}
            }
        }
        tracing::info!("Shutting down expired auction sweeper...");
        Ok(())
    }
}
