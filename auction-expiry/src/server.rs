use {
    crate::{
        auction::service::{
            add_auction::AddAuctionInput,
            close_auction::CloseAuctionInput,
            get_auction::GetAuctionInput,
            Service,
        },
        config::{
            AuctionOptions,
            Config,
            CreateOptions,
            RunOptions,
        },
        kernel::db,
    },
    anyhow::anyhow,
    std::{
        sync::atomic::{
            AtomicBool,
            Ordering,
        },
        time::Duration,
    },
    tokio_util::task::TaskTracker,
};

async fn build_service(
    run_options: &RunOptions,
    task_tracker: TaskTracker,
) -> anyhow::Result<Service> {
    let config = Config::load(&run_options.config.config).map_err(|err| {
        anyhow!(
            "Failed to load config from file({path}): {:?}",
            err,
            path = run_options.config.config
        )
    })?;
    tracing::info!(config = ?config, "Loaded config");

    let db = db::connect(&run_options.server.database_url).await?;
    Ok(Service::new(db, config.into(), task_tracker))
}

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    tokio::spawn(async move {
        tracing::info!("Registered shutdown signal handler...");
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?err, "Failed to listen for the shutdown signal");
        }
        tracing::info!("Shut down signal received, waiting for tasks...");
        SHOULD_EXIT.store(true, Ordering::Release);
    });

    let task_tracker = TaskTracker::new();
    let service = build_service(&run_options, task_tracker.clone()).await?;
    service.run_expiry_sweeper().await?;

    // Wait for all closures to finish
    task_tracker.close();
    task_tracker.wait().await;
    Ok(())
}

pub async fn create_auction(options: CreateOptions) -> anyhow::Result<()> {
    let task_tracker = TaskTracker::new();
    let service = build_service(&options.run, task_tracker.clone()).await?;
    let auction = service
        .add_auction(AddAuctionInput {
            auction_id: options.auction_id,
        })
        .await?;
    println!("Created auction {}", auction.id);

    // Keep the process alive until the armed closure has run.
    task_tracker.close();
    task_tracker.wait().await;
    print_status(&service, auction.id).await
}

pub async fn close_auction(options: AuctionOptions) -> anyhow::Result<()> {
    let service = build_service(&options.run, TaskTracker::new()).await?;
    let outcome = service
        .close_auction(CloseAuctionInput {
            auction_id: options.auction_id.clone(),
        })
        .await?;
    println!("{}: {}", options.auction_id, outcome);
    Ok(())
}

pub async fn get_auction_status(options: AuctionOptions) -> anyhow::Result<()> {
    let service = build_service(&options.run, TaskTracker::new()).await?;
    print_status(&service, options.auction_id).await
}

async fn print_status(service: &Service, auction_id: String) -> anyhow::Result<()> {
    match service
        .get_auction(GetAuctionInput {
            auction_id: auction_id.clone(),
        })
        .await?
    {
        Some(auction) => println!("{}: {}", auction.id, auction.status),
        None => println!("{auction_id}: not found"),
    }
    Ok(())
}

// A static exit flag to indicate to running threads that we're shutting down. This is used to
// gracefully shutdown the application.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
