//! Postdate server binary
//!
//! Wires the configured store and mail backend into the delivery
//! scheduler, starts the scheduler loop in the background, and serves the
//! HTTP API until ctrl-c.

use postdate::config::AppConfig;
use postdate::scheduler::DeliveryScheduler;
use postdate::{http, notify, store};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> postdate::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let store = store::connect(config.store_driver, &config.redis_url).await?;
    let notifier = notify::build_notifier(&config.mail)?;

    let scheduler = Arc::new(DeliveryScheduler::new(
        store.clone(),
        notifier,
        config.scheduler.clone(),
    ));

    let scheduler_loop = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };

    let routes = http::routes(store, scheduler.clone());
    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(config.bind, async {
        tokio::signal::ctrl_c().await.ok();
    });

    tracing::info!("Server listening on http://{}", addr);
    server.await;

    tracing::info!("Received shutdown signal");
    scheduler.shutdown();
    scheduler_loop.abort();

    tracing::info!("Server stopped");
    Ok(())
}
