use crate::{config::config_model::DotEnvyConfig, usecases::expire_access::ExpireAccessUseCase};
use anyhow::Result;
use chrono::Utc;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

/// Runs one sweep immediately, then keeps the daily cadence. The manual
/// HTTP trigger shares the same usecase and queue, so the two paths never
/// double-process a job.
pub async fn run(config: Arc<DotEnvyConfig>, usecase: Arc<ExpireAccessUseCase>) -> Result<()> {
    let interval = Duration::from_secs(config.sweep.interval_hours * 60 * 60);
    info!(
        interval_hours = config.sweep.interval_hours,
        "sweeper_loop: started"
    );

    loop {
        if let Err(e) = usecase.run(Utc::now()).await {
            error!("Error while running the expiry sweep: {}", e);
        }

        tokio::time::sleep(interval).await;
    }
}
