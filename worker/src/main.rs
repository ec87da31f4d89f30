use anyhow::Result;
use crates::domain::repositories::sweep::SweepRepository;
use crates::infra::db::{postgres::postgres_connection, repositories::sweep::SweepPostgres};
use std::sync::Arc;
use tracing::error;
use tracing::info;
use worker::{axum_http, config, services, usecases::expire_access::ExpireAccessUseCase};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(error) = run().await {
        error!("Worker exited with error: {}", error);
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("worker")?;

    let dotenvy_env = Arc::new(config::config_loader::load()?);
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let db_pool_arc = Arc::new(postgres_pool);

    let sweep_repository: Arc<dyn SweepRepository + Send + Sync> =
        Arc::new(SweepPostgres::new(Arc::clone(&db_pool_arc)));

    let expire_access_usecase = Arc::new(ExpireAccessUseCase::new(Arc::clone(&sweep_repository)));

    let sweeper_loop = tokio::spawn(services::sweeper_loop::run(
        Arc::clone(&dotenvy_env),
        Arc::clone(&expire_access_usecase),
    ));

    let server_config = Arc::clone(&dotenvy_env);
    let server_usecase = Arc::clone(&expire_access_usecase);
    let http_server =
        tokio::spawn(
            async move { axum_http::http_serve::start(server_config, server_usecase).await },
        );

    tokio::select! {
        result = sweeper_loop => result??,
        result = http_server => result??,
    };
    Ok(())
}
