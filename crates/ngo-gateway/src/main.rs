mod auth;
mod error;
mod routes;

use std::net::SocketAddr;

use anyhow::Result as AnyResult;
use axum::Router;
use ngo_orchestrator::StockTransferService;
use ngo_platform::{
    PgDirectory, PgStore, ServiceConfig, StaticTokenVerifier, connect_database, run_migrations,
};
use ngo_store::{InMemoryDirectory, InMemoryStore};
use tracing::{info, warn};

use crate::routes::{AppState, build_router};

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "ngo_gateway=info,tower_http=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;
    let verifier = StaticTokenVerifier::new(config.admin_api_token.clone());

    let router = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = connect_database(database_url).await?;
            run_migrations(&pool).await?;
            info!("postgres backend ready");

            let service =
                StockTransferService::new(PgStore::new(pool.clone()), PgDirectory::new(pool));
            build_router(AppState::new(service, verifier))
        }
        None => {
            warn!("DATABASE_URL not set; state is process-local and lost on restart");
            let service = StockTransferService::new(InMemoryStore::new(), memory_directory(&config));
            build_router(AppState::new(service, verifier))
        }
    };

    serve(router, &config.http_addr).await
}

fn memory_directory(config: &ServiceConfig) -> InMemoryDirectory {
    let directory = config
        .memory_schools
        .iter()
        .fold(InMemoryDirectory::new(), |directory, (id, name)| {
            directory.with_school(id, name)
        });
    config
        .memory_students
        .iter()
        .fold(directory, |directory, id| directory.with_student(id))
}

async fn serve(router: Router, http_addr: &str) -> AnyResult<()> {
    let addr: SocketAddr = http_addr.parse()?;
    info!("gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
