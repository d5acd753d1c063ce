use std::sync::Arc;

use crate::{config::Config, domain_events::TracingEventSink};
use abacus_core::{
    assets::{AssetService, AssetServiceTrait},
    ledger::{LedgerEngine, LedgerServiceTrait},
    portfolios::{PortfolioService, PortfolioServiceTrait},
    valuation::{ValuationService, ValuationServiceTrait},
};
use abacus_storage_sqlite::{
    db, AssetRepository, HoldingRepository, LedgerRepository, PortfolioRepository,
    PriceRepository, SqliteLedgerExecutor,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub portfolio_service: Arc<dyn PortfolioServiceTrait>,
    pub asset_service: Arc<dyn AssetServiceTrait>,
    pub ledger_service: Arc<dyn LedgerServiceTrait>,
    pub valuation_service: Arc<dyn ValuationServiceTrait>,
}

pub fn init_tracing() {
    let fmt_layer = fmt::layer().json().with_current_span(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let portfolio_repository = Arc::new(PortfolioRepository::new(pool.clone(), writer.clone()));
    let asset_repository = Arc::new(AssetRepository::new(pool.clone(), writer.clone()));
    let price_repository = Arc::new(PriceRepository::new(pool.clone(), writer.clone()));
    let holding_repository = Arc::new(HoldingRepository::new(pool.clone()));
    let ledger_repository = Arc::new(LedgerRepository::new(pool.clone()));

    let portfolio_service = Arc::new(PortfolioService::new(portfolio_repository.clone()));
    let asset_service = Arc::new(AssetService::new(
        asset_repository.clone(),
        price_repository.clone(),
    ));
    let ledger_service = Arc::new(LedgerEngine::new(
        SqliteLedgerExecutor::new(writer),
        price_repository.clone(),
        portfolio_repository.clone(),
        asset_repository.clone(),
        holding_repository.clone(),
        ledger_repository,
        Arc::new(TracingEventSink::new()),
    ));
    let valuation_service = Arc::new(ValuationService::new(
        portfolio_repository,
        holding_repository,
        asset_repository,
        price_repository,
    ));

    Ok(Arc::new(AppState {
        portfolio_service,
        asset_service,
        ledger_service,
        valuation_service,
    }))
}
