//! Standalone REST API server for the blood bank.
//!
//! Configuration comes from the environment:
//! - `BLOODBANK_REST_ADDR` - listen address (default `0.0.0.0:3000`)
//! - `BLOODBANK_DONATION_INTERVAL_DAYS` - days between donations (default 56)
//! - `BLOODBANK_EXPIRY_WARNING_DAYS` - expiry warning window (default 7)
//! - `BLOODBANK_QC_REQUIRED` - quality control gate on allocation (default true)

use std::sync::Arc;

use api_rest::{build_router, AppState};
use bloodbank_core::{
    config::{bool_from_env_value, days_from_env_value},
    constants::{DEFAULT_DONATION_INTERVAL_DAYS, DEFAULT_EXPIRY_WARNING_DAYS},
    BankStore, CoreConfig,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("bloodbank_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("BLOODBANK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting blood bank REST API on {}", addr);

    let donation_interval_days = days_from_env_value(
        std::env::var("BLOODBANK_DONATION_INTERVAL_DAYS").ok(),
        DEFAULT_DONATION_INTERVAL_DAYS,
    )?;
    let expiry_warning_days = days_from_env_value(
        std::env::var("BLOODBANK_EXPIRY_WARNING_DAYS").ok(),
        DEFAULT_EXPIRY_WARNING_DAYS,
    )?;
    let qc_required = bool_from_env_value(std::env::var("BLOODBANK_QC_REQUIRED").ok(), true)?;

    let cfg = Arc::new(CoreConfig::new(
        donation_interval_days,
        expiry_warning_days,
        qc_required,
    )?);
    let state = AppState::new(cfg, Arc::new(BankStore::new()));

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
