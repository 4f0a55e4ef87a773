use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_router, AppState};
use bloodbank_core::config::{bool_from_env_value, days_from_env_value};
use bloodbank_core::constants::{DEFAULT_DONATION_INTERVAL_DAYS, DEFAULT_EXPIRY_WARNING_DAYS};
use bloodbank_core::{BankStore, CoreConfig};

/// Main entry point for the blood bank application
///
/// Starts the REST server and serves the full blood bank workflow:
/// donor registration, donation collection and screening, component
/// separation, inventory quality control, and request allocation.
///
/// # Environment Variables
/// - `BLOODBANK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `BLOODBANK_DONATION_INTERVAL_DAYS`: minimum days between donations (default: 56)
/// - `BLOODBANK_EXPIRY_WARNING_DAYS`: expiry warning window in days (default: 7)
/// - `BLOODBANK_QC_REQUIRED`: whether allocation requires passed quality control (default: true)
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bloodbank_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("BLOODBANK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let donation_interval_days = days_from_env_value(
        std::env::var("BLOODBANK_DONATION_INTERVAL_DAYS").ok(),
        DEFAULT_DONATION_INTERVAL_DAYS,
    )?;
    let expiry_warning_days = days_from_env_value(
        std::env::var("BLOODBANK_EXPIRY_WARNING_DAYS").ok(),
        DEFAULT_EXPIRY_WARNING_DAYS,
    )?;
    let qc_required = bool_from_env_value(std::env::var("BLOODBANK_QC_REQUIRED").ok(), true)?;

    tracing::info!("++ Starting blood bank REST on {}", rest_addr);
    tracing::info!(
        donation_interval_days,
        expiry_warning_days,
        qc_required,
        "++ Core configuration loaded"
    );

    let cfg = Arc::new(CoreConfig::new(
        donation_interval_days,
        expiry_warning_days,
        qc_required,
    )?);
    let state = AppState::new(cfg, Arc::new(BankStore::new()));

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
