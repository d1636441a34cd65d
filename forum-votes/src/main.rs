use dotenv::dotenv;
use forum_votes::telemetry::init_tracing;
use forum_votes::{Config, Dependencies, LogFormat, ServiceError};
use tracing::{error, info, warn};

/// Main entry point of the forum votes service.
///
/// Loads the configuration, connects to and migrates the database, then
/// audits the denormalized vote counters before reporting readiness.
#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    dotenv().ok();

    init_tracing(LogFormat::from_env())?;

    info!(
        service_name = "forum-votes",
        service_version = env!("CARGO_PKG_VERSION"),
        "Starting forum votes service"
    );

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e);
        }
    };

    let dependencies = match Dependencies::new(&config).await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let report = dependencies.auditor.run(config.audit_repair).await?;
    if report.is_clean() {
        info!(items_checked = report.items_checked, "Vote counters are consistent");
    } else if report.repaired {
        info!(
            items_checked = report.items_checked,
            drifted = report.drifted.len(),
            orphans_removed = report.orphans_removed,
            "Vote counters repaired"
        );
    } else {
        warn!(
            items_checked = report.items_checked,
            drifted = report.drifted.len(),
            orphans_found = report.orphans_found,
            "Vote counters drifted from vote records; set AUDIT_REPAIR=true to repair"
        );
    }

    info!("Forum votes service ready");
    dependencies.pool.close().await;
    Ok(())
}
