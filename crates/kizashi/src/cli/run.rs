//! The `run` command.

use kizashi::{KizashiConfig, KizashiResult, Scheduler, build_pipeline};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

/// Run one cycle, or the scheduler until Ctrl-C.
pub async fn run_bot(config: &KizashiConfig, once: bool) -> KizashiResult<()> {
    config.validate()?;
    let pipeline = Arc::new(build_pipeline(config).await?);

    if once {
        let summary = pipeline.run_cycle().await?;
        println!("{}", summary);
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Interrupt received, shutting down"),
            Err(e) => error!(error = %e, "Failed to listen for interrupt"),
        }
        let _ = shutdown_tx.send(true);
    });

    let scheduler = Scheduler::new(config.interval(), config.schedule.run_on_start);
    scheduler.run(pipeline, shutdown_rx).await;
    Ok(())
}
