use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tracing::info;

use morph_core::connection::HttpProbe;
use morph_core::{AppConfig, ConnectionMonitor};

pub async fn run(config: &AppConfig, once: bool) -> Result<()> {
    let probe = HttpProbe::from_config(&config.connection)?;
    println!("Probing {}", probe.url());

    let monitor = Arc::new(ConnectionMonitor::new(
        Arc::new(probe),
        Duration::from_secs(config.connection.check_interval_secs),
    ));

    if once {
        let state = monitor.check_now().await;
        println!("{}", state);
        return Ok(());
    }

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    // Print every transition as it is published
    let mut state_rx = monitor.subscribe();
    let printer = tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = *state_rx.borrow_and_update();
            println!("{}  {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"), state);
        }
    });

    monitor.on_connected(|_| println!("Connection is up"));

    // Run monitor (blocks until shutdown)
    monitor.clone().run(shutdown_rx).await;

    drop(monitor);
    printer.abort();
    Ok(())
}
