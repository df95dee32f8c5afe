use tokio::sync::broadcast;
use tracing::info;

#[cfg(not(unix))]
use tracing::error;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Shutdown signal types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    /// User interrupt or termination request; stop after the current draw
    Interrupt,
}

/// Setup signal handlers for the render loop
///
/// Returns a broadcast sender for shutdown signals and a join handle for the
/// signal task. Handlers are registered before this function returns, so a
/// signal delivered right afterwards is not lost.
///
/// Handles:
/// - SIGINT/SIGTERM: stop watching
#[cfg(unix)]
pub fn setup_signal_handlers() -> std::io::Result<(
    broadcast::Sender<ShutdownSignal>,
    tokio::task::JoinHandle<()>,
)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {
                info!("SIGINT received, stopping");
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, stopping");
            }
        }
        let _ = tx_clone.send(ShutdownSignal::Interrupt);
    });

    Ok((shutdown_tx, handle))
}

/// Windows placeholder - only Ctrl+C is supported
#[cfg(not(unix))]
pub fn setup_signal_handlers() -> std::io::Result<(
    broadcast::Sender<ShutdownSignal>,
    tokio::task::JoinHandle<()>,
)> {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, stopping");
                let _ = tx_clone.send(ShutdownSignal::Interrupt);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    });

    Ok((shutdown_tx, handle))
}
