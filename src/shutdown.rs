//! Graceful shutdown handling.
//!
//! SIGINT and SIGTERM flip a watch channel; `main` waits on it alongside the
//! transport and then closes the connection pool.

use crate::constants::SHUTDOWN_CLOSE_TIMEOUT;
use crate::database::{close_pool, ConnectionPool};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Shutdown signal that can be awaited.
#[derive(Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Wait for the shutdown signal.
    pub async fn recv(&mut self) {
        let _ = self.receiver.wait_for(|&v| v).await;
    }
}

/// Controller for managing graceful shutdown.
pub struct ShutdownController {
    sender: watch::Sender<bool>,
    shutting_down: Arc<AtomicBool>,

    /// Upper bound on waiting for pooled connections to close.
    close_timeout: Duration,
}

impl ShutdownController {
    /// Create a new shutdown controller with the default close timeout.
    pub fn new() -> Self {
        Self::with_close_timeout(SHUTDOWN_CLOSE_TIMEOUT)
    }

    /// Create a shutdown controller with a custom close timeout.
    pub fn with_close_timeout(close_timeout: Duration) -> Self {
        let (sender, _) = watch::channel(false);

        Self {
            sender,
            shutting_down: Arc::new(AtomicBool::new(false)),
            close_timeout,
        }
    }

    /// Get a shutdown signal receiver.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            receiver: self.sender.subscribe(),
        }
    }

    /// Check if shutdown is in progress.
    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::SeqCst)
    }

    /// Initiate shutdown. Only the first call has an effect.
    pub fn shutdown(&self) {
        if self
            .shutting_down
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Shutting down MySQL MCP server...");
            let _ = self.sender.send(true);
        }
    }

    /// Close the pool, waiting at most `close_timeout` for in-flight queries.
    pub async fn graceful_shutdown(&self, pool: &ConnectionPool) {
        self.shutdown();

        info!("Closing database connections...");
        if tokio::time::timeout(self.close_timeout, close_pool(pool))
            .await
            .is_err()
        {
            warn!(
                "Connections still busy after {:?}, abandoning them",
                self.close_timeout
            );
        }

        info!("Graceful shutdown complete");
    }

    /// Get the close timeout.
    pub fn close_timeout(&self) -> Duration {
        self.close_timeout
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared shutdown controller type.
pub type SharedShutdownController = Arc<ShutdownController>;

/// Create a new shared shutdown controller.
pub fn new_shutdown_controller() -> SharedShutdownController {
    Arc::new(ShutdownController::new())
}

/// Install handlers for SIGINT (Ctrl+C) and, on Unix, SIGTERM.
///
/// When a signal is received, the shutdown controller is triggered.
pub async fn install_signal_handlers(controller: SharedShutdownController) {
    let ctrl_c_controller = controller.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl+C, initiating shutdown...");
                ctrl_c_controller.shutdown();
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C signal: {}", e);
            }
        }
    });

    #[cfg(unix)]
    {
        let term_controller = controller;
        tokio::spawn(async move {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                    info!("Received SIGTERM, initiating shutdown...");
                    term_controller.shutdown();
                }
                Err(e) => {
                    error!("Failed to install SIGTERM handler: {}", e);
                }
            }
        });
    }
}
