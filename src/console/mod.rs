pub mod config;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, error, info, warn};

use crate::registry::ModuleRegistry;
use config::ConsoleConfig;

/// Line-based command console on a Unix socket.
///
/// Each received line is routed through the registry (`"<module>
/// <command…>"`). Dispatch failures are answered with an `error: …` line;
/// successful commands produce no acknowledgement — any output they cause
/// arrives asynchronously as a report line, pushed to every connected
/// client.
pub struct Console {
    config: ConsoleConfig,
    registry: Arc<ModuleRegistry>,
    reports: broadcast::Sender<String>,
    shutdown_tx: Option<broadcast::Sender<()>>,
}

impl Console {
    pub fn new(
        config: ConsoleConfig,
        registry: Arc<ModuleRegistry>,
        reports: broadcast::Sender<String>,
    ) -> Self {
        Self {
            config,
            registry,
            reports,
            shutdown_tx: None,
        }
    }

    pub async fn start(&mut self) -> Result<()> {
        if Path::new(&self.config.socket_path).exists() {
            tokio::fs::remove_file(&self.config.socket_path).await?;
        }

        let listener = UnixListener::bind(&self.config.socket_path)?;
        info!("Console listening on: {}", self.config.socket_path);

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        self.shutdown_tx = Some(shutdown_tx);

        let registry = self.registry.clone();
        let reports = self.reports.clone();
        let max_connections = self.config.max_connections;

        tokio::spawn(async move {
            let active_connections = Arc::new(AtomicUsize::new(0));

            loop {
                tokio::select! {
                    accept_result = listener.accept() => {
                        match accept_result {
                            Ok((stream, _addr)) => {
                                if active_connections.load(Ordering::Relaxed) >= max_connections {
                                    warn!("Maximum connections reached, rejecting client");
                                    continue;
                                }

                                active_connections.fetch_add(1, Ordering::Relaxed);
                                debug!("Client connected");

                                let registry = registry.clone();
                                let report_rx = reports.subscribe();
                                let mut shutdown_rx = shutdown_rx.resubscribe();
                                let active_connections = active_connections.clone();

                                tokio::spawn(async move {
                                    if let Err(e) =
                                        Self::handle_client(stream, registry, report_rx, &mut shutdown_rx).await
                                    {
                                        error!("Client handler error: {}", e);
                                    }
                                    active_connections.fetch_sub(1, Ordering::Relaxed);
                                    debug!("Client disconnected");
                                });
                            }
                            Err(e) => {
                                error!("Failed to accept connection: {}", e);
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("Console shutting down");
                        break;
                    }
                }
            }
        });

        Ok(())
    }

    pub async fn shutdown(&self) -> Result<()> {
        if let Some(shutdown_tx) = &self.shutdown_tx {
            let _ = shutdown_tx.send(());
        }

        if Path::new(&self.config.socket_path).exists() {
            tokio::fs::remove_file(&self.config.socket_path).await?;
        }

        info!("Console shutdown complete");
        Ok(())
    }

    async fn handle_client(
        stream: UnixStream,
        registry: Arc<ModuleRegistry>,
        mut report_rx: broadcast::Receiver<String>,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> Result<()> {
        let mut framed = Framed::new(stream, LinesCodec::new());

        loop {
            tokio::select! {
                line_result = framed.next() => {
                    match line_result {
                        Some(Ok(line)) => {
                            debug!("Received command: {}", line);
                            if let Err(e) = registry.dispatch(&line).await {
                                framed.send(format!("error: {}", e)).await?;
                            }
                        }
                        Some(Err(e)) => {
                            error!("Error reading from client: {}", e);
                            break;
                        }
                        None => break,
                    }
                }
                report = report_rx.recv() => {
                    match report {
                        Ok(line) => framed.send(line).await?,
                        // Lagged clients miss reports but stay connected.
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!("Client lagged, {} report lines dropped", missed);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = shutdown_rx.recv() => {
                    debug!("Shutdown signal received, closing client connection");
                    break;
                }
            }
        }

        Ok(())
    }
}
