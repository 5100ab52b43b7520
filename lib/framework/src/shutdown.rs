use tokio::signal;
use tokio::sync::broadcast;
use tracing::info;
use tracing::warn;

pub struct Shutdown {
    sender: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Broadcasts to all subscribers once SIGINT or SIGTERM is received.
    pub fn listen(self) {
        tokio::spawn(async move {
            wait_for_signal().await;
            info!("received shutdown signal");
            if self.sender.send(()).is_err() {
                warn!("no shutdown subscribers");
            }
        });
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    let mut terminate = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
        Ok(terminate) => terminate,
        Err(e) => {
            warn!(error = ?e, "failed to listen to SIGTERM");
            wait_for_ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        () = wait_for_ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = ?e, "failed to listen to ctrl-c");
        std::future::pending::<()>().await;
    }
}
