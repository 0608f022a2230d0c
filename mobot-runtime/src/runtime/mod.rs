use tokio::sync::broadcast;

mod error;

pub use self::error::Error;

pub type Result<T = ()> = std::result::Result<T, error::Error>;

pub struct RuntimeContext {
    /// Runtime event bus.
    shutdown: (broadcast::Sender<()>, broadcast::Receiver<()>),
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self {
            shutdown: broadcast::channel(1),
        }
    }

    /// Listen for shutdown signal.
    pub fn shutdown_signal(&self) -> broadcast::Receiver<()> {
        self.shutdown.0.subscribe()
    }

    /// Spawn an asynchronous task in the background.
    ///
    /// The task will be terminated when the shutdown signal is received.
    pub fn spawn_background_task<T>(&self, task: T)
    where
        T: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut shutdown = self.shutdown_signal();

        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::debug!("Shutting down background task");
                }
                _ = task => {}
            }
        });
    }

    /// Trigger shutdown on SIGINT.
    pub fn enable_term_shutdown(&self) {
        let shutdown = self.shutdown.0.clone();

        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for termination: {}", e);
                return;
            }

            log::info!("Termination requested");

            shutdown.send(()).ok();
        });
    }

    /// Request the runtime to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.0.send(()).ok();
    }

    /// Wait for the runtime to shutdown.
    ///
    /// This method will block until the shutdown signal is received.
    pub async fn wait_for_shutdown(&self) {
        let mut shutdown = self.shutdown_signal();

        if let Err(e) = shutdown.recv().await {
            log::warn!("Shutdown signal lost: {}", e);
        }
    }
}
