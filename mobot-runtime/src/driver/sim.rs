use std::sync::{Arc, Mutex};

use crate::core::VelocityCommand;

use super::CommandSink;

/// Simulated drive.
///
/// Commands are traced and optionally recorded.
#[derive(Default)]
pub struct SimDrive {
    history: Option<Arc<Mutex<Vec<VelocityCommand>>>>,
}

impl SimDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simulated drive that records every command.
    pub fn with_history() -> (Self, Arc<Mutex<Vec<VelocityCommand>>>) {
        let history = Arc::new(Mutex::new(Vec::new()));

        (
            Self {
                history: Some(history.clone()),
            },
            history,
        )
    }
}

#[async_trait::async_trait]
impl CommandSink for SimDrive {
    async fn send(&mut self, command: &VelocityCommand) -> std::io::Result<()> {
        log::trace!("Drive: {}", command);

        if let Some(history) = &self.history {
            if let Ok(mut history) = history.lock() {
                history.push(*command);
            }
        }

        Ok(())
    }
}
