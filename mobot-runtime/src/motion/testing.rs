use std::sync::{Arc, Mutex};

use crate::{
    core::{Alarm, VelocityCommand},
    driver::CommandSink,
};

/// Recording sink with optional alarm trip and failure points.
pub(crate) struct TestSink {
    history: Arc<Mutex<Vec<VelocityCommand>>>,
    trip: Option<(Alarm, usize)>,
    fail_after: Option<usize>,
    fail_at: Option<usize>,
    attempts: usize,
}

impl TestSink {
    pub(crate) fn new() -> (Self, Arc<Mutex<Vec<VelocityCommand>>>) {
        let history = Arc::new(Mutex::new(Vec::new()));

        (
            Self {
                history: history.clone(),
                trip: None,
                fail_after: None,
                fail_at: None,
                attempts: 0,
            },
            history,
        )
    }

    /// Assert the alarm once this many non-zero commands were sent.
    pub(crate) fn trip_after(mut self, alarm: Alarm, count: usize) -> Self {
        self.trip = Some((alarm, count));
        self
    }

    /// Fail every send once this many commands were sent.
    pub(crate) fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Fail only the send with this zero based attempt index.
    pub(crate) fn fail_at(mut self, attempt: usize) -> Self {
        self.fail_at = Some(attempt);
        self
    }
}

#[async_trait::async_trait]
impl CommandSink for TestSink {
    async fn send(&mut self, command: &VelocityCommand) -> std::io::Result<()> {
        let mut history = self.history.lock().unwrap();

        let attempt = self.attempts;
        self.attempts += 1;

        if self.fail_at == Some(attempt) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "datagram lost",
            ));
        }

        if let Some(limit) = self.fail_after {
            if history.len() >= limit {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "drive unreachable",
                ));
            }
        }

        history.push(*command);

        if let Some((alarm, count)) = &self.trip {
            if history.iter().filter(|c| !c.is_zero()).count() == *count {
                alarm.set(true);
            }
        }

        Ok(())
    }
}

/// Count moving and zero commands.
pub(crate) fn split_counts(history: &[VelocityCommand]) -> (usize, usize) {
    let moving = history.iter().filter(|c| !c.is_zero()).count();

    (moving, history.len() - moving)
}
