use tokio::sync::{broadcast, mpsc};

use crate::{
    config::MotionConfig,
    core::{Alarm, ExecutionResult, Feedback, MotionGoal, Outcome, Pose},
    driver::CommandSink,
    runtime::{Error, Result},
};

use super::{Executor, Primitive};

/// Goal sequencer.
///
/// Executes the steps of a goal in order, a spin followed by a move for
/// each (angle, distance) pair. A primitive canceled by the alarm does not
/// fail the goal. Only shutdown and sink failure do.
pub struct Sequencer {
    executor: Executor,
}

impl Sequencer {
    pub fn new(config: MotionConfig, sink: Box<dyn CommandSink>, alarm: Alarm) -> Self {
        Self {
            executor: Executor::new(config, sink, alarm),
        }
    }

    /// Abort the running goal and refuse all later goals on shutdown.
    pub fn with_shutdown(mut self, shutdown: broadcast::Receiver<()>) -> Self {
        self.executor = self.executor.with_shutdown(shutdown);
        self
    }

    /// Dead reckoned pose since startup.
    #[inline]
    pub fn pose(&self) -> Pose {
        self.executor.pose()
    }

    /// Issue a halt pulse train outside of a goal.
    pub async fn halt(&mut self) -> Result {
        self.executor.halt().await
    }

    /// Execute a goal to completion.
    ///
    /// Feedback is emitted after each primitive if a channel is given. A full
    /// feedback channel drops the report rather than stall the motion.
    pub async fn execute(
        &mut self,
        goal: &MotionGoal,
        feedback: Option<&mpsc::Sender<Feedback>>,
    ) -> Result<ExecutionResult> {
        if let Err(e) = goal.validate() {
            log::warn!("Goal rejected: {}", e);
            return Err(e);
        }

        if self.executor.is_aborted() {
            log::warn!("Goal rejected: runtime is shutting down");
            return Err(Error::Aborted);
        }

        log::info!("Executing goal with {} steps", goal.len());
        log::debug!("{}", goal);

        match self.run(goal, feedback).await {
            Ok(()) => {
                log::info!("Goal succeeded; {}", self.pose());
                Ok(ExecutionResult::succeeded())
            }
            Err(e) => {
                log::error!("Goal failed: {}", e);
                Err(e)
            }
        }
    }

    async fn run(
        &mut self,
        goal: &MotionGoal,
        feedback: Option<&mpsc::Sender<Feedback>>,
    ) -> Result {
        let total = u16::try_from(goal.len()).unwrap_or(u16::MAX);

        for (step, (angle, distance)) in goal.steps().enumerate() {
            let step = u16::try_from(step).unwrap_or(u16::MAX);

            for primitive in [Primitive::Spin(angle), Primitive::Move(distance)] {
                let outcome = self.executor.execute(primitive).await?;

                if let Some(feedback) = feedback {
                    let report = Feedback {
                        step,
                        total,
                        phase: primitive.phase(),
                        outcome,
                        pose: self.executor.pose(),
                    };

                    if feedback.try_send(report).is_err() {
                        log::debug!("Feedback dropped for step {}", step + 1);
                    }
                }

                if outcome == Outcome::Aborted {
                    return Err(Error::Aborted);
                }
            }
        }

        self.executor.halt().await
    }
}
