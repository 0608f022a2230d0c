use std::time::Duration;

use crate::{
    config::MotionConfig,
    core::{Pose, VelocityCommand},
    driver::CommandSink,
};

/// Velocity command channel.
///
/// Holds the current command and publishes it to the sink once per tick.
/// Every tick advances the dead reckoned pose and then waits one sample
/// period.
pub struct VelocityChannel {
    command: VelocityCommand,
    sink: Box<dyn CommandSink>,
    sample_dt: f64,
    sample_interval: Duration,
    halt_ticks: usize,
    pose: Pose,
}

impl VelocityChannel {
    pub fn new(config: &MotionConfig, sink: Box<dyn CommandSink>) -> Self {
        Self {
            command: VelocityCommand::zero(),
            sink,
            sample_dt: config.sample_dt,
            sample_interval: config.sample_interval(),
            halt_ticks: config.halt_ticks,
            pose: Pose::default(),
        }
    }

    /// Replace the current command without publishing it.
    #[inline]
    pub fn set(&mut self, linear_x: f64, angular_z: f64) {
        self.command = VelocityCommand::new(linear_x, angular_z);
    }

    #[inline]
    pub fn command(&self) -> VelocityCommand {
        self.command
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Publish the current command once and sleep one sample period.
    pub async fn publish_tick(&mut self) -> std::io::Result<()> {
        self.sink.send(&self.command).await?;
        self.pose.integrate(&self.command, self.sample_dt);

        tokio::time::sleep(self.sample_interval).await;

        Ok(())
    }

    /// Zero the command and publish it for a full halt pulse train.
    ///
    /// A failed send does not cut the train short. Every tick is attempted
    /// and the first error is returned once the train is done.
    pub async fn halt(&mut self) -> std::io::Result<()> {
        self.command = VelocityCommand::zero();

        let mut result = Ok(());

        for tick in 0..self.halt_ticks {
            if let Err(e) = self.publish_tick().await {
                log::warn!("Halt tick {} lost: {}", tick, e);

                if result.is_ok() {
                    result = Err(e);
                }

                tokio::time::sleep(self.sample_interval).await;
            }
        }

        result
    }
}
