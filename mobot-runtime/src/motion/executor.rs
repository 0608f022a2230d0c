use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::{
    config::MotionConfig,
    core::{Alarm, Outcome, Phase, Pose},
    driver::CommandSink,
    math,
    runtime::Result,
};

use super::VelocityChannel;

/// Open loop motion primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    /// Rotate in place by an angle in radians.
    Spin(f64),
    /// Translate along the heading by a distance in meters.
    Move(f64),
}

impl Primitive {
    #[inline]
    pub fn phase(&self) -> Phase {
        match self {
            Primitive::Spin(_) => Phase::Spin,
            Primitive::Move(_) => Phase::Move,
        }
    }

    /// Time budget in seconds at the configured speed.
    pub fn final_time(&self, config: &MotionConfig) -> f64 {
        match self {
            Primitive::Spin(angle) => angle.abs() / config.spin_speed,
            Primitive::Move(distance) => distance.abs() / config.move_speed,
        }
    }

    /// Velocity pair (linear_x, angular_z) held for the whole primitive.
    pub fn command(&self, config: &MotionConfig) -> (f64, f64) {
        match self {
            Primitive::Spin(angle) => (0.0, math::sign(*angle) * config.spin_speed),
            Primitive::Move(distance) => (math::sign(*distance) * config.move_speed, 0.0),
        }
    }

    /// Whether the proximity alarm may cut this primitive short.
    pub fn is_interruptible(&self, config: &MotionConfig) -> bool {
        match self {
            Primitive::Spin(_) => config.spin_interruptible,
            Primitive::Move(_) => true,
        }
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Primitive::Spin(angle) => write!(f, "Spin {:.3} rad", angle),
            Primitive::Move(distance) => write!(f, "Move {:.3} m", distance),
        }
    }
}

/// Primitive motion executor.
///
/// Runs one primitive at a time on the velocity channel it owns. Every
/// primitive ends in a halt pulse train, whatever stopped it.
pub struct Executor {
    channel: VelocityChannel,
    alarm: Alarm,
    config: MotionConfig,
    shutdown: Option<broadcast::Receiver<()>>,
    aborted: bool,
}

impl Executor {
    pub fn new(config: MotionConfig, sink: Box<dyn CommandSink>, alarm: Alarm) -> Self {
        Self {
            channel: VelocityChannel::new(&config, sink),
            alarm,
            config,
            shutdown: None,
            aborted: false,
        }
    }

    /// Abort running primitives when the shutdown signal is raised.
    pub fn with_shutdown(mut self, shutdown: broadcast::Receiver<()>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Whether a shutdown was observed. Once set this never clears.
    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.channel.pose()
    }

    #[inline]
    pub async fn spin(&mut self, angle: f64) -> Result<Outcome> {
        self.execute(Primitive::Spin(angle)).await
    }

    #[inline]
    pub async fn move_straight(&mut self, distance: f64) -> Result<Outcome> {
        self.execute(Primitive::Move(distance)).await
    }

    /// Issue a halt pulse train.
    pub async fn halt(&mut self) -> Result {
        self.channel.halt().await?;

        Ok(())
    }

    fn poll_shutdown(&mut self) -> bool {
        if self.aborted {
            return true;
        }

        if let Some(shutdown) = self.shutdown.as_mut() {
            match shutdown.try_recv() {
                Ok(()) | Err(TryRecvError::Lagged(_)) => {
                    log::warn!("Shutdown requested, aborting motion");
                    self.aborted = true;
                }
                Err(TryRecvError::Closed) => self.shutdown = None,
                Err(TryRecvError::Empty) => {}
            }
        }

        self.aborted
    }

    /// Run a primitive until its time budget is spent, then halt.
    ///
    /// The alarm is polled before every tick. A sink failure is returned
    /// after a best effort halt.
    pub async fn execute(&mut self, primitive: Primitive) -> Result<Outcome> {
        let final_time = primitive.final_time(&self.config);
        let (linear_x, angular_z) = primitive.command(&self.config);

        log::debug!("{} started; final time {:.3}s", primitive, final_time);

        self.channel.set(linear_x, angular_z);

        let mut elapsed = 0.0;
        let mut outcome = Outcome::Completed;

        while elapsed < final_time {
            if self.poll_shutdown() {
                outcome = Outcome::Aborted;
                break;
            }

            if primitive.is_interruptible(&self.config) && self.alarm.is_active() {
                log::warn!("alarm active, too close, motion canceled");
                outcome = Outcome::Canceled;
                break;
            }

            if let Err(e) = self.channel.publish_tick().await {
                log::error!("Failed to publish velocity command: {}", e);

                if self.channel.halt().await.is_err() {
                    log::error!("Failed to halt drive");
                }

                return Err(e.into());
            }

            elapsed += self.config.sample_dt;
        }

        self.channel.halt().await?;

        let orientation = self.pose().orientation();
        log::trace!(
            "{} {:?} after {:.3}s; orientation z={:.4} w={:.4}",
            primitive,
            outcome,
            elapsed,
            orientation.k,
            orientation.w
        );

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        motion::testing::{split_counts, TestSink},
        runtime::Error,
    };

    #[test]
    fn test_primitive_final_time() {
        let config = MotionConfig::default();

        let spin = Primitive::Spin(-std::f64::consts::FRAC_PI_2);
        assert!((spin.final_time(&config) - std::f64::consts::PI).abs() < 1e-12);
        assert_eq!(spin.command(&config), (0.0, -0.5));

        let drive = Primitive::Move(2.0);
        assert_eq!(drive.final_time(&config), 2.0);
        assert_eq!(drive.command(&config), (1.0, 0.0));

        assert_eq!(Primitive::Move(0.0).command(&config), (0.0, 0.0));
    }

    #[test]
    fn test_primitive_interruptible() {
        let mut config = MotionConfig::default();
        assert!(Primitive::Spin(1.0).is_interruptible(&config));

        config.spin_interruptible = false;
        assert!(!Primitive::Spin(1.0).is_interruptible(&config));
        assert!(Primitive::Move(1.0).is_interruptible(&config));
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_completed() {
        let (sink, history) = TestSink::new();
        let mut executor = Executor::new(MotionConfig::default(), Box::new(sink), Alarm::new());

        let outcome = executor.move_straight(-0.5).await.unwrap();
        assert_eq!(outcome, Outcome::Completed);

        let history = history.lock().unwrap();
        let (moving, zero) = split_counts(&history);
        assert_eq!(moving, 50);
        assert_eq!(zero, 100);
        assert!(history[..moving].iter().all(|c| c.linear_x == -1.0));
        assert!(executor.pose().position.x < -0.49);
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_canceled_by_alarm() {
        let alarm = Alarm::new();
        let (sink, history) = TestSink::new();
        let sink = sink.trip_after(alarm.clone(), 100);

        let mut executor = Executor::new(MotionConfig::default(), Box::new(sink), alarm.clone());

        let outcome = executor.move_straight(2.0).await.unwrap();
        assert_eq!(outcome, Outcome::Canceled);

        let (moving, zero) = split_counts(&history.lock().unwrap());
        assert_eq!(moving, 100);
        assert_eq!(zero, 100);
        assert!((executor.pose().position.x - 1.0).abs() < 1e-9);
        assert!(alarm.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spin_not_interruptible() {
        let alarm = Alarm::new();
        alarm.set(true);

        let config = MotionConfig {
            spin_interruptible: false,
            ..Default::default()
        };

        let (sink, history) = TestSink::new();
        let mut executor = Executor::new(config, Box::new(sink), alarm.clone());

        assert_eq!(executor.spin(0.5).await.unwrap(), Outcome::Completed);
        assert_eq!(split_counts(&history.lock().unwrap()).0, 100);

        assert_eq!(
            executor.move_straight(1.0).await.unwrap(),
            Outcome::Canceled
        );
        assert_eq!(split_counts(&history.lock().unwrap()).0, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_magnitude() {
        let (sink, history) = TestSink::new();
        let mut executor = Executor::new(MotionConfig::default(), Box::new(sink), Alarm::new());

        assert_eq!(executor.spin(0.0).await.unwrap(), Outcome::Completed);

        let (moving, zero) = split_counts(&history.lock().unwrap());
        assert_eq!(moving, 0);
        assert_eq!(zero, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sink_failure() {
        let (sink, history) = TestSink::new();
        let sink = sink.fail_after(10);

        let mut executor = Executor::new(MotionConfig::default(), Box::new(sink), Alarm::new());

        let result = executor.move_straight(1.0).await;
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(history.lock().unwrap().len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lost_command_still_halts() {
        let (sink, history) = TestSink::new();
        let sink = sink.fail_at(5);

        let mut executor = Executor::new(MotionConfig::default(), Box::new(sink), Alarm::new());

        let result = executor.move_straight(1.0).await;
        assert!(matches!(result, Err(Error::Io(_))));

        let (moving, zero) = split_counts(&history.lock().unwrap());
        assert_eq!(moving, 5);
        assert_eq!(zero, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_aborts() {
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let (sink, history) = TestSink::new();
        let mut executor = Executor::new(MotionConfig::default(), Box::new(sink), Alarm::new())
            .with_shutdown(shutdown_rx);

        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            shutdown_tx.send(()).ok();
        });

        assert_eq!(executor.move_straight(5.0).await.unwrap(), Outcome::Aborted);
        assert!(executor.is_aborted());

        let (moving, zero) = split_counts(&history.lock().unwrap());
        assert!(moving < 500);
        assert_eq!(zero, 100);
    }
}
