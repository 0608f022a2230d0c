pub use self::alarm::{Alarm, AlarmSignal};
pub use self::feedback::{Feedback, Outcome, Phase};
pub use self::goal::{ExecutionResult, MotionGoal};
pub use self::pose::Pose;
pub use self::velocity::VelocityCommand;

mod alarm;
mod feedback;
mod goal;
mod pose;
mod velocity;
