pub use self::channel::VelocityChannel;
pub use self::executor::{Executor, Primitive};
pub use self::sequencer::Sequencer;

mod channel;
mod executor;
mod sequencer;

#[cfg(test)]
pub(crate) mod testing;
