use crate::core::VelocityCommand;

pub use self::sim::SimDrive;
pub use self::udp::UdpDrive;

mod sim;
mod udp;

/// Destination of velocity commands.
///
/// A sink receives every published tick, zero commands included. Delivery
/// is fire and forget. The sink never reports whether the base moved.
#[async_trait::async_trait]
pub trait CommandSink: Send {
    /// Deliver a single velocity command.
    async fn send(&mut self, command: &VelocityCommand) -> std::io::Result<()>;
}
