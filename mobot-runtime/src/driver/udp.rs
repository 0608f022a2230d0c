use tokio::net::{ToSocketAddrs, UdpSocket};

use crate::{core::VelocityCommand, protocol::Packetize};

use super::CommandSink;

/// Drive controller reached over UDP.
///
/// Each command is sent as one complete frame per datagram. A refused
/// datagram is dropped like any other lost datagram.
pub struct UdpDrive {
    socket: UdpSocket,
}

impl UdpDrive {
    pub async fn connect(address: impl ToSocketAddrs) -> std::io::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(address).await?;

        log::debug!("Drive link connected to: {}", socket.peer_addr()?);

        Ok(Self { socket })
    }
}

#[async_trait::async_trait]
impl CommandSink for UdpDrive {
    async fn send(&mut self, command: &VelocityCommand) -> std::io::Result<()> {
        match self.socket.send(command.to_frame().as_ref()).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                log::warn!("Drive refused command: {}", e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
