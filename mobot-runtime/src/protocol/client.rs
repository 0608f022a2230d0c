use tokio::net::{TcpStream, ToSocketAddrs};

use crate::protocol::{frame, Stream};

pub struct ClientBuilder<A: ToSocketAddrs> {
    address: A,
    session_name: String,
    command: bool,
    sensor: bool,
    failsafe: bool,
}

impl<A: ToSocketAddrs> ClientBuilder<A> {
    pub fn new(address: A, session_name: impl ToString) -> Self {
        Self {
            address,
            session_name: session_name.to_string(),
            command: false,
            sensor: false,
            failsafe: false,
        }
    }

    /// Request permission to submit motion goals.
    pub fn command(mut self, command: bool) -> Self {
        self.command = command;
        self
    }

    /// Request permission to publish the proximity alarm.
    pub fn sensor(mut self, sensor: bool) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn failsafe(mut self, failsafe: bool) -> Self {
        self.failsafe = failsafe;
        self
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;

        if self.command {
            flags |= frame::Session::MODE_COMMAND;
        }
        if self.sensor {
            flags |= frame::Session::MODE_SENSOR;
        }
        if self.failsafe {
            flags |= frame::Session::MODE_FAILSAFE;
        }

        flags
    }

    /// Connect to the server and announce the session.
    ///
    /// Returns the stream and the measured round trip time.
    pub async fn connect(self) -> std::io::Result<(Stream<TcpStream>, std::time::Duration)> {
        let flags = self.flags();

        let stream = TcpStream::connect(self.address).await?;
        stream.set_nodelay(true)?;

        let mut client = Stream::new(stream);

        let latency = client.handshake(self.session_name, flags).await?;

        Ok((client, latency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_flags() {
        let builder = ClientBuilder::new("127.0.0.1:0", "test");
        assert_eq!(builder.flags(), 0);

        let builder = ClientBuilder::new("127.0.0.1:0", "test")
            .command(true)
            .failsafe(true);
        assert_eq!(
            builder.flags(),
            frame::Session::MODE_COMMAND | frame::Session::MODE_FAILSAFE
        );

        let builder = ClientBuilder::new("127.0.0.1:0", "test").sensor(true);
        assert_eq!(builder.flags(), frame::Session::MODE_SENSOR);
    }
}
