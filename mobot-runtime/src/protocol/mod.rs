use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

pub mod client;
pub mod frame;

/// The protocol header.
///
/// This is used to identify the protocol. The header is always the same and is
/// always present at the start of a frame. The bytes shown here are the ASCII
/// representation of the header.
const PROTO_HEADER: [u8; 3] = [b'M', b'B', b'T'];

/// The protocol version.
///
/// If the version is not the same as the expected version, the frame is
/// considered invalid.
const PROTO_VERSION: u8 = 0x01;

/// The minimum buffer size required to read a frame.
const MIN_BUFFER_SIZE: usize = PROTO_HEADER.len()
    + std::mem::size_of::<u8>()
    + std::mem::size_of::<u8>()
    + std::mem::size_of::<u16>()
    + 3;

/// The maximum payload size.
///
/// Goals carry two sequences of doubles, this leaves room for several
/// hundred steps while still rejecting garbage lengths.
const MAX_PAYLOAD_SIZE: usize = 8_192;

/// A packet that can be sent over the network.
///
/// This trait is implemented for all packets that can be sent over the network.
pub trait Packetize: TryFrom<Vec<u8>> + Sized {
    /// The message type of the packet.
    const MESSAGE_TYPE: u8;
    /// If the packet has a fixed size, this is the size of the packet. If the
    /// packet has a variable size, this is `None`.
    ///
    /// This is used to validate the size of the packet when receiving a packet.
    const MESSAGE_SIZE: Option<usize> = None;

    /// Convert packet to bytes.
    fn to_bytes(&self) -> Vec<u8>;

    /// Convert packet to a complete frame, header included.
    fn to_frame(&self) -> frame::Frame {
        let payload = self.to_bytes();

        let mut frame = frame::Frame::new(Self::MESSAGE_TYPE, payload.len());
        frame.put(&payload[..]);
        frame
    }
}

pub struct Stream<T> {
    inner: T,
}

impl<T> Stream<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: AsyncWrite + AsyncRead + Unpin> Stream<T> {
    /// Probe the remote end and return the round trip time.
    pub async fn probe(&mut self) -> std::io::Result<std::time::Duration> {
        let random_number = rand::random::<i32>();

        let now = std::time::Instant::now();

        self.send_packet(&frame::Echo {
            payload: random_number,
        })
        .await?;

        let frame = loop {
            let frame = self.read_frame().await?;
            if frame.message == frame::Echo::MESSAGE_TYPE {
                break frame;
            }

            self.discard(frame.payload_length).await?;
        };

        let time_elapsed = now.elapsed();

        let echo = self
            .recv_packet::<frame::Echo>(frame.payload_length)
            .await?;

        if random_number != echo.payload {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "Invalid echo response from server",
            ));
        }

        Ok(time_elapsed)
    }

    /// Probe the server and announce the session.
    pub async fn handshake(
        &mut self,
        session_name: impl ToString,
        flags: u8,
    ) -> std::io::Result<std::time::Duration> {
        let latency = self.probe().await?;

        self.send_packet(&frame::Session::new(flags, session_name.to_string()))
            .await?;

        Ok(latency)
    }
}

impl<T: AsyncWrite + Unpin> Stream<T> {
    pub async fn send_packet<P: Packetize>(&mut self, packet: &P) -> std::io::Result<()> {
        let frame = packet.to_frame();

        if frame.payload_length > MAX_PAYLOAD_SIZE {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Payload exceeds {} bytes", MAX_PAYLOAD_SIZE),
            ));
        }

        self.inner.write_all(frame.as_ref()).await
    }

    #[inline]
    pub async fn send_shutdown(&mut self) -> std::io::Result<()> {
        self.send_packet(&frame::Shutdown).await
    }
}

impl<T: AsyncRead + Unpin> Stream<T> {
    pub async fn read_frame(&mut self) -> std::io::Result<frame::Frame> {
        let mut header_buffer = [0u8; MIN_BUFFER_SIZE];

        self.inner.read_exact(&mut header_buffer).await?;

        frame::Frame::try_from(&header_buffer[..]).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Failed to parse frame: {}", e),
            )
        })
    }

    pub async fn recv_packet<P: Packetize>(&mut self, size: usize) -> std::io::Result<P> {
        if let Some(message_size) = P::MESSAGE_SIZE {
            if size != message_size {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!(
                        "Invalid packet size: expected {}, got {}",
                        message_size, size
                    ),
                ));
            }
        }

        let mut payload_buffer = vec![0u8; size];
        self.inner.read_exact(&mut payload_buffer).await?;

        P::try_from(payload_buffer).map_err(|_| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, "Failed to parse packet")
        })
    }

    /// Skip over the payload of a frame we are not interested in.
    pub async fn discard(&mut self, size: usize) -> std::io::Result<()> {
        let mut payload_buffer = vec![0u8; size];
        self.inner.read_exact(&mut payload_buffer).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proto_header() {
        assert_eq!(PROTO_HEADER, [b'M', b'B', b'T']);
    }

    #[test]
    fn test_min_buffer_size() {
        assert_eq!(MIN_BUFFER_SIZE, 10);
    }

    #[tokio::test]
    async fn test_stream_packet() {
        let (left, right) = tokio::io::duplex(256);

        let mut client = Stream::new(left);
        let mut server = Stream::new(right);

        client
            .send_packet(&frame::Echo { payload: -42 })
            .await
            .unwrap();

        let frame = server.read_frame().await.unwrap();
        assert_eq!(frame.message, frame::Echo::MESSAGE_TYPE);
        assert_eq!(frame.payload_length, 4);

        let echo = server
            .recv_packet::<frame::Echo>(frame.payload_length)
            .await
            .unwrap();
        assert_eq!(echo.payload, -42);
    }

    #[tokio::test]
    async fn test_stream_packet_size_mismatch() {
        let (left, right) = tokio::io::duplex(256);

        let mut client = Stream::new(left);
        let mut server = Stream::new(right);

        client.send_packet(&frame::Shutdown).await.unwrap();

        let frame = server.read_frame().await.unwrap();
        let result = server.recv_packet::<frame::Echo>(frame.payload_length).await;

        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(std::io::ErrorKind::InvalidData)
        );
    }

    #[tokio::test]
    async fn test_stream_packet_oversize() {
        let (left, right) = tokio::io::duplex(256);

        let mut client = Stream::new(left);
        let mut server = Stream::new(right);

        let goal = crate::core::MotionGoal::new(vec![0.0; 512], vec![1.0; 512]);

        let result = client.send_packet(&goal).await;
        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(std::io::ErrorKind::InvalidInput)
        );

        client.send_packet(&frame::Shutdown).await.unwrap();

        let frame = server.read_frame().await.unwrap();
        assert_eq!(frame.message, frame::Shutdown::MESSAGE_TYPE);
    }

    #[tokio::test]
    async fn test_stream_probe() {
        let (left, right) = tokio::io::duplex(256);

        let mut server = Stream::new(right);
        tokio::spawn(async move {
            let frame = server.read_frame().await.unwrap();
            let echo = server
                .recv_packet::<frame::Echo>(frame.payload_length)
                .await
                .unwrap();
            server.send_packet(&echo).await.unwrap();
        });

        let mut client = Stream::new(left);
        assert!(client.probe().await.is_ok());
    }
}
