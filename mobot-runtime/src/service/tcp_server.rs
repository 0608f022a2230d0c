use std::sync::Arc;

use tokio::{
    io::{AsyncRead, AsyncWrite, WriteHalf},
    net::TcpListener,
    sync::{mpsc, Mutex, OwnedSemaphorePermit, Semaphore},
};

use crate::{
    core::{AlarmSignal, ExecutionResult, MotionGoal},
    motion::Sequencer,
    protocol::{
        frame::{Echo, Frame, Reject, Session, Shutdown},
        Packetize, Stream,
    },
};

use super::AlarmMonitor;

#[derive(Clone, Debug, serde_derive::Deserialize, PartialEq, Eq)]
pub struct TcpServerConfig {
    /// Network address to listen on.
    #[serde(default = "TcpServerConfig::default_listen")]
    pub listen: String,
    /// Maximum number of connections.
    #[serde(default = "TcpServerConfig::default_max_connections")]
    pub max_connections: usize,
}

impl TcpServerConfig {
    fn default_listen() -> String {
        format!("127.0.0.1:{}", crate::consts::DEFAULT_NETWORK_PORT)
    }

    fn default_max_connections() -> usize {
        8
    }
}

impl Default for TcpServerConfig {
    fn default() -> Self {
        Self {
            listen: Self::default_listen(),
            max_connections: Self::default_max_connections(),
        }
    }
}

enum SessionError {
    Io(std::io::Error),
    UnknownMessage(u8),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SessionError::Io(e) => write!(f, "IO error: {}", e),
            SessionError::UnknownMessage(m) => write!(f, "Unknown message: 0x{:X}", m),
        }
    }
}

type Writer<T> = Arc<Mutex<Stream<WriteHalf<T>>>>;

/// Goal intake and alarm input server.
pub struct GoalServer {
    config: TcpServerConfig,
    semaphore: Arc<Semaphore>,
    listener: TcpListener,
    sequencer: Arc<Mutex<Sequencer>>,
    monitor: AlarmMonitor,
}

impl GoalServer {
    pub async fn bind(
        config: TcpServerConfig,
        sequencer: Arc<Mutex<Sequencer>>,
        monitor: AlarmMonitor,
    ) -> std::io::Result<Self> {
        let listener = TcpListener::bind(&config.listen).await?;

        log::debug!("Listening on: {}", listener.local_addr()?);

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(config.max_connections)),
            config,
            listener,
            sequencer,
            monitor,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections until the task is dropped.
    pub async fn run(self) {
        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(connection) => connection,
                Err(e) => {
                    log::error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            log::debug!("Accepted connection from: {}", addr);

            let permit = match self.semaphore.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    log::warn!("Too many connections");
                    continue;
                }
            };

            let active_client_count =
                self.config.max_connections - self.semaphore.available_permits();

            log::debug!(
                "Active connections: {}/{}",
                active_client_count,
                self.config.max_connections
            );

            if let Err(e) = stream.set_nodelay(true) {
                log::warn!("Failed to set nodelay: {}", e);
            }

            tokio::spawn(Self::spawn_client_session(
                stream,
                self.sequencer.clone(),
                self.monitor.clone(),
                permit,
            ));
        }
    }

    async fn reject<T: AsyncWrite>(
        writer: &Writer<T>,
        reason: Reject,
    ) -> Result<(), SessionError> {
        log::warn!("Request rejected: {}", reason);

        writer
            .lock()
            .await
            .send_packet(&reason)
            .await
            .map_err(SessionError::Io)
    }

    /// Run a goal to completion and report back to the client.
    ///
    /// The sequencer lock is released before the result is sent.
    async fn execute_goal<T: AsyncWrite>(
        sequencer: tokio::sync::OwnedMutexGuard<Sequencer>,
        goal: MotionGoal,
        writer: Writer<T>,
    ) {
        let (feedback_tx, mut feedback_rx) = mpsc::channel(crate::consts::QUEUE_SIZE_FEEDBACK);

        let execution = async move {
            let mut sequencer = sequencer;
            sequencer.execute(&goal, Some(&feedback_tx)).await
        };

        let forward = async {
            while let Some(feedback) = feedback_rx.recv().await {
                log::trace!("{}", feedback);

                if let Err(e) = writer.lock().await.send_packet(&feedback).await {
                    log::warn!("Failed to send feedback: {}", e);
                }
            }
        };

        let (result, _) = tokio::join!(execution, forward);

        let result = result.unwrap_or_else(|_| ExecutionResult::failed());

        if let Err(e) = writer.lock().await.send_packet(&result).await {
            log::warn!("Failed to send result: {}", e);
        }
    }

    async fn parse<T>(
        reader: &mut Stream<tokio::io::ReadHalf<T>>,
        writer: &Writer<T>,
        frame: &Frame,
        session: &mut Session,
        sequencer: &Arc<Mutex<Sequencer>>,
        monitor: &AlarmMonitor,
    ) -> Result<(), SessionError>
    where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        match frame.message {
            Session::MESSAGE_TYPE => {
                *session = reader
                    .recv_packet::<Session>(frame.payload_length)
                    .await
                    .map_err(SessionError::Io)?;

                let mut flags = Vec::new();
                if session.is_command() {
                    flags.push("command")
                }
                if session.is_sensor() {
                    flags.push("sensor")
                }
                if session.is_failsafe() {
                    flags.push("failsafe")
                }

                log::info!(
                    "Session started for {} with {}",
                    session.name(),
                    flags.join(", ")
                );
            }
            Echo::MESSAGE_TYPE => {
                let echo = reader
                    .recv_packet::<Echo>(frame.payload_length)
                    .await
                    .map_err(SessionError::Io)?;

                writer
                    .lock()
                    .await
                    .send_packet(&echo)
                    .await
                    .map_err(SessionError::Io)?;
            }
            MotionGoal::MESSAGE_TYPE => {
                let goal = reader
                    .recv_packet::<MotionGoal>(frame.payload_length)
                    .await
                    .map_err(SessionError::Io)?;

                if !session.is_command() {
                    return Self::reject(writer, Reject::Unauthorized).await;
                }

                if goal.validate().is_err() {
                    return Self::reject(writer, Reject::MalformedGoal).await;
                }

                let guard = match sequencer.clone().try_lock_owned() {
                    Ok(guard) => guard,
                    Err(_) => return Self::reject(writer, Reject::Busy).await,
                };

                log::debug!("Goal accepted from: {}", session.name());

                tokio::spawn(Self::execute_goal(guard, goal, writer.clone()));
            }
            AlarmSignal::MESSAGE_TYPE => {
                let signal = reader
                    .recv_packet::<AlarmSignal>(frame.payload_length)
                    .await
                    .map_err(SessionError::Io)?;

                if !session.is_sensor() {
                    return Self::reject(writer, Reject::Unauthorized).await;
                }

                monitor.update(signal.active);
            }
            _ => {
                reader
                    .discard(frame.payload_length)
                    .await
                    .map_err(SessionError::Io)?;

                return Err(SessionError::UnknownMessage(frame.message));
            }
        }

        Ok(())
    }

    async fn spawn_client_session<T>(
        stream: T,
        sequencer: Arc<Mutex<Sequencer>>,
        monitor: AlarmMonitor,
        _permit: OwnedSemaphorePermit,
    ) where
        T: AsyncRead + AsyncWrite + Send + 'static,
    {
        log::debug!("Client session started");

        let (reader, writer) = tokio::io::split(stream);

        let mut reader = Stream::new(reader);
        let writer = Arc::new(Mutex::new(Stream::new(writer)));

        let mut session = Session::new(0, String::new());

        let orderly = loop {
            let frame = match reader.read_frame().await {
                Ok(frame) => frame,
                Err(e) => {
                    if e.kind() == std::io::ErrorKind::UnexpectedEof {
                        log::debug!("Session closed by: {}", session.name());
                    } else {
                        log::warn!("Session reset for {}: {}", session.name(), e);
                    }

                    break false;
                }
            };

            if frame.message == Shutdown::MESSAGE_TYPE {
                log::debug!("Session shutdown requested for: {}", session.name());
                break true;
            }

            if let Err(e) = Self::parse(
                &mut reader,
                &writer,
                &frame,
                &mut session,
                &sequencer,
                &monitor,
            )
            .await
            {
                log::warn!("Failed to parse frame: {}", e);

                if let SessionError::Io(_) = e {
                    break false;
                }
            }
        };

        if !orderly && session.is_sensor() && session.is_failsafe() {
            log::warn!("Enacting failsafe for: {}", session.name());
            monitor.update(true);
        }

        log::info!("Session shutdown for: {}", session.name());
    }
}
