pub use self::alarm::AlarmMonitor;
pub use self::tcp_server::{GoalServer, TcpServerConfig};

mod alarm;
mod tcp_server;
