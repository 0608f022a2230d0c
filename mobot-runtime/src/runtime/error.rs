use std::{error, fmt, io};

#[derive(Debug)]
pub enum Error {
    /// Configuration value out of range.
    InvalidConfig(&'static str),
    /// Goal sequences differ in length.
    MalformedGoal { angles: usize, distances: usize },
    /// Goal step with an infinite or NaN magnitude.
    NonFiniteGoal { step: usize },
    /// Runtime is shutting down.
    Aborted,
    /// Velocity sink failure.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfig(e) => write!(f, "invalid configuration: {}", e),
            Error::MalformedGoal { angles, distances } => write!(
                f,
                "malformed goal: {} angles and {} distances",
                angles, distances
            ),
            Error::NonFiniteGoal { step } => {
                write!(f, "malformed goal: step {} is not finite", step + 1)
            }
            Error::Aborted => write!(f, "motion aborted"),
            Error::Io(e) => write!(f, "{}", e),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
