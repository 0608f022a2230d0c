use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::protocol::frame::FrameError;

/// Shared proximity alarm level.
///
/// Last writer wins. Reading never clears the alarm.
#[derive(Clone, Debug, Default)]
pub struct Alarm(Arc<AtomicBool>);

impl Alarm {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Store the new level and return the previous one.
    #[inline]
    pub fn set(&self, active: bool) -> bool {
        self.0.swap(active, Ordering::AcqRel)
    }
}

/// Alarm level as delivered by the sensor collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlarmSignal {
    pub active: bool,
}

impl AlarmSignal {
    pub fn new(active: bool) -> Self {
        Self { active }
    }
}

impl std::fmt::Display for AlarmSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.active {
            write!(f, "Alarm active")
        } else {
            write!(f, "Alarm clear")
        }
    }
}

impl TryFrom<Vec<u8>> for AlarmSignal {
    type Error = FrameError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        match value.first() {
            Some(level) => Ok(Self {
                active: *level != 0,
            }),
            None => Err(FrameError::PayloadTooSmall),
        }
    }
}

impl crate::protocol::Packetize for AlarmSignal {
    const MESSAGE_TYPE: u8 = 0x41;
    const MESSAGE_SIZE: Option<usize> = Some(std::mem::size_of::<u8>());

    fn to_bytes(&self) -> Vec<u8> {
        vec![self.active as u8]
    }
}
