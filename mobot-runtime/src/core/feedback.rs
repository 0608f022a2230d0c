use bytes::{Buf, BufMut, BytesMut};
use nalgebra::Vector2;

use crate::protocol::frame::FrameError;

use super::Pose;

/// Primitive motion phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Rotate in place.
    Spin = 0,
    /// Translate along the current heading.
    Move = 1,
}

impl TryFrom<u8> for Phase {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Spin),
            1 => Ok(Self::Move),
            _ => Err(()),
        }
    }
}

/// How a primitive motion came to a halt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Time budget was exhausted.
    Completed = 0,
    /// The proximity alarm cut the motion short.
    Canceled = 1,
    /// The runtime is shutting down.
    Aborted = 2,
}

impl TryFrom<u8> for Outcome {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Completed),
            1 => Ok(Self::Canceled),
            2 => Ok(Self::Aborted),
            _ => Err(()),
        }
    }
}

/// Progress report emitted after each primitive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Feedback {
    /// Index of the goal step.
    pub step: u16,
    /// Number of steps in the goal.
    pub total: u16,
    pub phase: Phase,
    pub outcome: Outcome,
    /// Dead reckoned pose after the primitive halted.
    pub pose: Pose,
}

impl std::fmt::Display for Feedback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Step {}/{}; {:?} {:?}; {}",
            self.step + 1,
            self.total,
            self.phase,
            self.outcome,
            self.pose
        )
    }
}

impl TryFrom<Vec<u8>> for Feedback {
    type Error = FrameError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        if value.len() < Self::SIZE {
            Err(FrameError::PayloadTooSmall)?
        }

        let mut buf = &value[..];

        let step = buf.get_u16();
        let total = buf.get_u16();
        let phase = buf.get_u8();
        let phase = Phase::try_from(phase).map_err(|_| FrameError::InvalidEnumValue(phase))?;
        let outcome = buf.get_u8();
        let outcome =
            Outcome::try_from(outcome).map_err(|_| FrameError::InvalidEnumValue(outcome))?;
        let position = Vector2::new(buf.get_f64(), buf.get_f64());
        let heading = buf.get_f64();

        Ok(Self {
            step,
            total,
            phase,
            outcome,
            pose: Pose { position, heading },
        })
    }
}

impl Feedback {
    const SIZE: usize = (std::mem::size_of::<u16>() * 2)
        + (std::mem::size_of::<u8>() * 2)
        + (std::mem::size_of::<f64>() * 3);
}

impl crate::protocol::Packetize for Feedback {
    const MESSAGE_TYPE: u8 = 0x42;
    const MESSAGE_SIZE: Option<usize> = Some(Feedback::SIZE);

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(Self::SIZE);

        buf.put_u16(self.step);
        buf.put_u16(self.total);
        buf.put_u8(self.phase as u8);
        buf.put_u8(self.outcome as u8);
        buf.put_f64(self.pose.position.x);
        buf.put_f64(self.pose.position.y);
        buf.put_f64(self.pose.heading);

        buf.to_vec()
    }
}
