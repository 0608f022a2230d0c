use bytes::{Buf, BufMut, BytesMut};

use crate::protocol::frame::FrameError;

/// Planar velocity command.
///
/// All other axes are fixed at zero for planar motion.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VelocityCommand {
    /// Forward velocity in meters per second.
    pub linear_x: f64,
    /// Yaw rate in radians per second.
    pub angular_z: f64,
}

impl VelocityCommand {
    pub fn new(linear_x: f64, angular_z: f64) -> Self {
        Self {
            linear_x,
            angular_z,
        }
    }

    /// Zero velocity on both components.
    pub fn zero() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.linear_x == 0.0 && self.angular_z == 0.0
    }
}

impl std::fmt::Display for VelocityCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Linear: {:.3} m/s; Angular: {:.3} rad/s",
            self.linear_x, self.angular_z
        )
    }
}

impl TryFrom<Vec<u8>> for VelocityCommand {
    type Error = FrameError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        if value.len() < std::mem::size_of::<f64>() * 2 {
            Err(FrameError::PayloadTooSmall)?
        }

        let mut buf = &value[..];

        Ok(Self {
            linear_x: buf.get_f64(),
            angular_z: buf.get_f64(),
        })
    }
}

impl crate::protocol::Packetize for VelocityCommand {
    const MESSAGE_TYPE: u8 = 0x50;
    const MESSAGE_SIZE: Option<usize> = Some(std::mem::size_of::<f64>() * 2);

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(std::mem::size_of::<f64>() * 2);

        buf.put_f64(self.linear_x);
        buf.put_f64(self.angular_z);

        buf.to_vec()
    }
}
