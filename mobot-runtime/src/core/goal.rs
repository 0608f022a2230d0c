use bytes::{Buf, BufMut, BytesMut};

use crate::protocol::frame::FrameError;

/// Composite motion goal.
///
/// Each index pairs a rotation in radians with a translation in meters. The
/// pair is executed as a spin followed by a straight move.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotionGoal {
    pub angles: Vec<f64>,
    pub distances: Vec<f64>,
}

impl MotionGoal {
    pub fn new(angles: Vec<f64>, distances: Vec<f64>) -> Self {
        Self { angles, distances }
    }

    /// Check the goal is well formed.
    ///
    /// Both sequences must be of equal length and every value finite. A
    /// non-finite magnitude would never exhaust its time budget.
    pub fn validate(&self) -> crate::runtime::Result {
        if self.angles.len() != self.distances.len() {
            return Err(crate::runtime::Error::MalformedGoal {
                angles: self.angles.len(),
                distances: self.distances.len(),
            });
        }

        if let Some(step) = self
            .steps()
            .position(|(angle, distance)| !(angle.is_finite() && distance.is_finite()))
        {
            return Err(crate::runtime::Error::NonFiniteGoal { step });
        }

        Ok(())
    }

    /// Iterate over the (angle, distance) pairs.
    pub fn steps(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.angles
            .iter()
            .copied()
            .zip(self.distances.iter().copied())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.angles.len().min(self.distances.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for MotionGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Angles: {:?}; Distances: {:?}",
            self.angles, self.distances
        )
    }
}

fn get_sequence(buf: &mut &[u8]) -> Result<Vec<f64>, FrameError> {
    if buf.remaining() < std::mem::size_of::<u16>() {
        Err(FrameError::PayloadTooSmall)?
    }

    let len = buf.get_u16() as usize;
    if buf.remaining() < len * std::mem::size_of::<f64>() {
        Err(FrameError::PayloadTooSmall)?
    }

    Ok((0..len).map(|_| buf.get_f64()).collect())
}

impl TryFrom<Vec<u8>> for MotionGoal {
    type Error = FrameError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let mut buf = &value[..];

        let angles = get_sequence(&mut buf)?;
        let distances = get_sequence(&mut buf)?;

        Ok(Self { angles, distances })
    }
}

impl crate::protocol::Packetize for MotionGoal {
    const MESSAGE_TYPE: u8 = 0x40;

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(
            (std::mem::size_of::<u16>() * 2)
                + (self.angles.len() + self.distances.len()) * std::mem::size_of::<f64>(),
        );

        buf.put_u16(self.angles.len() as u16);
        for angle in &self.angles {
            buf.put_f64(*angle);
        }

        buf.put_u16(self.distances.len() as u16);
        for distance in &self.distances {
            buf.put_f64(*distance);
        }

        buf.to_vec()
    }
}

/// Result reported once per goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExecutionResult {
    pub succeeded: bool,
}

impl ExecutionResult {
    pub fn succeeded() -> Self {
        Self { succeeded: true }
    }

    pub fn failed() -> Self {
        Self { succeeded: false }
    }
}

impl std::fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.succeeded {
            write!(f, "Succeeded")
        } else {
            write!(f, "Failed")
        }
    }
}

impl TryFrom<Vec<u8>> for ExecutionResult {
    type Error = FrameError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        match value.first() {
            Some(flag) => Ok(Self {
                succeeded: *flag != 0,
            }),
            None => Err(FrameError::PayloadTooSmall),
        }
    }
}

impl crate::protocol::Packetize for ExecutionResult {
    const MESSAGE_TYPE: u8 = 0x43;
    const MESSAGE_SIZE: Option<usize> = Some(std::mem::size_of::<u8>());

    fn to_bytes(&self) -> Vec<u8> {
        vec![self.succeeded as u8]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Packetize;

    #[test]
    fn test_motion_goal() {
        let goal = MotionGoal::new(
            vec![std::f64::consts::FRAC_PI_2, -0.3],
            vec![2.0, -1.5],
        );

        let bytes = goal.to_bytes();
        assert_eq!(bytes.len(), 2 + 16 + 2 + 16);

        let goal2 = MotionGoal::try_from(bytes).unwrap();
        assert_eq!(goal, goal2);
        assert_eq!(goal2.len(), 2);
        assert!(goal2.validate().is_ok());
    }

    #[test]
    fn test_motion_goal_empty() {
        let goal = MotionGoal::default();

        assert!(goal.is_empty());
        assert!(goal.validate().is_ok());
        assert_eq!(goal.steps().count(), 0);
        assert_eq!(MotionGoal::try_from(goal.to_bytes()).unwrap(), goal);
    }

    #[test]
    fn test_motion_goal_mismatch() {
        let goal = MotionGoal::new(vec![0.1, 0.2, 0.3], vec![1.0]);

        assert_eq!(goal.len(), 1);
        assert!(matches!(
            goal.validate(),
            Err(crate::runtime::Error::MalformedGoal {
                angles: 3,
                distances: 1
            })
        ));
    }

    #[test]
    fn test_motion_goal_non_finite() {
        let goal = MotionGoal::new(vec![0.0], vec![f64::INFINITY]);
        assert!(matches!(
            goal.validate(),
            Err(crate::runtime::Error::NonFiniteGoal { step: 0 })
        ));

        let goal = MotionGoal::new(vec![0.5, f64::NAN], vec![1.0, 1.0]);
        assert!(matches!(
            goal.validate(),
            Err(crate::runtime::Error::NonFiniteGoal { step: 1 })
        ));

        let goal = MotionGoal::new(vec![f64::NEG_INFINITY], vec![1.0]);
        assert!(goal.validate().is_err());
    }

    #[test]
    fn test_motion_goal_truncated() {
        let goal = MotionGoal::new(vec![0.1, 0.2], vec![1.0, 2.0]);

        let mut bytes = goal.to_bytes();
        bytes.truncate(bytes.len() - 3);

        assert!(MotionGoal::try_from(bytes).is_err());
        assert!(MotionGoal::try_from(vec![]).is_err());
    }

    #[test]
    fn test_execution_result() {
        let result = ExecutionResult::try_from(ExecutionResult::succeeded().to_bytes()).unwrap();
        assert!(result.succeeded);

        let result = ExecutionResult::try_from(ExecutionResult::failed().to_bytes()).unwrap();
        assert!(!result.succeeded);
    }
}
