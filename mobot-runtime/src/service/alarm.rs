use crate::core::Alarm;

/// Proximity alarm monitor.
///
/// Created once at startup. Every sensor session feeds the same monitor and
/// the executor polls the same alarm.
#[derive(Clone, Debug, Default)]
pub struct AlarmMonitor {
    alarm: Alarm,
}

impl AlarmMonitor {
    pub fn new(alarm: Alarm) -> Self {
        Self { alarm }
    }

    /// Shared alarm handle for the executor.
    #[inline]
    pub fn alarm(&self) -> Alarm {
        self.alarm.clone()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.alarm.is_active()
    }

    /// Store the latest alarm level.
    pub fn update(&self, active: bool) {
        let previous = self.alarm.set(active);

        match (previous, active) {
            (false, true) => log::info!("Proximity alarm activated"),
            (true, false) => log::info!("Proximity alarm cleared"),
            _ => log::trace!("Proximity alarm level: {}", active),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alarm_monitor() {
        let monitor = AlarmMonitor::default();
        let alarm = monitor.alarm();

        monitor.update(true);
        assert!(alarm.is_active());
        monitor.update(true);
        assert!(monitor.is_active());

        monitor.update(false);
        assert!(!alarm.is_active());
    }
}
