use std::sync::Arc;

use chrono::{DateTime, Utc};

pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn from_millis(epoch_millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(epoch_millis).map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

impl<C> Clock for &C
where
    C: Clock + ?Sized,
{
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Supplies the timestamp used for both bounds of a non-revocation interval.
/// Every call re-reads the clock.
#[derive(Clone, Copy)]
pub struct RevocationTimestampProvider<'a> {
    clock: &'a dyn Clock,
}

impl<'a> RevocationTimestampProvider<'a> {
    pub fn new(clock: &'a dyn Clock) -> Self {
        Self { clock }
    }

    /// Current time in whole seconds since the unix epoch. Instants before
    /// the epoch clamp to zero.
    pub fn get(&self) -> u64 {
        u64::try_from(self.clock.now().timestamp()).unwrap_or_default()
    }
}

impl std::fmt::Debug for RevocationTimestampProvider<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationTimestampProvider")
            .field("now", &self.clock.now())
            .finish()
    }
}

#[cfg(test)]
mod unit_tests {
    use std::cell::Cell;

    use super::*;

    struct TickingClock(Cell<i64>);

    impl Clock for TickingClock {
        fn now(&self) -> DateTime<Utc> {
            let seconds = self.0.get();
            self.0.set(seconds + 1);
            DateTime::from_timestamp(seconds, 0).unwrap()
        }
    }

    #[test]
    fn test_floors_millis_to_seconds() {
        let clock = FixedClock::from_millis(1_650_000_000_999).unwrap();
        let provider = RevocationTimestampProvider::new(&clock);
        assert_eq!(provider.get(), 1_650_000_000);
    }

    #[test]
    fn test_rereads_clock_on_every_call() {
        let clock = TickingClock(Cell::new(100));
        let provider = RevocationTimestampProvider::new(&clock);
        assert_eq!(provider.get(), 100);
        assert_eq!(provider.get(), 101);
    }

    #[test]
    fn test_pre_epoch_clamps_to_zero() {
        let clock = FixedClock::from_millis(-5_000).unwrap();
        assert_eq!(RevocationTimestampProvider::new(&clock).get(), 0);
    }
}
