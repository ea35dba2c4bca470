use core::time::Duration;

const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Number of clock ticks in one second.
pub const CLOCK_SECOND: ClockTime = 1000;

/// A time value expressed in clock ticks.
///
/// When returned by a device stack poll, `0` means that no internal action
/// is scheduled.
pub type ClockTime = u64;

/// Converts a tick count into a [`Duration`].
///
/// The whole seconds and the remaining nanoseconds are computed separately,
/// so no precision is lost for large tick counts.
#[must_use]
pub const fn ticks_to_duration(ticks: ClockTime) -> Duration {
    let secs = ticks / CLOCK_SECOND;
    let nanos = (ticks % CLOCK_SECOND) * NANOS_PER_SECOND / CLOCK_SECOND;
    // `nanos` is always smaller than one second.
    Duration::new(secs, nanos as u32)
}

/// Converts a [`Duration`] into a tick count, rounding up.
///
/// A non-zero duration never maps to `0` ticks, since that value means
/// "nothing scheduled". Durations too large to be represented saturate at
/// [`ClockTime::MAX`].
#[must_use]
pub fn duration_to_ticks(duration: Duration) -> ClockTime {
    let nanos = duration.as_nanos();
    let ticks = nanos.div_ceil(u128::from(NANOS_PER_SECOND / CLOCK_SECOND));
    ClockTime::try_from(ticks).unwrap_or(ClockTime::MAX)
}

#[cfg(test)]
mod tests {
    use core::time::Duration;

    use super::{CLOCK_SECOND, duration_to_ticks, ticks_to_duration};

    #[test]
    fn ticks_split_into_seconds_and_nanos() {
        let duration = ticks_to_duration(2 * CLOCK_SECOND + 250);

        assert_eq!(duration.as_secs(), 2);
        assert_eq!(duration.subsec_nanos(), 250_000_000);
        assert_eq!(ticks_to_duration(0), Duration::ZERO);
    }

    #[test]
    fn durations_round_up() {
        assert_eq!(duration_to_ticks(Duration::ZERO), 0);
        assert_eq!(duration_to_ticks(Duration::from_nanos(1)), 1);
        assert_eq!(duration_to_ticks(Duration::from_millis(1500)), 1500);
        assert_eq!(duration_to_ticks(Duration::from_micros(1001)), 2);
        assert_eq!(duration_to_ticks(Duration::MAX), u64::MAX);
    }
}
