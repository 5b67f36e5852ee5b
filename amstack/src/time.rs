/*! Time structures.

Nodes count time with a free running 32-bit millisecond counter that wraps around after roughly
49 days. An [Instant] is a reading of that counter, differences are [Duration]s taken modulo the
counter width so that they stay correct across a single wrap.

[Instant]: struct.Instant.html
[Duration]: https://doc.rust-lang.org/core/time/struct.Duration.html
*/
use core::{fmt, ops};
pub use core::time::Duration;

/// A reading of the local millisecond counter.
///
/// Only the difference of two readings is meaningful. Comparisons between instants are not
/// provided since the counter wraps, use `wrapping_since` to order two nearby readings instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Instant {
    millis: u32,
}

impl Instant {
    /// Create an `Instant` from a raw counter value.
    pub const fn from_millis(millis: u32) -> Instant {
        Instant { millis }
    }

    /// The raw counter value.
    pub fn total_millis(self) -> u32 {
        self.millis
    }

    /// Time elapsed since an earlier reading.
    ///
    /// Correct as long as less than one full counter period passed between the two readings.
    pub fn wrapping_since(self, earlier: Instant) -> Duration {
        Duration::from_millis(u64::from(self.millis.wrapping_sub(earlier.millis)))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{:03}s", self.millis / 1000, self.millis % 1000)
    }
}

impl ops::Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant::from_millis(self.millis.wrapping_add(rhs.as_millis() as u32))
    }
}

impl ops::AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn instant_ops() {
        assert_eq!(Instant::from_millis(4) + Duration::from_millis(6), Instant::from_millis(10));
        let mut now = Instant::from_millis(u32::max_value());
        now += Duration::from_millis(2);
        assert_eq!(now, Instant::from_millis(1));
    }

    #[test]
    fn elapsed_across_wrap() {
        let before = Instant::from_millis(u32::max_value() - 9);
        let after = Instant::from_millis(10);
        assert_eq!(after.wrapping_since(before), Duration::from_millis(20));
    }

    #[test]
    fn instant_display() {
        assert_eq!(format!("{}", Instant::from_millis(5674)), "5.674s");
        assert_eq!(format!("{}", Instant::from_millis(5000)), "5.000s");
    }
}
