use std::time::Duration;

/// How long a blocking call should wait for a result.
///
/// Replaces the source API's overloaded `long timeout` convention (`0` for a
/// non-blocking poll, negative for an unbounded wait, positive for a bound in
/// milliseconds) with a small closed enum, so the three cases can't be
/// confused with each other at a call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Return immediately if no result is already available.
    Immediate,
    /// Block until a result is available, with no deadline.
    Forever,
    /// Block until a result is available or the duration elapses.
    After(Duration),
}

impl Timeout {
    /// Build a `Timeout` from the source convention's millisecond sentinel:
    /// `0` is [`Timeout::Immediate`], negative is [`Timeout::Forever`], and a
    /// positive value is [`Timeout::After`].
    pub fn from_millis(ms: i64) -> Self {
        match ms {
            0 => Self::Immediate,
            ms if ms < 0 => Self::Forever,
            ms => Self::After(Duration::from_millis(ms as u64)),
        }
    }
}
