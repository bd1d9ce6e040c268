use chrono::{NaiveDateTime, TimeDelta};

/// An inclusive hourly timeline between two timestamps.
///
/// Yields each hour in strict chronological order, paired with its index.
///
/// # Examples
///
/// ```
/// use dispatch_sim::demand::parse_timestamp;
/// use dispatch_sim::sim::clock::Timeline;
///
/// let start = parse_timestamp("2020-01-01 00:00:00").unwrap();
/// let end = parse_timestamp("2020-01-01 02:00:00").unwrap();
/// let timeline = Timeline::new(start, end);
/// assert_eq!(timeline.len(), 3);
/// assert_eq!(timeline.iter().last(), Some((2, end)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    start: NaiveDateTime,
    len: usize,
}

impl Timeline {
    /// Creates a timeline covering `start..=end`. Empty if `end < start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        let hours = (end - start).num_hours();
        let len = usize::try_from(hours).map_or(0, |h| h + 1);
        Self { start, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Timestamp of hour `index`.
    pub fn at(&self, index: usize) -> NaiveDateTime {
        self.start + TimeDelta::hours(index as i64)
    }

    /// Iterates `(index, timestamp)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, NaiveDateTime)> + '_ {
        (0..self.len).map(|i| (i, self.at(i)))
    }

    /// All timestamps, collected.
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.iter().map(|(_, ts)| ts).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::parse_timestamp;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).expect("valid timestamp")
    }

    #[test]
    fn inclusive_of_both_endpoints() {
        let t = Timeline::new(ts("2020-01-01 00:00:00"), ts("2020-01-02 00:00:00"));
        assert_eq!(t.len(), 25);
        assert_eq!(t.at(24), ts("2020-01-02 00:00:00"));
    }

    #[test]
    fn single_hour() {
        let t = Timeline::new(ts("2020-01-01 05:00:00"), ts("2020-01-01 05:00:00"));
        assert_eq!(t.timestamps(), vec![ts("2020-01-01 05:00:00")]);
    }

    #[test]
    fn reversed_range_is_empty() {
        let t = Timeline::new(ts("2020-01-02 00:00:00"), ts("2020-01-01 00:00:00"));
        assert!(t.is_empty());
        assert_eq!(t.iter().count(), 0);
    }
}
