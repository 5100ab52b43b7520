use chrono::DateTime;
use chrono::Days;
use chrono::FixedOffset;
use chrono::NaiveTime;
use chrono::Utc;

use super::Trigger;

pub(super) struct DailyTrigger {
    pub(super) timezone: FixedOffset,
    pub(super) time: NaiveTime,
}

impl Trigger for DailyTrigger {
    fn next(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let local = previous.with_timezone(&self.timezone);
        let mut date = local.date_naive();
        loop {
            // fixed offsets have no gaps, so every local time maps to exactly one instant
            if let Some(next) = date.and_time(self.time).and_local_timezone(self.timezone).single()
                && next > local
            {
                return next.with_timezone(&Utc);
            }
            match date.checked_add_days(Days::new(1)) {
                Some(tomorrow) => date = tomorrow,
                None => return previous,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use chrono::FixedOffset;
    use chrono::NaiveTime;
    use chrono::Utc;

    use super::DailyTrigger;
    use crate::schedule::Trigger;

    fn time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn next_same_day() {
        let trigger = DailyTrigger {
            timezone: FixedOffset::east_opt(0).unwrap(),
            time: NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
        };
        assert_eq!(
            trigger.next(time("2025-03-01T01:30:00Z")),
            time("2025-03-01T03:00:00Z")
        );
    }

    #[test]
    fn next_day_when_time_passed() {
        let trigger = DailyTrigger {
            timezone: FixedOffset::east_opt(0).unwrap(),
            time: NaiveTime::from_hms_opt(3, 0, 0).unwrap(),
        };
        assert_eq!(
            trigger.next(time("2025-03-01T03:00:00Z")),
            time("2025-03-02T03:00:00Z")
        );
        assert_eq!(
            trigger.next(time("2025-12-31T23:00:00Z")),
            time("2026-01-01T03:00:00Z")
        );
    }

    #[test]
    fn next_with_offset() {
        let trigger = DailyTrigger {
            timezone: FixedOffset::east_opt(8 * 60 * 60).unwrap(),
            time: NaiveTime::from_hms_opt(1, 0, 0).unwrap(),
        };
        // 2025-03-01 20:00 at +08:00, next 01:00 local is 2025-03-02 01:00 +08:00
        assert_eq!(
            trigger.next(time("2025-03-01T12:00:00Z")),
            time("2025-03-01T17:00:00Z")
        );
    }
}
