use std::time::Duration;

use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Local wall clock at a fixed UTC offset. "Today" and the nightly broadcast
/// are both resolved against it.
#[derive(Debug, Clone, Copy)]
pub struct LocalClock {
    offset: UtcOffset,
}

impl LocalClock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub fn from_hours(hours: i8) -> anyhow::Result<Self> {
        Ok(Self::new(UtcOffset::from_hms(hours, 0, 0)?))
    }

    pub fn now(&self) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        PrimitiveDateTime::new(now.date(), now.time())
    }

    pub fn today(&self) -> Date {
        self.now().date()
    }

    /// Time left until the next local occurrence of `at`.
    pub fn until_next(&self, at: Time) -> Duration {
        until_next_from(self.now(), at)
    }
}

pub fn until_next_from(now: PrimitiveDateTime, at: Time) -> Duration {
    let today_at = now.date().with_time(at);
    let target = if today_at > now {
        today_at
    } else {
        today_at + time::Duration::days(1)
    };
    Duration::try_from(target - now).unwrap_or_default()
}

/// Monday of the week containing `day`.
pub fn week_start(day: Date) -> Date {
    day - time::Duration::days(i64::from(day.weekday().number_days_from_monday()))
}
