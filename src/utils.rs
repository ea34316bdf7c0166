use chrono::{DateTime as UtcDateTime, Months};

use crate::{entity::BillingInterval, prelude::*};

pub fn now() -> DateTime {
  Utc::now().naive_utc()
}

/// Converts provider unix seconds into a naive UTC timestamp.
pub fn from_unix(secs: i64) -> Option<DateTime> {
  UtcDateTime::from_timestamp(secs, 0).map(|date| date.naive_utc())
}

/// End of a billing period starting at `start`.
pub fn period_end(start: DateTime, interval: BillingInterval) -> DateTime {
  start
    .checked_add_months(Months::new(interval.months()))
    .unwrap_or(DateTime::MAX)
}

/// Whole days left until `end`, rounded up and never negative.
pub fn days_remaining(end: DateTime, now: DateTime) -> i64 {
  let left = end - now;
  if left <= TimeDelta::zero() {
    return 0;
  }

  let days = left.num_days();
  if left > TimeDelta::days(days) { days + 1 } else { days }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
  }

  #[test]
  fn days_remaining_rounds_up() {
    let now = at(2026, 3, 1, 12);

    assert_eq!(days_remaining(at(2026, 3, 11, 12), now), 10);
    assert_eq!(days_remaining(at(2026, 3, 11, 13), now), 11);
    assert_eq!(days_remaining(at(2026, 3, 1, 13), now), 1);
  }

  #[test]
  fn days_remaining_is_never_negative() {
    let now = at(2026, 3, 1, 12);

    assert_eq!(days_remaining(at(2026, 2, 1, 12), now), 0);
    assert_eq!(days_remaining(now, now), 0);
  }

  #[test]
  fn periods_follow_calendar_months() {
    let start = at(2026, 1, 31, 0);

    assert_eq!(period_end(start, BillingInterval::Month), at(2026, 2, 28, 0));
    assert_eq!(
      period_end(start, BillingInterval::Semester),
      at(2026, 7, 31, 0)
    );
    assert_eq!(period_end(start, BillingInterval::Year), at(2027, 1, 31, 0));
  }

  #[test]
  fn unix_seconds_convert() {
    assert_eq!(from_unix(0), Some(at(1970, 1, 1, 0)));
  }
}
