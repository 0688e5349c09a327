//! Small utility helpers used across modules.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

/// Calendar day of `ts` as seen by a user living at `offset`.
pub fn local_day(ts: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
  ts.with_timezone(&offset).date_naive()
}

/// Build a fixed offset from minutes east of UTC. `None` outside the open ±24h range.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
  minutes.checked_mul(60).and_then(FixedOffset::east_opt)
}

pub fn utc_offset() -> FixedOffset {
  Utc.fix()
}

/// Log-safe truncation for large strings.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) { cut -= 1; }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn local_day_follows_offset() {
    let ts = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
    assert_eq!(local_day(ts, utc_offset()), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    let cet = offset_from_minutes(60).unwrap();
    assert_eq!(local_day(ts, cet), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
  }

  #[test]
  fn out_of_range_offsets_are_refused() {
    assert!(offset_from_minutes(-24 * 60).is_none());
    assert!(offset_from_minutes(100_000).is_none());
    assert!(offset_from_minutes(i32::MAX).is_none());
    assert_eq!(offset_from_minutes(-(23 * 60 + 59)).map(|o| o.local_minus_utc()), Some(-(23 * 3600 + 59 * 60)));
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let out = trunc_for_log("héllo world", 2);
    assert!(out.starts_with("h…"), "{out}");
  }
}
