//! The "viewed date" shared by the habit and task views.

use chrono::{Days, NaiveDate};

use super::clock::{Clock, SystemClock};
use super::error::{BambooError, Result};
use super::paths::DATE_FORMAT;

pub struct DateCursor<C: Clock = SystemClock> {
    current: NaiveDate,
    clock: C,
}

impl DateCursor<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for DateCursor<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> DateCursor<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            current: clock.today(),
            clock,
        }
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current
    }

    /// Moves by a signed number of days. Stays put if the result would leave
    /// chrono's representable range.
    pub fn advance(&mut self, delta_days: i64) {
        let magnitude = Days::new(delta_days.unsigned_abs());
        let moved = if delta_days >= 0 {
            self.current.checked_add_days(magnitude)
        } else {
            self.current.checked_sub_days(magnitude)
        };
        if let Some(date) = moved {
            self.current = date;
        }
    }

    pub fn reset_to_today(&mut self) {
        self.current = self.clock.today();
    }

    /// Parses `YYYY-MM-DD`. Blank input goes back to today; malformed input
    /// leaves the cursor where it was.
    pub fn jump_to(&mut self, input: &str) -> Result<()> {
        let input = input.trim();
        if input.is_empty() {
            self.reset_to_today();
            return Ok(());
        }
        self.current = parse_date(input)?;
        Ok(())
    }

    /// "Today", "Yesterday", "Tomorrow" or the weekday name.
    pub fn label(&self) -> String {
        let today = self.clock.today();
        match (self.current - today).num_days() {
            0 => "Today".to_string(),
            -1 => "Yesterday".to_string(),
            1 => "Tomorrow".to_string(),
            _ => self.current.format("%A").to_string(),
        }
    }
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| BambooError::Parse {
        input: input.to_string(),
        expected: "date (YYYY-MM-DD)",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn cursor_on(day: NaiveDate) -> DateCursor<FixedClock> {
        DateCursor::with_clock(FixedClock::on(day))
    }

    #[test]
    fn test_yesterday_then_tomorrow() {
        let mut cursor = cursor_on(date(2024, 6, 1));
        assert_eq!(cursor.label(), "Today");

        cursor.advance(-1);
        assert_eq!(cursor.label(), "Yesterday");

        cursor.advance(2);
        assert_eq!(cursor.label(), "Tomorrow");
        assert_eq!(cursor.current_date(), date(2024, 6, 2));
    }

    #[test]
    fn test_weekday_label() {
        let mut cursor = cursor_on(date(2024, 6, 1));
        cursor.advance(-5);
        // 2024-05-27 was a Monday
        assert_eq!(cursor.label(), "Monday");
        cursor.advance(400);
        assert_eq!(cursor.label(), cursor.current_date().format("%A").to_string());
    }

    #[test]
    fn test_advance_far_and_reset() {
        let mut cursor = cursor_on(date(2024, 6, 1));
        cursor.advance(-36_500);
        assert_eq!(cursor.current_date().format("%Y").to_string(), "1924");
        cursor.reset_to_today();
        assert_eq!(cursor.current_date(), date(2024, 6, 1));
    }

    #[test]
    fn test_jump_to() {
        let mut cursor = cursor_on(date(2024, 6, 1));
        cursor.jump_to("2023-12-31").unwrap();
        assert_eq!(cursor.current_date(), date(2023, 12, 31));

        let err = cursor.jump_to("31/12/2023").unwrap_err();
        assert!(matches!(err, BambooError::Parse { .. }));
        assert_eq!(cursor.current_date(), date(2023, 12, 31));

        assert!(cursor.jump_to("2023-02-30").is_err());
        assert_eq!(cursor.current_date(), date(2023, 12, 31));

        cursor.jump_to("  ").unwrap();
        assert_eq!(cursor.current_date(), date(2024, 6, 1));
    }

    #[test]
    fn test_label_follows_clock() {
        use chrono::NaiveDateTime;
        use std::cell::Cell;

        struct SteppingClock(Cell<NaiveDateTime>);
        impl Clock for SteppingClock {
            fn now(&self) -> NaiveDateTime {
                self.0.get()
            }
        }

        let start = date(2024, 6, 1).and_hms_opt(23, 59, 0).unwrap();
        let clock = SteppingClock(Cell::new(start));
        let cursor = DateCursor::with_clock(&clock);
        assert_eq!(cursor.label(), "Today");

        clock.0.set(date(2024, 6, 2).and_hms_opt(0, 1, 0).unwrap());
        assert_eq!(cursor.label(), "Yesterday");
    }
}
