use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("calendar requires at least one working day")]
    NoWorkingDays,
    #[error("holiday window {0} is not a valid month/day range")]
    InvalidWindow(HolidayWindow),
}

/// A year-independent, inclusive month/day range. A window whose end falls
/// before its start wraps across the year boundary (e.g. 15 Dec - 2 Jan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolidayWindow {
    pub start_month: u32,
    pub start_day: u32,
    pub end_month: u32,
    pub end_day: u32,
}

impl HolidayWindow {
    pub const fn new(start_month: u32, start_day: u32, end_month: u32, end_day: u32) -> Self {
        Self {
            start_month,
            start_day,
            end_month,
            end_day,
        }
    }

    /// The year-end closure: 15 December through 2 January.
    pub const fn year_end() -> Self {
        Self::new(12, 15, 1, 2)
    }

    fn is_valid(&self) -> bool {
        // 2024 is a leap year, so 29 Feb is accepted as a bound
        NaiveDate::from_ymd_opt(2024, self.start_month, self.start_day).is_some()
            && NaiveDate::from_ymd_opt(2024, self.end_month, self.end_day).is_some()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let key = (date.month(), date.day());
        let start = (self.start_month, self.start_day);
        let end = (self.end_month, self.end_day);
        if start <= end {
            start <= key && key <= end
        } else {
            key >= start || key <= end
        }
    }
}

impl std::fmt::Display for HolidayWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}/{:02}-{:02}/{:02}",
            self.start_day, self.start_month, self.end_day, self.end_month
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkCalendar {
    holiday_windows: Vec<HolidayWindow>,
    non_working_days: HashSet<Weekday>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkCalendarConfig {
    working_days: Vec<Weekday>,
    holiday_windows: Vec<HolidayWindow>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            holiday_windows: vec![HolidayWindow::year_end()],
            non_working_days: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn custom<I, J>(working_days: I, holiday_windows: J) -> Result<Self, CalendarError>
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = HolidayWindow>,
    {
        let config = WorkCalendarConfig::new(working_days, holiday_windows);
        Self::from_config(&config)
    }

    pub fn from_config(config: &WorkCalendarConfig) -> Result<Self, CalendarError> {
        let working_set: HashSet<Weekday> = config.working_days.iter().copied().collect();
        if working_set.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        if let Some(bad) = config.holiday_windows.iter().find(|w| !w.is_valid()) {
            return Err(CalendarError::InvalidWindow(*bad));
        }
        let non_working_days = Self::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !working_set.contains(day))
            .collect();

        let calendar = Self {
            holiday_windows: config.holiday_windows.clone(),
            non_working_days,
        };
        calendar.ensure_open_days()?;
        Ok(calendar)
    }

    // Windows recur yearly, so one leap year shows whether any day is open.
    fn ensure_open_days(&self) -> Result<(), CalendarError> {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or(CalendarError::NoWorkingDays)?;
        let open = first
            .iter_days()
            .take(366)
            .any(|day| self.is_working_day(day));
        if open {
            Ok(())
        } else {
            Err(CalendarError::NoWorkingDays)
        }
    }

    pub fn to_config(&self) -> WorkCalendarConfig {
        WorkCalendarConfig::from(self)
    }

    pub fn holiday_windows(&self) -> &[HolidayWindow] {
        &self.holiday_windows
    }

    /// Add a recurring holiday window
    pub fn add_holiday_window(&mut self, window: HolidayWindow) -> Result<(), CalendarError> {
        if !window.is_valid() {
            return Err(CalendarError::InvalidWindow(window));
        }
        if self.holiday_windows.contains(&window) {
            return Ok(());
        }
        self.holiday_windows.push(window);
        if let Err(err) = self.ensure_open_days() {
            self.holiday_windows.pop();
            return Err(err);
        }
        Ok(())
    }

    /// Set custom working days (e.g., Mon-Sat for 6-day weeks)
    pub fn set_working_days(&mut self, days: &[Weekday]) -> Result<(), CalendarError> {
        if days.is_empty() {
            return Err(CalendarError::NoWorkingDays);
        }
        let previous = std::mem::take(&mut self.non_working_days);
        for day in Self::ALL_WEEKDAYS {
            if !days.contains(&day) {
                self.non_working_days.insert(day);
            }
        }
        if let Err(err) = self.ensure_open_days() {
            self.non_working_days = previous;
            return Err(err);
        }
        Ok(())
    }

    /// True when the date's month/day falls inside any holiday window.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holiday_windows.iter().any(|w| w.contains(date))
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.non_working_days.contains(&date.weekday()) && !self.is_holiday(date)
    }

    /// Step `n` working days forward (or backward when negative), one
    /// calendar day at a time. `n == 0` returns `date` untouched, even when
    /// it is not itself a working day.
    pub fn advance(&self, date: NaiveDate, n: i64) -> NaiveDate {
        let step = if n < 0 { -1 } else { 1 };
        let mut current = date;
        let mut remaining = n.abs();

        while remaining > 0 {
            current += Duration::days(step);
            if self.is_working_day(current) {
                remaining -= 1;
            }
        }
        current
    }

    /// Smallest working day on or after `date`.
    pub fn next_working_day(&self, date: NaiveDate) -> NaiveDate {
        let mut current = date;
        while !self.is_working_day(current) {
            current += Duration::days(1);
        }
        current
    }

    /// Smallest working Monday strictly after `date`. A Monday that lands on
    /// a holiday is skipped for the following week, never shifted. Calendars
    /// where Monday is not a working weekday fall back to the next working day.
    pub fn next_working_monday(&self, date: NaiveDate) -> NaiveDate {
        if self.non_working_days.contains(&Weekday::Mon) {
            return self.next_working_day(date + Duration::days(1));
        }
        let offset = 7 - i64::from(date.weekday().num_days_from_monday());
        let mut current = date + Duration::days(offset);
        while !self.is_working_day(current) {
            current += Duration::weeks(1);
        }
        current
    }

    /// Get all working days in a date range
    pub fn working_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| self.is_working_day(*day))
            .collect()
    }

    /// Count working days in a date range (inclusive)
    pub fn count_working_days(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        start
            .iter_days()
            .take_while(|day| *day <= end)
            .filter(|day| self.is_working_day(*day))
            .count() as i64
    }
}

impl WorkCalendarConfig {
    pub fn new<I, J>(working_days: I, holiday_windows: J) -> Self
    where
        I: IntoIterator<Item = Weekday>,
        J: IntoIterator<Item = HolidayWindow>,
    {
        let mut working: Vec<Weekday> = working_days.into_iter().collect();
        working.sort_by_key(|wd| wd.num_days_from_monday());
        working.dedup();

        let mut windows: Vec<HolidayWindow> = Vec::new();
        for window in holiday_windows {
            if !windows.contains(&window) {
                windows.push(window);
            }
        }

        Self {
            working_days: working,
            holiday_windows: windows,
        }
    }

    pub fn working_days(&self) -> &[Weekday] {
        &self.working_days
    }

    pub fn holiday_windows(&self) -> &[HolidayWindow] {
        &self.holiday_windows
    }
}

impl Default for WorkCalendarConfig {
    fn default() -> Self {
        WorkCalendarConfig::from(&WorkCalendar::default())
    }
}

impl From<&WorkCalendar> for WorkCalendarConfig {
    fn from(calendar: &WorkCalendar) -> Self {
        let working = WorkCalendar::ALL_WEEKDAYS
            .into_iter()
            .filter(|day| !calendar.non_working_days.contains(day))
            .collect();

        Self {
            working_days: working,
            holiday_windows: calendar.holiday_windows.clone(),
        }
    }
}
