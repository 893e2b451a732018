//! Reporting calendar: Monday–Sunday windows resolved from one reference date.
//!
//! The system clock is read at most once, in [`CalendarWindowResolver::today`].
//! Every window handed to the rest of the crate is a resolved [`WindowSpec`].
//!
//! Prior-year weeks are rebuilt from the ISO (year, week) pair rather than by
//! subtracting 52 weeks, which drifts by one week after a 53-week year. The
//! fiscal year-to-date spans shift their endpoints by whole calendar years
//! instead, so their prior-year end dates can differ from the prior-year week.

use crate::domain::error::ReportError;
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

/// Number of weeks in the rolling report.
pub const ROLLING_WEEKS: usize = 8;

/// First month of the fiscal year (April).
pub const FISCAL_YEAR_START_MONTH: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum WindowKind {
    /// Monday through Sunday.
    Week,
    /// Any inclusive date range, e.g. fiscal year-to-date.
    Span,
}

/// A labelled, inclusive date window.
///
/// Fields are private so that a `Week` window always starts on a Monday and
/// ends six days later on a Sunday.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WindowSpec {
    label: String,
    start: NaiveDate,
    end: NaiveDate,
    kind: WindowKind,
}

impl WindowSpec {
    pub fn week(label: impl Into<String>, monday: NaiveDate) -> Result<Self, ReportError> {
        let label = label.into();
        if monday.weekday() != Weekday::Mon {
            return Err(ReportError::InvalidWindow {
                label,
                reason: format!("week must start on a Monday, got {} ({})", monday, monday.weekday()),
            });
        }
        Ok(Self {
            label,
            start: monday,
            end: monday + Duration::days(6),
            kind: WindowKind::Week,
        })
    }

    pub fn span(
        label: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, ReportError> {
        let label = label.into();
        if start > end {
            return Err(ReportError::InvalidWindow {
                label,
                reason: format!("start {} is after end {}", start, end),
            });
        }
        Ok(Self {
            label,
            start,
            end,
            kind: WindowKind::Span,
        })
    }

    /// The Monday–Sunday window of an ISO week. A week number past the last
    /// week of `iso_year` is clamped to that year's last week.
    pub fn iso_week(label: impl Into<String>, iso_year: i32, week: u32) -> Result<Self, ReportError> {
        let label = label.into();
        let week = week.clamp(1, iso_weeks_in_year(iso_year));
        let monday = NaiveDate::from_isoywd_opt(iso_year, week, Weekday::Mon).ok_or_else(|| {
            ReportError::InvalidWindow {
                label: label.clone(),
                reason: format!("ISO week {} of {} is out of range", week, iso_year),
            }
        })?;
        Self::week(label, monday)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn is_week(&self) -> bool {
        self.kind == WindowKind::Week
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// ISO (year, week) of the window start.
    pub fn iso_year_week(&self) -> (i32, u32) {
        let iso = self.start.iso_week();
        (iso.year(), iso.week())
    }

    /// e.g. `W07 2025`, using the ISO year so that late-December weeks
    /// belonging to week 1 are labelled with the following year.
    pub fn iso_label(&self) -> String {
        let (year, week) = self.iso_year_week();
        format!("W{:02} {}", week, year)
    }

    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..self.clone()
        }
    }

    /// Same ISO week number, `years_back` ISO years earlier.
    pub fn same_iso_week_years_back(
        &self,
        label: impl Into<String>,
        years_back: i32,
    ) -> Result<Self, ReportError> {
        let (year, week) = self.iso_year_week();
        Self::iso_week(label, year - years_back, week)
    }
}

/// Number of ISO weeks (52 or 53) in an ISO year.
pub fn iso_weeks_in_year(iso_year: i32) -> u32 {
    // December 28th always falls in the last ISO week of its year.
    NaiveDate::from_ymd_opt(iso_year, 12, 28)
        .map(|d| d.iso_week().week())
        .unwrap_or(52)
}

/// Shift a date by whole calendar years; February 29th becomes the 28th in a
/// non-leap target year.
pub fn shift_calendar_years(date: NaiveDate, years: i32) -> NaiveDate {
    let year = date.year() - years;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
        .unwrap_or(date)
}

/// Current week, previous week and the same ISO week one and two years back.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct WeekComparison {
    pub current_week: WindowSpec,
    pub last_week: WindowSpec,
    pub last_year: WindowSpec,
    pub two_years_back: WindowSpec,
}

impl WeekComparison {
    pub fn windows(&self) -> [&WindowSpec; 4] {
        [
            &self.current_week,
            &self.last_week,
            &self.last_year,
            &self.two_years_back,
        ]
    }
}

/// Fiscal year-to-date spans for this year and the two prior years.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FiscalYtd {
    pub current: WindowSpec,
    pub last_year: WindowSpec,
    pub two_years_back: WindowSpec,
}

/// One week of a rolling report. Index 1 is the oldest week.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RollingWeek {
    pub index: usize,
    pub window: WindowSpec,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RollingWeeks {
    pub weeks: Vec<RollingWeek>,
}

impl RollingWeeks {
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn windows(&self) -> impl Iterator<Item = &WindowSpec> {
        self.weeks.iter().map(|w| &w.window)
    }

    pub fn latest(&self) -> Option<&WindowSpec> {
        self.weeks.last().map(|w| &w.window)
    }

    /// Contiguous span from the first Monday to the last Sunday.
    pub fn span(&self, label: &str) -> Option<WindowSpec> {
        let first = self.weeks.first()?;
        let last = self.weeks.last()?;
        WindowSpec::span(label, first.window.start(), last.window.end()).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KeyDates {
    pub latest_sunday: NaiveDate,
    pub eight_weeks_back: NaiveDate,
    pub fiscal_year_start: NaiveDate,
    pub quarter_start: NaiveDate,
    pub month_start: NaiveDate,
    pub current_year: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarWindowResolver {
    reference_date: NaiveDate,
    latest_sunday: NaiveDate,
}

impl CalendarWindowResolver {
    pub fn new(reference_date: NaiveDate) -> Self {
        let back = reference_date.weekday().num_days_from_sunday() as i64;
        Self {
            reference_date,
            latest_sunday: reference_date - Duration::days(back),
        }
    }

    /// Resolve from the local system date.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    /// Use a `YYYY-MM-DD` override when one is configured, otherwise today.
    pub fn from_override(value: Option<&str>) -> Result<Self, ReportError> {
        match value.map(str::trim) {
            None | Some("") => Ok(Self::today()),
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(Self::new)
                .map_err(|_| ReportError::InvalidReferenceDate {
                    value: s.to_string(),
                }),
        }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn latest_sunday(&self) -> NaiveDate {
        self.latest_sunday
    }

    fn latest_monday(&self) -> NaiveDate {
        self.latest_sunday - Duration::days(6)
    }

    fn week_ending(&self, label: &str, weeks_back: i64) -> WindowSpec {
        let monday = self.latest_monday() - Duration::weeks(weeks_back);
        WindowSpec {
            label: label.to_string(),
            start: monday,
            end: monday + Duration::days(6),
            kind: WindowKind::Week,
        }
    }

    pub fn current_week(&self) -> WindowSpec {
        self.week_ending("current_week", 0)
    }

    pub fn last_week(&self) -> WindowSpec {
        self.week_ending("last_week", 1)
    }

    pub fn last_year(&self) -> Result<WindowSpec, ReportError> {
        self.current_week().same_iso_week_years_back("last_year", 1)
    }

    pub fn two_years_back(&self) -> Result<WindowSpec, ReportError> {
        self.current_week().same_iso_week_years_back("two_years_back", 2)
    }

    pub fn week_comparison(&self) -> Result<WeekComparison, ReportError> {
        Ok(WeekComparison {
            current_week: self.current_week(),
            last_week: self.last_week(),
            last_year: self.last_year()?,
            two_years_back: self.two_years_back()?,
        })
    }

    pub fn fiscal_year_start(&self) -> NaiveDate {
        let sunday = self.latest_sunday;
        let year = if sunday.month() >= FISCAL_YEAR_START_MONTH {
            sunday.year()
        } else {
            sunday.year() - 1
        };
        NaiveDate::from_ymd_opt(year, FISCAL_YEAR_START_MONTH, 1)
            .unwrap_or(sunday)
    }

    pub fn fiscal_ytd(&self) -> Result<FiscalYtd, ReportError> {
        let start = self.fiscal_year_start();
        let end = self.latest_sunday;
        let shifted = |label: &str, years: i32| {
            WindowSpec::span(
                label,
                shift_calendar_years(start, years),
                shift_calendar_years(end, years),
            )
        };
        Ok(FiscalYtd {
            current: WindowSpec::span("ytd", start, end)?,
            last_year: shifted("ytd_last_year", 1)?,
            two_years_back: shifted("ytd_two_years_back", 2)?,
        })
    }

    /// `count` consecutive weeks ending at the latest Sunday, oldest first.
    pub fn rolling_weeks(&self, count: usize) -> RollingWeeks {
        let weeks = (0..count)
            .map(|i| {
                let weeks_back = (count - 1 - i) as i64;
                let window = self.week_ending("", weeks_back);
                let label = window.iso_label();
                RollingWeek {
                    index: i + 1,
                    window: window.with_label(label),
                }
            })
            .collect();
        RollingWeeks { weeks }
    }

    /// The same rolling weeks one ISO year earlier, week by week.
    pub fn rolling_weeks_last_year(&self, count: usize) -> Result<RollingWeeks, ReportError> {
        let weeks = self
            .rolling_weeks(count)
            .weeks
            .into_iter()
            .map(|week| {
                let (year, iso_week) = week.window.iso_year_week();
                let window = WindowSpec::iso_week("", year - 1, iso_week)?;
                let label = window.iso_label();
                Ok(RollingWeek {
                    index: week.index,
                    window: window.with_label(label),
                })
            })
            .collect::<Result<Vec<_>, ReportError>>()?;
        Ok(RollingWeeks { weeks })
    }

    pub fn key_dates(&self) -> KeyDates {
        let sunday = self.latest_sunday;
        let quarter_month = ((sunday.month() - 1) / 3) * 3 + 1;
        KeyDates {
            latest_sunday: sunday,
            eight_weeks_back: sunday - Duration::weeks(ROLLING_WEEKS as i64),
            fiscal_year_start: self.fiscal_year_start(),
            quarter_start: NaiveDate::from_ymd_opt(sunday.year(), quarter_month, 1)
                .unwrap_or(sunday),
            month_start: sunday.with_day(1).unwrap_or(sunday),
            current_year: sunday.year(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn latest_sunday_steps_back_mid_week() {
        let r = CalendarWindowResolver::new(d(2025, 2, 12));
        assert_eq!(r.latest_sunday(), d(2025, 2, 9));
    }

    #[test]
    fn latest_sunday_on_sunday_is_itself() {
        let r = CalendarWindowResolver::new(d(2025, 2, 9));
        assert_eq!(r.latest_sunday(), d(2025, 2, 9));
    }

    #[test]
    fn latest_sunday_on_monday() {
        let r = CalendarWindowResolver::new(d(2025, 2, 10));
        assert_eq!(r.latest_sunday(), d(2025, 2, 9));
    }

    #[test]
    fn current_and_last_week() {
        let r = CalendarWindowResolver::new(d(2025, 2, 12));
        let current = r.current_week();
        assert_eq!(current.start(), d(2025, 2, 3));
        assert_eq!(current.end(), d(2025, 2, 9));
        assert_eq!(current.label(), "current_week");

        let last = r.last_week();
        assert_eq!(last.start(), d(2025, 1, 27));
        assert_eq!(last.end(), d(2025, 2, 2));
    }

    #[test]
    fn last_year_rebuilds_iso_week() {
        let r = CalendarWindowResolver::new(d(2025, 2, 12));
        let ly = r.last_year().unwrap();
        assert_eq!(ly.iso_year_week(), (2024, 6));
        assert_eq!(ly.start(), d(2024, 2, 5));
        assert_eq!(ly.end(), d(2024, 2, 11));

        let two = r.two_years_back().unwrap();
        assert_eq!(two.iso_year_week(), (2023, 6));
        assert_eq!(two.start(), d(2023, 2, 6));
    }

    #[test]
    fn week_one_after_53_week_year() {
        // 2020 has 53 ISO weeks; 2021-W01 starts on 2021-01-04.
        let r = CalendarWindowResolver::new(d(2021, 1, 10));
        assert_eq!(r.current_week().iso_year_week(), (2021, 1));

        let ly = r.last_year().unwrap();
        assert_eq!(ly.iso_year_week(), (2020, 1));
        assert_eq!(ly.start(), d(2019, 12, 30));
        assert_eq!(ly.end(), d(2020, 1, 5));

        // A flat 52-week shift would land on 2020-W02.
        let naive = r.current_week().start() - Duration::weeks(52);
        assert_eq!(naive, d(2020, 1, 6));
        assert_ne!(naive, ly.start());
    }

    #[test]
    fn week_53_clamps_to_last_week_of_shorter_year() {
        let r = CalendarWindowResolver::new(d(2021, 1, 3));
        assert_eq!(r.current_week().iso_year_week(), (2020, 53));

        let ly = r.last_year().unwrap();
        assert_eq!(ly.iso_year_week(), (2019, 52));
        assert_eq!(ly.start(), d(2019, 12, 23));
        assert_eq!(ly.end(), d(2019, 12, 29));
    }

    #[test]
    fn last_year_uses_iso_year_at_december_rollover() {
        // 2024-12-30 belongs to 2025-W01.
        let r = CalendarWindowResolver::new(d(2025, 1, 5));
        assert_eq!(r.current_week().start(), d(2024, 12, 30));
        let ly = r.last_year().unwrap();
        assert_eq!(ly.iso_year_week(), (2024, 1));
        assert_eq!(ly.start(), d(2024, 1, 1));
    }

    #[test]
    fn iso_weeks_in_year_counts() {
        assert_eq!(iso_weeks_in_year(2020), 53);
        assert_eq!(iso_weeks_in_year(2015), 53);
        assert_eq!(iso_weeks_in_year(2024), 52);
        assert_eq!(iso_weeks_in_year(2026), 53);
    }

    #[test]
    fn fiscal_year_start_before_april() {
        let r = CalendarWindowResolver::new(d(2025, 2, 12));
        assert_eq!(r.fiscal_year_start(), d(2024, 4, 1));
    }

    #[test]
    fn fiscal_year_start_from_april() {
        let r = CalendarWindowResolver::new(d(2025, 6, 15));
        assert_eq!(r.fiscal_year_start(), d(2025, 4, 1));
    }

    #[test]
    fn fiscal_year_start_follows_latest_sunday() {
        // Thursday 3 April resolves to Sunday 30 March, still the old fiscal year.
        let r = CalendarWindowResolver::new(d(2025, 4, 3));
        assert_eq!(r.latest_sunday(), d(2025, 3, 30));
        assert_eq!(r.fiscal_year_start(), d(2024, 4, 1));
        assert!(r.fiscal_ytd().is_ok());
    }

    #[test]
    fn fiscal_ytd_shifts_calendar_years() {
        let r = CalendarWindowResolver::new(d(2025, 2, 12));
        let ytd = r.fiscal_ytd().unwrap();
        assert_eq!(ytd.current.start(), d(2024, 4, 1));
        assert_eq!(ytd.current.end(), d(2025, 2, 9));
        assert_eq!(ytd.last_year.start(), d(2023, 4, 1));
        assert_eq!(ytd.last_year.end(), d(2024, 2, 9));
        assert_eq!(ytd.two_years_back.start(), d(2022, 4, 1));
        assert_eq!(ytd.two_years_back.end(), d(2023, 2, 9));
        assert!(!ytd.current.is_week());
    }

    #[test]
    fn fiscal_ytd_and_rolling_weeks_disagree_on_prior_year_end() {
        // The YTD comparison ends on the same calendar date a year earlier
        // (a Friday here) while the week comparison ends on the ISO Sunday.
        let r = CalendarWindowResolver::new(d(2025, 2, 12));
        let ytd_end = r.fiscal_ytd().unwrap().last_year.end();
        let week_end = r.last_year().unwrap().end();
        assert_eq!(ytd_end, d(2024, 2, 9));
        assert_eq!(ytd_end.weekday(), Weekday::Fri);
        assert_eq!(week_end, d(2024, 2, 11));
        assert_ne!(ytd_end, week_end);
    }

    #[test]
    fn fiscal_ytd_leap_day_clamps() {
        let r = CalendarWindowResolver::new(d(2032, 2, 29));
        assert_eq!(r.latest_sunday(), d(2032, 2, 29));
        let ytd = r.fiscal_ytd().unwrap();
        assert_eq!(ytd.last_year.end(), d(2031, 2, 28));
        assert_eq!(ytd.two_years_back.end(), d(2030, 2, 28));
    }

    #[test]
    fn rolling_weeks_are_consecutive() {
        let r = CalendarWindowResolver::new(d(2025, 2, 12));
        let weeks = r.rolling_weeks(ROLLING_WEEKS);
        assert_eq!(weeks.len(), 8);
        assert_eq!(weeks.weeks[0].index, 1);
        assert_eq!(weeks.weeks[7].index, 8);
        assert_eq!(weeks.weeks[0].window.start(), d(2024, 12, 16));
        assert_eq!(weeks.latest().unwrap().end(), d(2025, 2, 9));
        for pair in weeks.weeks.windows(2) {
            assert_eq!(
                pair[1].window.start() - pair[0].window.end(),
                Duration::days(1)
            );
        }
        let span = weeks.span("last_8_weeks").unwrap();
        assert_eq!(span.start(), d(2024, 12, 16));
        assert_eq!(span.end(), d(2025, 2, 9));
        assert_eq!(span.days(), 56);
    }

    #[test]
    fn rolling_weeks_labels_use_iso_year() {
        let r = CalendarWindowResolver::new(d(2025, 2, 12));
        let weeks = r.rolling_weeks(ROLLING_WEEKS);
        let labels: Vec<&str> = weeks.windows().map(|w| w.label()).collect();
        assert_eq!(
            labels,
            vec!["W51 2024", "W52 2024", "W01 2025", "W02 2025", "W03 2025", "W04 2025", "W05 2025", "W06 2025"]
        );
    }

    #[test]
    fn rolling_weeks_last_year_align_by_iso_week() {
        let r = CalendarWindowResolver::new(d(2025, 2, 12));
        let ly = r.rolling_weeks_last_year(ROLLING_WEEKS).unwrap();
        assert_eq!(ly.len(), 8);
        assert_eq!(ly.weeks[0].window.iso_year_week(), (2023, 51));
        assert_eq!(ly.weeks[2].window.start(), d(2024, 1, 1));
        assert_eq!(ly.weeks[7].window.end(), d(2024, 2, 11));
        let current = r.rolling_weeks(ROLLING_WEEKS);
        for (now, prior) in current.weeks.iter().zip(ly.weeks.iter()) {
            assert_eq!(now.index, prior.index);
            assert_eq!(now.window.iso_year_week().1, prior.window.iso_year_week().1);
        }
    }

    #[test]
    fn key_dates() {
        let r = CalendarWindowResolver::new(d(2025, 8, 20));
        let k = r.key_dates();
        assert_eq!(k.latest_sunday, d(2025, 8, 17));
        assert_eq!(k.eight_weeks_back, d(2025, 6, 22));
        assert_eq!(k.fiscal_year_start, d(2025, 4, 1));
        assert_eq!(k.quarter_start, d(2025, 7, 1));
        assert_eq!(k.month_start, d(2025, 8, 1));
        assert_eq!(k.current_year, 2025);
    }

    #[test]
    fn override_parses_date() {
        let r = CalendarWindowResolver::from_override(Some("2025-02-12")).unwrap();
        assert_eq!(r.reference_date(), d(2025, 2, 12));
    }

    #[test]
    fn override_rejects_malformed_value() {
        let err = CalendarWindowResolver::from_override(Some("12/02/2025")).unwrap_err();
        assert!(matches!(err, ReportError::InvalidReferenceDate { .. }));
    }

    #[test]
    fn window_week_requires_monday() {
        assert!(WindowSpec::week("w", d(2025, 2, 4)).is_err());
        let w = WindowSpec::week("w", d(2025, 2, 3)).unwrap();
        assert_eq!(w.end(), d(2025, 2, 9));
        assert_eq!(w.days(), 7);
    }

    #[test]
    fn window_span_requires_ordered_dates() {
        assert!(WindowSpec::span("s", d(2025, 2, 4), d(2025, 2, 3)).is_err());
        let s = WindowSpec::span("s", d(2025, 2, 3), d(2025, 2, 3)).unwrap();
        assert!(s.contains(d(2025, 2, 3)));
        assert!(!s.contains(d(2025, 2, 4)));
    }
}
