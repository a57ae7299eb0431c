//! Date ranges and Solr date math (`NOW-1DAYS/DAY`).

use crate::error::{QuarryError, Result};
use crate::indexer::document::format_solr_date;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Calendar interval with day granularity, parsed from ISO-8601 (`P1Y2M3D`, `P2W`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateInterval {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl DateInterval {
    pub fn days(days: u32) -> Self {
        DateInterval {
            days,
            ..Default::default()
        }
    }

    pub fn months(months: u32) -> Self {
        DateInterval {
            months,
            ..Default::default()
        }
    }

    pub fn years(years: u32) -> Self {
        DateInterval {
            years,
            ..Default::default()
        }
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    /// Date math with `sign` (`'+'` or `'-'`) in front of every unit:
    /// `-1YEARS-2MONTHS-3DAYS`. Zero units are left out.
    pub fn to_date_math(&self, sign: char) -> String {
        let mut math = String::new();
        for (amount, unit) in [
            (self.years, "YEARS"),
            (self.months, "MONTHS"),
            (self.days, "DAYS"),
        ] {
            if amount > 0 {
                math.push_str(&format!("{}{}{}", sign, amount, unit));
            }
        }
        math
    }
}

impl FromStr for DateInterval {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| QuarryError::InvalidInterval {
            interval: s.to_string(),
            reason: reason.to_string(),
        };

        let body = s
            .strip_prefix('P')
            .ok_or_else(|| invalid("must start with 'P'"))?;
        if body.is_empty() {
            return Err(invalid("empty interval"));
        }

        let mut interval = DateInterval::default();
        let mut number = String::new();
        let mut in_time = false;
        for c in body.chars() {
            match c {
                '0'..='9' => number.push(c),
                'T' if !in_time && number.is_empty() => in_time = true,
                _ => {
                    let amount: u32 = number
                        .parse()
                        .map_err(|_| invalid("missing amount"))?;
                    number.clear();
                    let too_large = || invalid("amount too large");
                    match (in_time, c) {
                        (false, 'Y') => {
                            interval.years =
                                interval.years.checked_add(amount).ok_or_else(too_large)?
                        }
                        (false, 'M') => {
                            interval.months =
                                interval.months.checked_add(amount).ok_or_else(too_large)?
                        }
                        (false, 'W') => {
                            let days = amount.checked_mul(7).ok_or_else(too_large)?;
                            interval.days =
                                interval.days.checked_add(days).ok_or_else(too_large)?
                        }
                        (false, 'D') => {
                            interval.days =
                                interval.days.checked_add(amount).ok_or_else(too_large)?
                        }
                        (true, 'H' | 'M' | 'S') => {
                            if amount > 0 {
                                return Err(invalid(
                                    "hours, minutes and seconds are not supported",
                                ));
                            }
                        }
                        _ => return Err(invalid("unknown designator")),
                    }
                }
            }
        }
        if !number.is_empty() {
            return Err(invalid("trailing amount without designator"));
        }
        Ok(interval)
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}Y{}M{}D", self.years, self.months, self.days)
    }
}

/// Boundary a relative date is rounded to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRangeRounding {
    #[default]
    None,
    StartOfDay,
    StartOfPreviousDay,
    EndOfDay,
    EndOfPreviousDay,
    StartOfMonth,
    StartOfPreviousMonth,
    EndOfMonth,
    EndOfPreviousMonth,
    StartOfYear,
    StartOfPreviousYear,
    EndOfYear,
    EndOfPreviousYear,
}

impl DateRangeRounding {
    pub fn to_date_math(self) -> &'static str {
        match self {
            DateRangeRounding::None => "",
            DateRangeRounding::StartOfDay => "/DAY",
            DateRangeRounding::StartOfPreviousDay => "/DAY-1DAY",
            DateRangeRounding::EndOfDay => "/DAY+1DAY-1SECOND",
            DateRangeRounding::EndOfPreviousDay => "/DAY-1SECOND",
            DateRangeRounding::StartOfMonth => "/MONTH",
            DateRangeRounding::StartOfPreviousMonth => "/MONTH-1MONTH",
            DateRangeRounding::EndOfMonth => "/MONTH+1MONTH-1SECOND",
            DateRangeRounding::EndOfPreviousMonth => "/MONTH-1SECOND",
            DateRangeRounding::StartOfYear => "/YEAR",
            DateRangeRounding::StartOfPreviousYear => "/YEAR-1YEAR",
            DateRangeRounding::EndOfYear => "/YEAR+1YEAR-1SECOND",
            DateRangeRounding::EndOfPreviousYear => "/YEAR-1SECOND",
        }
    }
}

/// Fixed range; a missing bound is open (`*`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsoluteDateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl AbsoluteDateRange {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        AbsoluteDateRange { from, to }
    }

    pub fn bounds(&self) -> (String, String) {
        let bound = |d: &Option<DateTime<Utc>>| d.as_ref().map_or("*".to_string(), format_solr_date);
        (bound(&self.from), bound(&self.to))
    }
}

/// Range around `base` (now if unset): `base - before` rounded with
/// `from_rounding` up to `base + after` rounded with `to_rounding`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeDateRange {
    pub base: Option<DateTime<Utc>>,
    pub before: Option<DateInterval>,
    pub after: Option<DateInterval>,
    pub from_rounding: DateRangeRounding,
    pub to_rounding: DateRangeRounding,
}

impl Default for RelativeDateRange {
    fn default() -> Self {
        RelativeDateRange {
            base: None,
            before: None,
            after: None,
            from_rounding: DateRangeRounding::StartOfDay,
            to_rounding: DateRangeRounding::EndOfDay,
        }
    }
}

impl RelativeDateRange {
    pub fn new(base: Option<DateTime<Utc>>) -> Self {
        RelativeDateRange {
            base,
            ..Default::default()
        }
    }

    pub fn before(mut self, interval: DateInterval) -> Self {
        self.before = Some(interval);
        self
    }

    pub fn after(mut self, interval: DateInterval) -> Self {
        self.after = Some(interval);
        self
    }

    pub fn rounding(mut self, from: DateRangeRounding, to: DateRangeRounding) -> Self {
        self.from_rounding = from;
        self.to_rounding = to;
        self
    }

    fn base_math(&self) -> String {
        self.base
            .as_ref()
            .map_or("NOW".to_string(), format_solr_date)
    }

    pub fn bounds(&self) -> (String, String) {
        let base = self.base_math();
        let from = format!(
            "{}{}{}",
            base,
            self.before.map(|i| i.to_date_math('-')).unwrap_or_default(),
            self.from_rounding.to_date_math()
        );
        let to = format!(
            "{}{}{}",
            base,
            self.after.map(|i| i.to_date_math('+')).unwrap_or_default(),
            self.to_rounding.to_date_math()
        );
        (from, to)
    }
}
