use anyhow::Context;
use chrono::{Local, NaiveDate};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The day-month-year format the reporting portal expects in form fields.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// A from/to date pair for the data POST. All current call sites query a
/// single day, so `from == to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl QueryWindow {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// Today in local time, the default for every front end.
    pub fn today() -> Self {
        Self::single_day(Local::now().date_naive())
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from
    }

    pub fn to_date(&self) -> NaiveDate {
        self.to
    }

    /// `fromDate` form field value, `DD/MM/YYYY`.
    pub fn from_param(&self) -> String {
        self.from.format(DATE_FORMAT).to_string()
    }

    /// `toDate` form field value, `DD/MM/YYYY`.
    pub fn to_param(&self) -> String {
        self.to.format(DATE_FORMAT).to_string()
    }
}

impl Display for QueryWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.from == self.to {
            write!(f, "{}", self.from_param())
        } else {
            write!(f, "{} to {}", self.from_param(), self.to_param())
        }
    }
}

impl FromStr for QueryWindow {
    type Err = crate::Error;

    /// Parses a single-day window from `DD/MM/YYYY`. Only the shape is
    /// checked here; whether the date has any data is up to the portal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .with_context(|| format!("Invalid date '{s}', expected DD/MM/YYYY"))?;
        Ok(Self::single_day(date))
    }
}
