//! `DD/MM/YYYY` date handling shared by the plan, the persistence layer and
//! the external surfaces.

use chrono::{Months, NaiveDate};
use serde::Deserialize;

pub const DISPLAY_FORMAT: &str = "%d/%m/%Y";

pub fn parse_display_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DISPLAY_FORMAT).ok()
}

pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Calendar-month addition, clamped to the end of the target month.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Outcome of reading a date value that may be absent or malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateField {
    Missing,
    Unparseable(String),
    Valid(NaiveDate),
}

impl DateField {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => DateField::Missing,
            Some(text) => match parse_display_date(text) {
                Some(date) => DateField::Valid(date),
                None => DateField::Unparseable(text.to_string()),
            },
        }
    }

    pub fn from_json(value: Option<&serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => DateField::Missing,
            Some(serde_json::Value::String(text)) => DateField::parse(Some(text)),
            Some(other) => DateField::Unparseable(other.to_string()),
        }
    }

    pub fn valid(&self) -> Option<NaiveDate> {
        match self {
            DateField::Valid(date) => Some(*date),
            _ => None,
        }
    }

    pub fn is_unparseable(&self) -> bool {
        matches!(self, DateField::Unparseable(_))
    }
}

impl From<NaiveDate> for DateField {
    fn from(value: NaiveDate) -> Self {
        DateField::Valid(value)
    }
}

/// serde adapter: `#[serde(with = "crate::dates::display_date")]`
pub mod display_date {
    use super::*;
    use serde::{Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_display_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_display_date(&raw)
            .ok_or_else(|| D::Error::custom(format!("expected DD/MM/YYYY date, got '{raw}'")))
    }
}

/// serde adapter for `Option<NaiveDate>`; `None` maps to JSON null.
pub mod option_display_date {
    use super::*;
    use serde::{Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        date: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_some(&format_display_date(*date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(raw) => parse_display_date(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("expected DD/MM/YYYY date, got '{raw}'"))),
        }
    }
}
