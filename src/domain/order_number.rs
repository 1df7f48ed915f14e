use std::fmt;

use chrono::NaiveDate;

use super::errors::DomainError;

pub const PREFIX: &str = "ORD";
pub const MAX_SEQUENCE: i32 = 9999;

const DATE_FORMAT: &str = "%Y%m%d";
const LEN: usize = 3 + 8 + 4;

/// `ORD<YYYYMMDD><NNNN>`, unique per date and increasing within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderNumber {
    date: NaiveDate,
    sequence: i32,
}

impl OrderNumber {
    pub fn new(date: NaiveDate, sequence: i32) -> Result<Self, DomainError> {
        if !(1..=MAX_SEQUENCE).contains(&sequence) {
            return Err(DomainError::validation(format!(
                "order sequence must be within 1..={}, got {}",
                MAX_SEQUENCE, sequence
            )));
        }
        Ok(Self { date, sequence })
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::validation(format!("malformed order number '{}'", s));

        if s.len() != LEN || !s.starts_with(PREFIX) || !s[PREFIX.len()..].bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let date = NaiveDate::parse_from_str(&s[3..11], DATE_FORMAT).map_err(|_| invalid())?;
        let sequence: i32 = s[11..].parse().map_err(|_| invalid())?;
        Self::new(date, sequence)
    }

    /// Prefix shared by every order number issued on `date`.
    pub fn date_prefix(date: NaiveDate) -> String {
        format!("{}{}", PREFIX, date.format(DATE_FORMAT))
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn sequence(&self) -> i32 {
        self.sequence
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", Self::date_prefix(self.date), self.sequence)
    }
}
