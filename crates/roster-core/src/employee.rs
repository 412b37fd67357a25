// ABOUTME: Defines the Employee struct, the single persisted entity of the roster service.
// ABOUTME: Serializes to the flat JSON wire form, rendering hire_date as a calendar date.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted employee record. The `id` and `hire_date` are assigned by the
/// store at creation; every other field comes from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub salary: Option<f64>,
    #[serde(default, with = "hire_date_format")]
    pub hire_date: Option<DateTime<Utc>>,
}

impl fmt::Display for Employee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Employee {} {}", self.first_name, self.last_name)
    }
}

/// Wire format for `hire_date`: `YYYY-MM-DD`, or `null` when unset.
/// Parsing a date yields midnight UTC, so the time of day does not survive
/// a round trip through JSON.
mod hire_date_format {
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            NaiveDate::parse_from_str(&s, FORMAT)
                .map(|date| date.and_time(NaiveTime::MIN).and_utc())
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
