use std::{fmt::Display, sync::Arc};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Header of the activity log, in column order.
pub const LOG_COLUMNS: [&str; 6] = [
    "Application",
    "Category",
    "Detail",
    "Start Time",
    "End Time",
    "Duration (seconds)",
];

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize, Clone, Copy)]
pub enum Category {
    Browser,
    Application,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Browser => write!(f, "Browser"),
            Category::Application => write!(f, "Application"),
        }
    }
}

/// One closed focus interval. Field order matches [LOG_COLUMNS].
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct ActivityRecord {
    #[serde(rename = "Application")]
    pub application: Arc<str>,
    #[serde(rename = "Category")]
    pub category: Category,
    #[serde(rename = "Detail")]
    pub detail: Arc<str>,
    #[serde(rename = "Start Time", with = "timestamp_ser")]
    pub start: NaiveDateTime,
    #[serde(rename = "End Time", with = "timestamp_ser")]
    pub end: NaiveDateTime,
    #[serde(rename = "Duration (seconds)")]
    pub duration_seconds: f64,
}

impl ActivityRecord {
    /// Builds a record, deriving the duration from the timestamps. An `end` before `start`
    /// (clock moved backwards) is clamped to `start`.
    pub fn new(
        application: Arc<str>,
        category: Category,
        detail: Arc<str>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        let end = end.max(start);
        let duration_seconds = (end - start).num_milliseconds() as f64 / 1000.;
        Self {
            application,
            category,
            detail,
            start,
            end,
            duration_seconds,
        }
    }
}

mod timestamp_ser {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use crate::utils::time::{format_timestamp, TIMESTAMP_FORMAT};

    pub fn serialize<S>(moment: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_timestamp(moment))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
