pub mod store;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use crate::temporal::lenient;

/// Problem difficulty as recorded by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Case-insensitive parse; anything else is "unknown".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Revision weight: harder problems decay faster.
    pub fn weight(difficulty: Option<Difficulty>) -> i64 {
        match difficulty {
            Some(Difficulty::Easy) | None => 1,
            Some(Difficulty::Medium) => 2,
            Some(Difficulty::Hard) => 3,
        }
    }
}

/// One solved practice problem, as handed over by the record store.
///
/// Only `id`, `user_id` and `title` are required. Every other field falls back
/// to `None` or its default when malformed, and fields this type does not
/// model are kept in `extra` so a write-back never drops them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PracticeRecord {
    pub id: String,
    #[serde(rename = "user_id", alias = "owner")]
    pub owner: String,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_difficulty")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub date_solved: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_retry_flag")]
    pub retry_later: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_spaced_repetition")]
    pub spaced_repetition: Option<SpacedRepetition>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_opt_u32")]
    pub time_taken_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_opt_string")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_opt_string")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PracticeRecord {
    pub fn new<S: Into<String>>(id: S, owner: S, title: S) -> Self {
        PracticeRecord {
            id: id.into(),
            owner: owner.into(),
            title: title.into(),
            difficulty: None,
            tags: Vec::new(),
            date_solved: None,
            retry_later: false,
            spaced_repetition: None,
            time_taken_min: None,
            url: None,
            notes: None,
            extra: Map::new(),
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn solved_on(mut self, date: NaiveDate) -> Self {
        self.date_solved = Some(date);
        self
    }

    pub fn flagged_for_retry(mut self, retry: bool) -> Self {
        self.retry_later = retry;
        self
    }

    pub fn review_count(&self) -> Option<usize> {
        self.spaced_repetition
            .as_ref()
            .map(|sr| sr.review_history.len())
    }
}

/// SM-2 style review state kept per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpacedRepetition {
    #[serde(default, deserialize_with = "deserialize_repetitions")]
    pub repetitions: u32,
    #[serde(default = "default_interval", alias = "interval", deserialize_with = "deserialize_interval")]
    pub interval_days: u32,
    #[serde(default = "default_easiness", deserialize_with = "deserialize_easiness")]
    pub easiness: f64,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub next_review: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub last_reviewed: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_review_history")]
    pub review_history: Vec<ReviewEvent>,
}

impl Default for SpacedRepetition {
    fn default() -> Self {
        SpacedRepetition {
            repetitions: 0,
            interval_days: default_interval(),
            easiness: default_easiness(),
            next_review: None,
            last_reviewed: None,
            review_history: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewEvent {
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_u8")]
    pub quality: Option<u8>,
    #[serde(default = "default_action", deserialize_with = "deserialize_action")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_opt_u32")]
    pub interval: Option<u32>,
}

fn default_interval() -> u32 {
    1
}

fn default_easiness() -> f64 {
    2.5
}

fn default_action() -> String {
    "reviewed".to_string()
}

/// Non-negative whole number from a JSON number or numeric string. Fractions
/// round to the nearest whole value.
fn whole_number(value: &Value) -> Option<u64> {
    let number = match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64)),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f.round() as u64),
        _ => None,
    };
    if number.is_none() && !value.is_null() {
        tracing::debug!(value = %value, "Ignoring malformed number");
    }
    number
}

fn deserialize_opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(whole_number(&raw).and_then(|n| u32::try_from(n).ok()))
}

fn deserialize_opt_u8<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(whole_number(&raw).and_then(|n| u8::try_from(n).ok()))
}

fn deserialize_repetitions<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_opt_u32(deserializer)?.unwrap_or(0))
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_opt_u32(deserializer)?.unwrap_or_else(default_interval))
}

fn deserialize_easiness<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let easiness = match &raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(easiness.filter(|f| f.is_finite()).unwrap_or_else(default_easiness))
}

fn deserialize_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn deserialize_action<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_opt_string(deserializer)?.unwrap_or_else(default_action))
}

fn deserialize_difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_opt_string(deserializer)?.as_deref().and_then(Difficulty::parse))
}

// A bare string is a single tag; non-string entries are dropped.
fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) => vec![s],
        _ => Vec::new(),
    })
}

fn deserialize_review_history<'de, D>(deserializer: D) -> Result<Vec<ReviewEvent>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<ReviewEvent>(item) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring malformed review event");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    })
}

fn deserialize_spaced_repetition<'de, D>(deserializer: D) -> Result<Option<SpacedRepetition>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    if !raw.is_object() {
        return Ok(None);
    }
    match serde_json::from_value::<SpacedRepetition>(raw) {
        Ok(sr) => Ok(Some(sr)),
        Err(e) => {
            tracing::debug!(error = %e, "Ignoring malformed spaced repetition state");
            Ok(None)
        }
    }
}

// Older records stored the retry flag as the string "Yes"; newer ones use a
// boolean. Both collapse to `bool` here.
fn deserialize_retry_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct RetryFlagVisitor;

    impl<'de> Visitor<'de> for RetryFlagVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a boolean or a \"Yes\"/\"No\" string")
        }

        fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(matches!(value.trim().to_ascii_lowercase().as_str(), "yes" | "true"))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value != 0)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value != 0)
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value != 0.0)
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            while seq.next_element::<de::IgnoredAny>()?.is_some() {}
            Ok(false)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: de::MapAccess<'de>,
        {
            while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
            Ok(false)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(false)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(false)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: Deserializer<'de>,
        {
            deserializer.deserialize_any(RetryFlagVisitor)
        }
    }

    deserializer.deserialize_any(RetryFlagVisitor)
}
