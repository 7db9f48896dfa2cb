use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Bucket key: a single lowercase ASCII letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Letter(char);

impl Letter {
    pub fn new(c: char) -> Option<Self> {
        let lower = c.to_ascii_lowercase();
        lower.is_ascii_lowercase().then_some(Letter(lower))
    }

    /// Bucket for a (trimmed) contact name.
    pub fn of_name(name: &str) -> Option<Self> {
        name.chars().next().and_then(Letter::new)
    }

    pub fn as_char(self) -> char {
        self.0
    }

    pub fn upper(self) -> char {
        self.0.to_ascii_uppercase()
    }

    pub fn all() -> impl Iterator<Item = Letter> {
        ('a'..='z').map(Letter)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Letter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Letter::new(c).ok_or_else(|| anyhow!("`{s}` is not a letter between A and Z"))
            }
            _ => Err(anyhow!("`{s}` is not a single letter")),
        }
    }
}

impl TryFrom<String> for Letter {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        // stored keys are always lowercase already
        match value.parse::<Letter>()? {
            letter if value == letter.to_string() => Ok(letter),
            _ => Err(anyhow!("bucket key `{value}` is not lowercase")),
        }
    }
}

impl From<Letter> for String {
    fn from(letter: Letter) -> Self {
        letter.0.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(String);

impl ContactId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn millis(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ContactId {
    fn from(value: &str) -> Self {
        ContactId(value.to_string())
    }
}

impl FromStr for ContactId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ContactId(s.trim().to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub job: String,
    pub phone: String,
}

/// Hands out millisecond-timestamp ids that strictly increase, even when
/// the clock stalls or steps backwards.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Start above every numeric id already in use so deleted ids are never
    /// handed out again.
    pub fn seeded<'a>(ids: impl IntoIterator<Item = &'a ContactId>) -> Self {
        let last = ids.into_iter().filter_map(ContactId::millis).max().unwrap_or(0);
        Self { last }
    }

    pub fn next_id(&mut self) -> ContactId {
        let now = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        self.next_at(u64::try_from(now).unwrap_or(0))
    }

    fn next_at(&mut self, now_millis: u64) -> ContactId {
        let id = now_millis.max(self.last.saturating_add(1));
        self.last = id;
        ContactId(id.to_string())
    }
}
