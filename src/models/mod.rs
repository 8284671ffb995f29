use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Layout used for timestamps shown in alerts, sheet rows and the dashboard
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single brand/category/price-ceiling query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpec {
    pub brand: String,
    pub category: String,
    /// Upper bound in whole euros, sent as `price_to`
    pub price_ceiling: u32,
}

impl SearchSpec {
    pub fn new(brand: &str, category: &str, price_ceiling: u32) -> Self {
        Self {
            brand: brand.to_string(),
            category: category.to_string(),
            price_ceiling,
        }
    }
}

/// Canonical listing derived from a raw catalog record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub id: String,
    pub title: String,
    #[serde(rename = "price")]
    pub price_text: String,
    pub sizes: String,
    pub condition: String,
    pub link: String,
    pub photo_url: Option<String>,
    pub brand: String,
    pub category: String,
    #[serde(rename = "timestamp", with = "local_timestamp")]
    pub found_at: DateTime<Local>,
}

impl NormalizedItem {
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::from_parts(&self.id, &self.title, &self.price_text)
    }

    pub fn found_at_text(&self) -> String {
        self.found_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Stable dedup identity of a listing.
///
/// Lowercase hex SHA-256 over `id`, `title` and `price` separated by the
/// ASCII unit separator, so the value survives restarts and machine moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    const SEPARATOR: &'static [u8] = &[0x1f];

    pub fn from_parts(id: &str, title: &str, price_text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(id.as_bytes());
        hasher.update(Self::SEPARATOR);
        hasher.update(title.as_bytes());
        hasher.update(Self::SEPARATOR);
        hasher.update(price_text.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wrap a value read back from the persisted log
    pub fn from_stored(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            None
        } else {
            Some(Self(line.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle tag attached to a dashboard entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemState {
    #[serde(rename = "Trovato")]
    Found,
}

impl ItemState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemState::Found => "Trovato",
        }
    }
}

/// Entry of the recent-items window served by the status surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEntry {
    #[serde(flatten)]
    pub item: NormalizedItem,
    pub state: ItemState,
}

impl RecentEntry {
    pub fn found(item: NormalizedItem) -> Self {
        Self {
            item,
            state: ItemState::Found,
        }
    }
}

mod local_timestamp {
    use super::TIMESTAMP_FORMAT;
    use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Local>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let naive = NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(de::Error::custom)?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .ok_or_else(|| de::Error::custom(format!("ambiguous local time: {raw}")))
    }
}
