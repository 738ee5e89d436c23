use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

/// A note persisted under `note:<slug>`
///
/// Timestamps serialize as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredNote {
    pub content: String,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis_opt")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredNote {
    pub fn new(content: String, created_at: DateTime<Utc>, preset: ExpiryPreset) -> Self {
        Self {
            content,
            created_at,
            expires_at: preset.expires_at(created_at),
        }
    }

    pub fn is_permanent(&self) -> bool {
        self.expires_at.is_none()
    }
}

/// 过期预设，只允许这四种取值
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, AsRefStr,
)]
pub enum ExpiryPreset {
    #[serde(rename = "1d")]
    #[strum(serialize = "1d")]
    OneDay,
    #[default]
    #[serde(rename = "7d")]
    #[strum(serialize = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    #[strum(serialize = "30d")]
    ThirtyDays,
    #[serde(rename = "never")]
    #[strum(serialize = "never")]
    Never,
}

impl ExpiryPreset {
    /// TTL in seconds, `None` for [`ExpiryPreset::Never`]
    pub fn seconds(&self) -> Option<u64> {
        match self {
            Self::OneDay => Some(86_400),
            Self::SevenDays => Some(604_800),
            Self::ThirtyDays => Some(2_592_000),
            Self::Never => None,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.seconds().map(Duration::from_secs)
    }

    /// `created_at + ttl`, or `None` when the note never expires
    pub fn expires_at(&self, created_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.seconds()
            .map(|secs| created_at + chrono::Duration::seconds(secs as i64))
    }
}

impl std::fmt::Display for ExpiryPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl std::str::FromStr for ExpiryPreset {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" => Ok(Self::OneDay),
            "7d" => Ok(Self::SevenDays),
            "30d" => Ok(Self::ThirtyDays),
            "never" => Ok(Self::Never),
            _ => Err(format!(
                "Invalid expiry preset: '{}'. Valid: 1d, 7d, 30d, never",
                s
            )),
        }
    }
}

/// Store key for a note
pub fn note_key(slug: &str) -> String {
    format!("note:{}", slug)
}

/// Store key for a client's share counter
pub fn rate_limit_key(client_address: &str) -> String {
    format!("rate:share:{}", client_address)
}

/// RFC 3339 with millisecond precision and a `Z` suffix
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub mod iso_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

pub mod iso_millis_opt {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&super::format_timestamp(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}
