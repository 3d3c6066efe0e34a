//! Launch record: one launch as returned by the launches query endpoint.
//!
//! Required fields have no serde default, so their absence fails
//! deserialization. Everything else falls back to `None` or an empty list.

use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A single validated launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
    #[serde(default)]
    pub fairings: Option<Fairings>,
    pub links: Links,
    #[serde(default)]
    pub static_fire_date_utc: Option<String>,
    #[serde(default)]
    pub static_fire_date_unix: Option<i64>,
    pub net: bool,
    #[serde(default)]
    pub window: Option<i64>,
    pub rocket: String,

    /// `None` until the outcome is known.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub failures: Vec<Value>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub crew: Vec<Value>,
    #[serde(default)]
    pub ships: Vec<String>,
    #[serde(default)]
    pub capsules: Vec<String>,

    /// Populated payload objects, not bare ids.
    #[serde(default)]
    pub payloads: Vec<Payload>,
    pub launchpad: String,
    pub flight_number: u32,
    pub name: String,

    /// Scheduled launch instant. Drives the incremental watermark.
    pub date_utc: LaunchDate,
    pub date_unix: i64,
    pub date_local: String,
    pub date_precision: String,

    /// True while the launch has not happened yet.
    pub upcoming: bool,
    #[serde(default)]
    pub cores: Vec<Core>,
    pub auto_update: bool,
    pub tbd: bool,
    #[serde(default)]
    pub launch_library_id: Option<String>,
    pub id: String,
}

/// An upstream date string together with the instant it names.
///
/// Comparisons go through [`LaunchDate::instant`]. Serializing writes the
/// upstream text back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchDate {
    text: String,
    instant: Timestamp,
}

impl LaunchDate {
    pub fn instant(&self) -> Timestamp {
        self.instant
    }
}

impl Serialize for LaunchDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for LaunchDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let instant = text
            .parse::<Timestamp>()
            .map_err(|e| serde::de::Error::custom(format!("invalid date {text:?}: {e}")))?;
        Ok(Self { text, instant })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fairings {
    #[serde(default)]
    pub reused: Option<bool>,
    #[serde(default)]
    pub recovery_attempt: Option<bool>,
    #[serde(default)]
    pub recovered: Option<bool>,
    #[serde(default)]
    pub ships: Vec<String>,
}

/// External links. `patch`, `reddit` and `flickr` must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Links {
    pub patch: Patch,
    pub reddit: Reddit,
    pub flickr: Flickr,
    #[serde(default)]
    pub presskit: Option<String>,
    #[serde(default)]
    pub webcast: Option<String>,
    #[serde(default)]
    pub youtube_id: Option<String>,
    #[serde(default)]
    pub article: Option<String>,
    #[serde(default)]
    pub wikipedia: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reddit {
    #[serde(default)]
    pub campaign: Option<String>,
    #[serde(default)]
    pub launch: Option<String>,
    #[serde(default)]
    pub media: Option<String>,
    #[serde(default)]
    pub recovery: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flickr {
    #[serde(default)]
    pub small: Vec<String>,
    #[serde(default)]
    pub original: Vec<String>,
}

/// A rocket core flown on the launch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Core {
    #[serde(default)]
    pub core: Option<String>,
    #[serde(default)]
    pub flight: Option<u32>,
    #[serde(default)]
    pub gridfins: Option<bool>,
    #[serde(default)]
    pub legs: Option<bool>,
    #[serde(default)]
    pub reused: Option<bool>,
    #[serde(default)]
    pub landing_attempt: Option<bool>,
    #[serde(default)]
    pub landing_success: Option<bool>,
    #[serde(default)]
    pub landing_type: Option<String>,
    #[serde(default)]
    pub landpad: Option<String>,
}

/// A payload carried by the launch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub mass_kg: Option<f64>,
    #[serde(default)]
    pub mass_lbs: Option<f64>,
    #[serde(default)]
    pub orbit: Option<String>,
    #[serde(default)]
    pub customers: Vec<String>,
    #[serde(default)]
    pub nationalities: Vec<String>,
    #[serde(default)]
    pub manufacturers: Vec<String>,
    pub id: String,
}
