use crate::error::Result;
use serde::{Deserialize, Deserializer};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "https://www.google-analytics.com/collect";
pub const DEFAULT_CLIENT_ID: &str = "555";
pub const DEFAULT_CATEGORY: &str = "Donations";

/// Analytics settings injected into the dispatcher.
///
/// Mirrors the platform's plugin options. Unknown keys in the JSON file are
/// ignored so a full settings export can be used as-is.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Measurement Protocol property ID (`UA-XXXX-Y`). Nothing is sent without it.
    pub tracking_id: Option<String>,
    pub affiliation: Option<String>,
    pub category: Option<String>,
    pub list: Option<String>,
    #[serde(deserialize_with = "deserialize_toggle")]
    pub test_mode: bool,
    #[serde(deserialize_with = "deserialize_toggle")]
    pub track_testing: bool,
    pub client_id: String,
    pub endpoint: String,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            tracking_id: None,
            affiliation: None,
            category: None,
            list: None,
            test_mode: false,
            track_testing: false,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl TrackingConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Tracking ID if one is configured and not blank.
    pub fn tracking_id(&self) -> Option<&str> {
        self.tracking_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn category_or_default(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }

    /// Test-mode donations are only tracked when testing is explicitly enabled.
    pub fn tracks_current_mode(&self) -> bool {
        !self.test_mode || self.track_testing
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Toggle {
    Bool(bool),
    Text(String),
}

/// Accepts JSON booleans as well as the platform's `enabled`/`disabled` style values.
fn deserialize_toggle<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Toggle::deserialize(deserializer)? {
        Toggle::Bool(value) => Ok(value),
        Toggle::Text(value) => Ok(matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "enabled" | "on" | "yes" | "true" | "1"
        )),
    }
}
