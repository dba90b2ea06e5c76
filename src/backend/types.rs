//! Wire types of the delivery backend REST surface

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::composer::media::MediaFile;

/// A registered broadcast destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Numeric identifier assigned by the messaging platform
    pub id: i64,
    /// Display title
    pub title: String,
    /// Chat type tag, e.g. `group` or `supergroup`
    #[serde(rename = "type")]
    pub kind: String,
    /// When the bot was added, as sent by the backend; empty when absent
    #[serde(default, deserialize_with = "null_as_empty")]
    pub added_at: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Group {
    /// The string-encoded id used in selections and send requests
    pub fn key(&self) -> String {
        self.id.to_string()
    }

    /// `added_at` parsed as RFC 3339, if it is one
    pub fn added_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.added_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Body of `GET /api/groups`
#[derive(Debug, Clone, Deserialize)]
pub struct GroupsResponse {
    /// Backend-reported outcome
    pub success: bool,
    /// Registered groups; absent on failure
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Failure description
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of every mutating endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    /// Backend-reported outcome
    pub success: bool,
    /// Failure description
    #[serde(default)]
    pub error: Option<String>,
}

/// JSON body of `POST /api/send-message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Destination group ids
    pub group_ids: Vec<String>,
    /// Message HTML
    pub message: String,
}

/// Multipart body of `POST /api/send-media-files`
#[derive(Debug, Clone)]
pub struct SendMediaRequest {
    /// Destination group ids, sent as a JSON-encoded `groupIds` part
    pub group_ids: Vec<String>,
    /// Message HTML, sent as the `caption` part
    pub caption: String,
    /// Files, each sent as a `media` part
    pub files: Vec<MediaFile>,
}

impl SendMediaRequest {
    /// The `groupIds` part value
    pub fn group_ids_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.group_ids)
    }
}
