use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// An announcement as the dashboards display it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub visible: bool,
    pub kind: AnnouncementKind,
    /// Creation date formatted for display; empty when the backend sent none.
    pub date: String,
    pub created_at: Option<DateTime<Utc>>,
    pub duration_days: Option<u32>,
    pub target_role: Option<String>,
    pub views: u64,
    pub has_seen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementKind {
    #[default]
    Info,
    Event,
    Warning,
    Urgent,
}

impl AnnouncementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementKind::Info => "info",
            AnnouncementKind::Event => "event",
            AnnouncementKind::Warning => "warning",
            AnnouncementKind::Urgent => "urgent",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "info" => Some(AnnouncementKind::Info),
            "event" => Some(AnnouncementKind::Event),
            "warning" => Some(AnnouncementKind::Warning),
            "urgent" => Some(AnnouncementKind::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for AnnouncementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An announcement as the backend stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seen_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_seen: Option<bool>,
}

/// Some backends hand out numeric ids; the client treats every id as opaque text.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
    })
}

/// Display-side partial edit. `None` means "leave this field alone".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub visible: Option<bool>,
    pub kind: Option<AnnouncementKind>,
    pub duration_days: Option<u32>,
    pub target_role: Option<String>,
}

impl AnnouncementPatch {
    pub fn is_empty(&self) -> bool {
        *self == AnnouncementPatch::default()
    }
}

impl From<&Announcement> for AnnouncementPatch {
    fn from(a: &Announcement) -> Self {
        Self {
            title: Some(a.title.clone()),
            content: Some(a.content.clone()),
            visible: Some(a.visible),
            kind: Some(a.kind),
            duration_days: a.duration_days,
            target_role: a.target_role.clone(),
        }
    }
}

/// Backend-side request body for create and update. Absent fields are not serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnouncementPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_role: Option<String>,
}

impl AnnouncementPayload {
    pub fn is_empty(&self) -> bool {
        *self == AnnouncementPayload::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewAnnouncement {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
    pub visible: bool,
    pub kind: Option<AnnouncementKind>,
    #[validate(range(min = 1, max = 365, message = "Duration must be between 1 and 365 days"))]
    pub duration_days: Option<u32>,
    pub target_role: Option<String>,
}

impl NewAnnouncement {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            visible: true,
            kind: None,
            duration_days: None,
            target_role: None,
        }
    }
}

impl From<NewAnnouncement> for AnnouncementPatch {
    fn from(n: NewAnnouncement) -> Self {
        Self {
            title: Some(n.title),
            content: Some(n.content),
            visible: Some(n.visible),
            kind: n.kind,
            duration_days: n.duration_days,
            target_role: n.target_role,
        }
    }
}

/// Response of the mark-seen endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenReceipt {
    pub seen_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!(AnnouncementKind::from_str("urgent"), Some(AnnouncementKind::Urgent));
        assert_eq!(AnnouncementKind::from_str("EVENT"), Some(AnnouncementKind::Event));
        assert_eq!(AnnouncementKind::from_str("party"), None);
    }

    #[test]
    fn test_record_accepts_numeric_id() {
        let record: AnnouncementRecord =
            serde_json::from_str(r#"{"id": 42, "title": "Hi", "content": "There", "is_active": true}"#)
                .unwrap();
        assert_eq!(record.id, "42");
        assert!(record.is_active);
        assert_eq!(record.seen_count, None);
    }

    #[test]
    fn test_new_announcement_validation() {
        let ok = NewAnnouncement::new("Title", "Body");
        assert!(ok.validate().is_ok());

        let missing = NewAnnouncement::new("", "Body");
        assert!(missing.validate().is_err());

        let mut too_long = NewAnnouncement::new("Title", "Body");
        too_long.duration_days = Some(400);
        assert!(too_long.validate().is_err());
    }
}
