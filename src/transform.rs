//! Mapping between the backend's announcement records and the display model.
//!
//! Both directions are pure. `to_backend` only emits the fields the caller
//! supplied, so a patch touching one field produces a one-field body.

use chrono::{DateTime, Utc};

use crate::domain::{
    Announcement, AnnouncementKind, AnnouncementPatch, AnnouncementPayload, AnnouncementRecord,
};

const DISPLAY_DATE_FORMAT: &str = "%b %d, %Y";

pub fn to_frontend(record: AnnouncementRecord) -> Announcement {
    let created_at = record.created_at.as_deref().and_then(parse_timestamp);
    let date = match (&created_at, &record.created_at) {
        (Some(ts), _) => ts.format(DISPLAY_DATE_FORMAT).to_string(),
        // Keep whatever the backend sent rather than dropping it.
        (None, Some(raw)) => raw.clone(),
        (None, None) => String::new(),
    };

    Announcement {
        id: record.id,
        title: record.title,
        content: record.content,
        visible: record.is_active,
        kind: record
            .kind
            .as_deref()
            .and_then(AnnouncementKind::from_str)
            .unwrap_or_default(),
        date,
        created_at,
        duration_days: record.duration_days,
        target_role: record.target_role,
        views: record.seen_count.unwrap_or(0),
        has_seen: record.has_seen.unwrap_or(false),
    }
}

pub fn to_backend(patch: &AnnouncementPatch) -> AnnouncementPayload {
    AnnouncementPayload {
        title: patch.title.clone(),
        content: patch.content.clone(),
        duration_days: patch.duration_days,
        is_active: patch.visible,
        kind: patch.kind.map(|k| k.as_str().to_string()),
        target_role: patch.target_role.clone(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // SQL-ish timestamps without an offset are treated as UTC.
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}
