//! Plain-text views over the store. Views read snapshots and issue
//! commands; they never touch store state themselves.

pub mod announcements;
pub mod composer;
pub mod forms;

use std::fmt;

use crate::domain::Announcement;

pub use announcements::{AnnouncementBoard, Opened};
pub use composer::AnnouncementComposer;
pub use forms::render_form;

/// Short-lived message shown after a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Success(msg) => write!(f, "OK: {}", msg),
            Notice::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// The `count` newest visible announcements.
pub fn recent(announcements: &[Announcement], count: usize) -> Vec<Announcement> {
    let mut visible: Vec<Announcement> = announcements
        .iter()
        .filter(|a| a.visible)
        .cloned()
        .collect();
    // Undated entries sort last.
    visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    visible.truncate(count);
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AnnouncementKind;
    use chrono::{TimeZone, Utc};

    fn announcement(id: &str, visible: bool, day: Option<u32>) -> Announcement {
        Announcement {
            id: id.to_string(),
            title: format!("Title {}", id),
            content: "Body".to_string(),
            visible,
            kind: AnnouncementKind::Info,
            date: String::new(),
            created_at: day.map(|d| Utc.with_ymd_and_hms(2026, 5, d, 9, 0, 0).unwrap()),
            duration_days: None,
            target_role: None,
            views: 0,
            has_seen: false,
        }
    }

    #[test]
    fn test_recent_filters_sorts_and_limits() {
        let list = vec![
            announcement("old", true, Some(1)),
            announcement("hidden", false, Some(20)),
            announcement("undated", true, None),
            announcement("newest", true, Some(15)),
            announcement("middle", true, Some(10)),
        ];

        let ids: Vec<String> = recent(&list, 3).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["newest", "middle", "old"]);

        let all: Vec<String> = recent(&list, 10).into_iter().map(|a| a.id).collect();
        assert_eq!(all.last().map(String::as_str), Some("undated"));
    }

    #[test]
    fn test_notice_display() {
        assert_eq!(Notice::Success("Saved".into()).to_string(), "OK: Saved");
        assert!(Notice::Error("nope".into()).is_error());
    }
}
