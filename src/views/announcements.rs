use std::collections::HashSet;
use std::sync::Arc;

use askama::Template;

use crate::{
    domain::Announcement,
    error::{AppError, Result},
    service::{AnnouncementStore, StoreState},
};
use super::{recent, Notice};

/// Display-ready strings for one announcement.
pub struct AnnouncementRow {
    pub id: String,
    pub badge: String,
    pub title: String,
    pub meta: String,
    pub unseen: bool,
    pub hidden: bool,
}

impl From<&Announcement> for AnnouncementRow {
    fn from(a: &Announcement) -> Self {
        let mut meta = Vec::new();
        if !a.date.is_empty() {
            meta.push(a.date.clone());
        }
        meta.push(format!("{} {}", a.views, if a.views == 1 { "view" } else { "views" }));
        if let Some(role) = &a.target_role {
            meta.push(format!("for {}", role));
        }
        if let Some(days) = a.duration_days {
            meta.push(format!("{} days", days));
        }
        meta.push(format!("id {}", a.id));

        Self {
            id: a.id.clone(),
            badge: a.kind.as_str().to_uppercase(),
            title: a.title.clone(),
            meta: meta.join(" | "),
            unseen: !a.has_seen,
            hidden: !a.visible,
        }
    }
}

#[derive(Template)]
#[template(path = "announcements/list.txt")]
struct AnnouncementListTemplate {
    loading: bool,
    error_message: String,
    rows: Vec<AnnouncementRow>,
}

#[derive(Template)]
#[template(path = "announcements/detail.txt")]
struct AnnouncementDetailTemplate {
    row: AnnouncementRow,
    content: String,
}

/// Result of opening an announcement: its rendered body, plus a notice if
/// recording the view failed.
pub struct Opened {
    pub detail: String,
    pub notice: Option<Notice>,
}

/// The announcement list as students, counsellors and admins see it.
pub struct AnnouncementBoard {
    store: Arc<AnnouncementStore>,
    opened: HashSet<String>,
}

impl AnnouncementBoard {
    pub fn new(store: Arc<AnnouncementStore>) -> Self {
        Self {
            store,
            opened: HashSet::new(),
        }
    }

    /// Re-fetches the list; a failure shows up in the rendered list too.
    pub async fn refresh(&self) -> Option<Notice> {
        match self.store.fetch().await {
            Ok(_) => None,
            Err(err) => Some(Notice::Error(err.to_string())),
        }
    }

    pub fn render(&self) -> Result<String> {
        let state = self.store.snapshot();
        let rows = state.announcements.iter().map(AnnouncementRow::from).collect();
        render_list(&state, rows)
    }

    pub fn render_recent(&self, count: usize) -> Result<String> {
        let state = self.store.snapshot();
        let rows = recent(&state.announcements, count)
            .iter()
            .map(AnnouncementRow::from)
            .collect();
        render_list(&state, rows)
    }

    /// Shows one announcement and records the view the first time it is
    /// opened on this board.
    pub async fn open(&mut self, id: &str) -> Result<Opened> {
        let before = self
            .store
            .snapshot()
            .find(id)
            .cloned()
            .ok_or_else(|| AppError::InvalidInput(format!("Announcement {} not found", id)))?;

        let mut notice = None;
        if !before.has_seen && self.opened.insert(id.to_string()) {
            if let Err(err) = self.store.mark_seen(id).await {
                notice = Some(Notice::Error(err.to_string()));
            }
        }

        // A failed mark-seen re-fetches, which may have dropped the entry.
        let shown = self.store.snapshot().find(id).cloned().unwrap_or(before);
        let detail = AnnouncementDetailTemplate {
            row: AnnouncementRow::from(&shown),
            content: shown.content.clone(),
        }
        .render()?;

        Ok(Opened { detail, notice })
    }
}

fn render_list(state: &StoreState, rows: Vec<AnnouncementRow>) -> Result<String> {
    let template = AnnouncementListTemplate {
        loading: state.loading,
        error_message: state.error.clone().unwrap_or_default(),
        rows,
    };
    Ok(template.render()?)
}
